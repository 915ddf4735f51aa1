use crate::batch::{FileReport, FileStatus};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Per-file progress bar for a batch run; hidden off a terminal
pub struct BatchProgress {
    bar: ProgressBar,
    started: Instant,
    failed: usize,
}

impl BatchProgress {
    pub fn new(total_files: usize, visible: bool) -> Self {
        let bar = if visible && console::Term::stdout().is_term() {
            let style = ProgressStyle::with_template(
                "{spinner} [{bar:30}] {pos}/{len} {wide_msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
            ProgressBar::new(total_files as u64).with_style(style)
        } else {
            ProgressBar::hidden()
        };

        Self {
            bar,
            started: Instant::now(),
            failed: 0,
        }
    }

    pub fn advance(&mut self, file: &FileReport) {
        if file.status == FileStatus::Failed {
            self.failed += 1;
        }
        self.bar.set_message(file.path.clone());
        self.bar.inc(1);
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Clear the bar and return the elapsed time
    pub fn finish(&self) -> Duration {
        self.bar.finish_and_clear();
        self.started.elapsed()
    }
}

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        if console::Term::stdout().is_term() {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        Self { pb }
    }

    pub fn finish_with_message(&self, msg: &str) {
        self.pb.finish_with_message(msg.to_string());
    }
}

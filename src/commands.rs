use crate::{OutputMode, emit_success};
use codeshape::config::{self, CodeshapeConfig, Settings};
use codeshape::source::{GitCheckout, LocalDirectory, RepositorySource};
use codeshape::ui::{self, Icons, banner, section, status, success};
use codeshape::{BatchRunner, DirectorySink, ExtractionEngine, Language};
use indicatif::HumanDuration;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub fn run_version(output_mode: OutputMode) -> anyhow::Result<()> {
    if output_mode.is_human() {
        banner(
            &format!("{}", "Codeshape".bold().style(codeshape::ui::theme().info.clone())),
            &format!("Version {}", env!("CARGO_PKG_VERSION").bold())
        );
    } else {
        let data = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
        });
        emit_success(output_mode, "version", data)?;
    }
    Ok(())
}

pub fn run_init(output_mode: OutputMode, path: &Path, force: bool) -> anyhow::Result<()> {
    config::write_config(path, &CodeshapeConfig::starter(), force)?;
    if output_mode.is_human() {
        success(&format!("Wrote {}", path.display()));
    } else {
        emit_success(output_mode, "init", serde_json::json!({ "config": path.display().to_string() }))?;
    }
    Ok(())
}

/// Single-file mode prints the document itself; errors are not turned into
/// error documents here.
pub fn run_extract(settings: &Settings, file: &Path, language: Option<&str>) -> anyhow::Result<()> {
    let engine = ExtractionEngine::new(settings.extract.clone())?;
    let model = match language {
        Some(name) => {
            let language = Language::from_str(name)?;
            let bytes = std::fs::read(file)?;
            engine.extract_bytes(&file.to_string_lossy(), language, &bytes)?
        }
        None => engine.extract_file(file)?,
    };
    println!("{}", model.to_json_pretty()?);
    Ok(())
}

pub fn run_batch(
    output_mode: OutputMode,
    settings: &Settings,
    path: Option<PathBuf>,
    repo: Option<String>,
    branch: Option<String>,
) -> anyhow::Result<()> {
    let source: Box<dyn RepositorySource> = match repo {
        Some(url) => {
            let checkout = GitCheckout::new(url)?;
            Box::new(match branch {
                Some(branch) => checkout.branch(branch),
                None => checkout,
            })
        }
        None => Box::new(LocalDirectory::new(path.unwrap_or_else(|| PathBuf::from(".")))),
    };

    let root = if output_mode.is_human() {
        let spinner = ui::Spinner::new(&format!("Preparing {}", source.describe()));
        let root = source.local_root()?;
        spinner.finish_with_message("Ready");
        root
    } else {
        source.local_root()?
    };

    let engine = ExtractionEngine::new(settings.extract.clone())?;
    let runner = BatchRunner::new(&engine, settings.batch_options(&root));
    let files = runner.discover()?;

    if output_mode.is_human() {
        ui::header(&format!("Extracting {} files", files.len()));
        status(Icons::FOLDER, "Source", &source.describe());
        status(Icons::PACKAGE, "Output", &settings.output_dir.display().to_string());
    }

    let mut sink = DirectorySink::new(&settings.output_dir);
    let mut progress = ui::BatchProgress::new(files.len(), output_mode.is_human());
    let report = runner.run_files(&files, &mut sink, &mut |file| progress.advance(file))?;
    let elapsed = progress.finish();

    if !output_mode.is_human() {
        return emit_success(output_mode, "batch", serde_json::to_value(&report)?);
    }

    println!(
        "{}",
        ui::stats_table(&[
            ("Files", report.total().to_string()),
            ("Extracted", report.extracted.to_string()),
            ("Failed", progress.failed().to_string()),
            ("Time", HumanDuration(elapsed).to_string()),
        ])
    );

    if report.failed > 0 {
        section("Failures");
        for file in report.failures() {
            ui::file_failed(&file.path, file.error.as_deref().unwrap_or(""));
        }
        ui::warn(&format!("{} files produced error documents", report.failed));
    } else {
        success("All files extracted");
    }
    Ok(())
}

pub fn run_serve(settings: &Settings, port: u16) -> anyhow::Result<()> {
    let engine = ExtractionEngine::new(settings.extract.clone())?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(codeshape::server::start_server(port, engine))
}

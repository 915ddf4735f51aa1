//! Batch driver
//!
//! Discovers source files below a root, extracts each one in isolation and
//! hands one document per file to a `DocumentSink`. A failing file (bad
//! syntax, bad encoding, unreadable, or a panic inside an extractor) yields an
//! error document and the run moves on.

use crate::adapter::ExtractionEngine;
use crate::ignore::IgnoreFilter;
use crate::model::{CodeModel, ErrorDocument, Language};
use crate::sink::DocumentSink;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

pub const DEFAULT_SUFFIX: &str = ".json";

/// What a batch run reads and how its documents are keyed
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub root: PathBuf,
    /// Excluded from discovery when it lies below `root`
    pub output_dir: Option<PathBuf>,
    pub suffix: String,
    /// Extension allow-list; defaults to every registered extension
    pub extensions: Option<Vec<String>>,
    /// Glob patterns relative to `root`
    pub exclude: Vec<String>,
}

impl BatchOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_dir: None,
            suffix: DEFAULT_SUFFIX.to_string(),
            extensions: None,
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Extracted,
    Failed,
}

/// Outcome for one processed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: String,
    pub language: Language,
    /// Location returned by the sink
    pub output: String,
    pub status: FileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub extracted: usize,
    pub failed: usize,
}

impl BatchReport {
    fn record(&mut self, file: FileReport) {
        match file.status {
            FileStatus::Extracted => self.extracted += 1,
            FileStatus::Failed => self.failed += 1,
        }
        self.files.push(file);
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.status == FileStatus::Failed)
    }
}

pub struct BatchRunner<'e> {
    engine: &'e ExtractionEngine,
    options: BatchOptions,
}

impl<'e> BatchRunner<'e> {
    pub fn new(engine: &'e ExtractionEngine, options: BatchOptions) -> Self {
        Self { engine, options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Candidate files in deterministic (file name sorted) walk order
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let root = &self.options.root;
        if !root.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", root.display()),
            )));
        }
        if root.is_file() {
            return Ok(if self.allowed(root) { vec![root.clone()] } else { Vec::new() });
        }

        let filter = IgnoreFilter::new(root, &self.options.exclude);
        let output_dir = self
            .options
            .output_dir
            .as_ref()
            .and_then(|dir| std::fs::canonicalize(dir).ok());

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.skip_entry(entry, &filter, output_dir.as_deref()));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && self.allowed(entry.path()) {
                files.push(entry.into_path());
            }
        }

        tracing::debug!("Discovered {} files under {}", files.len(), root.display());
        Ok(files)
    }

    fn skip_entry(&self, entry: &DirEntry, filter: &IgnoreFilter, output_dir: Option<&Path>) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let is_dir = entry.file_type().is_dir();
        if is_dir {
            if let Some(out) = output_dir {
                if std::fs::canonicalize(entry.path()).is_ok_and(|p| p == out) {
                    return true;
                }
            }
        }
        filter.is_ignored(entry.path(), &self.relative(entry.path()), is_dir)
    }

    fn allowed(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        match &self.options.extensions {
            Some(list) => list.iter().any(|allowed| allowed.trim_start_matches('.') == ext),
            None => self.engine.registry().supported_extensions().contains(&ext),
        }
    }

    fn relative(&self, path: &Path) -> PathBuf {
        let root = &self.options.root;
        if root.is_file() {
            return path.file_name().map(PathBuf::from).unwrap_or_else(|| path.to_path_buf());
        }
        path.strip_prefix(root).unwrap_or(path).to_path_buf()
    }

    /// Forward-slash relative path, the same on every platform
    fn display_path(&self, path: &Path) -> String {
        self.relative(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Discover and process every file
    pub fn run(
        &self,
        sink: &mut dyn DocumentSink,
        progress: &mut dyn FnMut(&FileReport),
    ) -> Result<BatchReport> {
        let files = self.discover()?;
        self.run_files(&files, sink, progress)
    }

    /// Process already discovered files. Files no extractor handles are
    /// skipped without a report entry.
    pub fn run_files(
        &self,
        files: &[PathBuf],
        sink: &mut dyn DocumentSink,
        progress: &mut dyn FnMut(&FileReport),
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for path in files {
            let Some(language) = self.engine.language_for_path(path) else {
                tracing::debug!("No extractor for {}, skipping", path.display());
                continue;
            };
            let name = self.display_path(path);
            let key = format!("{}{}", name, self.options.suffix);

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.extract_one(path, &name, language)));
            let (document, status, error) = match outcome {
                Ok(Ok(model)) => (serde_json::to_value(&model)?, FileStatus::Extracted, None),
                Ok(Err(err)) => {
                    tracing::warn!("{}: {}", name, err);
                    let doc = ErrorDocument::new(&name, &err);
                    (serde_json::to_value(&doc)?, FileStatus::Failed, Some(err.to_string()))
                }
                Err(payload) => {
                    let details = panic_message(payload.as_ref());
                    tracing::warn!("{}: extractor panicked: {}", name, details);
                    let doc = ErrorDocument::fault(&name, &details);
                    (serde_json::to_value(&doc)?, FileStatus::Failed, Some(details))
                }
            };

            // A document that cannot be stored fails only its own file
            let (output, status, error) = match sink.put(&key, &document) {
                Ok(output) => (output, status, error),
                Err(err) => {
                    tracing::warn!("{}: failed to store document: {}", name, err);
                    (String::new(), FileStatus::Failed, Some(err.to_string()))
                }
            };
            let file = FileReport {
                path: name,
                language,
                output,
                status,
                error,
            };
            progress(&file);
            report.record(file);
        }

        tracing::info!(
            "Batch finished: {} extracted, {} failed",
            report.extracted,
            report.failed
        );
        Ok(report)
    }

    fn extract_one(&self, path: &Path, name: &str, language: Language) -> Result<CodeModel> {
        let bytes = std::fs::read(path)?;
        tracing::debug!("Extracting {} ({}, {} bytes)", name, language, bytes.len());
        self.engine.extract_bytes(name, language, &bytes)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "extractor panicked".to_string()
    }
}

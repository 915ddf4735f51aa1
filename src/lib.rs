//! # Codeshape - Source Structure Extractor
//!
//! Parses source files with tree-sitter grammars and walks the syntax tree to
//! build a normalized, serializable structural model of each file.
//!
//! Codeshape provides:
//! - A process-wide grammar set loaded once and shared by every parse
//! - A lazy pre-order node walker with an optional tracing hook
//! - Python and JavaScript extractors for functions, classes, imports,
//!   module-level bindings and docstring-style comments
//! - A batch driver that isolates per-file failures and writes one document
//!   per input file

pub mod model;
pub mod adapter;
pub mod batch;
pub mod source;
pub mod sink;
pub mod server;
pub mod output;
pub mod config;
pub mod ignore;
pub mod ui;

// Re-exports for convenient access
pub use model::{CodeModel, Language};
pub use adapter::{ExtractionEngine, ExtractOptions};
pub use batch::{BatchOptions, BatchReport, BatchRunner};
pub use sink::{DirectorySink, DocumentSink, MemorySink};
pub use source::{GitCheckout, LocalDirectory, RepositorySource};

/// Result type alias for Codeshape operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Codeshape operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("File is not valid UTF-8: {path}")]
    Encoding { path: String },

    #[error("Grammar error: {0}")]
    Grammar(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Source error: {0}")]
    Source(String),
}

impl Error {
    /// Short label written into the `error` field of an error document
    pub fn error_label(&self) -> &'static str {
        match self {
            Error::Parse { .. } => "SyntaxError in file",
            Error::Encoding { .. } => "Failed to decode file",
            Error::Io(_) => "Failed to read file",
            _ => "Extraction failed",
        }
    }
}

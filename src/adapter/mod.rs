//! Language Adapter Framework
//!
//! Each language provides a tree-sitter grammar (loaded once into the shared
//! `GrammarSet`) and an extractor that visits the nodes of a parsed tree and
//! appends records to a `CodeModel`. The engine never sees node kinds.

pub mod grammar;
pub mod walker;
pub mod framework;
pub mod text;
pub mod python;
pub mod javascript;

pub use framework::{
    default_registry, ExtractContext, ExtractOptions, ExtractionEngine, ExtractorRegistry,
    LanguageExtractor, SnapshotMode,
};
pub use grammar::{GrammarSet, SourceParser, SyntaxTree};
pub use walker::{NodeEvent, PreorderWalk, Silent, TraceObserver, WalkObserver};

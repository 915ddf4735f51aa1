//! Core adapter framework
//!
//! Defines the extractor trait, the registry that dispatches by file
//! extension, and the engine that ties parsing, walking and visiting together.

use crate::model::{CodeModel, Language};
use crate::{Error, Result};
use super::grammar::{GrammarSet, SourceParser, SyntaxTree};
use super::walker::{NodeEvent, PreorderWalk, Silent, TraceObserver, WalkObserver};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tree_sitter::Node;

/// How right-hand-side expressions are captured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotMode {
    /// Source text of the expression
    #[default]
    Text,
    /// Tree-sitter S-expression of the expression
    Tree,
}

/// Options applied to every extraction run by an engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub snapshot: SnapshotMode,
    /// Extract from trees containing syntax errors instead of failing
    pub tolerate_syntax_errors: bool,
    /// Emit a trace event for every visited node
    pub trace_nodes: bool,
}

/// What a visitor sees besides the node itself
pub struct ExtractContext<'a> {
    pub tree: &'a SyntaxTree,
    pub options: &'a ExtractOptions,
}

impl<'a> ExtractContext<'a> {
    /// Source text covered by a node
    pub fn text(&self, node: Node<'_>) -> &'a str {
        node.utf8_text(self.tree.source().as_bytes()).unwrap_or("")
    }

    /// Text of a named field child, if present
    pub fn field_text(&self, node: Node<'_>, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|child| self.text(child).to_string())
    }

    /// Structural snapshot of an expression, never evaluated
    pub fn snapshot(&self, node: Node<'_>) -> String {
        match self.options.snapshot {
            SnapshotMode::Text => self.text(node).to_string(),
            SnapshotMode::Tree => node.to_sexp(),
        }
    }
}

/// Trait for language extractors
///
/// An extractor is a visitor: the engine walks the whole tree and hands
/// each node to `visit`, which appends records for the kinds it recognizes
/// and ignores everything else.
pub trait LanguageExtractor: Send + Sync {
    /// The language whose grammar this extractor expects
    fn language(&self) -> Language;

    /// Get file extensions this extractor handles
    fn file_extensions(&self) -> &[&str];

    /// Check if this extractor can handle a file
    fn can_handle(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            self.file_extensions().contains(&ext)
        } else {
            false
        }
    }

    /// Append records for a single node
    fn visit(&self, node: Node<'_>, ctx: &ExtractContext<'_>, model: &mut CodeModel);
}

/// Registry of language extractors
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn LanguageExtractor>>,
}

impl ExtractorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extractor
    pub fn register(&mut self, extractor: impl LanguageExtractor + 'static) {
        self.extractors.push(Box::new(extractor));
    }

    /// Find an extractor for a file
    pub fn find_extractor(&self, path: &Path) -> Option<&dyn LanguageExtractor> {
        self.extractors
            .iter()
            .find(|e| e.can_handle(path))
            .map(|e| e.as_ref())
    }

    /// Find the extractor for a language
    pub fn for_language(&self, language: Language) -> Option<&dyn LanguageExtractor> {
        self.extractors
            .iter()
            .find(|e| e.language() == language)
            .map(|e| e.as_ref())
    }

    /// All extensions across registered extractors
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.extractors
            .iter()
            .flat_map(|e| e.file_extensions().iter().copied())
            .collect()
    }

    /// Languages with a registered extractor
    pub fn languages(&self) -> Vec<Language> {
        self.extractors.iter().map(|e| e.language()).collect()
    }
}

/// Create a default registry with all built-in extractors
pub fn default_registry() -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::new();
    registry.register(super::python::PythonExtractor::new());
    registry.register(super::javascript::JavaScriptExtractor::new());
    registry
}

/// Parses sources and runs the matching extractor over the tree
pub struct ExtractionEngine {
    grammars: &'static GrammarSet,
    registry: ExtractorRegistry,
    options: ExtractOptions,
}

impl ExtractionEngine {
    /// Engine with the built-in extractors and the shared grammar set
    pub fn new(options: ExtractOptions) -> Result<Self> {
        Ok(Self::with_registry(GrammarSet::shared()?, default_registry(), options))
    }

    pub fn with_registry(
        grammars: &'static GrammarSet,
        registry: ExtractorRegistry,
        options: ExtractOptions,
    ) -> Self {
        Self {
            grammars,
            registry,
            options,
        }
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Language for a path, by extension
    pub fn language_for_path(&self, path: &Path) -> Option<Language> {
        self.registry.find_extractor(path).map(|e| e.language())
    }

    /// Extract from source text
    pub fn extract_source(&self, file: &str, language: Language, source: &str) -> Result<CodeModel> {
        self.extract_bytes(file, language, source.as_bytes())
    }

    /// Extract from raw file bytes, tracing nodes when enabled in the options
    pub fn extract_bytes(&self, file: &str, language: Language, bytes: &[u8]) -> Result<CodeModel> {
        if self.options.trace_nodes {
            let mut observer = TraceObserver::default();
            let model = self.extract_with(file, language, bytes, &mut observer)?;
            tracing::debug!("{}: visited {} nodes", file, observer.visited());
            Ok(model)
        } else {
            self.extract_with(file, language, bytes, &mut Silent)
        }
    }

    /// Extract with an explicit observer receiving every visited node
    pub fn extract_with(
        &self,
        file: &str,
        language: Language,
        bytes: &[u8],
        observer: &mut dyn WalkObserver,
    ) -> Result<CodeModel> {
        let extractor = self
            .registry
            .for_language(language)
            .ok_or_else(|| Error::UnsupportedLanguage(language.to_string()))?;

        let tree = SourceParser::new(self.grammars)
            .tolerate_errors(self.options.tolerate_syntax_errors)
            .parse(language, file, bytes)?;

        let ctx = ExtractContext {
            tree: &tree,
            options: &self.options,
        };
        let mut model = CodeModel::new(file, language);

        let mut walk = PreorderWalk::new(tree.root());
        while let Some(node) = walk.next() {
            observer.on_node(&NodeEvent::new(&node, walk.depth()));
            extractor.visit(node, &ctx, &mut model);
        }

        Ok(model)
    }

    /// Read and extract a single file, surfacing any error
    pub fn extract_file(&self, path: &Path) -> Result<CodeModel> {
        let language = self
            .language_for_path(path)
            .ok_or_else(|| Error::UnsupportedLanguage(path.display().to_string()))?;
        let bytes = std::fs::read(path)?;
        self.extract_bytes(&path.to_string_lossy(), language, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KindCounter;

    impl LanguageExtractor for KindCounter {
        fn language(&self) -> Language { Language::Python }
        fn file_extensions(&self) -> &[&str] { &["test"] }
        fn visit(&self, node: Node<'_>, ctx: &ExtractContext<'_>, model: &mut CodeModel) {
            if node.kind() == "identifier" {
                model.push_variable(crate::model::VariableRecord {
                    name: ctx.text(node).to_string(),
                    value: None,
                    annotation: None,
                    line: 1,
                });
            }
        }
    }

    struct Counting(usize);

    impl WalkObserver for Counting {
        fn on_node(&mut self, _event: &NodeEvent<'_>) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_registry() {
        let mut registry = ExtractorRegistry::new();
        registry.register(KindCounter);

        assert!(registry.find_extractor(Path::new("foo.test")).is_some());
        assert!(registry.find_extractor(Path::new("foo.other")).is_none());
        assert!(registry.for_language(Language::JavaScript).is_none());
    }

    #[test]
    fn test_default_registry_extensions() {
        let registry = default_registry();
        let exts = registry.supported_extensions();
        for ext in ["py", "pyi", "js", "jsx", "mjs", "cjs"] {
            assert!(exts.contains(&ext), "missing {}", ext);
        }
        assert!(registry.find_extractor(Path::new("notes.md")).is_none());
    }

    #[test]
    fn test_engine_dispatches_to_visitor() {
        let mut registry = ExtractorRegistry::new();
        registry.register(KindCounter);
        let engine = ExtractionEngine::with_registry(
            GrammarSet::shared().unwrap(),
            registry,
            ExtractOptions::default(),
        );

        let model = engine.extract_source("t.py", Language::Python, "a = b\n").unwrap();
        let names: Vec<&str> = model.variables().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_observer_sees_every_node() {
        let engine = ExtractionEngine::new(ExtractOptions::default()).unwrap();
        let mut counting = Counting(0);
        engine
            .extract_with("t.py", Language::Python, b"x = 1\n", &mut counting)
            .unwrap();
        // module, expression_statement, assignment, identifier, "=", integer
        assert_eq!(counting.0, 6);
    }

    #[test]
    fn test_snapshot_modes() {
        let text = ExtractionEngine::new(ExtractOptions::default()).unwrap();
        let model = text.extract_source("s.py", Language::Python, "x = f(1)\n").unwrap();
        assert_eq!(model.variables()[0].value.as_deref(), Some("f(1)"));

        let tree = ExtractionEngine::new(ExtractOptions {
            snapshot: SnapshotMode::Tree,
            ..ExtractOptions::default()
        })
        .unwrap();
        let model = tree.extract_source("s.py", Language::Python, "x = f(1)\n").unwrap();
        let value = model.variables()[0].value.clone().unwrap();
        assert!(value.starts_with("(call"), "value: {}", value);
    }

    #[test]
    fn test_extract_file_unsupported_extension() {
        let engine = ExtractionEngine::new(ExtractOptions::default()).unwrap();
        let err = engine.extract_file(Path::new("README.md")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage(_)));
    }
}

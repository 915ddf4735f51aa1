//! Parser adapter
//!
//! Grammars are built once per process and shared read-only. Every parse
//! goes through a `SourceParser` that borrows the shared set.

use crate::model::Language;
use crate::{Error, Result};
use std::sync::OnceLock;
use tree_sitter::{Language as Grammar, Node, Parser, Tree};
use super::walker::PreorderWalk;

static GRAMMARS: OnceLock<std::result::Result<GrammarSet, String>> = OnceLock::new();

/// The tree-sitter grammars for every supported language
#[derive(Debug)]
pub struct GrammarSet {
    python: Grammar,
    javascript: Grammar,
}

impl GrammarSet {
    /// Build and validate all grammars
    pub fn load() -> Result<Self> {
        let set = Self {
            python: tree_sitter_python::LANGUAGE.into(),
            javascript: tree_sitter_javascript::LANGUAGE.into(),
        };

        let mut probe = Parser::new();
        for language in Language::all() {
            probe
                .set_language(set.grammar(*language))
                .map_err(|e| Error::Grammar(format!("{}: {}", language, e)))?;
        }
        tracing::debug!("Loaded tree-sitter grammars: python, javascript");
        Ok(set)
    }

    /// The process-wide grammar set, built on first use
    pub fn shared() -> Result<&'static GrammarSet> {
        match GRAMMARS.get_or_init(|| Self::load().map_err(|e| e.to_string())) {
            Ok(set) => Ok(set),
            Err(message) => Err(Error::Grammar(message.clone())),
        }
    }

    /// Get the grammar for a language
    pub fn grammar(&self, language: Language) -> &Grammar {
        match language {
            Language::Python => &self.python,
            Language::JavaScript => &self.javascript,
        }
    }
}

/// A parsed file: the tree plus the text it was built from
pub struct SyntaxTree {
    tree: Tree,
    source: String,
    language: Language,
}

impl SyntaxTree {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Source text covered by a node
    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    pub fn has_error(&self) -> bool {
        self.root().has_error()
    }

    /// Describe the first `ERROR` or `MISSING` node in source order
    pub fn first_error(&self) -> Option<String> {
        let node = PreorderWalk::new(self.root()).find(|n| n.is_error() || n.is_missing())?;
        let pos = node.start_position();
        let what = if node.is_missing() {
            format!("missing \"{}\"", node.kind())
        } else {
            let snippet: String = self.text(node).chars().take(20).collect();
            format!("unexpected \"{}\"", snippet.trim())
        };
        Some(format!("{} at line {}, column {}", what, pos.row + 1, pos.column + 1))
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("language", &self.language)
            .field("root", &self.root().kind())
            .field("bytes", &self.source.len())
            .finish()
    }
}

/// Wraps a tree-sitter parser bound to the shared grammar set
pub struct SourceParser<'g> {
    grammars: &'g GrammarSet,
    parser: Parser,
    tolerate_errors: bool,
}

impl<'g> SourceParser<'g> {
    pub fn new(grammars: &'g GrammarSet) -> Self {
        Self {
            grammars,
            parser: Parser::new(),
            tolerate_errors: false,
        }
    }

    /// Keep trees that contain syntax errors instead of failing
    pub fn tolerate_errors(mut self, tolerate: bool) -> Self {
        self.tolerate_errors = tolerate;
        self
    }

    /// Parse raw bytes of the file at `path`
    pub fn parse(&mut self, language: Language, path: &str, bytes: &[u8]) -> Result<SyntaxTree> {
        let source = std::str::from_utf8(bytes)
            .map_err(|_| Error::Encoding { path: path.to_string() })?;
        self.parse_str(language, path, source)
    }

    /// Parse source text of the file at `path`
    pub fn parse_str(&mut self, language: Language, path: &str, source: &str) -> Result<SyntaxTree> {
        self.parser
            .set_language(self.grammars.grammar(language))
            .map_err(|e| Error::Grammar(format!("{}: {}", language, e)))?;

        let tree = self.parser.parse(source, None).ok_or_else(|| Error::Parse {
            path: path.to_string(),
            message: "parser returned no tree".to_string(),
        })?;

        let parsed = SyntaxTree {
            tree,
            source: source.to_string(),
            language,
        };

        if parsed.has_error() {
            let message = parsed
                .first_error()
                .unwrap_or_else(|| "syntax error".to_string());
            if !self.tolerate_errors {
                return Err(Error::Parse {
                    path: path.to_string(),
                    message,
                });
            }
            tracing::debug!("Keeping partial tree for {}: {}", path, message);
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_grammars_are_reused() {
        let first = GrammarSet::shared().unwrap();
        let second = GrammarSet::shared().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_parse_python() {
        let grammars = GrammarSet::shared().unwrap();
        let mut parser = SourceParser::new(grammars);
        let tree = parser.parse(Language::Python, "ok.py", b"x = 1\n").unwrap();
        assert_eq!(tree.root().kind(), "module");
        assert!(!tree.has_error());
    }

    #[test]
    fn test_unmatched_paren_is_parse_error() {
        let grammars = GrammarSet::shared().unwrap();
        let mut parser = SourceParser::new(grammars);
        let err = parser
            .parse(Language::Python, "bad.py", b"def f(a, b:\n    pass\n")
            .unwrap_err();
        match err {
            Error::Parse { path, message } => {
                assert_eq!(path, "bad.py");
                assert!(message.contains("line"), "message: {}", message);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_tolerated_errors_keep_tree() {
        let grammars = GrammarSet::shared().unwrap();
        let mut parser = SourceParser::new(grammars).tolerate_errors(true);
        let tree = parser.parse(Language::JavaScript, "bad.js", b"function f( {").unwrap();
        assert!(tree.has_error());
        assert!(tree.first_error().is_some());
    }

    #[test]
    fn test_invalid_utf8_is_encoding_error() {
        let grammars = GrammarSet::shared().unwrap();
        let mut parser = SourceParser::new(grammars);
        let err = parser.parse(Language::Python, "bin.py", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }
}

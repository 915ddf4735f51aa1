//! Code Model - normalized structural output
//!
//! One `CodeModel` is created per input file, filled during a single tree
//! traversal, serialized and dropped. Records are only ever appended.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Name used for functions and classes that carry no name node
/// (arrow functions, anonymous function and class expressions).
pub const UNNAMED: &str = "Unnamed";

/// Source languages with a registered extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
}

impl Language {
    /// Get the string representation of the language
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
        }
    }

    /// Get all languages
    pub fn all() -> &'static [Language] {
        &[Language::Python, Language::JavaScript]
    }

    /// Whether documents for this language carry a `classes` list
    pub fn has_classes(&self) -> bool {
        matches!(self, Language::Python | Language::JavaScript)
    }

    /// Whether documents for this language carry a `comments` list
    pub fn has_comments(&self) -> bool {
        matches!(self, Language::Python)
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "javascript" | "js" | "jsx" | "node" => Ok(Language::JavaScript),
            _ => Err(Error::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A function, method, arrow function or generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub parameters: Vec<String>,
    /// Return annotation as written in the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    /// Starting line number (1-indexed)
    pub line: u32,
}

impl FunctionRecord {
    /// Create a record; an empty name becomes [`UNNAMED`]
    pub fn new(name: impl Into<String>, parameters: Vec<String>, line: u32) -> Self {
        let name = name.into();
        Self {
            name: if name.is_empty() { UNNAMED.to_string() } else { name },
            parameters,
            return_type: None,
            docstring: None,
            line,
        }
    }

    pub fn with_return_type(mut self, return_type: Option<String>) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn with_docstring(mut self, docstring: Option<String>) -> Self {
        self.docstring = docstring;
        self
    }
}

/// A class definition with its direct methods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    #[serde(default)]
    pub bases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub methods: Vec<FunctionRecord>,
    pub line: u32,
}

/// One imported binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedName {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ImportedName {
    pub fn new(name: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            name: name.into(),
            alias,
        }
    }
}

/// An import statement (or one name of a plain multi-name import)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub module: String,
    #[serde(default)]
    pub names: Vec<ImportedName>,
    /// Local binding for the module itself (`import numpy as np`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub line: u32,
}

/// A module-level binding of a simple identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRecord {
    pub name: String,
    /// Snapshot of the right-hand side, never evaluated
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub line: u32,
}

/// A standalone string-literal statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub text: String,
    pub line: u32,
}

/// Structural model of a single source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeModel {
    pub file: String,
    language: Language,
    functions: Vec<FunctionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    classes: Option<Vec<ClassRecord>>,
    imports: Vec<ImportRecord>,
    variables: Vec<VariableRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comments: Option<Vec<CommentRecord>>,
}

impl CodeModel {
    /// Create an empty model; the language cannot change afterwards
    pub fn new(file: impl Into<String>, language: Language) -> Self {
        Self {
            file: file.into(),
            language,
            functions: Vec::new(),
            classes: language.has_classes().then(Vec::new),
            imports: Vec::new(),
            variables: Vec::new(),
            comments: language.has_comments().then(Vec::new),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn functions(&self) -> &[FunctionRecord] {
        &self.functions
    }

    pub fn classes(&self) -> &[ClassRecord] {
        self.classes.as_deref().unwrap_or_default()
    }

    pub fn imports(&self) -> &[ImportRecord] {
        &self.imports
    }

    pub fn variables(&self) -> &[VariableRecord] {
        &self.variables
    }

    pub fn comments(&self) -> &[CommentRecord] {
        self.comments.as_deref().unwrap_or_default()
    }

    pub fn push_function(&mut self, function: FunctionRecord) {
        self.functions.push(function);
    }

    /// Ignored for languages without a `classes` list
    pub fn push_class(&mut self, class: ClassRecord) {
        if let Some(classes) = self.classes.as_mut() {
            classes.push(class);
        }
    }

    pub fn push_import(&mut self, import: ImportRecord) {
        self.imports.push(import);
    }

    pub fn push_variable(&mut self, variable: VariableRecord) {
        self.variables.push(variable);
    }

    /// Ignored for languages without a `comments` list
    pub fn push_comment(&mut self, comment: CommentRecord) {
        if let Some(comments) = self.comments.as_mut() {
            comments.push(comment);
        }
    }

    /// Function names in record order
    pub fn function_names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name.as_str()).collect()
    }

    /// Imported module paths in record order
    pub fn import_modules(&self) -> Vec<&str> {
        self.imports.iter().map(|i| i.module.as_str()).collect()
    }

    /// Render the document as indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Document written in place of a `CodeModel` when a file fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDocument {
    pub error: String,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorDocument {
    pub fn new(file: impl Into<String>, error: &Error) -> Self {
        Self {
            error: error.error_label().to_string(),
            file: file.into(),
            details: Some(error.to_string()),
        }
    }

    /// Error document for a panic caught at the per-file boundary
    pub fn fault(file: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: "Extraction failed".to_string(),
            file: file.into(),
            details: Some(details.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_str() {
        assert_eq!(Language::from_str("Python").unwrap(), Language::Python);
        assert_eq!(Language::from_str("js").unwrap(), Language::JavaScript);
        assert!(Language::from_str("cobol").is_err());
    }

    #[test]
    fn test_optional_sections_follow_language() {
        let py = serde_json::to_value(CodeModel::new("a.py", Language::Python)).unwrap();
        assert!(py.get("classes").is_some());
        assert!(py.get("comments").is_some());

        let js = serde_json::to_value(CodeModel::new("a.js", Language::JavaScript)).unwrap();
        assert!(js.get("classes").is_some());
        assert!(js.get("comments").is_none());
        assert_eq!(js["language"], "javascript");
    }

    #[test]
    fn test_push_comment_ignored_without_section() {
        let mut model = CodeModel::new("a.js", Language::JavaScript);
        model.push_comment(CommentRecord { text: "x".into(), line: 1 });
        assert!(model.comments().is_empty());
    }

    #[test]
    fn test_function_record_defaults_to_sentinel() {
        let record = FunctionRecord::new("", vec![], 3);
        assert_eq!(record.name, UNNAMED);

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("return_type").is_none());
        assert!(json.get("docstring").is_none());
    }

    #[test]
    fn test_error_document_labels() {
        let err = Error::Parse {
            path: "bad.py".into(),
            message: "missing \")\"".into(),
        };
        let doc = ErrorDocument::new("bad.py", &err);
        assert_eq!(doc.error, "SyntaxError in file");
        assert_eq!(doc.file, "bad.py");
    }
}

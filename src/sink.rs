//! Document sinks
//!
//! A sink receives one JSON document per processed file, keyed by the file's
//! path relative to the batch root plus a suffix.

use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Destination for extracted documents
pub trait DocumentSink {
    /// Store a document under `key`, returning where it was stored
    fn put(&mut self, key: &str, document: &Value) -> Result<String>;
}

/// Writes pretty-printed JSON files below a root directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || escapes {
            return Err(Error::Sink(format!("invalid document key: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

impl DocumentSink for DirectorySink {
    fn put(&mut self, key: &str, document: &Value) -> Result<String> {
        let path = self.target(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut contents = serde_json::to_string_pretty(document)?;
        contents.push('\n');

        // Readers never see a half-written document
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let staging = path.with_file_name(format!(".{}.tmp", file_name));
        let written = std::fs::write(&staging, contents).and_then(|_| std::fs::rename(&staging, &path));
        if let Err(e) = written {
            std::fs::remove_file(&staging).ok();
            return Err(e.into());
        }

        Ok(path.display().to_string())
    }
}

/// Keeps documents in memory, ordered by key
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: BTreeMap<String, Value>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.documents.get(key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.documents
    }
}

impl DocumentSink for MemorySink {
    fn put(&mut self, key: &str, document: &Value) -> Result<String> {
        self.documents.insert(key.to_string(), document.clone());
        Ok(format!("memory://{}", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_directory_sink_writes_nested_documents() {
        let dir = TempDir::new().unwrap();
        let mut sink = DirectorySink::new(dir.path());

        let location = sink.put("pkg/mod.py.json", &json!({"file": "pkg/mod.py"})).unwrap();
        let written = dir.path().join("pkg").join("mod.py.json");
        assert_eq!(location, written.display().to_string());

        let contents = std::fs::read_to_string(&written).unwrap();
        assert!(contents.starts_with("{\n  \"file\""));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("pkg"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_directory_sink_rejects_escaping_keys() {
        let dir = TempDir::new().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        assert!(matches!(sink.put("../x.json", &json!({})), Err(Error::Sink(_))));
        assert!(matches!(sink.put("", &json!({})), Err(Error::Sink(_))));
    }

    #[test]
    fn test_failed_rename_leaves_no_staging_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a.py.json").join("blocker")).unwrap();
        let mut sink = DirectorySink::new(dir.path());

        assert!(matches!(sink.put("a.py.json", &json!({})), Err(Error::Io(_))));
        assert!(!dir.path().join(".a.py.json.tmp").exists());
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.put("b.js.json", &json!(2)).unwrap();
        sink.put("a.py.json", &json!(1)).unwrap();
        assert_eq!(sink.keys(), vec!["a.py.json", "b.js.json"]);
        assert_eq!(sink.get("b.js.json"), Some(&json!(2)));
    }
}

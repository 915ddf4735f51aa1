use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Decides which paths a batch run skips: `.gitignore`/`.ignore` rules,
/// built-in noise directories and user exclude globs
pub struct IgnoreFilter {
    inner: Gitignore,
    excludes: Vec<glob::Pattern>,
}

impl IgnoreFilter {
    pub fn new(root: &Path, extra_excludes: &[String]) -> Self {
        let mut builder = GitignoreBuilder::new(root);

        // 1. Load from .gitignore and .ignore
        builder.add(root.join(".gitignore"));
        builder.add(root.join(".ignore"));

        // 2. Add defaults (global)
        let defaults = [
            // Noise directories
            "node_modules/", "venv/", ".venv/", "env/", "vendor/", "bower_components/",
            "dist/", "build/", "coverage/", "__pycache__/", "*.egg-info/",
            ".git/", ".hg/", ".svn/", ".tox/", ".mypy_cache/", ".pytest_cache/",
            ".vscode/", ".idea/",

            // Bundled or generated sources
            "*.min.js", "*.bundle.js",
        ];

        for pattern in defaults {
            builder.add_line(None, pattern).ok();
        }

        Self {
            inner: builder.build().unwrap_or_else(|_| Gitignore::empty()),
            excludes: compile_excludes(extra_excludes),
        }
    }

    /// `relative` is the path below the walk root, used for exclude globs
    pub fn is_ignored(&self, path: &Path, relative: &Path, is_dir: bool) -> bool {
        if self.inner.matched(path, is_dir).is_ignore() {
            return true;
        }
        self.excludes.iter().any(|p| p.matches_path(relative))
    }
}

fn compile_excludes(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|raw| match glob::Pattern::new(raw) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::warn!("Ignoring invalid exclude pattern {:?}: {}", raw, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_noise_directories() {
        let dir = TempDir::new().unwrap();
        let filter = IgnoreFilter::new(dir.path(), &[]);

        let modules = dir.path().join("node_modules");
        assert!(filter.is_ignored(&modules, Path::new("node_modules"), true));
        let src = dir.path().join("src");
        assert!(!filter.is_ignored(&src, Path::new("src"), true));
    }

    #[test]
    fn test_gitignore_and_excludes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "generated/\n").unwrap();
        let filter = IgnoreFilter::new(dir.path(), &["tests/**/*.py".to_string(), "[".to_string()]);

        let generated = dir.path().join("generated");
        assert!(filter.is_ignored(&generated, Path::new("generated"), true));

        let test_file = Path::new("tests/unit/test_a.py");
        assert!(filter.is_ignored(&dir.path().join(test_file), test_file, false));

        let app = Path::new("app/main.py");
        assert!(!filter.is_ignored(&dir.path().join(app), app, false));
    }
}

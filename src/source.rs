//! Repository sources
//!
//! Resolve where a batch run reads its files from: a local directory as is,
//! or a shallow clone of a git repository in a temporary directory.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub trait RepositorySource {
    /// Local directory holding the files to process
    fn local_root(&self) -> Result<PathBuf>;

    /// Human-readable origin, for logs and reports
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct LocalDirectory {
    path: PathBuf,
}

impl LocalDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RepositorySource for LocalDirectory {
    fn local_root(&self) -> Result<PathBuf> {
        if !self.path.exists() {
            return Err(Error::Source(format!(
                "path does not exist: {}",
                self.path.display()
            )));
        }
        Ok(self.path.clone())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Shallow clone of a remote repository, removed when dropped
#[derive(Debug)]
pub struct GitCheckout {
    url: String,
    branch: Option<String>,
    workdir: TempDir,
}

impl GitCheckout {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            branch: None,
            workdir: TempDir::new()?,
        })
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    fn checkout_dir(&self) -> PathBuf {
        self.workdir.path().join("repo")
    }

    fn clone_into(&self, target: &Path) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.args(["clone", "--depth", "1", "--quiet"]);
        if let Some(branch) = &self.branch {
            cmd.arg("--branch").arg(branch);
        }
        cmd.arg(&self.url).arg(target);

        tracing::info!("Cloning {} into {}", self.url, target.display());
        let output = cmd
            .output()
            .map_err(|e| Error::Source(format!("failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Source(format!(
                "git clone of {} failed: {}",
                self.url,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl RepositorySource for GitCheckout {
    fn local_root(&self) -> Result<PathBuf> {
        let target = self.checkout_dir();
        if !target.join(".git").exists() {
            self.clone_into(&target)?;
        }
        Ok(target)
    }

    fn describe(&self) -> String {
        match &self.branch {
            Some(branch) => format!("{}@{}", self.url, branch),
            None => self.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_directory() {
        let dir = TempDir::new().unwrap();
        let source = LocalDirectory::new(dir.path());
        assert_eq!(source.local_root().unwrap(), dir.path());

        let missing = LocalDirectory::new(dir.path().join("missing"));
        assert!(matches!(missing.local_root(), Err(Error::Source(_))));
    }

    #[test]
    fn test_git_checkout_failure_is_source_error() {
        let dir = TempDir::new().unwrap();
        let url = dir.path().join("not-a-repo").display().to_string();
        let checkout = GitCheckout::new(url.clone()).unwrap().branch("main");

        assert_eq!(checkout.describe(), format!("{}@main", url));
        assert!(matches!(checkout.local_root(), Err(Error::Source(_))));
    }
}

use crate::adapter::{ExtractOptions, SnapshotMode};
use crate::batch::{BatchOptions, DEFAULT_SUFFIX};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "codeshape-out";

/// Contents of `codeshape.toml`; every field is optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CodeshapeConfig {
    pub extensions: Option<Vec<String>>,
    pub output_dir: Option<String>,
    pub suffix: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub snapshot: Option<SnapshotMode>,
    pub tolerate_syntax_errors: Option<bool>,
    pub trace_nodes: Option<bool>,
}

impl CodeshapeConfig {
    /// The file `init` writes: defaults spelled out
    pub fn starter() -> Self {
        Self {
            extensions: Some(
                ["py", "js", "jsx", "mjs", "cjs"].iter().map(|e| e.to_string()).collect(),
            ),
            output_dir: Some(DEFAULT_OUTPUT_DIR.to_string()),
            suffix: Some(DEFAULT_SUFFIX.to_string()),
            exclude: Some(Vec::new()),
            snapshot: Some(SnapshotMode::Text),
            tolerate_syntax_errors: Some(false),
            trace_nodes: Some(false),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("codeshape.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<CodeshapeConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: CodeshapeConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &CodeshapeConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Values given on the command line; they win over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub trace_nodes: bool,
}

/// Effective settings after merging the config file with CLI flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub extensions: Option<Vec<String>>,
    pub output_dir: PathBuf,
    pub suffix: String,
    pub exclude: Vec<String>,
    pub extract: ExtractOptions,
}

impl Settings {
    pub fn resolve(config: Option<CodeshapeConfig>, overrides: Overrides) -> Self {
        let config = config.unwrap_or_default();
        Self {
            extensions: config.extensions,
            output_dir: overrides
                .output_dir
                .or_else(|| config.output_dir.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            suffix: config.suffix.unwrap_or_else(|| DEFAULT_SUFFIX.to_string()),
            exclude: config.exclude.unwrap_or_default(),
            extract: ExtractOptions {
                snapshot: config.snapshot.unwrap_or_default(),
                tolerate_syntax_errors: config.tolerate_syntax_errors.unwrap_or(false),
                trace_nodes: overrides.trace_nodes || config.trace_nodes.unwrap_or(false),
            },
        }
    }

    pub fn batch_options(&self, root: impl Into<PathBuf>) -> BatchOptions {
        BatchOptions {
            root: root.into(),
            output_dir: Some(self.output_dir.clone()),
            suffix: self.suffix.clone(),
            extensions: self.extensions.clone(),
            exclude: self.exclude.clone(),
        }
    }
}

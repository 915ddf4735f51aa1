//! Codeshape CLI - extract functions, classes, imports and bindings as JSON

mod commands;

use clap::{Parser, Subcommand};
use codeshape::config::{self, Overrides, Settings};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "codeshape")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-language source structure extractor")]
#[command(long_about = r#"
Codeshape parses Python and JavaScript sources with tree-sitter and writes one
JSON document per file describing its functions, classes, imports, module-level
bindings and docstring comments.

Example usage:
  codeshape extract src/app.py
  codeshape batch --path ./project --out ./shapes
  codeshape batch --repo https://github.com/user/project.git
  codeshape serve --port 8080
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Trace every visited syntax node (very noisy)
    #[arg(long, global = true)]
    trace_nodes: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a single file and print its document
    Extract {
        /// Source file to extract
        file: PathBuf,

        /// Language override (python, javascript); defaults to the extension
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Extract every supported file under a directory or repository
    Batch {
        /// Directory or file to process
        #[arg(short, long, conflicts_with = "repo")]
        path: Option<PathBuf>,

        /// Git URL to clone and process
        #[arg(short, long)]
        repo: Option<String>,

        /// Branch to clone with --repo
        #[arg(short, long, requires = "repo")]
        branch: Option<String>,

        /// Output directory for documents
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Serve extraction over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Write a default codeshape.toml
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show version information
    Version,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Quiet,
}

impl OutputMode {
    fn detect(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else if codeshape::output::is_quiet() {
            OutputMode::Quiet
        } else {
            OutputMode::Human
        }
    }

    pub fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

/// Print a success envelope in JSON mode; no-op otherwise
pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if output_mode == OutputMode::Json {
        let envelope = serde_json::json!({
            "ok": true,
            "command": command,
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    Ok(())
}

fn load_settings(config_path: Option<&Path>, overrides: Overrides) -> anyhow::Result<Settings> {
    let config = config::load_config(config_path)?;
    if config.is_some() {
        let path = config_path.map(Path::to_path_buf).unwrap_or_else(config::default_config_path);
        tracing::debug!("Loaded config from {}", path.display());
    }
    Ok(Settings::resolve(config, overrides))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins when set
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    if cli.trace_nodes {
        if let Ok(directive) = "codeshape::walk=trace".parse() {
            filter = filter.add_directive(directive);
        }
    }

    // stdout carries documents and JSON envelopes
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = OutputMode::detect(cli.json);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Extract { file, language } => {
            let settings = load_settings(config_path, Overrides {
                output_dir: None,
                trace_nodes: cli.trace_nodes,
            })?;
            commands::run_extract(&settings, &file, language.as_deref())
        }

        Commands::Batch { path, repo, branch, out } => {
            let settings = load_settings(config_path, Overrides {
                output_dir: out,
                trace_nodes: cli.trace_nodes,
            })?;
            commands::run_batch(output_mode, &settings, path, repo, branch)
        }

        Commands::Serve { port } => {
            let settings = load_settings(config_path, Overrides {
                output_dir: None,
                trace_nodes: cli.trace_nodes,
            })?;
            commands::run_serve(&settings, port)
        }

        Commands::Init { force } => {
            let path = cli.config.clone().unwrap_or_else(config::default_config_path);
            commands::run_init(output_mode, &path, force)
        }

        Commands::Version => commands::run_version(output_mode),
    }
}

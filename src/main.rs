//! `sandbox-fs` binary: serves filesystem tools over stdio, confined to the given directories.
//!
//! Usage:
//!   sandbox-fs [--config sandbox.toml] [--log-level debug] <DIR>...

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use sandbox_fs::server::SandboxServer;
use sandbox_fs::{Context, Dispatcher, SandboxConfig};

#[derive(Debug, Parser)]
#[command(name = "sandbox-fs")]
#[command(about = "Filesystem tool server confined to an allow-list of directories.")]
#[command(version)]
struct Args {
    /// TOML or JSON configuration file; its `roots` are merged with the positional directories.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `sandbox_fs=debug`. Falls back to `RUST_LOG`, then `info`.
    #[arg(long)]
    log_level: Option<String>,

    /// Directories the server may access.
    #[arg(value_name = "DIR")]
    dirs: Vec<PathBuf>,
}

#[derive(Debug)]
enum CliError {
    Tool(sandbox_fs::Error),
    Io(std::io::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Tool(err) => write!(f, "{err}"),
            CliError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Tool(err) => Some(err),
            CliError::Io(err) => Some(err),
        }
    }
}

impl From<sandbox_fs::Error> for CliError {
    fn from(err: sandbox_fs::Error) -> Self {
        Self::Tool(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn build_config(args: &Args) -> Result<SandboxConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => sandbox_fs::config_io::load_config(path)?,
        None => SandboxConfig::default(),
    };
    config.roots.extend(args.dirs.iter().cloned());
    Ok(config)
}

async fn run(args: &Args) -> Result<(), CliError> {
    let config = build_config(args)?;
    let ctx = Context::new(config)?;
    for root in ctx.allowed_roots() {
        tracing::info!(root = %root.display(), "allowed directory");
    }

    SandboxServer::new(Dispatcher::new(ctx))
        .serve_stdio()
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    if let Err(err) = run(&args).await {
        tracing::error!(error = %err, "sandbox-fs failed");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_dirs_are_appended_after_config_roots() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_path = dir.path().join("sandbox.toml");
        std::fs::write(&config_path, "roots = [\"/from/config\"]\n").expect("write");

        let args = Args::parse_from([
            "sandbox-fs",
            "--config",
            config_path.to_str().expect("utf-8 path"),
            "/from/args",
        ]);
        let config = build_config(&args).expect("config");
        assert_eq!(
            config.roots,
            vec![PathBuf::from("/from/config"), PathBuf::from("/from/args")]
        );
    }

    #[test]
    fn no_directories_fails_at_context_construction() {
        let args = Args::parse_from(["sandbox-fs"]);
        let config = build_config(&args).expect("config");
        match Context::new(config) {
            Err(sandbox_fs::Error::InvalidConfig(msg)) => {
                assert!(msg.contains("no allowed directories"), "{msg}");
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }
}

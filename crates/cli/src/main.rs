use std::path::PathBuf;

use anyhow::Result;
use assetkit_core::{
    config::{self, AppConfig},
    AcquireOutcome, AssetAcquirer, CachePolicy, Destination,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Fetch a remote asset into the local cache and print its path.
#[derive(Debug, Parser)]
#[command(name = "assetkit", version, about)]
struct Cli {
    /// Remote URL (http/https) or local path of the asset.
    locator: String,

    /// Save to this exact file path.
    #[arg(long, conflicts_with = "dest_dir")]
    dest: Option<PathBuf>,

    /// Save into this directory, keeping the source filename.
    #[arg(long)]
    dest_dir: Option<PathBuf>,

    /// Discard any cached copy and download again.
    #[arg(long)]
    refresh: bool,

    /// Override the configured request timeout, in seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    config::ensure_default_config()?;
    let mut config = AppConfig::load()?;
    if let Some(secs) = cli.timeout {
        config.request_timeout_secs = secs;
    }
    let acquirer = AssetAcquirer::new(config)?;

    let destination = match (cli.dest, cli.dest_dir) {
        (Some(path), _) => Some(Destination::File(path)),
        (None, Some(dir)) => Some(Destination::Directory(dir)),
        (None, None) => None,
    };
    let policy = if cli.refresh {
        CachePolicy::Refresh
    } else {
        CachePolicy::Reuse
    };

    let asset = acquirer
        .ensure_local(cli.locator.as_str(), destination, policy)
        .await?;

    match asset.outcome {
        AcquireOutcome::Fetched => tracing::info!("downloaded {}", asset.path.display()),
        AcquireOutcome::Reused => tracing::info!("cache hit {}", asset.path.display()),
        AcquireOutcome::AlreadyLocal => tracing::info!("already local"),
    }
    println!("{}", asset.path.display());
    Ok(())
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .with_env_filter(env_filter)
        .init();
}

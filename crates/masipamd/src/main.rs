//! masipamd entry point
//!
//! Refreshes the MAS source on a fixed interval until the descriptor file has
//! been loaded, then keeps the committed address space until shutdown.

use anyhow::Context;
use clap::Parser;
use masipamd::{
    AddressConfigSource, AddressManager, MasSource, MasipamdConfig, RefreshOutcome,
    SystemInterfaces, LOCAL_DEFAULT_ADDRESS_SPACE_ID,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "masipamd", version, about = "MAS interface descriptor IPAM source")]
struct Args {
    /// Daemon configuration file
    #[arg(short, long, default_value = masipamd::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Interface descriptor file (overrides the config file)
    #[arg(short, long)]
    file_path: Option<PathBuf>,

    /// Seconds between refresh attempts (overrides the config file)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Refresh once, print the address space and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut config = MasipamdConfig::load_or_default(&args.config)?;
    if let Some(path) = args.file_path {
        config.source.file_path = Some(path);
    }
    if let Some(secs) = args.interval {
        config.daemon.refresh_interval_secs = secs;
    }
    config.validate()?;

    let manager = Arc::new(AddressManager::new());
    let mut source = MasSource::new(&config.source, SystemInterfaces);
    source.start(manager.clone())?;

    info!(
        source = source.name(),
        path = %source.file_path().display(),
        "Starting masipamd"
    );

    if args.once {
        source.refresh().context("refresh failed")?;
        let local = manager
            .address_space(LOCAL_DEFAULT_ADDRESS_SPACE_ID)
            .context("no local address space committed")?;
        println!("{}", serde_json::to_string_pretty(&local)?);
        return Ok(());
    }

    run(&mut source, config.refresh_interval()).await;

    source.stop();
    info!("masipamd exiting");
    Ok(())
}

/// Refreshes until loaded, then waits for Ctrl-C.
async fn run(source: &mut MasSource, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received SIGINT, shutting down");
                return;
            }
            _ = ticker.tick(), if !source.is_loaded() => {
                match source.refresh() {
                    Ok(RefreshOutcome::Loaded(report)) => {
                        if !report.unmatched.is_empty() {
                            warn!(
                                unmatched = report.unmatched.len(),
                                "Some descriptors did not match a host interface"
                            );
                        }
                    }
                    Ok(RefreshOutcome::AlreadyLoaded) => {}
                    Err(e) => error!(error = %e, retry_in = ?interval, "Refresh failed"),
                }
            }
        }
    }
}

//! Audio source server (oas-server) - Main entry point
//!
//! Loads configuration, owns the source registry and polls every source on
//! a fixed interval so that gain fades advance and state changes are seen.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oas_common::MonotonicClock;
use oas_server::backend::MemoryBackend;
use oas_server::config::{ConfigOverrides, ServerConfig};
use oas_server::logging::LogFilter;
use oas_server::SourceRegistry;

/// Command-line arguments for oas-server
#[derive(Parser, Debug)]
#[command(name = "oas-server")]
#[command(about = "Audio source server")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "OAS_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "OAS_PORT")]
    port: Option<u16>,

    /// Directory for cached audio data
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Audio output device name
    #[arg(short, long)]
    device: Option<String>,

    /// Show the status GUI
    #[arg(long)]
    gui: bool,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            config_path: args.config,
            port: args.port,
            cache_directory: args.cache_dir,
            audio_device: args.device,
            gui: args.gui,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing before config so config warnings are visible
    let (filter_layer, log_filter) = LogFilter::from_env();
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = ServerConfig::load(args.into()).context("Failed to load configuration")?;
    log_filter.apply_level(config.log_level());

    let server_info = config.server_info();
    info!("Starting audio source server on port {}", server_info.port());
    info!("Cache directory: {}", server_info.cache_directory().display());
    if server_info.audio_device().is_empty() {
        info!("Audio device: system default");
    } else {
        info!("Audio device: {}", server_info.audio_device());
    }
    if server_info.use_gui() {
        warn!("Status GUI requested but not available in this build");
    }

    let backend = Arc::new(MemoryBackend::new());
    let mut registry = SourceRegistry::new(backend, Arc::new(MonotonicClock));

    let mut ticker = tokio::time::interval(config.update_interval());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                registry.update_all();
            }
            _ = &mut shutdown => break,
        }
    }

    let failed = registry.reset();
    if failed > 0 {
        warn!("{} sound sources were not released cleanly", failed);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

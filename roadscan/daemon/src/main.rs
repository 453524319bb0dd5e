//! roadscan Daemon - Headless Pothole Detection
//!
//! Signs in, replays frames from a directory through the capture loop, and
//! logs every classification. Useful on a box with a dashcam syncing into a
//! folder, or for checking a classifier deployment from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Sign in and classify frames from the configured directory
//! roadscan-daemon --email driver@example.com --password hunter22
//!
//! # Create the account first, point at another classifier
//! roadscan-daemon --register --endpoint 192.168.1.20:5000 --frames ./frames \
//!     --email driver@example.com --password hunter22
//!
//! # Verbose logging
//! RUST_LOG=debug roadscan-daemon ...
//! ```
//!
//! # Signals
//!
//! - `SIGTERM` / `SIGINT`: stop the capture loop, sign out, exit

mod detector;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{info, warn};

use roadscan_core::config::{default_config_path, load_config_from_path, ConfigOverrides};
use roadscan_core::{CaptureLoop, DirectoryCamera, HttpPredictionClient, IdentityClient};

use detector::StopReason;

/// roadscan daemon - classify road frames against a remote pothole model
#[derive(Parser, Debug)]
#[command(name = "roadscan-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "ROADSCAN_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Prediction endpoint (e.g. 192.168.1.20:5000)
    #[arg(short = 'e', long, value_name = "URL")]
    endpoint: Option<String>,

    /// Directory of JPEG frames to classify
    #[arg(short = 'f', long, value_name = "DIR")]
    frames: Option<PathBuf>,

    /// Capture period in milliseconds
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Account email
    #[arg(long, env = "ROADSCAN_EMAIL")]
    email: String,

    /// Account password
    #[arg(long, env = "ROADSCAN_PASSWORD", hide_env_values = true)]
    password: String,

    /// Create the account before signing in
    #[arg(long)]
    register: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "ROADSCAN_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            endpoint: self.endpoint.clone(),
            interval_ms: self.interval_ms,
            frames_dir: self.frames.clone(),
            ..ConfigOverrides::default()
        }
    }
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("roadscan_daemon={level},roadscan_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Resolve on SIGTERM or SIGINT
async fn wait_for_shutdown(mut sigterm: Signal, mut sigint: Signal) {
    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, initiating shutdown"),
        _ = sigint.recv() => info!("Received SIGINT, initiating shutdown"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("roadscan daemon starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.clone().or_else(default_config_path);
    let mut config =
        load_config_from_path(config_path).context("Failed to load configuration")?;
    args.overrides()
        .apply(&mut config)
        .context("Invalid command-line option")?;

    info!(
        endpoint = %config.endpoint,
        source = %config.endpoint_source(),
        frames = %config.frames_dir.display(),
        interval_ms = config.interval_ms,
        "Configuration loaded"
    );

    let sigterm = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let sigint = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;

    let identity = IdentityClient::from_config(&config.provider_config());
    identity.start();
    info!(provider = identity.provider_name(), "Identity provider ready");

    let session = detector::authenticate(&identity, &args.email, &args.password, args.register)
        .await
        .context("Authentication failed")?;
    info!(email = %session.user.email, "Signed in");

    let backend = HttpPredictionClient::new(&config.endpoint, config.request_timeout())
        .context("Invalid prediction endpoint")?;
    info!(url = %backend.predict_url(), "Prediction endpoint");

    let camera = DirectoryCamera::new(&config.frames_dir);
    let capture = CaptureLoop::new(Box::new(camera), Arc::new(backend), config.capture_config());

    let (reason, snapshot) =
        detector::run_until(&identity, capture, wait_for_shutdown(sigterm, sigint)).await;

    if reason != StopReason::SessionEnded {
        detector::sign_out(&identity).await;
    }
    if reason == StopReason::LoopExited {
        warn!("Capture loop exited unexpectedly");
    }

    info!(
        attempts = snapshot.stats.attempts,
        successes = snapshot.stats.successes,
        "roadscan daemon stopped cleanly"
    );
    Ok(())
}

//! roadscan TUI Entry Point
//!
//! Usage:
//!   roadscan-tui [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>     Configuration file
//!   -e, --endpoint <URL>    Prediction endpoint
//!   -f, --frames <DIR>      Directory of JPEG frames
//!   -t, --theme <MODE>      light, dark or system
//!
//! Logging goes to stderr and only when `RUST_LOG` is set, since the
//! terminal belongs to the UI.

use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roadscan_core::config::{default_config_path, load_config_from_path, ConfigOverrides};
use roadscan_core::{Camera, DirectoryCamera, HttpPredictionClient, IdentityClient, ThemeMode};
use roadscan_tui::{App, CaptureServices};

/// roadscan TUI - find and report potholes in your area
#[derive(Parser, Debug)]
#[command(name = "roadscan-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "ROADSCAN_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Prediction endpoint (e.g. 192.168.1.20:5000)
    #[arg(short = 'e', long, value_name = "URL")]
    endpoint: Option<String>,

    /// Directory of JPEG frames to classify
    #[arg(short = 'f', long, value_name = "DIR")]
    frames: Option<PathBuf>,

    /// Color scheme (light, dark, system)
    #[arg(short = 't', long, value_name = "MODE")]
    theme: Option<ThemeMode>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            endpoint: self.endpoint.clone(),
            frames_dir: self.frames.clone(),
            theme: self.theme,
            ..ConfigOverrides::default()
        }
    }
}

fn init_logging() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging();

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: roadscan-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("For headless use, run roadscan-daemon instead.");
        std::process::exit(1);
    }

    let config_path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(config_path).context("Failed to load configuration")?;
    args.overrides()
        .apply(&mut config)
        .context("Invalid command-line option")?;

    let identity = IdentityClient::from_config(&config.provider_config());
    let backend = HttpPredictionClient::new(&config.endpoint, config.request_timeout())
        .context("Invalid prediction endpoint")?;
    let frames_dir = config.frames_dir.clone();
    let services = CaptureServices::new(
        Arc::new(backend),
        Box::new(move || Box::new(DirectoryCamera::new(frames_dir.clone())) as Box<dyn Camera>),
        config.capture_config(),
    );
    let mut app = App::new(identity, services, config.theme.scheme());

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}

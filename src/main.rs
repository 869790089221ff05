use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use cognos::api::ApiClient;
use cognos::app::{App, AppEvent};
use cognos::config::Config;
use cognos::{sync, ui};

/// Get the config directory path (~/.config/cognos/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("cognos"))
}

#[derive(Parser, Debug)]
#[command(name = "cognos", about = "Terminal client for tag-driven news matching")]
struct Args {
    /// API location, absolute (http://host:port/api) or a path like /api.
    /// Overrides COGNOS_API_URL and the config file.
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Config file (defaults to ~/.config/cognos/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Log to a file; stdout belongs to the TUI.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(config_dir: &std::path::Path, level: &str) -> Result<()> {
    let log_path = config_dir.join("cognos.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    init_logging(&config_dir, &config.log_level)?;

    let api_url = match args.api_url {
        Some(url) if !url.trim().is_empty() => url,
        _ => config.api_url(),
    };
    let client = ApiClient::new(&api_url, config.request_timeout())
        .with_context(|| format!("Invalid API location: {}", api_url))?;
    tracing::info!(base_url = %client.base_url(), "Starting cognos");

    let mut app = App::new(client, &config);

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    sync::start_bootstrap(&mut app, &event_tx);

    ui::run(&mut app, event_tx, event_rx).await?;

    Ok(())
}

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mom_bridge::{
    config::Config,
    prefs::{self, FileStore},
    App,
};

#[derive(Parser, Debug)]
#[command(name = "mom-bridge")]
#[command(about = "Exposes a MOM monitor controller as a set of remotely controllable objects")]
#[command(version)]
struct Cli {
    /// Configuration file (default ~/.config/mom-bridge/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Listener port, overriding the configuration
    #[arg(long)]
    port: Option<u16>,

    /// Print the persisted preferences and exit
    #[arg(long)]
    status: bool,

    /// Clear all label overrides and exit
    #[arg(long)]
    reset_labels: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(port) = cli.port {
        config.listener.port = port;
    }

    // Handle simple commands first
    if cli.status {
        return print_status(&config);
    }

    if cli.reset_labels {
        return reset_labels(&config).await;
    }

    info!("Starting mom-bridge");

    let mut app = App::new(config).await?;

    // Set up signal handlers for graceful shutdown
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

    let result = tokio::select! {
        result = app.run() => {
            result
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            Ok(())
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
            Ok(())
        }
    };

    // Always run shutdown
    app.shutdown().await;
    result
}

fn print_status(config: &Config) -> Result<()> {
    let path = config.preferences_path()?;
    let values = FileStore::load(&path)?;
    let options = config.bridge_options();

    println!("Preferences: {}", path.display());
    println!("  Default device: {} ({})", options.identity.name, options.identity.device_id);
    println!("  Serial: {}", options.identity.serial_number);
    if values.is_empty() {
        println!("  (none stored)");
    }
    for (key, value) in &values {
        println!("  {} = {}", key, value);
    }
    Ok(())
}

async fn reset_labels(config: &Config) -> Result<()> {
    let path = config.preferences_path()?;
    let mut values = FileStore::load(&path)?;

    let removed = prefs::clear_labels(&mut values);
    if removed > 0 {
        FileStore::save(&path, &values).await?;
    }

    println!("✓ Cleared {} label overrides in {}", removed, path.display());
    Ok(())
}

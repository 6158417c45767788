//! Society billing - CLI server
//!
//! Headless maintenance billing service for systemd, Docker or a plain shell.
//!
//! ```sh
//! # Default config (~/.config/society-billing/config.toml)
//! society-billing-service
//!
//! # Custom config path and port
//! society-billing-service --config /etc/society-billing/config.toml --api-port 8081
//!
//! # Validate config without starting
//! society-billing-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use society_billing::config::AppConfig;
use society_billing::server::{init_tracing, ServerHandle, ServerOptions};

#[derive(Parser, Debug)]
#[command(
    name = "society-billing-service",
    version,
    about = "Maintenance billing service for a housing society",
    long_about = "REST API for members, rates, monthly maintenance invoices, \
                  society expenses and collection dashboards.\n\n\
                  Default config: ~/.config/society-billing/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "SOCIETY_BILLING_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(society_billing::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    if let Some(e) = load_error {
        error!("{}", e);
        if cli.check {
            return Err(e.into());
        }
        error!("Using default configuration.");
    } else {
        info!("Configuration loaded from {}", config_path.display());
    }

    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
        config.server.api_port = port;
    }

    if cli.check {
        config.validate()?;
        println!("✅ Configuration is valid");
        println!("   Config file    : {}", config_path.display());
        println!("   API address    : {}", config.api_address());
        println!("   Database       : {}", config.database.url);
        println!("   Log level      : {}", config.logging.level);
        println!("   Invoice prefix : {}", config.billing.invoice_prefix);
        println!("   Expense prefix : {}", config.billing.expense_prefix);
        println!("   Currency       : {}", config.billing.currency);
        return Ok(());
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;
    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;
    Ok(())
}

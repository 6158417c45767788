//! Society billing REST service.
//!
//! Reads configuration from TOML (`~/.config/society-billing/config.toml`,
//! or the path in `SOCIETY_BILLING_CONFIG`).

use tracing::{error, info};

use society_billing::server::{init_tracing, ServerHandle, ServerOptions};
use society_billing::{default_config_path, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = default_config_path();
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg);
            error!("{}", e);
            error!("Using default configuration.");
            cfg
        }
    };

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: true,
    })
    .await?;
    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;
    Ok(())
}

//! Server runtime shared by the `society-billing` binary and the `cli` crate
//!
//! [`ServerHandle`] owns the whole lifecycle: metrics recorder, database and
//! migrations, repository wiring, the REST listener, and graceful shutdown.

use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::BillingService;
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::{init_database, run_migrations, InMemoryStorage, SeaOrmRepositoryProvider};
use crate::interfaces::http::{create_api_router, AppState, HealthState, RouterOptions};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

pub struct ServerOptions {
    pub config: AppConfig,
    /// Apply pending migrations before serving (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

/// The global recorder can be installed once per process; restarts reuse it.
fn prometheus_handle() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    if let Some(handle) = HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("📊 Prometheus metrics recorder installed");
    Ok(HANDLE.get_or_init(|| handle).clone())
}

/// Handle to a running billing server.
///
/// ```rust,no_run
/// use society_billing::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,
    /// Port actually bound; differs from the config when it asked for 0.
    pub api_port: u16,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// 1. Install the Prometheus recorder (when metrics are enabled)
    /// 2. Connect to the database and run migrations, or use in-memory storage
    /// 3. Build services and the REST router
    /// 4. Bind and serve until shutdown is triggered
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let config = opts.config;
        config.validate()?;
        info!("Starting society billing service...");

        let metrics = if config.server.metrics_enabled {
            Some(prometheus_handle()?)
        } else {
            None
        };

        let (repos, db): (Arc<dyn RepositoryProvider>, Option<DatabaseConnection>) =
            if config.database.is_memory() {
                warn!("Using in-memory storage; data is lost on shutdown");
                (Arc::new(InMemoryStorage::new()), None)
            } else {
                let db = init_database(&config.database.to_database_config()).await?;
                if opts.auto_migrate {
                    run_migrations(&db).await?;
                }
                (Arc::new(SeaOrmRepositoryProvider::new(db.clone())), Some(db))
            };

        let billing = BillingService::new(repos.clone(), config.billing.invoice_prefix.clone())
            .with_retry(config.billing.retry_config());
        let state = AppState::new(
            repos.clone(),
            billing,
            config.billing.expense_prefix.clone(),
            config.billing.currency.clone(),
        );
        let router = create_api_router(
            state,
            HealthState::new(db.clone()),
            RouterOptions {
                cors_origins: config.server.cors_origins.clone(),
                metrics,
            },
        );

        let listener = tokio::net::TcpListener::bind(config.api_address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let signal = shutdown.signal();
        let api_task = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    signal.wait().await;
                    info!("🛑 REST API server received shutdown signal");
                })
                .await;
            if let Err(e) = served {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            repos,
            config,
            api_port: local_addr.port(),
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGTERM / SIGINT.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }

    /// Wait for the server to stop after shutdown was triggered, bounded by
    /// `server.shutdown_timeout`, then close the database.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            ..
        } = self;

        let drained = shutdown
            .shutdown_with_cleanup(|| async move {
                if let Err(e) = api_task.await {
                    error!("REST API server task panicked: {}", e);
                }
            })
            .await;
        if !drained {
            warn!("In-flight requests abandoned");
        }

        if let Some(db) = db {
            match db.close().await {
                Ok(()) => info!("✅ Database connection closed"),
                Err(e) => warn!("Error closing database connection: {}", e),
            }
        }
        info!("👋 Society billing service stopped");
    }

    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }
}

/// Initialize tracing from the config. `RUST_LOG` overrides `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    if let Err(e) = result {
        warn!("Tracing already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MEMORY_DATABASE_URL;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.api_host = "127.0.0.1".into();
        config.server.api_port = 0;
        config.server.metrics_enabled = false;
        config.server.shutdown_timeout = 5;
        config.database.url = MEMORY_DATABASE_URL.into();
        config
    }

    #[tokio::test]
    async fn starts_and_stops_on_memory_storage() {
        let handle = ServerHandle::start(ServerOptions {
            config: memory_config(),
            auto_migrate: false,
        })
        .await
        .unwrap();
        assert_ne!(handle.api_port, 0);
        assert!(handle.is_running());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn invalid_config_refused() {
        let mut config = memory_config();
        config.billing.invoice_prefix = String::new();
        let result = ServerHandle::start(ServerOptions {
            config,
            auto_migrate: false,
        })
        .await;
        assert!(result.is_err());
    }
}

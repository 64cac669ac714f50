#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::database::{DbPool, PgMessageRepository};
use crate::api::{AppState, MgmtState};
use crate::config::Config;
use crate::domain::repository::MessageRepository;
use crate::services::health_service::HealthService;
use crate::services::message_service::DefaultMessageService;
use std::sync::Arc;
use tokio::sync::watch;

/// Everything the two routers need, wired once at startup.
#[derive(Debug)]
pub struct App {
    pub state: AppState,
    pub mgmt: MgmtState,
}

#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    pool: Option<DbPool>,
    repository: Option<Arc<dyn MessageRepository>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, pool: None, repository: None }
    }

    /// Backs the API with PostgreSQL.
    #[must_use]
    pub fn with_database(mut self, pool: DbPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Backs the API with an explicit repository, taking precedence over the database.
    #[must_use]
    pub fn with_repository(mut self, repository: Arc<dyn MessageRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Wires repository, services and router state.
    ///
    /// # Errors
    /// Returns an error if neither a database nor a repository was supplied.
    pub fn build(self) -> anyhow::Result<App> {
        let repository: Arc<dyn MessageRepository> = match (self.repository, &self.pool) {
            (Some(repository), _) => repository,
            (None, Some(pool)) => Arc::new(PgMessageRepository::new(pool.clone())),
            (None, None) => anyhow::bail!("no message store configured"),
        };

        let message_service = Arc::new(DefaultMessageService::new(repository));
        let health_service = HealthService::new(self.pool, self.config.health.clone());

        Ok(App { state: AppState { message_service }, mgmt: MgmtState { health_service } })
    }
}

/// Applies the embedded schema migrations.
///
/// # Errors
/// Returns an error if a migration fails.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!().run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

/// Routes panics through `tracing` so they reach the configured log sinks.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(|l| format!("{}:{}", l.file(), l.line())).unwrap_or_default();
        tracing::error!(panic = %info, location = %location, "Panic occurred");
    }));
}

/// Flips the shutdown channel on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
            () = terminate => tracing::info!("Received SIGTERM, shutting down"),
        }

        let _ = shutdown_tx.send(true);
    });
}

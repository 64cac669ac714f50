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

use messages_api::adapters::memory::InMemoryMessageRepository;
use messages_api::config::Config;
use messages_api::{AppBuilder, adapters, telemetry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    messages_api::setup_panic_hook();

    let boot_span = tracing::info_span!("boot_server");
    let (api_listener, mgmt_listener, app_router, mgmt_app) = async {
        // Phase 1: Infrastructure Setup
        let builder = if config.in_memory {
            tracing::warn!("running with the in-memory message store; data is lost on exit");
            AppBuilder::new(config.clone()).with_repository(Arc::new(InMemoryMessageRepository::new()))
        } else {
            let pool = adapters::database::init_pool(&config.database).await?;
            tracing::info!(host = %config.database.host, database = %config.database.name, "database connected");
            messages_api::run_migrations(&pool).await?;
            AppBuilder::new(config.clone()).with_database(pool)
        };

        // Phase 2: Component Wiring
        let app = builder.build()?;

        // Phase 3: Runtime Setup
        let app_router = messages_api::api::app_router(app.state);
        let mgmt_app = messages_api::api::mgmt_router(app.mgmt);

        let api_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let mgmt_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.mgmt_port).parse()?;

        tracing::info!(address = %api_addr, "listening");
        tracing::info!(address = %mgmt_addr, "management server listening");

        let api_listener = tokio::net::TcpListener::bind(api_addr).await?;
        let mgmt_listener = tokio::net::TcpListener::bind(mgmt_addr).await?;

        Ok::<(tokio::net::TcpListener, tokio::net::TcpListener, axum::Router, axum::Router), anyhow::Error>((
            api_listener,
            mgmt_listener,
            app_router,
            mgmt_app,
        ))
    }
    .instrument(boot_span)
    .await?;

    // Phase 4: Start Runtime
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    messages_api::spawn_signal_handler(shutdown_tx.clone());

    let mut api_rx = shutdown_rx.clone();
    let api_server = axum::serve(api_listener, app_router).with_graceful_shutdown(async move {
        let _ = api_rx.wait_for(|&s| s).await;
    });

    let mut mgmt_rx = shutdown_rx.clone();
    let mgmt_server = axum::serve(mgmt_listener, mgmt_app).with_graceful_shutdown(async move {
        let _ = mgmt_rx.wait_for(|&s| s).await;
    });

    let servers = async { tokio::try_join!(api_server, mgmt_server) };

    // Phase 5: Graceful Shutdown
    tokio::select! {
        result = servers => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server error");
            }
            tracing::info!("Servers stopped.");
        }
        () = async {
            let mut rx = shutdown_rx.clone();
            let _ = rx.wait_for(|&s| s).await;
            tokio::time::sleep(std::time::Duration::from_secs(config.server.shutdown_timeout_secs)).await;
        } => {
            tracing::warn!("Timeout waiting for in-flight requests to finish.");
        }
    }

    let _ = shutdown_tx.send(true);
    telemetry_guard.shutdown();
    Ok(())
}

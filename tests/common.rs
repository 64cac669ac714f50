#![allow(dead_code)]

use messages_api::adapters::memory::InMemoryMessageRepository;
use messages_api::api::{AppState, app_router, mgmt_router};
use messages_api::config::{Config, DatabaseConfig, HealthConfig, ServerConfig, TelemetryConfig};
use messages_api::services::message_service::MessageService;
use messages_api::{AppBuilder, telemetry};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;

pub fn get_test_config() -> Config {
    Config {
        in_memory: true,
        database: DatabaseConfig::default(),
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 0, mgmt_port: 0, shutdown_timeout_secs: 1 },
        telemetry: TelemetryConfig::default(),
        health: HealthConfig::default(),
    }
}

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
}

async fn serve(router: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}")
}

impl TestApp {
    /// Full stack (handlers, service, repository) over a fresh in-memory store.
    pub async fn spawn() -> Self {
        telemetry::init_test_telemetry();

        let app = AppBuilder::new(get_test_config())
            .with_repository(Arc::new(InMemoryMessageRepository::new()))
            .build()
            .unwrap();

        Self {
            server_url: serve(app_router(app.state)).await,
            mgmt_url: serve(mgmt_router(app.mgmt)).await,
            client: reqwest::Client::new(),
        }
    }

    /// Handlers only, in front of a substitute service.
    pub async fn spawn_with_service(message_service: Arc<dyn MessageService>) -> Self {
        telemetry::init_test_telemetry();

        let app = AppBuilder::new(get_test_config())
            .with_repository(Arc::new(InMemoryMessageRepository::new()))
            .build()
            .unwrap();

        Self {
            server_url: serve(app_router(AppState { message_service })).await,
            mgmt_url: serve(mgmt_router(app.mgmt)).await,
            client: reqwest::Client::new(),
        }
    }

    pub async fn create_message(&self, title: &str, body: &str) -> Value {
        let resp = self
            .client
            .post(format!("{}/messages", self.server_url))
            .json(&serde_json::json!({ "title": title, "body": body }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED, "seeding message '{title}' failed");
        resp.json().await.unwrap()
    }
}

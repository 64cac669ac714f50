use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Serve from a process-local store instead of PostgreSQL (development only)
    #[arg(long, env = "MESSAGES_IN_MEMORY", default_value_t = false)]
    pub in_memory: bool,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,

    #[command(flatten)]
    pub health: HealthConfig,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Database host
    #[arg(id = "db_host", long = "db-host", env = "MESSAGES_DB_HOST", default_value = "localhost")]
    pub host: String,

    /// Database port
    #[arg(id = "db_port", long = "db-port", env = "MESSAGES_DB_PORT", default_value_t = 5432)]
    pub port: u16,

    /// Database user
    #[arg(long = "db-user", env = "MESSAGES_DB_USER", default_value = "postgres")]
    pub user: String,

    /// Database password
    #[arg(long = "db-password", env = "MESSAGES_DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Database name
    #[arg(long = "db-name", env = "MESSAGES_DB_NAME", default_value = "messages")]
    pub name: String,

    /// Maximum number of pooled connections
    #[arg(long, env = "MESSAGES_DB_MAX_CONNECTIONS", default_value_t = 20)]
    pub max_connections: u32,

    /// Minimum number of idle connections kept open
    #[arg(long, env = "MESSAGES_DB_MIN_CONNECTIONS", default_value_t = 0)]
    pub min_connections: u32,

    /// How long to wait for a free connection before failing
    #[arg(long, env = "MESSAGES_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "messages".to_string(),
            max_connections: 20,
            min_connections: 0,
            acquire_timeout_secs: 5,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "MESSAGES_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "MESSAGES_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Port for the liveness/readiness endpoints
    #[arg(long, env = "MESSAGES_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// How long to wait for in-flight work after a shutdown signal
    #[arg(long, env = "MESSAGES_SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080, mgmt_port: 9090, shutdown_timeout_secs: 10 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Default, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "MESSAGES_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint for traces, metrics and logs (disabled when unset)
    #[arg(long, env = "MESSAGES_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Timeout for the readiness database probe
    #[arg(long, env = "MESSAGES_HEALTH_DB_TIMEOUT_MS", default_value_t = 2000)]
    pub db_timeout_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { db_timeout_ms: 2000 }
    }
}

impl Config {
    /// Reads `.env` if present, then parses flags and environment variables.
    #[must_use]
    pub fn load() -> Self {
        // A missing .env file is normal outside development.
        let _ = dotenvy::dotenv();
        Self::parse()
    }
}

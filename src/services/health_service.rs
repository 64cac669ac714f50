use crate::adapters::database::DbPool;
use crate::config::HealthConfig;
use opentelemetry::{KeyValue, global, metrics::Gauge};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum DbCheckError {
    #[error("database unreachable: {0}")]
    Unreachable(#[source] sqlx::Error),
    #[error("database did not answer within {0:?}")]
    TimedOut(Duration),
}

/// Readiness of the message store.
#[derive(Clone, Debug)]
pub struct HealthService {
    pool: Option<DbPool>,
    db_timeout: Duration,
    db_up: Gauge<i64>,
}

impl HealthService {
    /// `pool` is `None` when the API runs against the in-memory store.
    #[must_use]
    pub fn new(pool: Option<DbPool>, config: HealthConfig) -> Self {
        let db_up = global::meter("messages-api")
            .i64_gauge("messages_api_database_up")
            .with_description("1 if the last readiness check reached the database, 0 otherwise")
            .build();

        Self { pool, db_timeout: Duration::from_millis(config.db_timeout_ms), db_up }
    }

    /// Runs `SELECT 1` against the pool, bounded by the configured timeout.
    /// Always ready without a pool.
    ///
    /// # Errors
    /// Returns `DbCheckError` if the query fails or does not finish in time.
    pub async fn check_db(&self) -> Result<(), DbCheckError> {
        let Some(pool) = &self.pool else {
            return Ok(());
        };

        let outcome = tokio::time::timeout(self.db_timeout, sqlx::query("SELECT 1").execute(pool))
            .await
            .map_err(|_| DbCheckError::TimedOut(self.db_timeout))
            .and_then(|res| res.map(drop).map_err(DbCheckError::Unreachable));

        self.db_up.record(i64::from(outcome.is_ok()), &[KeyValue::new("component", "database")]);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

    #[tokio::test]
    async fn test_ready_without_pool() {
        let service = HealthService::new(None, HealthConfig::default());
        assert!(service.check_db().await.is_ok());
    }

    #[tokio::test]
    async fn test_not_ready_when_database_is_down() {
        let options = PgConnectOptions::new().host("127.0.0.1").port(1).username("nobody");
        let pool = PgPoolOptions::new().acquire_timeout(Duration::from_millis(100)).connect_lazy_with(options);
        let service = HealthService::new(Some(pool), HealthConfig { db_timeout_ms: 300 });

        assert!(service.check_db().await.is_err());
    }
}

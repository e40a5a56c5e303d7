use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::Result;

/// Hands out one logical connection per request.
///
/// Backed by a bounded pool that is built lazily: nothing talks to the
/// store until the first `acquire`/`begin`, so an unreachable database
/// shows up as a failed request instead of a failed startup.
#[derive(Debug, Clone)]
pub struct ConnectionGateway {
    pool: PgPool,
}

impl ConnectionGateway {
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        if config.max_connections == 0 {
            return Err(AppError::ConfigError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy_with(config.connect_options());

        info!(
            "Database gateway configured for {}:{}/{} (max {} connections)",
            config.host, config.port, config.name, config.max_connections
        );

        Ok(Self { pool })
    }

    /// A plain connection for read-only work. Returned to the pool on drop.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>> {
        debug!("Acquiring database connection");
        Ok(self.pool.acquire().await?)
    }

    /// A connection with an open transaction. Rolled back on drop unless
    /// committed.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        debug!("Opening database transaction");
        Ok(self.pool.begin().await?)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

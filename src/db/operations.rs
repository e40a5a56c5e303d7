use sqlx::pool::PoolConnection;
use sqlx::{Postgres, Transaction};
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::db::gateway::ConnectionGateway;
use crate::error::AppError;
use crate::Result;

/// Unique constraints on `users` and the request field each one guards.
const UNIQUE_CONSTRAINTS: &[(&str, &str)] = &[
    ("users_username_key", "username"),
    ("users_email_key", "email"),
];

/// Field protected by a unique constraint, if the constraint is known.
pub fn unique_field(constraint: Option<&str>) -> Option<&'static str> {
    let constraint = constraint?;
    UNIQUE_CONSTRAINTS
        .iter()
        .find(|(name, _)| *name == constraint)
        .map(|(_, field)| *field)
}

/// Message for a unique violation, naming the field when it is known.
pub fn conflict_message(field: Option<&str>) -> String {
    match field {
        Some("username") => "Username already exists".to_string(),
        Some("email") => "Email already exists".to_string(),
        Some(other) => format!("{} already exists", other),
        None => "User with these details already exists".to_string(),
    }
}

/// Classify a failed user write: unique violations become `Conflict`,
/// anything else goes through the regular store error mapping.
pub(crate) fn map_user_write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            let field = unique_field(db_err.constraint());
            if field.is_none() {
                warn!("Unique violation on unmapped constraint: {}", db_err.message());
            }
            return AppError::Conflict(conflict_message(field));
        }
    }
    AppError::from(err)
}

/// Data access for users and addresses.
///
/// Every method takes exactly one connection from the gateway and gives
/// it back before returning. Writes run in a transaction that is committed
/// on success and rolled back on any error.
#[derive(Debug, Clone)]
pub struct DbOperations {
    gateway: ConnectionGateway,
}

impl DbOperations {
    pub fn new(gateway: ConnectionGateway) -> Self {
        Self { gateway }
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Ok(Self::new(ConnectionGateway::new(config)?))
    }

    pub(crate) async fn connection(&self) -> Result<PoolConnection<Postgres>> {
        self.gateway.acquire().await
    }

    pub(crate) async fn begin_transaction(&self) -> Result<Transaction<'static, Postgres>> {
        self.gateway.begin().await
    }

    /// Commit `transaction` if `result` is `Ok`, otherwise roll back and
    /// hand the original error back unchanged.
    pub(crate) async fn finish<T>(
        transaction: Transaction<'static, Postgres>,
        result: Result<T>,
    ) -> Result<T> {
        match result {
            Ok(value) => {
                transaction.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = transaction.rollback().await {
                    warn!("Rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    pub async fn close(&self) {
        self.gateway.close().await;
    }
}

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;

use std::sync::Arc;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use db::{Address, ConnectionGateway, DbOperations, User};
pub use handlers::{configure, health_check};

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db: Arc<DbOperations>,
}

impl AppState {
    /// Build the state without touching the database; connections are
    /// opened on demand by the first request that needs one.
    pub fn new(config: Settings) -> Result<Self> {
        let db = DbOperations::from_config(&config.database)?;

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
        })
    }

    pub async fn shutdown(&self) -> Result<()> {
        // Close database connections
        self.db.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings::defaults()
            .and_then(|b| b.set_override("environment", "test"))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("Failed to load test config")
    }

    #[tokio::test]
    async fn test_app_state_creation_is_lazy() {
        // The default host is not resolvable here; building state must
        // still succeed because nothing connects yet.
        let state = AppState::new(test_settings());
        assert!(state.is_ok());
    }

    #[tokio::test]
    async fn test_app_state_rejects_empty_pool() {
        let mut config = test_settings();
        config.database.max_connections = 0;
        let state = AppState::new(config);
        assert!(matches!(state, Err(AppError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_app_state_clone() {
        let state = AppState::new(test_settings()).expect("Failed to build state");
        let cloned = state.clone();

        // Verify Arc references are shared
        assert!(Arc::ptr_eq(&state.config, &cloned.config));
        assert!(Arc::ptr_eq(&state.db, &cloned.db));

        state.shutdown().await.unwrap();
    }
}

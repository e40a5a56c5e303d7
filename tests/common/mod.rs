#![allow(dead_code)]

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, Executor, PgConnection};
use user_registry_server::{AppState, Settings};
use uuid::Uuid;

/// Settings whose database can never be reached, for tests that must not
/// depend on a running PostgreSQL.
pub fn offline_settings() -> Settings {
    Settings::defaults()
        .and_then(|b| b.set_override("environment", "test"))
        .and_then(|b| b.set_override("database.host", "127.0.0.1"))
        .and_then(|b| b.set_override("database.port", 1))
        .and_then(|b| b.set_override("database.acquire_timeout_secs", 1))
        .and_then(|b| b.build())
        .and_then(|c| c.try_deserialize())
        .expect("Failed to build offline settings")
}

/// A throwaway database with the schema applied.
///
/// Connection parameters come from the usual `APP_DATABASE__*` variables;
/// the configured user must be allowed to create databases.
pub struct TestDb {
    pub name: String,
    pub state: AppState,
    admin: PgConnectOptions,
}

impl TestDb {
    pub async fn create() -> Self {
        let mut settings = Settings::new().expect("Failed to load settings");
        let admin = settings.database.connect_options().database("postgres");
        let name = format!("user_registry_test_{}", Uuid::new_v4().simple());

        let mut admin_conn = PgConnection::connect_with(&admin)
            .await
            .expect("Failed to connect to admin database");
        admin_conn
            .execute(&*format!("CREATE DATABASE \"{}\"", name))
            .await
            .expect("Failed to create test database");
        admin_conn.close().await.ok();

        settings.database.name = name.clone();
        let mut conn = PgConnection::connect_with(&settings.database.connect_options())
            .await
            .expect("Failed to connect to test database");
        sqlx::migrate!("./migrations")
            .run(&mut conn)
            .await
            .expect("Failed to apply schema");
        conn.close().await.ok();

        let state = AppState::new(settings).expect("Failed to build state");
        Self { name, state, admin }
    }

    pub async fn cleanup(self) {
        self.state.shutdown().await.ok();

        let mut admin_conn = PgConnection::connect_with(&self.admin)
            .await
            .expect("Failed to connect to admin database for cleanup");
        admin_conn
            .execute(&*format!(
                "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
                self.name
            ))
            .await
            .ok();
        admin_conn
            .execute(&*format!("DROP DATABASE IF EXISTS \"{}\"", self.name))
            .await
            .expect("Failed to drop test database during cleanup");
        admin_conn.close().await.ok();
    }
}

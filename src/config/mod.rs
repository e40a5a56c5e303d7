use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: u32,
}

/// Connection parameters for the PostgreSQL store.
///
/// Only `host` is expected to change between deployments
/// (`APP_DATABASE__HOST`); the rest ship as fixed defaults.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allow_any_origin: bool,
    /// Comma-separated origins, used when `allow_any_origin` is off.
    pub allowed_origins: String,
    pub max_age: u32,
}

impl CorsConfig {
    pub fn origins(&self) -> Vec<&str> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Self::defaults()?
            // Add in settings from the config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // E.g., `APP_DATABASE__HOST=db.internal` sets `Settings.database.host`
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults, before any file or environment layer.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", "development")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.host", "postgres")?
            .set_default("database.port", 5432)?
            .set_default("database.name", "mydatabase")?
            .set_default("database.user", "myuser")?
            .set_default("database.password", "mypassword")?
            .set_default("database.max_connections", 5)?
            .set_default("database.acquire_timeout_secs", 5)?
            .set_default("cors.enabled", true)?
            .set_default("cors.allow_any_origin", true)?
            .set_default("cors.allowed_origins", "")?
            .set_default("cors.max_age", 3600)
    }

    fn environment() -> Environment {
        Environment::with_prefix("app")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_env(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Settings::defaults()?
            .add_source(Settings::environment().source(Some(source)))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_settings_defaults() {
        let settings = with_env(&[]).expect("Failed to load settings");
        assert_eq!(settings.environment, "development");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.server.workers as usize, num_cpus::get());
        assert_eq!(settings.database.host, "postgres");
        assert_eq!(settings.database.port, 5432);
        assert_eq!(settings.database.name, "mydatabase");
        assert_eq!(settings.database.user, "myuser");
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.database.acquire_timeout(), Duration::from_secs(5));
        assert!(settings.cors.enabled);
    }

    #[test]
    fn test_database_host_override() {
        let settings = with_env(&[("APP_DATABASE__HOST", "db.internal")])
            .expect("Failed to load settings");

        assert_eq!(settings.database.host, "db.internal");
        // Everything else keeps its fixed value
        assert_eq!(settings.database.name, "mydatabase");
        assert_eq!(settings.database.password, "mypassword");
    }

    #[test]
    fn test_numeric_overrides_are_parsed() {
        let settings = with_env(&[
            ("APP_SERVER__PORT", "9000"),
            ("APP_SERVER__WORKERS", "2"),
            ("APP_DATABASE__MAX_CONNECTIONS", "12"),
        ])
        .expect("Failed to load settings");

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.workers, 2);
        assert_eq!(settings.database.max_connections, 12);
    }

    #[test]
    fn test_invalid_port() {
        let result = with_env(&[("APP_SERVER__PORT", "invalid")]);
        assert!(result.is_err(), "Expected error for invalid port");
    }

    #[test]
    fn test_cors_origins_from_environment() {
        let settings = with_env(&[
            ("APP_CORS__ALLOW_ANY_ORIGIN", "false"),
            ("APP_CORS__ALLOWED_ORIGINS", "https://app.example.com, http://localhost:3000,"),
        ])
        .unwrap();

        assert!(!settings.cors.allow_any_origin);
        assert_eq!(
            settings.cors.origins(),
            ["https://app.example.com", "http://localhost:3000"]
        );
        assert!(with_env(&[]).unwrap().cors.origins().is_empty());
    }

    #[test]
    fn test_connect_options_use_configured_host() {
        let settings = with_env(&[("APP_DATABASE__HOST", "10.0.0.7")]).unwrap();
        let options = settings.database.connect_options();
        assert_eq!(options.get_host(), "10.0.0.7");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_database(), Some("mydatabase"));
        assert_eq!(options.get_username(), "myuser");
    }
}

//! Application configuration loaded from environment variables.

use std::env;

use vista_infra::{DatabaseConfig, JwtConfig};

const DEFAULT_DATABASE_URL: &str = "sqlite://voyagevista.db?mode=rwc";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub template_dir: String,
    pub jwt: JwtConfig,
    pub run_migrations: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(10),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(1),
            sqlx_logging: parse_flag("DB_LOG_QUERIES").unwrap_or(false),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            template_dir: env::var("TEMPLATE_DIR").unwrap_or_else(|_| default_template_dir()),
            jwt: JwtConfig::from_env(),
            run_migrations: parse_flag("RUN_MIGRATIONS").unwrap_or(true),
        }
    }
}

/// The templates shipped with this crate.
pub fn default_template_dir() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/templates").to_string()
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn parse_flag(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no" | "off"))
}

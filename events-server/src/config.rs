//! Configuration module for environment variable parsing.
//!
//! Every setting has a default, so the server starts with no environment at all.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// SQLite connection string for the event store
    pub database_url: String,

    /// Maximum number of pooled database connections
    pub database_max_connections: u32,

    /// Default look-back window for the recent events listing
    pub recent_window: Duration,

    /// Maximum accepted webhook body size in bytes
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            database_url: "sqlite://events.db".to_string(),
            database_max_connections: 5,
            recent_window: Duration::from_secs(15),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            port: parse_var("PORT", defaults.port),

            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.database_url),

            database_max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )
            .max(1),

            recent_window: Duration::from_secs(parse_var(
                "RECENT_WINDOW_SECS",
                defaults.recent_window.as_secs(),
            )),

            max_body_bytes: parse_var("MAX_BODY_BYTES", defaults.max_body_bytes),
        }
    }
}

/// Parse a variable, falling back to `default` when unset or invalid.
fn parse_var<T: FromStr + Copy>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

//! Environment configuration
//!
//! Reads service settings from environment variables (optionally seeded by a
//! `.env` file in `main`).

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Duration;

use crate::utils::time::OperatingZone;

/// Where rentals, invoices and the ledger live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    /// Empty means permissive CORS.
    pub cors_origins: Vec<String>,
    pub operating_zone: OperatingZone,
    pub cancellation_window: Duration,
    pub storage_backend: StorageBackend,
    pub memory_seed_path: Option<PathBuf>,
    pub log_level: tracing::Level,
}

impl EnvironmentConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let port = match var("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid number, got '{}'", port))?,
            None => 3000,
        };

        let jwt_secret = var("JWT_SECRET").ok_or_else(|| anyhow!("JWT_SECRET must be set"))?;

        let cors_origins = var("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let operating_zone = match var("OPERATING_UTC_OFFSET") {
            Some(offset) => OperatingZone::parse(&offset).map_err(|e| anyhow!("OPERATING_UTC_OFFSET: {}", e))?,
            None => OperatingZone::default(),
        };

        let window_minutes: i64 = match var("CANCELLATION_WINDOW_MINUTES") {
            Some(minutes) => minutes.trim().parse().with_context(|| {
                format!("CANCELLATION_WINDOW_MINUTES must be a valid number, got '{}'", minutes)
            })?,
            None => 60,
        };
        if window_minutes < 0 {
            return Err(anyhow!("CANCELLATION_WINDOW_MINUTES must not be negative"));
        }

        let storage_backend = match var("STORAGE_BACKEND").as_deref().map(str::trim) {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => return Err(anyhow!("unknown STORAGE_BACKEND '{}'", other)),
        };

        let log_level = match var("LOG_LEVEL") {
            Some(level) => level
                .trim()
                .parse()
                .map_err(|_| anyhow!("LOG_LEVEL must be one of trace, debug, info, warn, error"))?,
            None if environment == "development" => tracing::Level::DEBUG,
            None => tracing::Level::INFO,
        };

        Ok(Self {
            environment,
            port,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            jwt_secret,
            cors_origins,
            operating_zone,
            cancellation_window: Duration::minutes(window_minutes),
            storage_backend,
            memory_seed_path: var("MEMORY_SEED_PATH").map(PathBuf::from),
            log_level,
        })
    }

    /// Whether we are running in development mode
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Address the server binds to
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EnvironmentConfig::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert!(config.is_development());
        assert_eq!(config.server_url(), "0.0.0.0:3000");
        assert_eq!(config.operating_zone, OperatingZone::default());
        assert_eq!(config.cancellation_window, Duration::hours(1));
        assert_eq!(config.storage_backend, StorageBackend::Postgres);
        assert_eq!(config.log_level, tracing::Level::DEBUG);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = EnvironmentConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("ENVIRONMENT", "production"),
            ("PORT", "8081"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("OPERATING_UTC_OFFSET", "+00:00"),
            ("CANCELLATION_WINDOW_MINUTES", "30"),
            ("STORAGE_BACKEND", "memory"),
            ("MEMORY_SEED_PATH", "seed.json"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8081);
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.operating_zone, OperatingZone::utc());
        assert_eq!(config.cancellation_window, Duration::minutes(30));
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.memory_seed_path, Some(PathBuf::from("seed.json")));
        assert_eq!(config.log_level, tracing::Level::INFO);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(EnvironmentConfig::from_lookup(lookup(&[])).is_err());
        assert!(EnvironmentConfig::from_lookup(lookup(&[("JWT_SECRET", "x"), ("PORT", "http")])).is_err());
        assert!(EnvironmentConfig::from_lookup(lookup(&[("JWT_SECRET", "x"), ("STORAGE_BACKEND", "redis")])).is_err());
        assert!(EnvironmentConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "x"),
            ("OPERATING_UTC_OFFSET", "Asia/Singapore")
        ]))
        .is_err());
    }
}

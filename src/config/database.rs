//! Database configuration
//!
//! PostgreSQL pool settings for SQLx.

use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Upper bound on waiting for a connection before a unit of work starts.
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let url = env::var("DATABASE_URL").map_err(|_| anyhow!("DATABASE_URL must be set"))?;

        let acquire_secs: u64 = match env::var("DB_ACQUIRE_TIMEOUT_SECS") {
            Ok(secs) => secs
                .trim()
                .parse()
                .with_context(|| format!("DB_ACQUIRE_TIMEOUT_SECS must be a valid number, got '{}'", secs))?,
            Err(_) => 5,
        };

        let run_migrations = match env::var("RUN_MIGRATIONS") {
            Ok(flag) => flag
                .trim()
                .parse()
                .with_context(|| format!("RUN_MIGRATIONS must be true or false, got '{}'", flag))?,
            Err(_) => true,
        };

        Ok(Self {
            url,
            max_connections: 20,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(acquire_secs),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(3600),
            run_migrations,
        })
    }

    /// Create a new connection pool
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .connect(&self.url)
            .await
    }
}

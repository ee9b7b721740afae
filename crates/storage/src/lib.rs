//! Persistence and domain logic for the leaderboard service.
//!
//! Scores live in a single PostgreSQL relation; the ranking is computed on
//! every read. [`services::leaderboard::LeaderboardService`] is the entry
//! point used by the web layer.

pub mod dto;
pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod schema;
pub mod services;
pub mod store;

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::{Result, StorageError};

pub use memory::MemoryStore;
pub use services::leaderboard::LeaderboardService;
pub use store::ScoreStore;

/// Pool sizing for [`Database::connect`]
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// PostgreSQL connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Build a pool with default settings. No connection is opened until the
    /// first query, so an unreachable server surfaces on first use.
    pub fn new(database_url: &str) -> Result<Self> {
        Self::connect(database_url, PoolSettings::default())
    }

    pub fn connect(database_url: &str, settings: PoolSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Create the `scores` relation if it does not exist yet.
    pub async fn run_migrations(&self) -> Result<()> {
        for sql in schema::statements() {
            sqlx::query(&sql)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    let err = StorageError::from(e);
                    if err.is_connection_failure() {
                        StorageError::Unavailable(err.to_string())
                    } else {
                        err
                    }
                })?;
        }

        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

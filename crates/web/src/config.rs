use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use storage::PoolSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub addr: SocketAddr,
    pub nickname: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub pool: PoolSettings,
    pub ingest: Option<IngestConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let backend = match var("LEADERBOARD_STORE").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => bail!("LEADERBOARD_STORE must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_url = var("DATABASE_URL").filter(|url| !url.is_empty());
        if backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("Cannot load DATABASE_URL env variable");
        }

        let defaults = PoolSettings::default();
        let pool = PoolSettings {
            max_connections: match var("DATABASE_MAX_CONNECTIONS") {
                Some(v) => v
                    .parse::<u32>()
                    .context("DATABASE_MAX_CONNECTIONS must be a number")?,
                None => defaults.max_connections,
            },
            acquire_timeout: match var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(
                    v.parse::<u64>()
                        .context("DATABASE_ACQUIRE_TIMEOUT_SECS must be a number")?,
                ),
                None => defaults.acquire_timeout,
            },
        };

        let ingest = match var("INGEST_ADDR") {
            Some(addr) => Some(IngestConfig {
                addr: addr
                    .parse::<SocketAddr>()
                    .context("INGEST_ADDR must be a socket address")?,
                nickname: var("INGEST_NICKNAME")
                    .filter(|n| !n.trim().is_empty())
                    .context("INGEST_NICKNAME is required when INGEST_ADDR is set")?,
            }),
            None => None,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: match var("PORT") {
                Some(port) => port.parse::<u16>().context("PORT must be a number")?,
                None => 5000,
            },
            backend,
            database_url,
            pool,
            ingest,
        })
    }
}

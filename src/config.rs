//! Server configuration parsed from environment variables.
//!
//! Numeric knobs fall back to their defaults when absent or malformed.
//! Enum-valued settings (strategy, toss policy) are rejected when malformed
//! so a typo never silently changes ceremony rules.

use std::str::FromStr;

use ceremony::toss::DEFAULT_STREAK_WINDOW;
use ceremony::{ParseError, SequenceStrategy, TossPolicy};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://valorant-api.com/v1";
pub const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PERSIST_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_PERSIST_BATCH_SIZE: usize = 32;
pub const DEFAULT_PERSIST_FLUSH_MS: u64 = 50;
pub const DEFAULT_PERSIST_RETRIES: usize = 2;
pub const DEFAULT_PERSIST_RETRY_BASE_MS: u64 = 20;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: {source}")]
    Invalid {
        var: &'static str,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Tuning for the finished-ceremony persistence worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistConfig {
    pub queue_capacity: usize,
    pub batch_size: usize,
    pub flush_ms: u64,
    pub retries: usize,
    pub retry_base_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Persistence is disabled when unset.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub catalog: CatalogConfig,
    pub strategy: SequenceStrategy,
    pub toss_policy: TossPolicy,
    pub persist: PersistConfig,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// - `PORT` (3000), `DATABASE_URL`, `DB_MAX_CONNECTIONS` (5)
    /// - `CATALOG_BASE_URL`, `CATALOG_TIMEOUT_SECS` (10)
    /// - `SEQUENCE_STRATEGY`: `scaling` (default) or `fixed`
    /// - `TOSS_POLICY`: `uniform` (default) or `streak_biased`, with
    ///   `TOSS_STREAK_WINDOW` (4)
    /// - `CEREMONY_PERSIST_QUEUE_CAPACITY`, `CEREMONY_PERSIST_BATCH_SIZE`,
    ///   `CEREMONY_PERSIST_FLUSH_MS`, `CEREMONY_PERSIST_RETRIES`,
    ///   `CEREMONY_PERSIST_RETRY_BASE_MS`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown strategy or policy.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] over an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown strategy or policy.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let strategy = match var("SEQUENCE_STRATEGY") {
            Some(raw) => raw
                .parse::<SequenceStrategy>()
                .map_err(|source| ConfigError::Invalid { var: "SEQUENCE_STRATEGY", source })?,
            None => SequenceStrategy::default(),
        };
        let window = parse_or(var("TOSS_STREAK_WINDOW"), DEFAULT_STREAK_WINDOW);
        let toss_policy = match var("TOSS_POLICY") {
            Some(raw) => {
                TossPolicy::parse(&raw, window).map_err(|source| ConfigError::Invalid { var: "TOSS_POLICY", source })?
            }
            None => TossPolicy::default(),
        };

        Ok(Self {
            port: parse_or(var("PORT"), DEFAULT_PORT),
            database_url: var("DATABASE_URL"),
            db_max_connections: parse_or(var("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS),
            catalog: CatalogConfig {
                base_url: var("CATALOG_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_CATALOG_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                timeout_secs: parse_or(var("CATALOG_TIMEOUT_SECS"), DEFAULT_CATALOG_TIMEOUT_SECS),
            },
            strategy,
            toss_policy,
            persist: PersistConfig {
                queue_capacity: parse_or(var("CEREMONY_PERSIST_QUEUE_CAPACITY"), DEFAULT_PERSIST_QUEUE_CAPACITY).max(1),
                batch_size: parse_or(var("CEREMONY_PERSIST_BATCH_SIZE"), DEFAULT_PERSIST_BATCH_SIZE).max(1),
                flush_ms: parse_or(var("CEREMONY_PERSIST_FLUSH_MS"), DEFAULT_PERSIST_FLUSH_MS).max(1),
                retries: parse_or(var("CEREMONY_PERSIST_RETRIES"), DEFAULT_PERSIST_RETRIES).max(1),
                retry_base_ms: parse_or(var("CEREMONY_PERSIST_RETRY_BASE_MS"), DEFAULT_PERSIST_RETRY_BASE_MS),
            },
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            catalog: CatalogConfig {
                base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
                timeout_secs: DEFAULT_CATALOG_TIMEOUT_SECS,
            },
            strategy: SequenceStrategy::default(),
            toss_policy: TossPolicy::default(),
            persist: PersistConfig {
                queue_capacity: DEFAULT_PERSIST_QUEUE_CAPACITY,
                batch_size: DEFAULT_PERSIST_BATCH_SIZE,
                flush_ms: DEFAULT_PERSIST_FLUSH_MS,
                retries: DEFAULT_PERSIST_RETRIES,
                retry_base_ms: DEFAULT_PERSIST_RETRY_BASE_MS,
            },
        }
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

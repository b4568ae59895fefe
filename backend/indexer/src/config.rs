//! Indexer configuration, read from environment variables (and `.env`).

use std::str::FromStr;

use crate::errors::{IndexerError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Soroban RPC endpoint (e.g. https://soroban-testnet.stellar.org)
    pub rpc_url: String,
    /// Deployed HelpCrypt contract address (Strkey format)
    pub contract_id: String,
    /// SQLite database URL or file path
    pub database_url: String,
    /// Port the REST API binds to
    pub api_port: u16,
    /// Seconds between two `getEvents` polls
    pub poll_interval_secs: u64,
    /// Page size for `getEvents`
    pub events_per_page: u32,
    /// Ledger to start from when no cursor has been saved
    pub start_ledger: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            rpc_url: std::env::var("RPC_URL")
                .unwrap_or_else(|_| "https://soroban-testnet.stellar.org".to_string()),
            contract_id: std::env::var("CONTRACT_ID").map_err(|_| {
                IndexerError::Config("CONTRACT_ID environment variable is required".to_string())
            })?,
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./helpcrypt_events.db".to_string()),
            api_port: parse_or("API_PORT", 3001)?,
            poll_interval_secs: parse_or("POLL_INTERVAL_SECS", 5)?,
            events_per_page: parse_or("EVENTS_PER_PAGE", 100)?,
            start_ledger: parse_or("START_LEDGER", 0)?,
        })
    }
}

/// Parse `key` as `T`, falling back to `default` when the variable is unset.
fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| IndexerError::Config(format!("Invalid {key}: {raw:?}"))),
        Err(_) => Ok(default),
    }
}

//! Configuration types for the txindexer system

mod analysis;

pub use analysis::AnalysisConfig;

use {
    serde::{Deserialize, Serialize},
    std::{fmt::Display, fs, path::Path, str::FromStr, time::Duration},
};

use crate::{
    errors::{Error, Result},
    types::SYSTEM_PROGRAM_ID,
    utils::string_to_pubkey,
};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8899";
pub const DEFAULT_INDEX_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_MAX_TRANSACTION_HISTORY: usize = 1_000;
pub const DEFAULT_SIGNATURE_PAGE_LIMIT: usize = 100;
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 10_000;

/// Settings for the indexing loop and its chain node connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// JSON-RPC endpoint of the chain node
    pub rpc_url: String,
    /// Address whose signatures are polled every cycle
    pub index_address: String,
    /// Sleep between two cycles
    pub index_interval_ms: u64,
    /// Retention cap enforced at the end of every cycle
    pub max_transaction_history: usize,
    /// Signatures requested per cycle
    pub signature_page_limit: usize,
    /// Per-request timeout for node calls
    pub rpc_timeout_ms: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            index_address: SYSTEM_PROGRAM_ID.to_string(),
            index_interval_ms: DEFAULT_INDEX_INTERVAL_MS,
            max_transaction_history: DEFAULT_MAX_TRANSACTION_HISTORY,
            signature_page_limit: DEFAULT_SIGNATURE_PAGE_LIMIT,
            rpc_timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
        }
    }
}

impl IndexerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str::<Self>(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `SOLANA_RPC_URL`, `INDEX_ADDRESS`, `INDEX_INTERVAL_MS`,
    /// `MAX_TRANSACTION_HISTORY`, `SIGNATURE_PAGE_LIMIT` and `RPC_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`IndexerConfig::from_env`] with a caller-supplied variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            rpc_url: lookup("SOLANA_RPC_URL").unwrap_or(defaults.rpc_url),
            index_address: lookup("INDEX_ADDRESS").unwrap_or(defaults.index_address),
            index_interval_ms: parse_var(&lookup, "INDEX_INTERVAL_MS", defaults.index_interval_ms)?,
            max_transaction_history: parse_var(
                &lookup,
                "MAX_TRANSACTION_HISTORY",
                defaults.max_transaction_history,
            )?,
            signature_page_limit: parse_var(
                &lookup,
                "SIGNATURE_PAGE_LIMIT",
                defaults.signature_page_limit,
            )?,
            rpc_timeout_ms: parse_var(&lookup, "RPC_TIMEOUT_MS", defaults.rpc_timeout_ms)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.trim().is_empty() {
            return Err(Error::Config("rpc_url must not be empty".to_string()));
        }
        if self.max_transaction_history == 0 {
            return Err(Error::Config("max_transaction_history must be positive".to_string()));
        }
        if self.signature_page_limit == 0 {
            return Err(Error::Config("signature_page_limit must be positive".to_string()));
        }
        string_to_pubkey(&self.index_address).map_err(|e| {
            Error::Config(format!("invalid index address {}: {}", self.index_address, e))
        })?;
        Ok(())
    }

    pub fn index_interval(&self) -> Duration {
        Duration::from_millis(self.index_interval_ms)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }
}

pub(crate) fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| Error::Config(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}

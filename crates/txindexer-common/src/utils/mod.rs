//! Utility functions and helpers

mod time;

pub use time::{current_timestamp_millis, format_timestamp_millis};

use {solana_sdk::pubkey::Pubkey, std::str::FromStr};

pub fn string_to_pubkey(s: &str) -> crate::Result<Pubkey> {
    Pubkey::from_str(s).map_err(|e| crate::Error::Other(e.to_string()))
}

//! Common data types used throughout the txindexer system

pub mod rpc;
pub mod transaction;

pub use rpc::{
    ParsedAccountKey, ParsedInstruction, ParsedMessage, ParsedTransaction, ParsedTransactionBody,
    ParsedTransactionMeta, SignatureInfo,
};
pub use transaction::{
    IndexedTransaction, TransactionStatus, TransactionType, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};

use serde::{Deserialize, Serialize};

/// Point-in-time view of an indexer, as reported to health checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerStatus {
    pub running: bool,
    pub last_processed_slot: u64,
    pub retained: usize,
    pub cycles: u64,
}

impl IndexerStatus {
    pub fn state(&self) -> &'static str {
        if self.running {
            "running"
        } else {
            "stopped"
        }
    }
}

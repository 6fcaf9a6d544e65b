use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SPL Token program.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Native system program.
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// Normalized record kept in the retention window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedTransaction {
    /// The transaction signature
    pub signature: String,

    /// The slot this transaction landed in
    pub slot: u64,

    /// Block production time reported by the node, 0 when unknown
    pub block_time: i64,

    /// Fee paid in lamports
    pub fee: u64,

    pub status: TransactionStatus,

    /// Program ids in instruction order
    pub program_ids: Vec<String>,

    /// Account keys in message order
    pub accounts: Vec<String>,

    #[serde(rename = "type")]
    pub tx_type: TransactionType,

    /// Local wall clock (ms) when this process observed the transaction
    pub indexed_at: i64,
}

impl IndexedTransaction {
    pub fn involves(&self, account: &str) -> bool {
        self.accounts.iter().any(|a| a == account)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    TokenTransfer,
    SolTransfer,
    Unknown,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::TokenTransfer => "TOKEN_TRANSFER",
            TransactionType::SolTransfer => "SOL_TRANSFER",
            TransactionType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TOKEN_TRANSFER" => Ok(TransactionType::TokenTransfer),
            "SOL_TRANSFER" => Ok(TransactionType::SolTransfer),
            "UNKNOWN" => Ok(TransactionType::Unknown),
            _ => Err(crate::Error::Other(format!("Unknown transaction type: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::system_program;

    #[test]
    fn test_system_program_id_matches_sdk() {
        assert_eq!(SYSTEM_PROGRAM_ID, system_program::id().to_string());
    }

    #[test]
    fn test_type_tags_round_trip_through_str() {
        for ty in [
            TransactionType::TokenTransfer,
            TransactionType::SolTransfer,
            TransactionType::Unknown,
        ] {
            assert_eq!(ty.as_str().parse::<TransactionType>().unwrap(), ty);
            assert_eq!(serde_json::to_value(ty).unwrap(), serde_json::json!(ty.as_str()));
        }
        assert_eq!("sol_transfer".parse::<TransactionType>().unwrap(), TransactionType::SolTransfer);
        assert!("SWAP".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let tx = IndexedTransaction {
            signature: "sig".to_string(),
            slot: 7,
            block_time: 1_700_000_000,
            fee: 5000,
            status: TransactionStatus::Failed,
            program_ids: vec![SYSTEM_PROGRAM_ID.to_string()],
            accounts: vec!["a".to_string()],
            tx_type: TransactionType::SolTransfer,
            indexed_at: 1,
        };

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["blockTime"], 1_700_000_000);
        assert_eq!(json["programIds"][0], SYSTEM_PROGRAM_ID);
        assert_eq!(json["type"], "SOL_TRANSFER");
        assert_eq!(json["status"], "failed");
        assert!(tx.involves("a"));
        assert!(!tx.involves("b"));
    }
}

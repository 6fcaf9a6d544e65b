//! Shapes returned by the node's JSON-RPC API (`jsonParsed` encoding).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of `getSignaturesForAddress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub confirmation_status: Option<String>,
}

impl SignatureInfo {
    pub fn new(signature: impl Into<String>, slot: u64) -> Self {
        Self {
            signature: signature.into(),
            slot,
            err: None,
            block_time: None,
            confirmation_status: None,
        }
    }
}

/// Result of `getTransaction` with `jsonParsed` encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTransaction {
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    pub transaction: ParsedTransactionBody,
    #[serde(default)]
    pub meta: Option<ParsedTransactionMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransactionBody {
    #[serde(default)]
    pub signatures: Vec<String>,
    pub message: ParsedMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMessage {
    pub account_keys: Vec<ParsedAccountKey>,
    pub instructions: Vec<ParsedInstruction>,
    #[serde(default)]
    pub recent_blockhash: String,
}

/// Account keys come back as objects under `jsonParsed` and as bare strings
/// under `json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParsedAccountKey {
    Keyed {
        pubkey: String,
        #[serde(default)]
        signer: bool,
        #[serde(default)]
        writable: bool,
    },
    Plain(String),
}

impl ParsedAccountKey {
    pub fn pubkey(&self) -> &str {
        match self {
            ParsedAccountKey::Keyed { pubkey, .. } => pubkey,
            ParsedAccountKey::Plain(pubkey) => pubkey,
        }
    }

    pub fn is_signer(&self) -> bool {
        matches!(self, ParsedAccountKey::Keyed { signer: true, .. })
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, ParsedAccountKey::Keyed { writable: true, .. })
    }
}

/// Either a fully parsed instruction (`program` + `parsed`) or a partially
/// decoded one (`accounts` + `data`). Both carry `programId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInstruction {
    #[serde(default)]
    pub program_id: String,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub parsed: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTransactionMeta {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub log_messages: Option<Vec<String>>,
}

impl ParsedTransactionMeta {
    pub fn is_failure(&self) -> bool {
        matches!(&self.err, Some(err) if !err.is_null())
    }
}

//! Request contexts handed to the analysis backend as pretty-printed JSON.

use {
    serde::{Deserialize, Serialize},
    txindexer_common::{
        types::ParsedTransaction,
        utils::{current_timestamp_millis, format_timestamp_millis},
    },
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMetaContext {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionContext {
    pub program_id: String,
    pub keys: Vec<AccountMetaContext>,
    pub data: String,
}

/// What the backend sees when asked to assess a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionContext {
    pub instructions: Vec<InstructionContext>,
    pub signers: Vec<String>,
    /// RFC 3339
    pub timestamp: String,
}

impl TransactionContext {
    pub fn new(instructions: Vec<InstructionContext>, signers: Vec<String>) -> Self {
        Self {
            instructions,
            signers,
            timestamp: format_timestamp_millis(current_timestamp_millis()),
        }
    }

    /// Build a context from a transaction fetched from the node. Signer and
    /// writable flags come from the message's account keys.
    pub fn from_parsed(tx: &ParsedTransaction) -> Self {
        let keys = &tx.transaction.message.account_keys;
        let meta_for = |pubkey: &str| {
            let (is_signer, is_writable) = keys
                .iter()
                .find(|key| key.pubkey() == pubkey)
                .map(|key| (key.is_signer(), key.is_writable()))
                .unwrap_or((false, false));
            AccountMetaContext {
                pubkey: pubkey.to_string(),
                is_signer,
                is_writable,
            }
        };

        let instructions = tx
            .transaction
            .message
            .instructions
            .iter()
            .map(|ix| InstructionContext {
                program_id: ix.program_id.clone(),
                keys: ix.accounts.iter().map(|account| meta_for(account.as_str())).collect(),
                data: match (&ix.data, &ix.parsed) {
                    (Some(data), _) => data.clone(),
                    (None, Some(parsed)) => parsed.to_string(),
                    (None, None) => String::new(),
                },
            })
            .collect();

        let signers = keys
            .iter()
            .filter(|key| key.is_signer())
            .map(|key| key.pubkey().to_string())
            .collect();

        let millis = tx
            .block_time
            .filter(|block_time| *block_time >= 0)
            .and_then(|block_time| block_time.checked_mul(1000))
            .unwrap_or_else(current_timestamp_millis);
        let timestamp = format_timestamp_millis(millis);

        Self {
            instructions,
            signers,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Venue the quote was observed on
    pub source: String,
    pub price: f64,
}

/// What the backend sees when asked to compare prices for a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceContext {
    pub input: String,
    pub output: String,
    pub amount: f64,
    pub prices: Vec<PriceQuote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_conditions: Option<String>,
}

impl PriceContext {
    pub fn new(input: impl Into<String>, output: impl Into<String>, amount: f64) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            amount,
            prices: Vec::new(),
            market_conditions: None,
        }
    }

    pub fn with_quote(mut self, source: impl Into<String>, price: f64) -> Self {
        self.prices.push(PriceQuote {
            source: source.into(),
            price,
        });
        self
    }

    pub fn with_market_conditions(mut self, conditions: impl Into<String>) -> Self {
        self.market_conditions = Some(conditions.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisContext {
    Transaction(TransactionContext),
    Price(PriceContext),
}

impl From<TransactionContext> for AnalysisContext {
    fn from(context: TransactionContext) -> Self {
        AnalysisContext::Transaction(context)
    }
}

impl From<PriceContext> for AnalysisContext {
    fn from(context: PriceContext) -> Self {
        AnalysisContext::Price(context)
    }
}

//! Maps raw node transactions onto [`IndexedTransaction`] records.

use txindexer_common::{
    types::{
        IndexedTransaction, ParsedTransaction, TransactionStatus, TransactionType,
        SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
    },
    utils::current_timestamp_millis,
    Error, Result,
};

/// Priority-ordered program id → type rules. The first rule whose program id
/// appears anywhere in a transaction decides its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramTable {
    rules: Vec<(String, TransactionType)>,
}

impl Default for ProgramTable {
    fn default() -> Self {
        Self::new(vec![
            (TOKEN_PROGRAM_ID.to_string(), TransactionType::TokenTransfer),
            (SYSTEM_PROGRAM_ID.to_string(), TransactionType::SolTransfer),
        ])
    }
}

impl ProgramTable {
    pub fn new(rules: Vec<(String, TransactionType)>) -> Self {
        Self { rules }
    }

    /// Append a rule with the lowest priority so far.
    pub fn with_rule(mut self, program_id: impl Into<String>, tx_type: TransactionType) -> Self {
        self.rules.push((program_id.into(), tx_type));
        self
    }

    pub fn rules(&self) -> &[(String, TransactionType)] {
        &self.rules
    }

    pub fn classify(&self, program_ids: &[String]) -> TransactionType {
        self.rules
            .iter()
            .find(|(program_id, _)| program_ids.iter().any(|id| id == program_id))
            .map(|(_, tx_type)| *tx_type)
            .unwrap_or(TransactionType::Unknown)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionClassifier {
    table: ProgramTable,
}

impl TransactionClassifier {
    pub fn new(table: ProgramTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ProgramTable {
        &self.table
    }

    /// Normalize `tx`, stamping it with the current wall clock.
    pub fn classify(&self, tx: &ParsedTransaction, signature: &str) -> Result<IndexedTransaction> {
        self.classify_at(tx, signature, current_timestamp_millis())
    }

    pub fn classify_at(
        &self,
        tx: &ParsedTransaction,
        signature: &str,
        indexed_at: i64,
    ) -> Result<IndexedTransaction> {
        if signature.is_empty() {
            return Err(Error::Classification("empty signature".to_string()));
        }

        let message = &tx.transaction.message;

        let program_ids = message
            .instructions
            .iter()
            .enumerate()
            .map(|(index, ix)| {
                if ix.program_id.is_empty() {
                    Err(Error::Classification(format!(
                        "{}: instruction {} has no program id",
                        signature, index
                    )))
                } else {
                    Ok(ix.program_id.clone())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let accounts = message
            .account_keys
            .iter()
            .enumerate()
            .map(|(index, key)| {
                if key.pubkey().is_empty() {
                    Err(Error::Classification(format!(
                        "{}: account key {} is empty",
                        signature, index
                    )))
                } else {
                    Ok(key.pubkey().to_string())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let block_time = tx.block_time.unwrap_or(0);
        if block_time < 0 {
            return Err(Error::Classification(format!(
                "{}: negative block time {}",
                signature, block_time
            )));
        }

        let (fee, status) = match &tx.meta {
            Some(meta) if meta.is_failure() => (meta.fee, TransactionStatus::Failed),
            Some(meta) => (meta.fee, TransactionStatus::Success),
            None => (0, TransactionStatus::Success),
        };

        let tx_type = self.table.classify(&program_ids);

        Ok(IndexedTransaction {
            signature: signature.to_string(),
            slot: tx.slot,
            block_time,
            fee,
            status,
            program_ids,
            accounts,
            tx_type,
            indexed_at,
        })
    }
}

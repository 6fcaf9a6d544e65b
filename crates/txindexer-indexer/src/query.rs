//! Read-only accessors consumed by the API layer.

use {
    crate::indexer::BlockchainIndexer,
    async_trait::async_trait,
    txindexer_common::{
        types::{IndexedTransaction, IndexerStatus, TransactionType},
        Result,
    },
};

#[async_trait]
pub trait TransactionQuery: Send + Sync {
    /// Every retained transaction, most recently indexed first
    async fn get_all(&self) -> Result<Vec<IndexedTransaction>>;

    async fn get_by_account(&self, account: &str) -> Result<Vec<IndexedTransaction>>;

    async fn get_by_type(&self, tx_type: TransactionType) -> Result<Vec<IndexedTransaction>>;

    async fn get_transaction(&self, signature: &str) -> Result<Option<IndexedTransaction>>;

    async fn status(&self) -> Result<IndexerStatus>;
}

#[async_trait]
impl TransactionQuery for BlockchainIndexer {
    async fn get_all(&self) -> Result<Vec<IndexedTransaction>> {
        self.store().all().await
    }

    async fn get_by_account(&self, account: &str) -> Result<Vec<IndexedTransaction>> {
        self.store().by_account(account).await
    }

    async fn get_by_type(&self, tx_type: TransactionType) -> Result<Vec<IndexedTransaction>> {
        self.store().by_type(tx_type).await
    }

    async fn get_transaction(&self, signature: &str) -> Result<Option<IndexedTransaction>> {
        self.store().get(signature).await
    }

    async fn status(&self) -> Result<IndexerStatus> {
        Ok(IndexerStatus {
            running: self.is_running(),
            last_processed_slot: self.last_processed_slot(),
            retained: self.store().len().await?,
            cycles: self.cycles(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockChainClient;
    use std::sync::Arc;
    use txindexer_common::{
        types::{TransactionStatus, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID},
        IndexerConfig,
    };
    use txindexer_store::{RetentionStore, TransactionStore};

    fn record(signature: &str, accounts: &[&str], tx_type: TransactionType, indexed_at: i64) -> IndexedTransaction {
        let program = match tx_type {
            TransactionType::TokenTransfer => TOKEN_PROGRAM_ID,
            _ => SYSTEM_PROGRAM_ID,
        };
        IndexedTransaction {
            signature: signature.to_string(),
            slot: 1,
            block_time: 0,
            fee: 5000,
            status: TransactionStatus::Success,
            program_ids: vec![program.to_string()],
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            tx_type,
            indexed_at,
        }
    }

    async fn seeded() -> BlockchainIndexer {
        let store = RetentionStore::new();
        store.put(record("a", &["alice", "bob"], TransactionType::TokenTransfer, 1)).await.unwrap();
        store.put(record("b", &["bob"], TransactionType::SolTransfer, 2)).await.unwrap();
        store.put(record("c", &["carol"], TransactionType::TokenTransfer, 3)).await.unwrap();

        BlockchainIndexer::new(
            IndexerConfig::default(),
            Arc::new(MockChainClient::new()),
            Arc::new(store),
        )
    }

    #[tokio::test]
    async fn test_filters_match_full_dump() {
        let indexer = seeded().await;
        let all = indexer.get_all().await.unwrap();
        assert_eq!(all.len(), 3);

        let expected: Vec<_> = all.iter().filter(|tx| tx.involves("bob")).cloned().collect();
        assert_eq!(indexer.get_by_account("bob").await.unwrap(), expected);

        let expected: Vec<_> = all
            .iter()
            .filter(|tx| tx.tx_type == TransactionType::TokenTransfer)
            .cloned()
            .collect();
        assert_eq!(indexer.get_by_type(TransactionType::TokenTransfer).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_point_lookup_and_status() {
        let indexer = seeded().await;

        let tx = indexer.get_transaction("b").await.unwrap().unwrap();
        assert_eq!(tx.accounts, vec!["bob".to_string()]);
        assert!(indexer.get_transaction("zzz").await.unwrap().is_none());

        let status = indexer.status().await.unwrap();
        assert!(!status.running);
        assert_eq!(status.state(), "stopped");
        assert_eq!(status.retained, 3);
        assert_eq!(status.last_processed_slot, 0);
    }
}

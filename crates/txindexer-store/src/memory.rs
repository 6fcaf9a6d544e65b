use {
    crate::{traits::TransactionStore, window::RetentionWindow},
    async_trait::async_trait,
    std::sync::Arc,
    tokio::sync::RwLock,
    tracing::debug,
    txindexer_common::{
        types::{IndexedTransaction, TransactionType},
        Result,
    },
};

/// Process-local retention store. Cloning shares the same window.
#[derive(Debug, Clone, Default)]
pub struct RetentionStore {
    window: Arc<RwLock<RetentionWindow>>,
}

impl RetentionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            window: Arc::new(RwLock::new(RetentionWindow::with_capacity(capacity))),
        }
    }
}

#[async_trait]
impl TransactionStore for RetentionStore {
    async fn put(&self, transaction: IndexedTransaction) -> Result<()> {
        let mut window = self.window.write().await;
        if let Some(previous) = window.insert(transaction) {
            debug!("Re-indexed transaction {}", previous.signature);
        }
        Ok(())
    }

    async fn get(&self, signature: &str) -> Result<Option<IndexedTransaction>> {
        Ok(self.window.read().await.get(signature).cloned())
    }

    async fn all(&self) -> Result<Vec<IndexedTransaction>> {
        Ok(self.window.read().await.snapshot())
    }

    async fn by_account(&self, account: &str) -> Result<Vec<IndexedTransaction>> {
        Ok(self.window.read().await.by_account(account))
    }

    async fn by_type(&self, tx_type: TransactionType) -> Result<Vec<IndexedTransaction>> {
        Ok(self.window.read().await.by_type(tx_type))
    }

    async fn evict_to_capacity(&self, max: usize) -> Result<usize> {
        let evicted = self.window.write().await.evict_to_capacity(max);
        if evicted > 0 {
            debug!("Evicted {} transactions to stay within {}", evicted, max);
        }
        Ok(evicted)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.window.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txindexer_common::types::TransactionStatus;

    fn record(signature: &str, indexed_at: i64, tx_type: TransactionType) -> IndexedTransaction {
        IndexedTransaction {
            signature: signature.to_string(),
            slot: 1,
            block_time: 0,
            fee: 0,
            status: TransactionStatus::Success,
            program_ids: vec![],
            accounts: vec!["shared".to_string()],
            tx_type,
            indexed_at,
        }
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let store = RetentionStore::new();
        let tx = record("sig", 1, TransactionType::TokenTransfer);

        store.put(tx.clone()).await.unwrap();
        assert_eq!(store.get("sig").await.unwrap(), Some(tx));
        assert_eq!(store.len().await.unwrap(), 1);
        assert!(!store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_snapshot_unaffected_by_later_writes() {
        let store = RetentionStore::new();
        store.put(record("a", 1, TransactionType::SolTransfer)).await.unwrap();

        let snapshot = store.all().await.unwrap();
        store.put(record("b", 2, TransactionType::SolTransfer)).await.unwrap();
        store.evict_to_capacity(1).await.unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].signature, "a");
        assert_eq!(store.all().await.unwrap()[0].signature, "b");
    }

    #[tokio::test]
    async fn test_clones_share_window() {
        let store = RetentionStore::with_capacity(4);
        let reader = store.clone();

        store.put(record("a", 1, TransactionType::Unknown)).await.unwrap();
        store.put(record("b", 2, TransactionType::TokenTransfer)).await.unwrap();

        assert_eq!(reader.by_account("shared").await.unwrap().len(), 2);
        assert_eq!(reader.by_type(TransactionType::TokenTransfer).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_reads_during_writes() {
        let store = RetentionStore::new();
        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..200 {
                    store.put(record(&format!("sig-{}", i), i, TransactionType::Unknown)).await.unwrap();
                    store.evict_to_capacity(50).await.unwrap();
                }
            })
        };

        for _ in 0..50 {
            assert!(store.all().await.unwrap().len() <= 51);
            tokio::task::yield_now().await;
        }

        writer.await.unwrap();
        assert_eq!(store.len().await.unwrap(), 50);
    }
}

use {
    async_trait::async_trait,
    txindexer_common::{
        types::{IndexedTransaction, TransactionType},
        Result,
    },
};

/// Storage capabilities the indexing loop writes through and the query
/// surface reads from. Every read returns an owned snapshot.
#[async_trait]
pub trait TransactionStore: Send + Sync + 'static {
    /// Insert a record, replacing any record with the same signature
    async fn put(&self, transaction: IndexedTransaction) -> Result<()>;

    /// Get transaction by signature
    async fn get(&self, signature: &str) -> Result<Option<IndexedTransaction>>;

    /// Every retained record
    async fn all(&self) -> Result<Vec<IndexedTransaction>>;

    /// Records whose account list contains `account`
    async fn by_account(&self, account: &str) -> Result<Vec<IndexedTransaction>>;

    /// Records classified as `tx_type`
    async fn by_type(&self, tx_type: TransactionType) -> Result<Vec<IndexedTransaction>>;

    /// Drop all but the `max` most recently indexed records, returning how
    /// many were dropped
    async fn evict_to_capacity(&self, max: usize) -> Result<usize>;

    /// Number of retained records
    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

use {
    std::{cmp::Ordering, collections::HashMap},
    txindexer_common::types::{IndexedTransaction, TransactionType},
};

#[derive(Debug, Clone)]
struct Entry {
    /// Insertion counter, breaks `indexed_at` ties during eviction
    sequence: u64,
    transaction: IndexedTransaction,
}

impl Entry {
    /// Newest first.
    fn recency_cmp(&self, other: &Self) -> Ordering {
        other
            .transaction
            .indexed_at
            .cmp(&self.transaction.indexed_at)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Signature-keyed map of indexed transactions with recency-based eviction.
///
/// Not synchronized; [`crate::RetentionStore`] wraps it in a lock.
#[derive(Debug, Default)]
pub struct RetentionWindow {
    entries: HashMap<String, Entry>,
    next_sequence: u64,
}

impl RetentionWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            next_sequence: 0,
        }
    }

    /// Insert or overwrite by signature, returning the replaced record.
    pub fn insert(&mut self, transaction: IndexedTransaction) -> Option<IndexedTransaction> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.entries
            .insert(transaction.signature.clone(), Entry { sequence, transaction })
            .map(|previous| previous.transaction)
    }

    pub fn get(&self, signature: &str) -> Option<&IndexedTransaction> {
        self.entries.get(signature).map(|entry| &entry.transaction)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Materialized copy of every record, most recently indexed first.
    pub fn snapshot(&self) -> Vec<IndexedTransaction> {
        self.collect_where(|_| true)
    }

    pub fn by_account(&self, account: &str) -> Vec<IndexedTransaction> {
        self.collect_where(|tx| tx.involves(account))
    }

    pub fn by_type(&self, tx_type: TransactionType) -> Vec<IndexedTransaction> {
        self.collect_where(|tx| tx.tx_type == tx_type)
    }

    /// Keep the `max` records with the greatest `indexed_at` and drop the
    /// rest. Equal timestamps are settled by insertion order, later wins.
    pub fn evict_to_capacity(&mut self, max: usize) -> usize {
        let before = self.entries.len();
        if before <= max {
            return 0;
        }

        let mut ranked: Vec<Entry> = self.entries.drain().map(|(_, entry)| entry).collect();
        ranked.sort_unstable_by(Entry::recency_cmp);
        ranked.truncate(max);

        self.entries = ranked
            .into_iter()
            .map(|entry| (entry.transaction.signature.clone(), entry))
            .collect();

        before - self.entries.len()
    }

    fn collect_where<P>(&self, predicate: P) -> Vec<IndexedTransaction>
    where
        P: Fn(&IndexedTransaction) -> bool,
    {
        let mut matched: Vec<&Entry> = self
            .entries
            .values()
            .filter(|entry| predicate(&entry.transaction))
            .collect();
        matched.sort_unstable_by(|a, b| a.recency_cmp(b));
        matched.into_iter().map(|entry| entry.transaction.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use txindexer_common::types::TransactionStatus;

    fn record(signature: &str, indexed_at: i64, accounts: &[&str], tx_type: TransactionType) -> IndexedTransaction {
        IndexedTransaction {
            signature: signature.to_string(),
            slot: 100,
            block_time: 0,
            fee: 5000,
            status: TransactionStatus::Success,
            program_ids: Vec::new(),
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            tx_type,
            indexed_at,
        }
    }

    #[test]
    fn test_insert_then_get_returns_record() {
        let mut window = RetentionWindow::new();
        let tx = record("sig-1", 10, &["alice"], TransactionType::SolTransfer);

        assert!(window.insert(tx.clone()).is_none());
        assert_eq!(window.get("sig-1"), Some(&tx));
        assert_eq!(window.get("sig-2"), None);
    }

    #[test]
    fn test_reinsert_overwrites() {
        let mut window = RetentionWindow::new();
        window.insert(record("sig-1", 10, &["alice"], TransactionType::Unknown));
        let replaced = window.insert(record("sig-1", 20, &["bob"], TransactionType::SolTransfer));

        assert_eq!(replaced.map(|tx| tx.indexed_at), Some(10));
        assert_eq!(window.len(), 1);
        assert_eq!(window.get("sig-1").map(|tx| tx.indexed_at), Some(20));
    }

    #[test]
    fn test_filters_are_subsets_of_snapshot() {
        let mut window = RetentionWindow::new();
        window.insert(record("a", 1, &["alice", "bob"], TransactionType::TokenTransfer));
        window.insert(record("b", 2, &["bob"], TransactionType::SolTransfer));
        window.insert(record("c", 3, &["carol"], TransactionType::TokenTransfer));

        let all = window.snapshot();
        let for_bob: Vec<_> = all.iter().filter(|tx| tx.involves("bob")).cloned().collect();
        assert_eq!(window.by_account("bob"), for_bob);
        assert_eq!(for_bob.len(), 2);

        let tokens: Vec<_> = all
            .iter()
            .filter(|tx| tx.tx_type == TransactionType::TokenTransfer)
            .cloned()
            .collect();
        assert_eq!(window.by_type(TransactionType::TokenTransfer), tokens);
        assert!(window.by_type(TransactionType::Unknown).is_empty());
        assert!(window.by_account("dave").is_empty());
    }

    #[test]
    fn test_snapshot_is_newest_first() {
        let mut window = RetentionWindow::new();
        window.insert(record("old", 1, &[], TransactionType::Unknown));
        window.insert(record("new", 3, &[], TransactionType::Unknown));
        window.insert(record("mid", 2, &[], TransactionType::Unknown));

        let order: Vec<_> = window.snapshot().into_iter().map(|tx| tx.signature).collect();
        assert_eq!(order, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_evict_keeps_most_recent() {
        let mut window = RetentionWindow::new();
        for i in 0..10 {
            window.insert(record(&format!("sig-{}", i), i, &[], TransactionType::Unknown));
        }

        assert_eq!(window.evict_to_capacity(20), 0);
        assert_eq!(window.evict_to_capacity(4), 6);
        assert_eq!(window.len(), 4);
        for i in 6..10 {
            assert!(window.get(&format!("sig-{}", i)).is_some());
        }
        assert!(window.get("sig-5").is_none());
    }

    #[test]
    fn test_full_window_plus_one_keeps_newcomer() {
        let mut window = RetentionWindow::with_capacity(1001);
        for i in 0..1000 {
            window.insert(record(&format!("sig-{}", i), 1_000 + i, &[], TransactionType::Unknown));
        }
        window.insert(record("fresh", 5_000, &[], TransactionType::Unknown));

        window.evict_to_capacity(1000);
        assert_eq!(window.len(), 1000);
        assert!(window.get("fresh").is_some());
        assert!(window.get("sig-0").is_none());
    }

    #[test]
    fn test_ties_keep_exact_count() {
        let mut window = RetentionWindow::new();
        for i in 0..8 {
            window.insert(record(&format!("sig-{}", i), 42, &[], TransactionType::Unknown));
        }

        assert_eq!(window.evict_to_capacity(3), 5);
        assert_eq!(window.len(), 3);
    }

    proptest! {
        #[test]
        fn prop_eviction_bounds_and_recency(
            inserts in prop::collection::vec((0u8..64, 0i64..32), 0..200),
            max in 0usize..40,
        ) {
            let mut window = RetentionWindow::new();
            for (sig, indexed_at) in &inserts {
                window.insert(record(&format!("sig-{}", sig), *indexed_at, &[], TransactionType::Unknown));
            }

            let before = window.snapshot();
            let evicted = window.evict_to_capacity(max);
            let after = window.snapshot();

            prop_assert!(window.len() <= max);
            prop_assert_eq!(after.len(), before.len().min(max));
            prop_assert_eq!(evicted, before.len() - after.len());

            let kept: HashSet<&str> = after.iter().map(|tx| tx.signature.as_str()).collect();
            let min_kept = after.iter().map(|tx| tx.indexed_at).min();
            for dropped in before.iter().filter(|tx| !kept.contains(tx.signature.as_str())) {
                if let Some(min_kept) = min_kept {
                    prop_assert!(dropped.indexed_at <= min_kept);
                }
            }
        }
    }
}

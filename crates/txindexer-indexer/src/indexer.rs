use {
    crate::{classifier::TransactionClassifier, client::ChainClient},
    std::sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    tokio::sync::Mutex,
    tracing::{debug, error, info, warn},
    txindexer_common::{
        types::{IndexedTransaction, SignatureInfo},
        Error, IndexerConfig, Result,
    },
    txindexer_metrics::metrics::{
        CYCLE_ERRORS, INDEX_CYCLES, LAST_PROCESSED_SLOT, RETAINED_TRANSACTIONS,
        TRANSACTIONS_EVICTED, TRANSACTIONS_INDEXED, TRANSACTIONS_SKIPPED,
    },
    txindexer_store::TransactionStore,
};

/// Outcome of a single indexing cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Slot observed at the start of the cycle
    pub current_slot: u64,
    /// The slot had not advanced, nothing was fetched
    pub idle: bool,
    /// Listed signatures newer than the watermark
    pub candidates: usize,
    pub indexed: usize,
    /// Unknown to the node when fetched
    pub missing: usize,
    /// Fetch, classification or store failures
    pub failed: usize,
    pub evicted: usize,
}

/// Polls the chain node, classifies what is new and keeps the store within
/// its retention cap. Callers construct and own an instance; the query
/// methods live in [`crate::query`].
pub struct BlockchainIndexer {
    inner: Arc<IndexerInner>,
    /// Serializes `start` calls
    lifecycle: Mutex<()>,
}

struct IndexerInner {
    client: Arc<dyn ChainClient>,
    store: Arc<dyn TransactionStore>,
    classifier: TransactionClassifier,
    config: IndexerConfig,
    running: AtomicBool,
    /// Bumped on every start; a loop from an older start exits on its next check
    generation: AtomicU64,
    last_processed_slot: AtomicU64,
    cycles: AtomicU64,
}

impl BlockchainIndexer {
    pub fn new(
        config: IndexerConfig,
        client: Arc<dyn ChainClient>,
        store: Arc<dyn TransactionStore>,
    ) -> Self {
        Self::with_classifier(config, client, store, TransactionClassifier::default())
    }

    pub fn with_classifier(
        config: IndexerConfig,
        client: Arc<dyn ChainClient>,
        store: Arc<dyn TransactionStore>,
        classifier: TransactionClassifier,
    ) -> Self {
        Self {
            inner: Arc::new(IndexerInner {
                client,
                store,
                classifier,
                config,
                running: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                last_processed_slot: AtomicU64::new(0),
                cycles: AtomicU64::new(0),
            }),
            lifecycle: Mutex::new(()),
        }
    }

    /// Start the background loop. A no-op while already running; fails with
    /// [`Error::Initialization`] when the starting slot cannot be read.
    pub async fn start(&self) -> Result<()> {
        let _guard = self.lifecycle.lock().await;
        if self.inner.running.load(Ordering::SeqCst) {
            debug!("Indexer already running");
            return Ok(());
        }

        let slot = self.initialize().await?;
        info!("Starting indexer from slot {}", slot);

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.running.store(true, Ordering::SeqCst);
        tokio::spawn(run_loop(self.inner.clone(), generation));

        Ok(())
    }

    /// Ask the loop to exit. It notices at the top of its next iteration, so
    /// one more cycle may still complete.
    pub fn stop(&self) {
        if self.inner.running.swap(false, Ordering::SeqCst) {
            info!("Stopping indexer at slot {}", self.last_processed_slot());
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    pub fn last_processed_slot(&self) -> u64 {
        self.inner.last_processed_slot.load(Ordering::SeqCst)
    }

    pub fn cycles(&self) -> u64 {
        self.inner.cycles.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.inner.config
    }

    pub(crate) fn store(&self) -> &Arc<dyn TransactionStore> {
        &self.inner.store
    }

    /// Read the node's current slot and use it as the watermark.
    pub async fn initialize(&self) -> Result<u64> {
        let slot = self
            .inner
            .client
            .get_slot()
            .await
            .map_err(|e| Error::Initialization(format!("cannot read starting slot: {}", e)))?;
        self.inner.advance_watermark(slot);
        Ok(slot)
    }

    /// Run one cycle outside the background loop.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        self.inner.run_cycle().await
    }
}

impl Drop for BlockchainIndexer {
    fn drop(&mut self) {
        self.inner.running.store(false, Ordering::SeqCst);
    }
}

async fn run_loop(inner: Arc<IndexerInner>, generation: u64) {
    let interval = inner.config.index_interval();

    while inner.is_current(generation) {
        match inner.run_cycle().await {
            Ok(report) if !report.idle => {
                debug!(
                    "Cycle at slot {}: {} candidates, {} indexed, {} missing, {} failed, {} evicted",
                    report.current_slot,
                    report.candidates,
                    report.indexed,
                    report.missing,
                    report.failed,
                    report.evicted
                );
            }
            Ok(_) => {}
            Err(e) => {
                CYCLE_ERRORS.inc();
                if e.is_transient() {
                    warn!("Error processing transactions: {}", e);
                } else {
                    error!("Error processing transactions: {}", e);
                }
            }
        }

        tokio::time::sleep(interval).await;
    }

    info!("Indexing loop exited");
}

impl IndexerInner {
    fn is_current(&self, generation: u64) -> bool {
        self.running.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }

    fn watermark(&self) -> u64 {
        self.last_processed_slot.load(Ordering::SeqCst)
    }

    fn advance_watermark(&self, slot: u64) {
        let previous = self.last_processed_slot.fetch_max(slot, Ordering::SeqCst);
        LAST_PROCESSED_SLOT.set(previous.max(slot) as i64);
    }

    async fn run_cycle(&self) -> Result<CycleReport> {
        self.cycles.fetch_add(1, Ordering::SeqCst);
        INDEX_CYCLES.inc();

        let current_slot = self.client.get_slot().await?;
        let watermark = self.watermark();

        let mut report = CycleReport {
            current_slot,
            ..CycleReport::default()
        };

        if current_slot <= watermark {
            report.idle = true;
            return Ok(report);
        }

        // Newest page, filtered by slot; the watermark is never used as a cursor.
        let signatures = self
            .client
            .get_signatures(&self.config.index_address, self.config.signature_page_limit, None)
            .await?;

        for info in signatures.iter().filter(|info| info.slot > watermark) {
            report.candidates += 1;
            match self.index_signature(info).await {
                Ok(Some(tx)) => {
                    debug!("Indexed {} ({}) at slot {}", tx.signature, tx.tx_type, tx.slot);
                    report.indexed += 1;
                }
                Ok(None) => {
                    debug!("Transaction {} not available yet", info.signature);
                    report.missing += 1;
                }
                Err(e) => {
                    warn!("Error indexing transaction {}: {}", info.signature, e);
                    report.failed += 1;
                }
            }
        }

        self.advance_watermark(current_slot);

        report.evicted = self
            .store
            .evict_to_capacity(self.config.max_transaction_history)
            .await?;

        TRANSACTIONS_INDEXED.inc_by(report.indexed as u64);
        TRANSACTIONS_SKIPPED.inc_by((report.missing + report.failed) as u64);
        TRANSACTIONS_EVICTED.inc_by(report.evicted as u64);
        RETAINED_TRANSACTIONS.set(self.store.len().await? as i64);

        Ok(report)
    }

    async fn index_signature(&self, info: &SignatureInfo) -> Result<Option<IndexedTransaction>> {
        let Some(raw) = self.client.get_parsed_transaction(&info.signature).await? else {
            return Ok(None);
        };

        let tx = self.classifier.classify(&raw, &info.signature)?;
        self.store.put(tx.clone()).await?;
        Ok(Some(tx))
    }
}

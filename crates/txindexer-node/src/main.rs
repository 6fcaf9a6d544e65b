use {
    anyhow::{Context, Result},
    clap::Parser,
    std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration},
    tokio::time::interval,
    tracing::{info, warn},
    tracing_subscriber::EnvFilter,
    txindexer_analysis::LmStudioClient,
    txindexer_common::{AnalysisConfig, IndexerConfig},
    txindexer_indexer::{BlockchainIndexer, SolanaRpcClient, TransactionQuery},
    txindexer_metrics::exporter::start_metrics_server,
    txindexer_store::RetentionStore,
};

#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Solana transaction indexer",
    long_about = "Polls a Solana RPC node for recent signatures of an address and keeps a bounded, classified window of them in memory"
)]
struct Args {
    /// JSON config file; environment variables are used when absent
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(long)]
    rpc_url: Option<String>,

    #[clap(long)]
    index_address: Option<String>,

    #[clap(long)]
    interval_ms: Option<u64>,

    #[clap(long)]
    max_history: Option<usize>,

    #[clap(long)]
    page_limit: Option<usize>,

    /// Serve Prometheus metrics on this address, e.g. 127.0.0.1:9100
    #[clap(long)]
    metrics_addr: Option<SocketAddr>,

    /// Probe the analysis backend at startup
    #[clap(long)]
    analysis_check: bool,

    #[clap(long, default_value = "30")]
    status_interval_secs: u64,

    #[clap(long)]
    log_level: Option<String>,
}

impl Args {
    fn indexer_config(&self) -> Result<IndexerConfig> {
        let mut config = match &self.config {
            Some(path) => IndexerConfig::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => IndexerConfig::from_env().context("failed to load config from environment")?,
        };

        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        if let Some(address) = &self.index_address {
            config.index_address = address.clone();
        }
        if let Some(ms) = self.interval_ms {
            config.index_interval_ms = ms;
        }
        if let Some(max) = self.max_history {
            config.max_transaction_history = max;
        }
        if let Some(limit) = self.page_limit {
            config.signature_page_limit = limit;
        }

        config.validate()?;
        Ok(config)
    }
}

async fn check_analysis_backend() {
    let client = match AnalysisConfig::from_env()
        .map_err(anyhow::Error::from)
        .and_then(|config| LmStudioClient::new(config).map_err(anyhow::Error::from))
    {
        Ok(client) => client,
        Err(e) => {
            warn!("Analysis backend not configured: {}", e);
            return;
        }
    };

    if let Err(e) = client.check_connection().await {
        warn!("Analysis backend unreachable at {}: {}", client.config().base_url(), e);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = args.indexer_config()?;
    info!(
        "Indexing {} via {} every {}ms (keeping {} transactions)",
        config.index_address, config.rpc_url, config.index_interval_ms, config.max_transaction_history
    );

    let metrics_shutdown = match args.metrics_addr {
        Some(addr) => Some(start_metrics_server(addr).await?),
        None => None,
    };

    if args.analysis_check {
        check_analysis_backend().await;
    }

    let client = Arc::new(SolanaRpcClient::new(config.rpc_url.clone(), config.rpc_timeout())?);
    let store = Arc::new(RetentionStore::with_capacity(config.max_transaction_history));
    let indexer = BlockchainIndexer::new(config, client, store);

    indexer.start().await?;

    let mut status_ticker = interval(Duration::from_secs(args.status_interval_secs.max(1)));
    status_ticker.tick().await;

    loop {
        tokio::select! {
            _ = status_ticker.tick() => {
                match indexer.status().await {
                    Ok(status) => info!(
                        "Indexer {}: last slot {}, {} transactions retained, {} cycles",
                        status.state(), status.last_processed_slot, status.retained, status.cycles
                    ),
                    Err(e) => warn!("Failed to read indexer status: {}", e),
                }
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Shutting down");
                break;
            }
        }
    }

    indexer.stop();
    if let Some(tx) = metrics_shutdown {
        let _ = tx.send(());
    }

    Ok(())
}

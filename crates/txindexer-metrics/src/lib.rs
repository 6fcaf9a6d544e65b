//! Prometheus instrumentation for the indexer and a `/metrics` exporter.

pub mod metrics {
    use lazy_static::lazy_static;
    use prometheus::{register_int_counter, register_int_gauge, IntCounter, IntGauge};

    lazy_static! {
        pub static ref INDEX_CYCLES: IntCounter =
            register_int_counter!("txindexer_index_cycles", "Number of indexing cycles run")
                .expect("metric can be registered");

        pub static ref TRANSACTIONS_INDEXED: IntCounter =
            register_int_counter!("txindexer_transactions_indexed", "Number of transactions indexed")
                .expect("metric can be registered");

        pub static ref TRANSACTIONS_SKIPPED: IntCounter =
            register_int_counter!(
                "txindexer_transactions_skipped",
                "Number of transactions that could not be fetched or classified"
            )
            .expect("metric can be registered");

        pub static ref TRANSACTIONS_EVICTED: IntCounter =
            register_int_counter!("txindexer_transactions_evicted", "Number of transactions evicted")
                .expect("metric can be registered");

        pub static ref CYCLE_ERRORS: IntCounter =
            register_int_counter!("txindexer_cycle_errors", "Number of cycles aborted by node errors")
                .expect("metric can be registered");

        pub static ref LAST_PROCESSED_SLOT: IntGauge =
            register_int_gauge!("txindexer_last_processed_slot", "Indexer watermark")
                .expect("metric can be registered");

        pub static ref RETAINED_TRANSACTIONS: IntGauge =
            register_int_gauge!("txindexer_retained_transactions", "Records in the retention window")
                .expect("metric can be registered");
    }
}

pub mod exporter {
    use anyhow::Result;
    use prometheus::{Encoder, TextEncoder};
    use std::net::SocketAddr;
    use tokio::sync::oneshot;
    use warp::{http::StatusCode, Filter};

    /// Render every registered metric in the text exposition format.
    pub fn gather_text() -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Serve `/metrics` on `addr` until the returned sender fires or drops.
    pub async fn start_metrics_server(addr: SocketAddr) -> Result<oneshot::Sender<()>> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let metrics_route = warp::path!("metrics").map(|| match gather_text() {
            Ok(body) => warp::reply::with_status(body, StatusCode::OK),
            Err(e) => {
                tracing::error!("Failed to encode metrics: {}", e);
                warp::reply::with_status(String::new(), StatusCode::INTERNAL_SERVER_ERROR)
            }
        });

        let (bound, server) = warp::serve(metrics_route).try_bind_with_graceful_shutdown(addr, async {
            shutdown_rx.await.ok();
        })?;

        tracing::info!("Serving metrics on http://{}/metrics", bound);
        tokio::spawn(server);

        Ok(shutdown_tx)
    }
}

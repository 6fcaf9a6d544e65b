// crates/txindexer-indexer/src/client.rs

use {
    async_trait::async_trait,
    reqwest::Client,
    serde::{de::DeserializeOwned, Deserialize},
    serde_json::{json, Value},
    std::time::Duration,
    tracing::{debug, info},
    txindexer_common::{
        types::{ParsedTransaction, SignatureInfo},
        Error, Result,
    },
};

/// Commitment used for every read; the indexer only wants confirmed data.
const COMMITMENT: &str = "confirmed";

/// The node RPC surface the indexing loop depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Current slot at `confirmed` commitment
    async fn get_slot(&self) -> Result<u64>;

    /// Most recent signatures touching `address`, newest first. `before` is a
    /// signature cursor: only signatures older than it are returned.
    async fn get_signatures(
        &self,
        address: &str,
        limit: usize,
        before: Option<String>,
    ) -> Result<Vec<SignatureInfo>>;

    /// `Ok(None)` when the node does not know the transaction (yet)
    async fn get_parsed_transaction(&self, signature: &str) -> Result<Option<ParsedTransaction>>;
}

/// JSON-RPC envelope; exactly one of `result` / `error` is set.
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorDetail>,
}

/// Solana RPC error detail
#[derive(Debug, Deserialize)]
struct RpcErrorDetail {
    code: i64,
    message: String,
}

/// Solana RPC client over plain HTTP JSON-RPC
#[derive(Debug, Clone)]
pub struct SolanaRpcClient {
    /// HTTP client
    client: Client,
    /// RPC URL
    rpc_url: String,
}

impl SolanaRpcClient {
    /// Create a new client; `timeout` bounds every request.
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let rpc_url = rpc_url.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Rpc(format!("failed to build HTTP client: {}", e)))?;

        info!("Initializing Solana client for {}", rpc_url);

        Ok(Self { client, rpc_url })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>> {
        let response = self
            .client
            .post(&self.rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": method,
                "params": params,
            }))
            .send()
            .await
            .map_err(|e| Error::Rpc(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Rpc(format!("{} returned HTTP {}", method, status)));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| Error::Rpc(format!("{} response could not be decoded: {}", method, e)))?;

        if let Some(error) = body.error {
            return Err(Error::Rpc(format!(
                "{} failed with code {}: {}",
                method, error.code, error.message
            )));
        }

        Ok(body.result)
    }
}

#[async_trait]
impl ChainClient for SolanaRpcClient {
    async fn get_slot(&self) -> Result<u64> {
        self.call::<u64>("getSlot", json!([{ "commitment": COMMITMENT }]))
            .await?
            .ok_or_else(|| Error::Rpc("getSlot returned no result".to_string()))
    }

    async fn get_signatures(
        &self,
        address: &str,
        limit: usize,
        before: Option<String>,
    ) -> Result<Vec<SignatureInfo>> {
        let params = signatures_params(address, limit, before.as_deref());
        let signatures = self
            .call::<Vec<SignatureInfo>>("getSignaturesForAddress", params)
            .await?
            .unwrap_or_default();

        debug!("Fetched {} signatures for {}", signatures.len(), address);
        Ok(signatures)
    }

    async fn get_parsed_transaction(&self, signature: &str) -> Result<Option<ParsedTransaction>> {
        self.call::<ParsedTransaction>(
            "getTransaction",
            json!([
                signature,
                {
                    "encoding": "jsonParsed",
                    "commitment": COMMITMENT,
                    "maxSupportedTransactionVersion": 0
                }
            ]),
        )
        .await
    }
}

fn signatures_params(address: &str, limit: usize, before: Option<&str>) -> Value {
    let mut options = json!({
        "limit": limit,
        "commitment": COMMITMENT,
    });
    if let Some(before) = before {
        options["before"] = json!(before);
    }
    json!([address, options])
}

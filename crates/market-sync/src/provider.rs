use crate::scanner::BlockRange;
use alloy::network::Ethereum;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, Log};
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use market_core::{MarketError, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Boxed provider trait for HTTP connections
pub type BoxedProvider = Arc<dyn Provider<Ethereum> + Send + Sync>;

/// Read-only chain access used by the reconciliation job
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Current head block number
    async fn latest_block(&self) -> Result<u64>;

    /// Logs emitted by `address` with topic0 `signature` inside `range`
    async fn logs(&self, address: Address, signature: B256, range: BlockRange) -> Result<Vec<Log>>;
}

/// Read-only HTTP provider bound to one endpoint
pub struct ProviderManager {
    http: BoxedProvider,
}

impl ProviderManager {
    pub fn new(http_url: &str) -> Result<Self> {
        let parsed: reqwest::Url = http_url
            .parse()
            .map_err(|e| MarketError::Rpc(format!("Invalid HTTP URL: {}", e)))?;

        let http = ProviderBuilder::new().connect_http(parsed);

        Ok(Self {
            http: Arc::new(http),
        })
    }
}

#[async_trait]
impl ChainReader for ProviderManager {
    async fn latest_block(&self) -> Result<u64> {
        self.http
            .get_block_number()
            .await
            .map_err(|e| MarketError::Rpc(e.to_string()))
    }

    async fn logs(&self, address: Address, signature: B256, range: BlockRange) -> Result<Vec<Log>> {
        let filter = Filter::new()
            .address(address)
            .event_signature(signature)
            .from_block(range.from)
            .to_block(range.to);

        let logs = self
            .http
            .get_logs(&filter)
            .await
            .map_err(|e| MarketError::Rpc(format!("{:?}", e)))?;

        if !logs.is_empty() {
            debug!(
                address = ?address,
                from = range.from,
                to = range.to,
                count = logs.len(),
                "Fetched event logs"
            );
        }

        Ok(logs)
    }
}

/// Builds a client for a candidate endpoint and checks it is alive
#[async_trait]
pub trait EndpointProbe: Send + Sync {
    type Client: Send;

    /// Connect to `url` and return the client with the head block it reported
    async fn connect(&self, url: &str) -> Result<(Self::Client, u64)>;
}

/// Probes endpoints with `eth_blockNumber` over HTTP
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpProbe;

#[async_trait]
impl EndpointProbe for HttpProbe {
    type Client = ProviderManager;

    async fn connect(&self, url: &str) -> Result<(ProviderManager, u64)> {
        let provider = ProviderManager::new(url)?;
        let head = provider.latest_block().await?;
        Ok((provider, head))
    }
}

/// The endpoint chosen for a run
#[derive(Debug)]
pub struct SelectedEndpoint<C> {
    pub url: String,
    pub client: C,
    /// Head block reported by the liveness probe
    pub head: u64,
}

/// Probe candidates in priority order and return the first live one.
///
/// Empty slots are skipped without counting as a failure. Candidates after
/// the first live one are never contacted.
pub async fn select_endpoint<P: EndpointProbe>(
    probe: &P,
    candidates: &[Option<String>],
) -> Result<SelectedEndpoint<P::Client>> {
    let mut attempted = 0usize;

    for url in candidates.iter().flatten() {
        let url = url.trim();
        if url.is_empty() {
            continue;
        }
        attempted += 1;
        info!(endpoint = url, "Probing RPC endpoint");

        match probe.connect(url).await {
            Ok((client, head)) => {
                info!(endpoint = url, head = head, "Using RPC endpoint");
                return Ok(SelectedEndpoint {
                    url: url.to_string(),
                    client,
                    head,
                });
            }
            Err(e) => warn!(endpoint = url, error = %e, "RPC endpoint unavailable"),
        }
    }

    Err(MarketError::NoHealthyEndpoint { attempted })
}

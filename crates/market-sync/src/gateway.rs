use async_trait::async_trait;
use market_client::{MarketApi, MarketClient};
use market_core::wire::OrderSubmission;
use tracing::{debug, warn};

/// Destination for reconciled order events
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit one event. Returns whether the store accepted it; failures are
    /// logged, never raised.
    async fn submit(&self, submission: &OrderSubmission) -> bool;
}

/// Submits events to the marketplace API over HTTP
pub struct HttpOrderGateway<A = MarketClient> {
    api: A,
}

impl HttpOrderGateway<MarketClient> {
    pub fn new(backend_url: &str) -> Self {
        Self::with_api(MarketClient::new(backend_url))
    }
}

impl<A: MarketApi> HttpOrderGateway<A> {
    pub fn with_api(api: A) -> Self {
        Self { api }
    }
}

#[async_trait]
impl<A: MarketApi> OrderGateway for HttpOrderGateway<A> {
    async fn submit(&self, submission: &OrderSubmission) -> bool {
        let order_hash = submission.order_hash.as_deref().unwrap_or_default();

        match self.api.submit_order(submission).await {
            Ok(response) if response.success => {
                debug!(order_hash = order_hash, status = ?submission.status, "Order accepted");
                true
            }
            Ok(response) => {
                warn!(
                    order_hash = order_hash,
                    error = response.error.as_deref().unwrap_or("unknown"),
                    "Order rejected by backend"
                );
                false
            }
            Err(e) => {
                warn!(order_hash = order_hash, error = %e, "Order submission failed");
                false
            }
        }
    }
}

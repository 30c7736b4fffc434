use crate::{ClientError, Result};
use async_trait::async_trait;
use market_core::types::OrderRecord;
use market_core::wire::{
    BuyRequest, OrderResponse, OrderSubmission, OrdersResponse, StatusResponse,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Operations the marketplace backend exposes
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Create or update an order keyed by its hash
    async fn submit_order(&self, submission: &OrderSubmission) -> Result<OrderResponse>;

    /// Active listings, newest first. `page` is 1-based.
    async fn list_orders(&self, page: u32, limit: u32) -> Result<Vec<OrderRecord>>;

    /// Tell the backend a listing was bought
    async fn record_buy(&self, order_hash: &str, buyer: &str) -> Result<OrderRecord>;
}

/// HTTP client for the marketplace API
#[derive(Clone)]
pub struct MarketClient {
    client: Client,
    base_url: String,
}

impl MarketClient {
    /// `base_url` is the backend root; routes are resolved under `/api`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Liveness of the backend
    pub async fn status(&self) -> Result<StatusResponse> {
        let resp = self.client.get(self.url("status")).send().await?;
        read_json(resp).await
    }
}

#[async_trait]
impl MarketApi for MarketClient {
    async fn submit_order(&self, submission: &OrderSubmission) -> Result<OrderResponse> {
        debug!(order_hash = ?submission.order_hash, "Submitting order");
        let resp = self
            .client
            .post(self.url("order"))
            .json(submission)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn list_orders(&self, page: u32, limit: u32) -> Result<Vec<OrderRecord>> {
        let resp = self
            .client
            .get(self.url("orders"))
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await?;
        let body: OrdersResponse = read_json(resp).await?;
        if !body.success {
            return Err(ClientError::Unsuccessful(
                body.error.unwrap_or_else(|| "order listing failed".to_string()),
            ));
        }
        Ok(body.orders)
    }

    async fn record_buy(&self, order_hash: &str, buyer: &str) -> Result<OrderRecord> {
        let request = BuyRequest {
            order_hash: Some(order_hash.to_string()),
            buyer_address: Some(buyer.to_string()),
        };
        let resp = self
            .client
            .post(self.url("buy"))
            .json(&request)
            .send()
            .await?;
        let body: OrderResponse = read_json(resp).await?;
        match body {
            OrderResponse {
                success: true,
                order: Some(order),
                ..
            } => Ok(order),
            OrderResponse { error, .. } => Err(ClientError::Unsuccessful(
                error.unwrap_or_else(|| "buy was not recorded".to_string()),
            )),
        }
    }
}

/// Decode a JSON body, turning non-2xx statuses into `Rejected`
async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.json::<T>().await?)
}

use crate::config::ApiConfig;
use crate::{metrics, ApiError, Result};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use market_core::wire::{
    BuyRequest, ClassifiedSubmission, OrderResponse, OrderSubmission, OrdersResponse,
    StatusResponse,
};
use market_core::OrderStore;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared state of the API handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub config: Arc<ApiConfig>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(store: Arc<dyn OrderStore>, config: ApiConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        ok: true,
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// `POST /api/order`: create or update a listing, or record a chain event
pub async fn upsert_order(
    State(state): State<AppState>,
    body: std::result::Result<Json<OrderSubmission>, JsonRejection>,
) -> Result<Json<OrderResponse>> {
    let Json(submission) = body.map_err(|e| {
        metrics::order_rejected();
        ApiError::BadRequest(e.body_text())
    })?;

    let classified = submission.classify().map_err(|e| {
        metrics::order_rejected();
        ApiError::from(e)
    })?;

    let (kind, upsert) = match classified {
        ClassifiedSubmission::Listing(mut upsert) => {
            if upsert.nft_contract.is_none() {
                upsert.nft_contract = state.config.nft_contract.clone();
            }
            if upsert.marketplace_contract.is_none() {
                upsert.marketplace_contract = state.config.marketplace_contract.clone();
            }
            ("listing", upsert)
        }
        ClassifiedSubmission::ChainEvent(upsert) => ("chain_event", upsert),
    };

    let order = state.store.upsert(upsert).await?;
    metrics::order_upserted(kind);
    info!(order_hash = %order.order_hash, status = %order.status, kind = kind, "Order saved");

    Ok(Json(OrderResponse {
        success: true,
        order: Some(order),
        error: None,
    }))
}

/// `GET /api/orders`: active listings, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<OrdersResponse>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit = state.config.page_limit(query.limit);
    let page = query.page.unwrap_or(1).max(1);

    let orders = state.store.list_active(page, limit).await?;
    debug!(page = page, limit = limit, count = orders.len(), "Listed orders");

    Ok(Json(OrdersResponse {
        success: true,
        orders,
        error: None,
    }))
}

/// `POST /api/buy`: record a marketplace purchase
pub async fn record_buy(
    State(state): State<AppState>,
    body: std::result::Result<Json<BuyRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let (Some(order_hash), Some(buyer)) = (
        request.order_hash.filter(|h| !h.trim().is_empty()),
        request.buyer_address.filter(|b| !b.trim().is_empty()),
    ) else {
        return Err(ApiError::BadRequest("Missing parameters".to_string()));
    };

    let order_hash = order_hash.trim().to_lowercase();
    let order = state
        .store
        .mark_sold(&order_hash, buyer.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    metrics::buy_recorded();
    info!(order_hash = %order.order_hash, buyer = ?order.buyer, "Purchase recorded");

    Ok(Json(OrderResponse {
        success: true,
        order: Some(order),
        error: None,
    }))
}

pub async fn render_metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// `GET /health`: 503 while the order store is unreachable
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            warn!(error = %e, "Order store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable")
        }
    }
}

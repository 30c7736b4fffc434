use crate::config::ApiConfig;
use crate::routes::{self, AppState};
use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use market_core::OrderStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Marketplace REST API server
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(config: ApiConfig, store: Arc<dyn OrderStore>) -> Self {
        Self {
            state: AppState::new(store, config),
        }
    }

    /// Serve Prometheus metrics on `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.state = self.state.with_metrics(handle);
        self
    }

    /// Start the server
    pub async fn run(self) -> crate::Result<()> {
        let addr = self.state.config.address();
        let app = build_router(self.state);

        info!(address = %addr, "Starting marketplace API server");

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::ApiError::Server(e.to_string()))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::ApiError::Server(e.to_string()))?;

        info!("Marketplace API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("Shutdown signal received (Ctrl+C)");
}

/// Router with every API route, CORS and request tracing applied
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/api/status", get(routes::status))
        .route("/api/order", post(routes::upsert_order))
        .route("/api/orders", get(routes::list_orders))
        .route("/api/buy", post(routes::record_buy))
        .route("/metrics", get(routes::render_metrics))
        .route("/health", get(routes::health_check))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if !config.cors_enabled {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use async_trait::async_trait;
    use market_core::types::{OrderRecord, OrderStatus, OrderUpsert};
    use market_core::MarketError;
    use market_store::MemoryOrderStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_with(store: Arc<MemoryOrderStore>) -> Router {
        let config = ApiConfig {
            nft_contract: Some("0x1111".to_string()),
            marketplace_contract: Some("0x2222".to_string()),
            ..ApiConfig::default()
        };
        build_router(AppState::new(store, config))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn listing(hash: &str) -> Value {
        json!({
            "tokenId": 42,
            "price": "1.5",
            "sellerAddress": "0xAAAA",
            "orderHash": hash,
            "signedOrderPayload": { "parameters": { "consideration": [] }, "signature": "0x01" }
        })
    }

    #[tokio::test]
    async fn test_listing_is_stored_with_contracts() {
        let store = Arc::new(MemoryOrderStore::new());

        let (status, body) = send(app_with(store.clone()), "POST", "/api/order", Some(listing("0xAB"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["order"]["orderHash"], "0xab");
        assert_eq!(body["order"]["status"], "active");
        assert_eq!(body["order"]["nftContract"], "0x1111");
        assert_eq!(body["order"]["seller"], "0xaaaa");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected() {
        let store = Arc::new(MemoryOrderStore::new());

        let (status, body) = send(
            app_with(store.clone()),
            "POST",
            "/api/order",
            Some(json!({ "tokenId": 1, "price": "1" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "error": "Missing parameters" }));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_chain_event_keeps_listing_payload() {
        let store = Arc::new(MemoryOrderStore::new());
        send(app_with(store.clone()), "POST", "/api/order", Some(listing("0xab"))).await;

        let (status, body) = send(
            app_with(store.clone()),
            "POST",
            "/api/order",
            Some(json!({ "orderHash": "0xab", "status": "fulfilled", "buyerAddress": "0xBB", "onChainBlock": 900 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["status"], "fulfilled");
        assert_eq!(body["order"]["onChain"], true);
        assert_eq!(body["order"]["tokenId"], "42");
        assert!(body["order"]["signedOrderPayload"].is_object());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_orders_lists_active_newest_first() {
        let store = Arc::new(MemoryOrderStore::new());
        for hash in ["0x01", "0x02", "0x03"] {
            store
                .upsert(OrderUpsert::new(hash, OrderStatus::Active))
                .await
                .unwrap();
        }
        store
            .upsert(OrderUpsert::new("0x02", OrderStatus::Cancelled))
            .await
            .unwrap();

        let (status, body) = send(app_with(store), "GET", "/api/orders?page=1&limit=1", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let orders = body["orders"].as_array().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0]["orderHash"], "0x03");
    }

    #[tokio::test]
    async fn test_buy_marks_sold() {
        let store = Arc::new(MemoryOrderStore::new());
        send(app_with(store.clone()), "POST", "/api/order", Some(listing("0xab"))).await;

        let (status, body) = send(
            app_with(store.clone()),
            "POST",
            "/api/buy",
            Some(json!({ "orderHash": "0xab", "buyerAddress": "0xCC" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["status"], "sold");
        assert_eq!(body["order"]["onChain"], true);
        assert_eq!(body["order"]["buyer"], "0xcc");
    }

    #[tokio::test]
    async fn test_buy_errors() {
        let store = Arc::new(MemoryOrderStore::new());

        let (status, _) = send(
            app_with(store.clone()),
            "POST",
            "/api/buy",
            Some(json!({ "orderHash": "0xab" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            app_with(store),
            "POST",
            "/api/buy",
            Some(json!({ "orderHash": "0xab", "buyerAddress": "0xcc" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_status_and_health() {
        let store = Arc::new(MemoryOrderStore::new());

        let (status, body) = send(app_with(store.clone()), "GET", "/api/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert!(body["time"].as_str().unwrap().ends_with('Z'));

        let response = app_with(store)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_paging_gets_json_error() {
        let store = Arc::new(MemoryOrderStore::new());

        let (status, body) = send(app_with(store), "GET", "/api/orders?page=abc", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().is_some());
    }

    struct UnreachableStore;

    #[async_trait]
    impl OrderStore for UnreachableStore {
        async fn upsert(&self, _order: OrderUpsert) -> market_core::Result<OrderRecord> {
            Err(MarketError::Store("connection refused".to_string()))
        }

        async fn list_active(&self, _page: u32, _limit: u32) -> market_core::Result<Vec<OrderRecord>> {
            Err(MarketError::Store("connection refused".to_string()))
        }

        async fn mark_sold(&self, _order_hash: &str, _buyer: &str) -> market_core::Result<Option<OrderRecord>> {
            Err(MarketError::Store("connection refused".to_string()))
        }

        async fn get_by_hash(&self, _order_hash: &str) -> market_core::Result<Option<OrderRecord>> {
            Err(MarketError::Store("connection refused".to_string()))
        }

        async fn count(&self) -> market_core::Result<u64> {
            Err(MarketError::Store("connection refused".to_string()))
        }

        async fn health_check(&self) -> market_core::Result<()> {
            Err(MarketError::Store("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_health_reports_unreachable_store() {
        let app = build_router(AppState::new(Arc::new(UnreachableStore), ApiConfig::default()));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let app = build_router(AppState::new(Arc::new(UnreachableStore), ApiConfig::default()));
        let (status, body) = send(app, "GET", "/api/orders", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Server error");
    }
}

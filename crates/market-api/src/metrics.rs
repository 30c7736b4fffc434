use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and describe the API counters
pub fn init() -> crate::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| crate::ApiError::Server(e.to_string()))?;

    describe_counter!(
        "market_orders_upserted_total",
        "Orders created or updated, by kind"
    );
    describe_counter!(
        "market_orders_rejected_total",
        "Order submissions rejected as invalid"
    );
    describe_counter!("market_buys_total", "Purchases recorded");

    Ok(handle)
}

/// `kind` is `listing` or `chain_event`
pub fn order_upserted(kind: &'static str) {
    counter!("market_orders_upserted_total", "kind" => kind).increment(1);
}

pub fn order_rejected() {
    counter!("market_orders_rejected_total").increment(1);
}

pub fn buy_recorded() {
    counter!("market_buys_total").increment(1);
}

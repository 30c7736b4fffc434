use crate::error::Result;
use crate::types::{OrderRecord, OrderUpsert};
use async_trait::async_trait;

/// Persistence boundary for marketplace orders.
///
/// Implementations must treat `order_hash` as the only deduplication key and
/// apply [`OrderRecord::merge_from`] semantics when a hash is written twice.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Create the order or merge into the existing row with the same hash
    async fn upsert(&self, order: OrderUpsert) -> Result<OrderRecord>;

    /// Active orders, newest first. `page` is 1-based.
    async fn list_active(&self, page: u32, limit: u32) -> Result<Vec<OrderRecord>>;

    /// Record a marketplace purchase. Returns `None` for an unknown hash.
    async fn mark_sold(&self, order_hash: &str, buyer: &str) -> Result<Option<OrderRecord>>;

    async fn get_by_hash(&self, order_hash: &str) -> Result<Option<OrderRecord>>;

    async fn count(&self) -> Result<u64>;

    /// Check that the backing storage is reachable
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Row offset for a 1-based page
pub fn page_offset(page: u32, limit: u32) -> u64 {
    u64::from(page.max(1) - 1) * u64::from(limit)
}

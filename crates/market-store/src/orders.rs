use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use market_core::store::page_offset;
use market_core::types::{OrderRecord, OrderStatus, OrderUpsert};
use market_core::{OrderStore, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredOrder {
    /// Insertion sequence, breaks ties between equal `created_at`
    seq: u64,
    record: OrderRecord,
}

/// Thread-safe in-memory order store keyed by order hash
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: DashMap<String, StoredOrder>,
    next_seq: AtomicU64,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn upsert(&self, order: OrderUpsert) -> Result<OrderRecord> {
        let now = Utc::now();

        let record = match self.orders.entry(order.order_hash.clone()) {
            Entry::Occupied(mut entry) => {
                let stored = entry.get_mut();
                stored.record.merge_from(order, now);
                stored.record.clone()
            }
            Entry::Vacant(entry) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                let record = OrderRecord::create(order, now);
                entry.insert(StoredOrder {
                    seq,
                    record: record.clone(),
                });
                record
            }
        };

        debug!(order_hash = %record.order_hash, status = %record.status, "Order upserted");
        Ok(record)
    }

    async fn list_active(&self, page: u32, limit: u32) -> Result<Vec<OrderRecord>> {
        let mut active: Vec<StoredOrder> = self
            .orders
            .iter()
            .filter(|entry| entry.record.is_active())
            .map(|entry| entry.value().clone())
            .collect();

        active.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        let offset = usize::try_from(page_offset(page, limit)).unwrap_or(usize::MAX);
        Ok(active
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .map(|stored| stored.record)
            .collect())
    }

    async fn mark_sold(&self, order_hash: &str, buyer: &str) -> Result<Option<OrderRecord>> {
        let Some(mut stored) = self.orders.get_mut(order_hash) else {
            return Ok(None);
        };

        let record = &mut stored.record;
        record.status = OrderStatus::Sold;
        record.on_chain = true;
        record.buyer = Some(buyer.to_lowercase());
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn get_by_hash(&self, order_hash: &str) -> Result<Option<OrderRecord>> {
        Ok(self.orders.get(order_hash).map(|stored| stored.record.clone()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.orders.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing(hash: &str) -> OrderUpsert {
        OrderUpsert {
            token_id: Some("1".to_string()),
            price: Some("2.0".to_string()),
            seller: Some("0xaa".to_string()),
            signed_order_payload: Some(json!({ "parameters": {}, "signature": "0x01" })),
            ..OrderUpsert::new(hash, OrderStatus::Active)
        }
    }

    #[tokio::test]
    async fn test_same_hash_collapses_to_one_row() {
        let store = MemoryOrderStore::new();

        let first = store.upsert(listing("0x01")).await.unwrap();
        let second = store
            .upsert(OrderUpsert {
                on_chain: true,
                on_chain_block: Some(42),
                ..OrderUpsert::new("0x01", OrderStatus::Fulfilled)
            })
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.status, OrderStatus::Fulfilled);
        assert!(second.signed_order_payload.is_some());
        assert_eq!(second.price.as_deref(), Some("2.0"));
    }

    #[tokio::test]
    async fn test_list_active_newest_first_with_paging() {
        let store = MemoryOrderStore::new();
        for i in 0..5 {
            store.upsert(listing(&format!("0x0{}", i))).await.unwrap();
        }
        store
            .upsert(OrderUpsert::new("0x02", OrderStatus::Cancelled))
            .await
            .unwrap();

        let first_page = store.list_active(1, 2).await.unwrap();
        let hashes: Vec<&str> = first_page.iter().map(|o| o.order_hash.as_str()).collect();
        assert_eq!(hashes, vec!["0x04", "0x03"]);

        let second_page = store.list_active(2, 2).await.unwrap();
        let hashes: Vec<&str> = second_page.iter().map(|o| o.order_hash.as_str()).collect();
        assert_eq!(hashes, vec!["0x01", "0x00"]);

        assert!(store.list_active(3, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_sold() {
        let store = MemoryOrderStore::new();
        store.upsert(listing("0x01")).await.unwrap();

        let sold = store.mark_sold("0x01", "0xBB").await.unwrap().unwrap();
        assert_eq!(sold.status, OrderStatus::Sold);
        assert!(sold.on_chain);
        assert_eq!(sold.buyer.as_deref(), Some("0xbb"));
        assert!(store.list_active(1, 12).await.unwrap().is_empty());

        assert!(store.mark_sold("0xmissing", "0xbb").await.unwrap().is_none());
    }
}

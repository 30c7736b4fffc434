use crate::models::DbOrder;
use crate::pool::DatabasePool;
use crate::Result;
use async_trait::async_trait;
use chrono::Utc;
use market_core::store::page_offset;
use market_core::types::{OrderRecord, OrderUpsert};
use market_core::OrderStore;
use sqlx::PgPool;

pub struct OrderRepository;

impl OrderRepository {
    /// Insert an order or merge it into the row with the same hash.
    ///
    /// Nullable columns keep their value when the incoming one is null,
    /// `on_chain` never reverts, `status` takes the incoming value.
    pub async fn upsert(pool: &PgPool, order: &DbOrder) -> Result<DbOrder> {
        let row = sqlx::query_as::<_, DbOrder>(
            r#"
            INSERT INTO orders (id, order_hash, token_id, price, seller, buyer, status, on_chain,
                                on_chain_block, signed_order_payload, image, nft_contract,
                                marketplace_contract, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (order_hash) DO UPDATE SET
                token_id = COALESCE(EXCLUDED.token_id, orders.token_id),
                price = COALESCE(EXCLUDED.price, orders.price),
                seller = COALESCE(EXCLUDED.seller, orders.seller),
                buyer = COALESCE(EXCLUDED.buyer, orders.buyer),
                status = EXCLUDED.status,
                on_chain = orders.on_chain OR EXCLUDED.on_chain,
                on_chain_block = COALESCE(EXCLUDED.on_chain_block, orders.on_chain_block),
                signed_order_payload = COALESCE(EXCLUDED.signed_order_payload, orders.signed_order_payload),
                image = COALESCE(EXCLUDED.image, orders.image),
                nft_contract = COALESCE(EXCLUDED.nft_contract, orders.nft_contract),
                marketplace_contract = COALESCE(EXCLUDED.marketplace_contract, orders.marketplace_contract),
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_hash)
        .bind(&order.token_id)
        .bind(&order.price)
        .bind(&order.seller)
        .bind(&order.buyer)
        .bind(&order.status)
        .bind(order.on_chain)
        .bind(order.on_chain_block)
        .bind(&order.signed_order_payload)
        .bind(&order.image)
        .bind(&order.nft_contract)
        .bind(&order.marketplace_contract)
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_hash(pool: &PgPool, order_hash: &str) -> Result<Option<DbOrder>> {
        let result = sqlx::query_as::<_, DbOrder>("SELECT * FROM orders WHERE order_hash = $1")
            .bind(order_hash)
            .fetch_optional(pool)
            .await?;
        Ok(result)
    }

    /// Active orders, newest first
    pub async fn get_active(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<DbOrder>> {
        let results = sqlx::query_as::<_, DbOrder>(
            "SELECT * FROM orders WHERE status = 'active' ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(results)
    }

    /// Record a marketplace purchase
    pub async fn mark_sold(pool: &PgPool, order_hash: &str, buyer: &str) -> Result<Option<DbOrder>> {
        let result = sqlx::query_as::<_, DbOrder>(
            r#"
            UPDATE orders
            SET status = 'sold', on_chain = TRUE, buyer = $2, updated_at = NOW()
            WHERE order_hash = $1
            RETURNING *
            "#,
        )
        .bind(order_hash)
        .bind(buyer)
        .fetch_optional(pool)
        .await?;
        Ok(result)
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

/// PostgreSQL-backed order store
#[derive(Clone)]
pub struct PgOrderStore {
    pool: DatabasePool,
}

impl PgOrderStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn upsert(&self, order: OrderUpsert) -> market_core::Result<OrderRecord> {
        let fresh = OrderRecord::create(order, Utc::now());
        let row = OrderRepository::upsert(self.pool.inner(), &DbOrder::from(&fresh)).await?;
        Ok(row.into_record()?)
    }

    async fn list_active(&self, page: u32, limit: u32) -> market_core::Result<Vec<OrderRecord>> {
        let offset = i64::try_from(page_offset(page, limit)).unwrap_or(i64::MAX);
        let rows = OrderRepository::get_active(self.pool.inner(), i64::from(limit), offset).await?;
        let records = rows
            .into_iter()
            .map(DbOrder::into_record)
            .collect::<Result<Vec<_>>>()?;
        Ok(records)
    }

    async fn mark_sold(&self, order_hash: &str, buyer: &str) -> market_core::Result<Option<OrderRecord>> {
        let row = OrderRepository::mark_sold(self.pool.inner(), order_hash, &buyer.to_lowercase()).await?;
        Ok(row.map(DbOrder::into_record).transpose()?)
    }

    async fn get_by_hash(&self, order_hash: &str) -> market_core::Result<Option<OrderRecord>> {
        let row = OrderRepository::get_by_hash(self.pool.inner(), order_hash).await?;
        Ok(row.map(DbOrder::into_record).transpose()?)
    }

    async fn count(&self) -> market_core::Result<u64> {
        let count = OrderRepository::count(self.pool.inner()).await?;
        Ok(count.max(0) as u64)
    }

    async fn health_check(&self) -> market_core::Result<()> {
        Ok(self.pool.health_check().await?)
    }
}

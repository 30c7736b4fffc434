use crate::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use market_core::types::{OrderRecord, OrderStatus};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the orders table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbOrder {
    pub id: String,
    /// Unique; the upsert conflict key
    pub order_hash: String,
    pub token_id: Option<String>,
    /// Decimal text in the native currency
    pub price: Option<String>,
    pub seller: Option<String>,
    pub buyer: Option<String>,
    /// active, sold, fulfilled or cancelled
    pub status: String,
    pub on_chain: bool,
    pub on_chain_block: Option<i64>,
    pub signed_order_payload: Option<serde_json::Value>,
    pub image: Option<String>,
    pub nft_contract: Option<String>,
    pub marketplace_contract: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&OrderRecord> for DbOrder {
    fn from(record: &OrderRecord) -> Self {
        Self {
            id: record.id.clone(),
            order_hash: record.order_hash.clone(),
            token_id: record.token_id.clone(),
            price: record.price.clone(),
            seller: record.seller.clone(),
            buyer: record.buyer.clone(),
            status: record.status.as_str().to_string(),
            on_chain: record.on_chain,
            on_chain_block: record
                .on_chain_block
                .map(|block| i64::try_from(block).unwrap_or(i64::MAX)),
            signed_order_payload: record.signed_order_payload.clone(),
            image: record.image.clone(),
            nft_contract: record.nft_contract.clone(),
            marketplace_contract: record.marketplace_contract.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl DbOrder {
    pub fn into_record(self) -> Result<OrderRecord> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(DatabaseError::Serialization)?;
        let on_chain_block = self
            .on_chain_block
            .map(u64::try_from)
            .transpose()
            .map_err(|e| DatabaseError::Serialization(format!("on_chain_block: {}", e)))?;

        Ok(OrderRecord {
            id: self.id,
            order_hash: self.order_hash,
            token_id: self.token_id,
            price: self.price,
            seller: self.seller,
            buyer: self.buyer,
            status,
            on_chain: self.on_chain,
            on_chain_block,
            signed_order_payload: self.signed_order_payload,
            image: self.image,
            nft_contract: self.nft_contract,
            marketplace_contract: self.marketplace_contract,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::types::OrderUpsert;

    #[test]
    fn test_row_converts_back_to_record() {
        let record = OrderRecord::create(
            OrderUpsert {
                on_chain: true,
                on_chain_block: Some(123),
                ..OrderUpsert::new("0x01", OrderStatus::Fulfilled)
            },
            Utc::now(),
        );

        let row = DbOrder::from(&record);
        assert_eq!(row.status, "fulfilled");
        assert_eq!(row.on_chain_block, Some(123));
        assert_eq!(row.into_record().unwrap(), record);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let mut row = DbOrder::from(&OrderRecord::create(
            OrderUpsert::new("0x01", OrderStatus::Active),
            Utc::now(),
        ));
        row.status = "open".to_string();

        assert!(matches!(row.into_record(), Err(DatabaseError::Serialization(_))));
    }
}

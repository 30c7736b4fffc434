use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a marketplace order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Listed and fillable
    Active,
    /// Bought through the marketplace frontend
    Sold,
    /// Fulfillment observed on chain
    Fulfilled,
    /// Cancellation observed on chain
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Sold => "sold",
            Self::Fulfilled => "fulfilled",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "sold" => Ok(Self::Sold),
            "fulfilled" => Ok(Self::Fulfilled),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

/// Persisted order row, keyed by `order_hash`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Opaque id assigned on first insert
    pub id: String,
    /// Seaport order hash (lowercase hex), the upsert conflict key
    pub order_hash: String,
    pub token_id: Option<String>,
    /// Decimal amount in the native currency
    pub price: Option<String>,
    pub seller: Option<String>,
    pub buyer: Option<String>,
    pub status: OrderStatus,
    pub on_chain: bool,
    pub on_chain_block: Option<u64>,
    /// Signed Seaport order needed to fulfil the listing later
    pub signed_order_payload: Option<serde_json::Value>,
    pub image: Option<String>,
    pub nft_contract: Option<String>,
    pub marketplace_contract: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A create-or-update request against the order store
#[derive(Debug, Clone, PartialEq)]
pub struct OrderUpsert {
    pub order_hash: String,
    pub token_id: Option<String>,
    pub price: Option<String>,
    pub seller: Option<String>,
    pub buyer: Option<String>,
    pub status: OrderStatus,
    pub on_chain: bool,
    pub on_chain_block: Option<u64>,
    pub signed_order_payload: Option<serde_json::Value>,
    pub image: Option<String>,
    pub nft_contract: Option<String>,
    pub marketplace_contract: Option<String>,
}

impl OrderUpsert {
    /// Minimal upsert with every optional field empty
    pub fn new(order_hash: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            order_hash: order_hash.into(),
            token_id: None,
            price: None,
            seller: None,
            buyer: None,
            status,
            on_chain: false,
            on_chain_block: None,
            signed_order_payload: None,
            image: None,
            nft_contract: None,
            marketplace_contract: None,
        }
    }
}

impl OrderRecord {
    /// Create a fresh record for an order hash seen for the first time
    pub fn create(upsert: OrderUpsert, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            order_hash: upsert.order_hash,
            token_id: upsert.token_id,
            price: upsert.price,
            seller: upsert.seller,
            buyer: upsert.buyer,
            status: upsert.status,
            on_chain: upsert.on_chain,
            on_chain_block: upsert.on_chain_block,
            signed_order_payload: upsert.signed_order_payload,
            image: upsert.image,
            nft_contract: upsert.nft_contract,
            marketplace_contract: upsert.marketplace_contract,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a later write for the same order hash.
    ///
    /// Status always takes the later value, `on_chain` never reverts to false,
    /// and optional fields only change when the later write carries a value.
    pub fn merge_from(&mut self, upsert: OrderUpsert, now: DateTime<Utc>) {
        fn keep<T>(slot: &mut Option<T>, incoming: Option<T>) {
            if incoming.is_some() {
                *slot = incoming;
            }
        }

        keep(&mut self.token_id, upsert.token_id);
        keep(&mut self.price, upsert.price);
        keep(&mut self.seller, upsert.seller);
        keep(&mut self.buyer, upsert.buyer);
        keep(&mut self.on_chain_block, upsert.on_chain_block);
        keep(&mut self.signed_order_payload, upsert.signed_order_payload);
        keep(&mut self.image, upsert.image);
        keep(&mut self.nft_contract, upsert.nft_contract);
        keep(&mut self.marketplace_contract, upsert.marketplace_contract);
        self.status = upsert.status;
        self.on_chain = self.on_chain || upsert.on_chain;
        self.updated_at = now;
    }

    /// Whether the order can still be bought
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }
}

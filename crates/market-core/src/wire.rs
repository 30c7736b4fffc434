//! JSON bodies exchanged with the marketplace API.

use crate::error::{MarketError, Result};
use crate::payload::{display_price, SignedOrderPayload};
use crate::types::{CanonicalEvent, EventCategory, OrderRecord, OrderStatus, OrderUpsert};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `POST /api/order`.
///
/// Carries either a listing (with a signed order payload) or an on-chain
/// event stub (with a `status`); the API classifies it before use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    #[serde(default, deserialize_with = "number_or_string", skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(default, deserialize_with = "number_or_string", skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_hash: Option<String>,
    #[serde(default, alias = "seaportOrder", skip_serializing_if = "Option::is_none")]
    pub signed_order_payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nft_contract: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketplace_contract: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_chain_block: Option<u64>,
}

/// A submission after classification, ready for the store
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedSubmission {
    /// Marketplace listing carrying a signed order payload
    Listing(OrderUpsert),
    /// Fulfillment or cancellation observed on chain
    ChainEvent(OrderUpsert),
}

impl ClassifiedSubmission {
    pub fn into_upsert(self) -> OrderUpsert {
        match self {
            Self::Listing(upsert) | Self::ChainEvent(upsert) => upsert,
        }
    }
}

impl OrderSubmission {
    /// Submission reporting an on-chain event for the given contracts
    pub fn from_event(event: &CanonicalEvent, nft_contract: &str, marketplace_contract: &str) -> Self {
        Self {
            token_id: event.token_id.clone(),
            price: event.price.clone(),
            seller_address: Some(event.seller_address.clone()),
            buyer_address: event.buyer_address.clone(),
            order_hash: Some(event.order_hash.clone()),
            nft_contract: Some(nft_contract.to_string()),
            marketplace_contract: Some(marketplace_contract.to_string()),
            status: Some(event.category.status()),
            on_chain_block: Some(event.block_number),
            ..Default::default()
        }
    }

    /// Decide whether the body is a listing or a chain event.
    ///
    /// A body with a payload is a listing and needs token id, seller and
    /// order hash; its price may be derived from the payload. A body without
    /// one must carry a `fulfilled` or `cancelled` status and an order hash.
    pub fn classify(self) -> Result<ClassifiedSubmission> {
        let order_hash = present(self.order_hash).map(|h| h.to_lowercase());
        let seller = present(self.seller_address).map(|a| a.to_lowercase());
        let buyer = present(self.buyer_address).map(|a| a.to_lowercase());
        let token_id = present(self.token_id);
        let image = present(self.image);
        let nft_contract = present(self.nft_contract).map(|a| a.to_lowercase());
        let marketplace_contract = present(self.marketplace_contract).map(|a| a.to_lowercase());

        if let Some(payload) = self.signed_order_payload {
            SignedOrderPayload::classify(&payload)?;
            let price = display_price(present(self.price).as_deref(), Some(&payload));
            let (Some(order_hash), Some(token_id), Some(seller), Some(price)) =
                (order_hash, token_id, seller, price)
            else {
                return Err(missing());
            };

            return Ok(ClassifiedSubmission::Listing(OrderUpsert {
                token_id: Some(token_id),
                price: Some(price),
                seller: Some(seller),
                buyer,
                signed_order_payload: Some(payload),
                image,
                nft_contract,
                marketplace_contract,
                ..OrderUpsert::new(order_hash, OrderStatus::Active)
            }));
        }

        let category = match self.status {
            Some(OrderStatus::Fulfilled) => EventCategory::Fulfilled,
            Some(OrderStatus::Cancelled) => EventCategory::Cancelled,
            _ => return Err(missing()),
        };
        let order_hash = order_hash.ok_or_else(missing)?;

        Ok(ClassifiedSubmission::ChainEvent(OrderUpsert {
            token_id,
            price: present(self.price),
            seller,
            buyer,
            on_chain: category == EventCategory::Fulfilled,
            on_chain_block: self.on_chain_block,
            image,
            nft_contract,
            marketplace_contract,
            ..OrderUpsert::new(order_hash, category.status())
        }))
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn missing() -> MarketError {
    MarketError::InvalidPayload("Missing parameters".to_string())
}

/// Body of `POST /api/buy`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequest {
    #[serde(default)]
    pub order_hash: Option<String>,
    #[serde(default)]
    pub buyer_address: Option<String>,
}

/// Response carrying a single order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `GET /api/orders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdersResponse {
    pub success: bool,
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `GET /api/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub ok: bool,
    pub time: String,
}

/// Accept `1.5`, `"1.5"` or `null` and keep the decimal text
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected number or string, got {}",
            other
        ))),
    }
}

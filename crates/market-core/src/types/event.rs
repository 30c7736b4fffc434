use super::order::{OrderStatus, OrderUpsert};

/// Kind of on-chain order event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Fulfilled,
    Cancelled,
}

impl EventCategory {
    /// Order status the event implies
    pub fn status(&self) -> OrderStatus {
        match self {
            Self::Fulfilled => OrderStatus::Fulfilled,
            Self::Cancelled => OrderStatus::Cancelled,
        }
    }
}

/// Order event normalized across every known log encoding.
///
/// Fields that a given encoding does not carry are `None`; they are never
/// inferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalEvent {
    /// Lowercase 0x-prefixed hex
    pub order_hash: String,
    /// Lowercase 0x-prefixed address of the offerer
    pub seller_address: String,
    /// Lowercase 0x-prefixed address of the fulfiller
    pub buyer_address: Option<String>,
    /// Decimal token id
    pub token_id: Option<String>,
    /// Decimal price in the native currency
    pub price: Option<String>,
    pub block_number: u64,
    pub category: EventCategory,
}

impl CanonicalEvent {
    /// Build the store write this event implies
    pub fn to_upsert(&self) -> OrderUpsert {
        OrderUpsert {
            token_id: self.token_id.clone(),
            price: self.price.clone(),
            seller: Some(self.seller_address.clone()),
            buyer: self.buyer_address.clone(),
            on_chain: self.category == EventCategory::Fulfilled,
            on_chain_block: Some(self.block_number),
            ..OrderUpsert::new(self.order_hash.clone(), self.category.status())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_upsert_is_not_on_chain_fulfillment() {
        let event = CanonicalEvent {
            order_hash: "0x01".to_string(),
            seller_address: "0xaa".to_string(),
            buyer_address: None,
            token_id: None,
            price: None,
            block_number: 77,
            category: EventCategory::Cancelled,
        };

        let upsert = event.to_upsert();
        assert_eq!(upsert.status, OrderStatus::Cancelled);
        assert!(!upsert.on_chain);
        assert_eq!(upsert.on_chain_block, Some(77));
        assert!(upsert.signed_order_payload.is_none());
    }
}

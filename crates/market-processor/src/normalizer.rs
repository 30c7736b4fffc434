use crate::decode::RawOrderEvent;
use alloy::rpc::types::Log;
use market_core::types::{CanonicalEvent, EventCategory};
use market_core::units::format_ether;
use market_core::Result;

/// Lowercase 0x-prefixed hex of an address or hash
pub fn hex_lower(value: impl std::fmt::LowerHex) -> String {
    format!("{:#x}", value)
}

/// Map a decoded event onto the canonical order event.
///
/// Pure: fields absent from the event's encoding stay `None`.
pub fn normalize(event: &RawOrderEvent, block_number: u64) -> CanonicalEvent {
    match event {
        RawOrderEvent::FulfilledPrimary(e) => CanonicalEvent {
            order_hash: hex_lower(e.orderHash),
            seller_address: hex_lower(e.offerer),
            buyer_address: Some(hex_lower(e.fulfiller)),
            token_id: None,
            price: None,
            block_number,
            category: EventCategory::Fulfilled,
        },
        RawOrderEvent::FulfilledAlt(e) => CanonicalEvent {
            order_hash: hex_lower(e.orderHash),
            seller_address: hex_lower(e.offerer),
            buyer_address: Some(hex_lower(e.fulfiller)),
            token_id: e.tokenIds.first().map(|id| id.to_string()),
            price: Some(format_ether(e.amount)),
            block_number,
            category: EventCategory::Fulfilled,
        },
        RawOrderEvent::Cancelled(e) => CanonicalEvent {
            order_hash: hex_lower(e.orderHash),
            seller_address: hex_lower(e.offerer),
            buyer_address: None,
            token_id: None,
            price: None,
            block_number,
            category: EventCategory::Cancelled,
        },
    }
}

/// Classify and normalize a raw log in one step
pub fn normalize_log(log: &Log) -> Result<CanonicalEvent> {
    let event = RawOrderEvent::classify(log)?;
    Ok(normalize(&event, log.block_number.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes, B256, U256};
    use market_core::events::{alt, primary, OrderCancelled};

    fn alt_event(amount: U256, token_ids: Vec<U256>) -> RawOrderEvent {
        RawOrderEvent::FulfilledAlt(alt::OrderFulfilled {
            orderHash: B256::repeat_byte(0xab),
            offerer: Address::repeat_byte(0xaa),
            fulfiller: Address::repeat_byte(0xbb),
            recipient: Address::repeat_byte(0xbb),
            paymentToken: Address::ZERO,
            amount,
            tokenIds: token_ids,
        })
    }

    #[test]
    fn test_primary_never_yields_token_or_price() {
        let event = RawOrderEvent::FulfilledPrimary(primary::OrderFulfilled {
            orderHash: B256::repeat_byte(0xab),
            offerer: Address::repeat_byte(0xaa),
            fulfiller: Address::repeat_byte(0xbb),
            orderDetails: Bytes::from(vec![0u8; 64]),
        });

        let canonical = normalize(&event, 100);
        assert_eq!(canonical.token_id, None);
        assert_eq!(canonical.price, None);
        assert_eq!(canonical.category, EventCategory::Fulfilled);
        assert_eq!(canonical.block_number, 100);
        assert_eq!(
            canonical.buyer_address.as_deref(),
            Some("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb")
        );
    }

    #[test]
    fn test_alt_takes_first_token_id() {
        let canonical = normalize(&alt_event(U256::ZERO, vec![U256::from(7u8), U256::from(9u8)]), 1);
        assert_eq!(canonical.token_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_alt_empty_token_list_yields_none() {
        let canonical = normalize(&alt_event(U256::ZERO, vec![]), 1);
        assert_eq!(canonical.token_id, None);
    }

    #[test]
    fn test_alt_price_is_formatted_with_18_decimals() {
        let amount = U256::from(1_500_000_000_000_000_000u128);
        let canonical = normalize(&alt_event(amount, vec![U256::from(1u8)]), 1);
        assert_eq!(canonical.price.as_deref(), Some("1.5"));
    }

    #[test]
    fn test_cancelled_has_only_hash_and_seller() {
        let event = RawOrderEvent::Cancelled(OrderCancelled {
            orderHash: B256::repeat_byte(0xcd),
            offerer: Address::repeat_byte(0xAA),
        });

        let canonical = normalize(&event, 5);
        assert_eq!(canonical.category, EventCategory::Cancelled);
        assert_eq!(canonical.buyer_address, None);
        assert_eq!(canonical.token_id, None);
        assert_eq!(canonical.price, None);
        assert_eq!(canonical.order_hash, format!("0x{}", "cd".repeat(32)));
        assert_eq!(canonical.seller_address, format!("0x{}", "aa".repeat(20)));
    }

    #[test]
    fn test_normalize_log_uses_log_block_number() {
        use alloy_sol_types::SolEvent;

        let event = OrderCancelled {
            orderHash: B256::repeat_byte(0x01),
            offerer: Address::repeat_byte(0x02),
        };
        let log = Log {
            inner: alloy_primitives::Log {
                address: Address::repeat_byte(0x55),
                data: event.encode_log_data(),
            },
            block_number: Some(4242),
            ..Default::default()
        };

        let canonical = normalize_log(&log).unwrap();
        assert_eq!(canonical.block_number, 4242);
        assert_eq!(canonical.category, EventCategory::Cancelled);
    }
}

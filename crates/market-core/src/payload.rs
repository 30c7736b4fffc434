//! Signed Seaport order payloads stored alongside listings.
//!
//! The marketplace keeps the payload opaque, but the price shown for a
//! listing falls back to the first consideration item when no explicit price
//! was recorded. Payloads are classified into exactly one known shape before
//! any field is read.

use crate::error::{MarketError, Result};
use crate::units::{format_ether, parse_units};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One consideration item of a Seaport order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsiderationItem {
    #[serde(default)]
    pub item_type: Option<u8>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub start_amount: Option<String>,
    #[serde(default)]
    pub end_amount: Option<String>,
    /// Single amount used by some order builders instead of start/end
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
}

impl ConsiderationItem {
    /// Amount paid at the end of the order's lifetime, falling back to the
    /// start amount, then to a plain `amount`
    pub fn settled_amount(&self) -> Option<&str> {
        self.end_amount
            .as_deref()
            .or(self.start_amount.as_deref())
            .or(self.amount.as_deref())
    }
}

/// The subset of Seaport order parameters the marketplace reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderParameters {
    #[serde(default)]
    pub offerer: Option<String>,
    #[serde(default)]
    pub consideration: Vec<ConsiderationItem>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// A stored order payload, classified by shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedOrderPayload {
    /// `{ parameters, signature }` as produced by order creation
    Signed {
        parameters: OrderParameters,
        signature: String,
    },
    /// Order parameters nested under an `order` key
    Wrapped(OrderParameters),
    /// Bare order parameters without a signature
    Parameters(OrderParameters),
}

impl SignedOrderPayload {
    /// Classify a raw payload into one known shape
    pub fn classify(raw: &Value) -> Result<Self> {
        let object = raw
            .as_object()
            .ok_or_else(|| MarketError::InvalidPayload("payload is not an object".to_string()))?;

        if let Some(parameters) = object.get("parameters") {
            let parameters: OrderParameters = serde_json::from_value(parameters.clone())
                .map_err(|e| MarketError::InvalidPayload(e.to_string()))?;
            let signature = object
                .get("signature")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Ok(Self::Signed {
                parameters,
                signature,
            });
        }

        if let Some(order) = object.get("order").filter(|o| o.is_object()) {
            let parameters: OrderParameters = serde_json::from_value(order.clone())
                .map_err(|e| MarketError::InvalidPayload(e.to_string()))?;
            return Ok(Self::Wrapped(parameters));
        }

        if object.contains_key("consideration") {
            let parameters: OrderParameters = serde_json::from_value(raw.clone())
                .map_err(|e| MarketError::InvalidPayload(e.to_string()))?;
            return Ok(Self::Parameters(parameters));
        }

        Err(MarketError::InvalidPayload(
            "neither signed order nor order parameters".to_string(),
        ))
    }

    pub fn parameters(&self) -> &OrderParameters {
        match self {
            Self::Signed { parameters, .. } => parameters,
            Self::Wrapped(parameters) | Self::Parameters(parameters) => parameters,
        }
    }

    /// Display price taken from the first consideration item
    pub fn listing_price(&self) -> Option<String> {
        let amount = self.parameters().consideration.first()?.settled_amount()?;
        parse_units(amount, 0).ok().map(format_ether)
    }
}

/// Price to display for a listing: the recorded price, else the payload's
pub fn display_price(price: Option<&str>, payload: Option<&Value>) -> Option<String> {
    if let Some(price) = price {
        return Some(price.to_string());
    }
    let payload = SignedOrderPayload::classify(payload?).ok()?;
    payload.listing_price()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_signed_order() {
        let raw = json!({
            "parameters": {
                "offerer": "0xabc",
                "consideration": [
                    { "itemType": 0, "startAmount": "2500000000000000000", "endAmount": "2500000000000000000" }
                ],
                "endTime": "1700000000"
            },
            "signature": "0xdeadbeef"
        });

        let payload = SignedOrderPayload::classify(&raw).unwrap();
        assert!(matches!(payload, SignedOrderPayload::Signed { ref signature, .. } if signature == "0xdeadbeef"));
        assert_eq!(payload.listing_price().as_deref(), Some("2.5"));
    }

    #[test]
    fn test_classify_bare_parameters() {
        let raw = json!({
            "consideration": [ { "startAmount": "1000000000000000000" } ]
        });

        let payload = SignedOrderPayload::classify(&raw).unwrap();
        assert!(matches!(payload, SignedOrderPayload::Parameters(_)));
        assert_eq!(payload.listing_price().as_deref(), Some("1.0"));
    }

    #[test]
    fn test_classify_wrapped_order_with_plain_amount() {
        let raw = json!({
            "order": { "consideration": [ { "amount": "750000000000000000" } ] }
        });

        let payload = SignedOrderPayload::classify(&raw).unwrap();
        assert!(matches!(payload, SignedOrderPayload::Wrapped(_)));
        assert_eq!(payload.listing_price().as_deref(), Some("0.75"));
    }

    #[test]
    fn test_classify_rejects_unknown_shape() {
        assert!(SignedOrderPayload::classify(&json!({ "orderHash": "0x01" })).is_err());
        assert!(SignedOrderPayload::classify(&json!("0x01")).is_err());
    }

    #[test]
    fn test_empty_consideration_has_no_price() {
        let payload = SignedOrderPayload::classify(&json!({ "consideration": [] })).unwrap();
        assert_eq!(payload.listing_price(), None);
    }

    #[test]
    fn test_display_price_prefers_recorded_price() {
        let raw = json!({ "consideration": [ { "endAmount": "3000000000000000000" } ] });
        assert_eq!(display_price(Some("1.25"), Some(&raw)).as_deref(), Some("1.25"));
        assert_eq!(display_price(None, Some(&raw)).as_deref(), Some("3.0"));
        assert_eq!(display_price(None, None), None);
    }
}

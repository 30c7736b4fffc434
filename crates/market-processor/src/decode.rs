use alloy::rpc::types::Log;
use alloy_primitives::B256;
use alloy_sol_types::SolEvent;
use market_core::events::{alt, primary, OrderCancelled};
use market_core::{MarketError, Result};

/// Log encodings the marketplace contract is known to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVariant {
    /// `OrderFulfilled` with opaque order details
    FulfilledPrimary,
    /// `OrderFulfilled` with amount and token ids
    FulfilledAlt,
    /// `OrderCancelled`
    Cancelled,
}

impl SchemaVariant {
    /// All variants, in the order the reconciliation job scans them
    pub const ALL: [SchemaVariant; 3] = [
        SchemaVariant::FulfilledPrimary,
        SchemaVariant::FulfilledAlt,
        SchemaVariant::Cancelled,
    ];

    /// topic0 of logs encoded under this variant
    pub fn signature_hash(&self) -> B256 {
        match self {
            Self::FulfilledPrimary => primary::OrderFulfilled::SIGNATURE_HASH,
            Self::FulfilledAlt => alt::OrderFulfilled::SIGNATURE_HASH,
            Self::Cancelled => OrderCancelled::SIGNATURE_HASH,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FulfilledPrimary => "OrderFulfilled(primary)",
            Self::FulfilledAlt => "OrderFulfilled(alt)",
            Self::Cancelled => "OrderCancelled",
        }
    }

    /// Identify the variant of a log from its topic0
    pub fn from_topic(topic0: &B256) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.signature_hash() == *topic0)
    }
}

/// A log decoded under exactly one known variant
#[derive(Debug, Clone)]
pub enum RawOrderEvent {
    FulfilledPrimary(primary::OrderFulfilled),
    FulfilledAlt(alt::OrderFulfilled),
    Cancelled(OrderCancelled),
}

impl RawOrderEvent {
    /// Classify a log by its topic0 and decode it under that variant only
    pub fn classify(log: &Log) -> Result<Self> {
        let topic0 = log
            .topics()
            .first()
            .ok_or_else(|| MarketError::EventDecode("log has no topics".to_string()))?;

        let variant = SchemaVariant::from_topic(topic0)
            .ok_or_else(|| MarketError::UnknownEvent(format!("{:#x}", topic0)))?;

        let decoded = match variant {
            SchemaVariant::FulfilledPrimary => {
                Self::FulfilledPrimary(decode::<primary::OrderFulfilled>(log)?)
            }
            SchemaVariant::FulfilledAlt => Self::FulfilledAlt(decode::<alt::OrderFulfilled>(log)?),
            SchemaVariant::Cancelled => Self::Cancelled(decode::<OrderCancelled>(log)?),
        };
        Ok(decoded)
    }

    pub fn variant(&self) -> SchemaVariant {
        match self {
            Self::FulfilledPrimary(_) => SchemaVariant::FulfilledPrimary,
            Self::FulfilledAlt(_) => SchemaVariant::FulfilledAlt,
            Self::Cancelled(_) => SchemaVariant::Cancelled,
        }
    }
}

fn decode<E: SolEvent>(log: &Log) -> Result<E> {
    E::decode_log(&log.inner)
        .map(|decoded| decoded.data)
        .map_err(|e| MarketError::EventDecode(e.to_string()))
}

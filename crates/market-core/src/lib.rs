pub mod config;
pub mod error;
pub mod events;
pub mod payload;
pub mod store;
pub mod types;
pub mod units;
pub mod wire;

pub use config::{sanitize_url, SyncConfig, FALLBACK_RPC_URLS};
pub use error::{MarketError, Result};
pub use payload::SignedOrderPayload;
pub use store::OrderStore;

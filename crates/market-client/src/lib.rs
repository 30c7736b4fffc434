mod client;
mod config;
mod session;

pub use client::{MarketApi, MarketClient};
pub use config::FrontendConfig;
pub use session::{ListingRequest, MarketSession, SignedListing, WalletCapability, LISTING_DURATION_SECS};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Backend reported failure: {0}")]
    Unsuccessful(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Wrong network: connected to chain {actual}, expected {expected}")]
    WrongChain { expected: u64, actual: u64 },

    #[error("Token {token_id} is owned by {owner}, not {account}")]
    NotOwner {
        token_id: String,
        owner: String,
        account: String,
    },

    #[error("Order {0} has no signed payload")]
    MissingPayload(String),

    #[error(transparent)]
    Market(#[from] market_core::MarketError),
}

pub type Result<T> = std::result::Result<T, ClientError>;

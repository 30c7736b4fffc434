use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("No RPC endpoint responded ({attempted} attempted)")]
    NoHealthyEndpoint { attempted: usize },

    #[error("Event decode error: {0}")]
    EventDecode(String),

    #[error("Unknown event signature: {0}")]
    UnknownEvent(String),

    #[error("Invalid order payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, MarketError>;

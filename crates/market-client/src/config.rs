use alloy_primitives::Address;
use market_core::{sanitize_url, MarketError};
use std::env;

/// ApeChain mainnet
pub const DEFAULT_CHAIN_ID: u64 = 33139;

/// Listings shown per marketplace page
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Configuration of a marketplace frontend session
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    pub backend_url: String,
    pub nft_contract: Address,
    pub seaport_contract: Address,
    pub chain_id: u64,
    pub page_size: u32,
}

impl FrontendConfig {
    pub fn from_env() -> market_core::Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> market_core::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(sanitize_url)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| MarketError::MissingEnvVar(key.to_string()))
        };
        let address = |key: &str| -> market_core::Result<Address> {
            let value = required(key)?;
            value
                .parse()
                .map_err(|_| MarketError::InvalidConfig(format!("{} is not an address: {}", key, value)))
        };

        Ok(Self {
            backend_url: required("BACKEND_URL")?.trim_end_matches('/').to_string(),
            nft_contract: address("NFT_CONTRACT_ADDRESS")?,
            seaport_contract: address("SEAPORT_CONTRACT_ADDRESS")?,
            chain_id: lookup("CHAIN_ID")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_CHAIN_ID),
            page_size: lookup("PAGE_SIZE")
                .and_then(|s| s.trim().parse().ok())
                .filter(|size: &u32| *size > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }

    /// Chain id in the `0x`-prefixed form wallets expect when adding a chain
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }
}

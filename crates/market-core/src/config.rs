use crate::error::{MarketError, Result};
use alloy_primitives::Address;
use std::env;

/// Public RPC endpoints tried after the operator-supplied one, in priority order
pub const FALLBACK_RPC_URLS: [&str; 3] = [
    "https://rpc.apechain.com/http",
    "https://apechain.drpc.org",
    "https://33139.rpc.thirdweb.com",
];

/// Default maximum chunk width (blocks) for eth_getLogs queries
pub const DEFAULT_CHUNK_SIZE: u64 = 5000;

/// Reconciliation job configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Marketplace API base URL (without the `/api` suffix)
    pub backend_url: String,
    /// Collectible (ERC-721) contract
    pub nft_contract: Address,
    /// Seaport order-book contract
    pub seaport_contract: Address,
    /// First block of the sweep (inclusive)
    pub from_block: u64,
    /// Operator-supplied RPC endpoint, tried before the fallbacks
    pub primary_rpc: Option<String>,
    /// Maximum chunk width for log queries
    pub chunk_size: u64,
}

impl SyncConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(sanitize_url)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| MarketError::MissingEnvVar(key.to_string()))
        };

        let backend_url = required("BACKEND_URL")?.trim_end_matches('/').to_string();
        let nft_contract = parse_address("NFT_CONTRACT_ADDRESS", &required("NFT_CONTRACT_ADDRESS")?)?;
        let seaport_contract =
            parse_address("SEAPORT_CONTRACT_ADDRESS", &required("SEAPORT_CONTRACT_ADDRESS")?)?;

        let from_block = match lookup("FROM_BLOCK").map(sanitize_url) {
            Some(v) if !v.is_empty() => v.parse::<u64>().map_err(|_| {
                MarketError::InvalidConfig(format!("FROM_BLOCK is not a block number: {}", v))
            })?,
            _ => 0,
        };

        let primary_rpc = lookup("APECHAIN_RPC")
            .map(sanitize_url)
            .filter(|v| !v.is_empty());

        let chunk_size = lookup("SYNC_CHUNK_SIZE")
            .and_then(|s| s.trim().parse().ok())
            .filter(|size: &u64| *size > 0)
            .unwrap_or(DEFAULT_CHUNK_SIZE);

        Ok(Self {
            backend_url,
            nft_contract,
            seaport_contract,
            from_block,
            primary_rpc,
            chunk_size,
        })
    }

    /// Candidate RPC endpoints, highest priority first. The primary slot is
    /// `None` when no operator endpoint is configured.
    pub fn rpc_candidates(&self) -> Vec<Option<String>> {
        std::iter::once(self.primary_rpc.clone())
            .chain(FALLBACK_RPC_URLS.iter().map(|url| Some(url.to_string())))
            .collect()
    }
}

fn parse_address(key: &str, value: &str) -> Result<Address> {
    value
        .parse()
        .map_err(|_| MarketError::InvalidConfig(format!("{} is not an address: {}", key, value)))
}

/// Sanitize URL by removing surrounding quotes and whitespace
pub fn sanitize_url(url: String) -> String {
    let trimmed = url.trim();
    let without_quotes = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"')
    {
        &trimmed[1..trimmed.len() - 1]
    } else if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    without_quotes.to_string()
}

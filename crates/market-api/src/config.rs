use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_cors")]
    pub cors_enabled: bool,

    /// CORS allowed origins (comma-separated); any origin when unset
    #[serde(default)]
    pub cors_origins: Option<String>,

    /// Collection stamped onto listings that do not name one
    #[serde(default)]
    pub nft_contract: Option<String>,

    /// Order book contract stamped onto listings that do not name one
    #[serde(default)]
    pub marketplace_contract: Option<String>,

    /// Listings per page when the request gives no limit
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper bound on the page size a client may request
    #[serde(default = "default_max_limit")]
    pub orders_max_limit: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cors() -> bool {
    true
}

fn default_page_size() -> u32 {
    12
}

fn default_max_limit() -> u32 {
    500
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_cors(),
            cors_origins: None,
            nft_contract: None,
            marketplace_contract: None,
            default_page_size: default_page_size(),
            orders_max_limit: default_max_limit(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = |key: &str| {
            lookup(key)
                .map(market_core::sanitize_url)
                .filter(|v| !v.is_empty())
                .map(|v| v.to_lowercase())
        };

        Self {
            host: lookup("API_HOST").unwrap_or_else(default_host),
            port: lookup("API_PORT")
                .or_else(|| lookup("PORT"))
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or_else(default_port),
            cors_enabled: lookup("API_CORS_ENABLED")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or_else(default_cors),
            cors_origins: lookup("API_CORS_ORIGINS").filter(|s| !s.trim().is_empty()),
            nft_contract: address("NFT_CONTRACT_ADDRESS"),
            marketplace_contract: address("SEAPORT_CONTRACT_ADDRESS"),
            default_page_size: lookup("ORDERS_PAGE_SIZE")
                .and_then(|s| s.trim().parse().ok())
                .filter(|n: &u32| *n > 0)
                .unwrap_or_else(default_page_size),
            orders_max_limit: lookup("ORDERS_MAX_LIMIT")
                .and_then(|s| s.trim().parse().ok())
                .filter(|n: &u32| *n > 0)
                .unwrap_or_else(default_max_limit),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Page size for a request, clamped to `1..=orders_max_limit`
    pub fn page_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.orders_max_limit.max(1))
    }
}

//! Marketplace session for one connected wallet.
//!
//! A session is created when a wallet connects and dropped on disconnect. It
//! owns everything the listing and buying flows need, so nothing about the
//! connection lives in global state.

use crate::client::MarketApi;
use crate::config::FrontendConfig;
use crate::{ClientError, Result};
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use market_core::types::OrderRecord;
use market_core::units::parse_ether;
use market_core::wire::OrderSubmission;
use serde_json::Value;
use tracing::info;

/// Lifetime of a new listing
pub const LISTING_DURATION_SECS: u64 = 30 * 24 * 60 * 60;

/// Order the wallet is asked to create and sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub nft_contract: Address,
    pub token_id: U256,
    /// Price in base units, paid to `recipient`
    pub price: U256,
    pub recipient: Address,
    /// Unix seconds
    pub end_time: u64,
}

/// Signed order returned by the order protocol
#[derive(Debug, Clone, PartialEq)]
pub struct SignedListing {
    pub order_hash: String,
    pub payload: Value,
}

/// Wallet and order-protocol operations the session relies on.
///
/// Signing, approval and fulfillment are performed by the wallet and the
/// order-book protocol; the session only sequences them.
#[async_trait]
pub trait WalletCapability: Send + Sync {
    async fn account(&self) -> Result<Address>;

    async fn chain_id(&self) -> Result<u64>;

    async fn owner_of(&self, nft_contract: Address, token_id: U256) -> Result<Address>;

    async fn is_approved_for_all(
        &self,
        nft_contract: Address,
        owner: Address,
        operator: Address,
    ) -> Result<bool>;

    /// Approve `operator` for every token and wait for confirmation
    async fn set_approval_for_all(&self, nft_contract: Address, operator: Address) -> Result<()>;

    async fn create_order(&self, request: &ListingRequest) -> Result<SignedListing>;

    /// Fulfil a signed order and wait for the transaction to be mined
    async fn fulfill_order(&self, payload: &Value, buyer: Address) -> Result<B256>;
}

/// State of one connected wallet
pub struct MarketSession<A, W> {
    config: FrontendConfig,
    api: A,
    wallet: W,
    account: Address,
    current_page: u32,
}

impl<A: MarketApi, W: WalletCapability> MarketSession<A, W> {
    /// Connect a wallet, refusing wallets on another chain
    pub async fn connect(config: FrontendConfig, api: A, wallet: W) -> Result<Self> {
        let actual = wallet.chain_id().await?;
        if actual != config.chain_id {
            return Err(ClientError::WrongChain {
                expected: config.chain_id,
                actual,
            });
        }
        let account = wallet.account().await?;
        info!(account = %format!("{:#x}", account), "Wallet connected");

        Ok(Self {
            config,
            api,
            wallet,
            account,
            current_page: 1,
        })
    }

    /// Connected account, lowercase hex
    pub fn account(&self) -> String {
        format!("{:#x}", self.account)
    }

    /// Connected account shortened for display, e.g. `0x1234...abcd`
    pub fn short_account(&self) -> String {
        let account = self.account();
        format!("{}...{}", &account[..6], &account[account.len() - 4..])
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub async fn load_page(&mut self, page: u32) -> Result<Vec<OrderRecord>> {
        let page = page.max(1);
        let orders = self.api.list_orders(page, self.config.page_size).await?;
        self.current_page = page;
        Ok(orders)
    }

    pub async fn next_page(&mut self) -> Result<Vec<OrderRecord>> {
        self.load_page(self.current_page + 1).await
    }

    /// Load the previous page; `None` when already on the first page
    pub async fn prev_page(&mut self) -> Result<Option<Vec<OrderRecord>>> {
        if self.current_page <= 1 {
            return Ok(None);
        }
        self.load_page(self.current_page - 1).await.map(Some)
    }

    /// List an owned token at `price` (decimal, native currency)
    pub async fn list_token(&self, token_id: &str, price: &str) -> Result<OrderRecord> {
        let token = U256::from_str_radix(token_id.trim(), 10)
            .map_err(|_| market_core::MarketError::InvalidAmount(token_id.to_string()))?;
        let nft = self.config.nft_contract;

        let owner = self.wallet.owner_of(nft, token).await?;
        if owner != self.account {
            return Err(ClientError::NotOwner {
                token_id: token_id.to_string(),
                owner: format!("{:#x}", owner),
                account: self.account(),
            });
        }

        let price_wei = parse_ether(price)?;

        let operator = self.config.seaport_contract;
        if !self.wallet.is_approved_for_all(nft, self.account, operator).await? {
            info!(operator = %format!("{:#x}", operator), "Approving marketplace for collection");
            self.wallet.set_approval_for_all(nft, operator).await?;
        }

        let request = ListingRequest {
            nft_contract: nft,
            token_id: token,
            price: price_wei,
            recipient: self.account,
            end_time: chrono::Utc::now().timestamp().max(0) as u64 + LISTING_DURATION_SECS,
        };
        let signed = self.wallet.create_order(&request).await?;

        let submission = OrderSubmission {
            token_id: Some(token.to_string()),
            price: Some(price.trim().to_string()),
            seller_address: Some(self.account()),
            order_hash: Some(signed.order_hash.clone()),
            signed_order_payload: Some(signed.payload),
            ..Default::default()
        };
        let response = self.api.submit_order(&submission).await?;
        match response.order {
            Some(order) if response.success => {
                info!(token_id = %token, price = %price, order_hash = %signed.order_hash, "Token listed");
                Ok(order)
            }
            _ => Err(ClientError::Unsuccessful(
                response
                    .error
                    .unwrap_or_else(|| "listing was not accepted".to_string()),
            )),
        }
    }

    /// Buy a listed order and report the purchase to the backend
    pub async fn buy(&self, order: &OrderRecord) -> Result<OrderRecord> {
        let payload = order
            .signed_order_payload
            .as_ref()
            .ok_or_else(|| ClientError::MissingPayload(order.order_hash.clone()))?;

        let tx = self.wallet.fulfill_order(payload, self.account).await?;
        info!(order_hash = %order.order_hash, tx = %format!("{:#x}", tx), "Order fulfilled");

        self.api.record_buy(&order.order_hash, &self.account()).await
    }
}

//! Trades: converting one asset into another inside an address.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, DEFAULT_PAGE_SIZE, Page, Pollable, WaitOptions, fetch_all, wait};
use crate::error::Error;

use super::{require_id, require_positive_amount};

/// Default budget for [`Trades::wait`].
pub const TRADE_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifecycle status of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Pending,
    Broadcast,
    Complete,
    Failed,
    #[serde(other)]
    Unspecified,
}

impl TradeStatus {
    /// Whether this status will never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TradeStatus::Complete | TradeStatus::Failed)
    }
}

/// A conversion of `from_asset_id` into `to_asset_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct Trade {
    pub id: String,
    pub wallet_id: String,
    pub address_id: String,
    pub network_id: String,
    pub from_asset_id: String,
    pub to_asset_id: String,
    pub from_amount: String,
    /// Filled in once the trade settles.
    #[serde(default)]
    pub to_amount: Option<String>,
    pub status: TradeStatus,
}

impl Pollable for Trade {
    fn kind(&self) -> &'static str {
        "trade"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[derive(Serialize)]
struct CreateTradeRequest<'a> {
    amount: &'a str,
    from_asset_id: &'a str,
    to_asset_id: &'a str,
}

/// Trade operations, created via [`Cdp::trades`](crate::Cdp::trades).
pub struct Trades {
    api: Arc<ApiClient>,
}

impl Trades {
    pub(crate) fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Create a trade.
    ///
    /// Fails with [`Error::InvalidArgument`] before any network call when the
    /// amount is not positive, an identifier is empty, or the two assets are
    /// the same.
    pub async fn create(
        &self,
        wallet_id: &str,
        address_id: &str,
        amount: &str,
        from_asset_id: &str,
        to_asset_id: &str,
    ) -> Result<Trade, Error> {
        require_id("wallet_id", wallet_id)?;
        require_id("address_id", address_id)?;
        require_id("from_asset_id", from_asset_id)?;
        require_id("to_asset_id", to_asset_id)?;
        require_positive_amount(amount)?;
        if from_asset_id == to_asset_id {
            return Err(Error::InvalidArgument(format!(
                "cannot trade {from_asset_id} for itself"
            )));
        }

        let path = format!("/v1/wallets/{wallet_id}/addresses/{address_id}/trades");
        self.api
            .post(
                &path,
                &CreateTradeRequest {
                    amount,
                    from_asset_id,
                    to_asset_id,
                },
            )
            .await
    }

    /// Fetch the current snapshot of a trade.
    pub async fn get(
        &self,
        wallet_id: &str,
        address_id: &str,
        trade_id: &str,
    ) -> Result<Trade, Error> {
        let path = format!("/v1/wallets/{wallet_id}/addresses/{address_id}/trades/{trade_id}");
        self.api.get(&path).await
    }

    /// List all trades for an address, across all pages.
    pub async fn list(&self, wallet_id: &str, address_id: &str) -> Result<Vec<Trade>, Error> {
        require_id("wallet_id", wallet_id)?;
        require_id("address_id", address_id)?;

        let path = format!("/v1/wallets/{wallet_id}/addresses/{address_id}/trades");
        fetch_all(
            |cursor, limit| self.fetch_page(&path, cursor, limit),
            DEFAULT_PAGE_SIZE,
        )
        .await
    }

    /// Poll a trade until it completes or fails, with the default budget.
    pub async fn wait(&self, trade: &mut Trade) -> Result<(), Error> {
        self.wait_with(trade, WaitOptions::new(TRADE_WAIT_TIMEOUT))
            .await
    }

    /// Poll a trade with custom timing.
    pub async fn wait_with(&self, trade: &mut Trade, options: WaitOptions) -> Result<(), Error> {
        let wallet_id = trade.wallet_id.clone();
        let address_id = trade.address_id.clone();
        let trade_id = trade.id.clone();
        wait(
            trade,
            || self.get(&wallet_id, &address_id, &trade_id),
            options,
        )
        .await
    }

    async fn fetch_page(
        &self,
        path: &str,
        cursor: Option<String>,
        limit: u32,
    ) -> Result<Page<Trade>, Error> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(page) = cursor {
            query.push(("page", page));
        }
        self.api.get_with_query(path, &query).await
    }
}

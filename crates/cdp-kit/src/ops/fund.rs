//! Fund operations: topping up an address from a linked funding source.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, DEFAULT_PAGE_SIZE, Page, Pollable, WaitOptions, fetch_all, wait};
use crate::error::Error;

use super::{require_id, require_positive_amount};

/// Default budget for [`FundOperations::wait`]. Funding settles through
/// payment rails, not a chain, and can take a while.
pub const FUND_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Lifecycle status of a fund operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundOperationStatus {
    Pending,
    Complete,
    Failed,
    #[serde(other)]
    Unspecified,
}

impl FundOperationStatus {
    /// Whether this status will never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FundOperationStatus::Complete | FundOperationStatus::Failed
        )
    }
}

/// A funding operation crediting an address.
#[derive(Debug, Clone, Deserialize)]
pub struct FundOperation {
    pub id: String,
    pub wallet_id: String,
    pub address_id: String,
    pub asset_id: String,
    pub amount: String,
    /// Fiat side of the funding, when priced.
    #[serde(default)]
    pub fiat_amount: Option<String>,
    #[serde(default)]
    pub fiat_currency: Option<String>,
    pub status: FundOperationStatus,
}

impl Pollable for FundOperation {
    fn kind(&self) -> &'static str {
        "fund operation"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[derive(Serialize)]
struct CreateFundOperationRequest<'a> {
    amount: &'a str,
    asset_id: &'a str,
}

/// Fund operations, created via [`Cdp::funds`](crate::Cdp::funds).
pub struct FundOperations {
    api: Arc<ApiClient>,
}

impl FundOperations {
    pub(crate) fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Create a fund operation.
    ///
    /// Fails with [`Error::InvalidArgument`] before any network call when the
    /// amount is not positive or an identifier is empty.
    pub async fn create(
        &self,
        wallet_id: &str,
        address_id: &str,
        amount: &str,
        asset_id: &str,
    ) -> Result<FundOperation, Error> {
        require_id("wallet_id", wallet_id)?;
        require_id("address_id", address_id)?;
        require_id("asset_id", asset_id)?;
        require_positive_amount(amount)?;

        let path = format!("/v1/wallets/{wallet_id}/addresses/{address_id}/fund_operations");
        self.api
            .post(&path, &CreateFundOperationRequest { amount, asset_id })
            .await
    }

    /// Fetch the current snapshot of a fund operation.
    pub async fn get(
        &self,
        wallet_id: &str,
        address_id: &str,
        operation_id: &str,
    ) -> Result<FundOperation, Error> {
        let path =
            format!("/v1/wallets/{wallet_id}/addresses/{address_id}/fund_operations/{operation_id}");
        self.api.get(&path).await
    }

    /// List all fund operations for an address, across all pages.
    pub async fn list(
        &self,
        wallet_id: &str,
        address_id: &str,
    ) -> Result<Vec<FundOperation>, Error> {
        require_id("wallet_id", wallet_id)?;
        require_id("address_id", address_id)?;

        let path = format!("/v1/wallets/{wallet_id}/addresses/{address_id}/fund_operations");
        fetch_all(
            |cursor, limit| self.fetch_page(&path, cursor, limit),
            DEFAULT_PAGE_SIZE,
        )
        .await
    }

    /// Poll a fund operation until it completes or fails, with the default
    /// budget.
    pub async fn wait(&self, operation: &mut FundOperation) -> Result<(), Error> {
        self.wait_with(operation, WaitOptions::new(FUND_WAIT_TIMEOUT))
            .await
    }

    /// Poll a fund operation with custom timing.
    pub async fn wait_with(
        &self,
        operation: &mut FundOperation,
        options: WaitOptions,
    ) -> Result<(), Error> {
        let wallet_id = operation.wallet_id.clone();
        let address_id = operation.address_id.clone();
        let operation_id = operation.id.clone();
        wait(
            operation,
            || self.get(&wallet_id, &address_id, &operation_id),
            options,
        )
        .await
    }

    async fn fetch_page(
        &self,
        path: &str,
        cursor: Option<String>,
        limit: u32,
    ) -> Result<Page<FundOperation>, Error> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(page) = cursor {
            query.push(("page", page));
        }
        self.api.get_with_query(path, &query).await
    }
}

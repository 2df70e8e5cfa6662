//! Transfers: moving an asset from an address to a destination.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, DEFAULT_PAGE_SIZE, Page, Pollable, WaitOptions, fetch_all, wait};
use crate::error::Error;
use crate::types::Transaction;

use super::{require_id, require_positive_amount};

/// Default budget for [`Transfers::wait`].
pub const TRANSFER_WAIT_TIMEOUT: Duration = Duration::from_secs(20);

/// Lifecycle status of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Broadcast,
    Complete,
    Failed,
    #[serde(other)]
    Unspecified,
}

impl TransferStatus {
    /// Whether this status will never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Complete | TransferStatus::Failed)
    }
}

/// A transfer of an asset to a destination address.
#[derive(Debug, Clone, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub wallet_id: String,
    pub address_id: String,
    pub network_id: String,
    pub asset_id: String,
    pub amount: String,
    pub destination: String,
    pub status: TransferStatus,
    /// The unsigned transaction, present when the caller signs locally.
    #[serde(default)]
    pub transaction: Option<Transaction>,
}

impl Pollable for Transfer {
    fn kind(&self) -> &'static str {
        "transfer"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn absorb(&mut self, mut fresh: Self) {
        // Keep the local transaction object when it carries a signature the
        // server snapshot does not know about yet.
        if let (Some(local), Some(remote)) = (&self.transaction, &fresh.transaction) {
            if local.unsigned_payload == remote.unsigned_payload
                && local.is_signed()
                && !remote.is_signed()
            {
                fresh.transaction = self.transaction.take();
            }
        }
        *self = fresh;
    }
}

#[derive(Serialize)]
struct CreateTransferRequest<'a> {
    amount: &'a str,
    asset_id: &'a str,
    destination: &'a str,
}

#[derive(Serialize)]
struct BroadcastTransferRequest<'a> {
    signed_payload: &'a str,
}

/// Transfer operations, created via [`Cdp::transfers`](crate::Cdp::transfers).
pub struct Transfers {
    api: Arc<ApiClient>,
}

impl Transfers {
    pub(crate) fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Create a transfer.
    ///
    /// Fails with [`Error::InvalidArgument`] before any network call when the
    /// amount is not a positive number or any identifier is empty.
    pub async fn create(
        &self,
        wallet_id: &str,
        address_id: &str,
        amount: &str,
        asset_id: &str,
        destination: &str,
    ) -> Result<Transfer, Error> {
        require_id("wallet_id", wallet_id)?;
        require_id("address_id", address_id)?;
        require_id("asset_id", asset_id)?;
        require_id("destination", destination)?;
        require_positive_amount(amount)?;

        let path = format!("/v1/wallets/{wallet_id}/addresses/{address_id}/transfers");
        self.api
            .post(
                &path,
                &CreateTransferRequest {
                    amount,
                    asset_id,
                    destination,
                },
            )
            .await
    }

    /// Fetch the current snapshot of a transfer.
    pub async fn get(
        &self,
        wallet_id: &str,
        address_id: &str,
        transfer_id: &str,
    ) -> Result<Transfer, Error> {
        let path =
            format!("/v1/wallets/{wallet_id}/addresses/{address_id}/transfers/{transfer_id}");
        self.api.get(&path).await
    }

    /// List all transfers for an address, across all pages.
    pub async fn list(&self, wallet_id: &str, address_id: &str) -> Result<Vec<Transfer>, Error> {
        require_id("wallet_id", wallet_id)?;
        require_id("address_id", address_id)?;

        let path = format!("/v1/wallets/{wallet_id}/addresses/{address_id}/transfers");
        fetch_all(
            |cursor, limit| self.fetch_page(&path, cursor, limit),
            DEFAULT_PAGE_SIZE,
        )
        .await
    }

    /// Broadcast a locally-signed transfer.
    pub async fn broadcast(&self, transfer: &Transfer) -> Result<Transfer, Error> {
        let signed_payload = transfer
            .transaction
            .as_ref()
            .and_then(|tx| tx.signed_payload.as_deref())
            .ok_or_else(|| {
                Error::InvalidArgument("transfer has no signed payload to broadcast".to_string())
            })?;

        let path = format!(
            "/v1/wallets/{}/addresses/{}/transfers/{}/broadcast",
            transfer.wallet_id, transfer.address_id, transfer.id
        );
        self.api
            .post(&path, &BroadcastTransferRequest { signed_payload })
            .await
    }

    /// Poll a transfer until it completes or fails, with the default budget.
    pub async fn wait(&self, transfer: &mut Transfer) -> Result<(), Error> {
        self.wait_with(transfer, WaitOptions::new(TRANSFER_WAIT_TIMEOUT))
            .await
    }

    /// Poll a transfer with custom timing.
    pub async fn wait_with(
        &self,
        transfer: &mut Transfer,
        options: WaitOptions,
    ) -> Result<(), Error> {
        let wallet_id = transfer.wallet_id.clone();
        let address_id = transfer.address_id.clone();
        let transfer_id = transfer.id.clone();
        wait(
            transfer,
            || self.get(&wallet_id, &address_id, &transfer_id),
            options,
        )
        .await
    }

    async fn fetch_page(
        &self,
        path: &str,
        cursor: Option<String>,
        limit: u32,
    ) -> Result<Page<Transfer>, Error> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(page) = cursor {
            query.push(("page", page));
        }
        self.api.get_with_query(path, &query).await
    }
}

//! Staking operations: stake, unstake, and claim flows.
//!
//! A staking operation is the one variant that carries a *sequence* of
//! signable transactions — some protocols need several (approve + deposit,
//! or one exit per validator). The caller signs them locally through
//! [`StakingOperation::sign`], broadcasts each, and polls. Reloading merges
//! by unsigned-payload identity, so a poll can never un-sign local work while
//! still picking up transactions the platform appends mid-flight.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, DEFAULT_PAGE_SIZE, Page, Pollable, WaitOptions, fetch_all, wait};
use crate::error::Error;
use crate::types::{Transaction, TxSigner, merge_transactions};

use super::{require_id, require_positive_amount};

/// Default budget for [`StakingOperations::wait`]. Staking flows routinely
/// take minutes, so the budget and interval are much larger than for
/// transfers.
pub const STAKING_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Default poll interval for staking operations.
pub const STAKING_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Lifecycle status of a staking operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakingOperationStatus {
    Initialized,
    Complete,
    Failed,
    #[serde(other)]
    Unspecified,
}

impl StakingOperationStatus {
    /// Whether this status will never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StakingOperationStatus::Complete | StakingOperationStatus::Failed
        )
    }
}

/// The action a staking operation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakingAction {
    Stake,
    Unstake,
    ClaimStake,
}

impl StakingAction {
    /// Get the wire name for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            StakingAction::Stake => "stake",
            StakingAction::Unstake => "unstake",
            StakingAction::ClaimStake => "claim_stake",
        }
    }
}

/// A long-running staking operation with its signable transactions.
#[derive(Debug, Clone, Deserialize)]
pub struct StakingOperation {
    pub id: String,
    pub wallet_id: String,
    pub address_id: String,
    pub network_id: String,
    pub status: StakingOperationStatus,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl StakingOperation {
    /// Sign every unsigned transaction in place with the supplied signer.
    ///
    /// Already-signed transactions are skipped, so calling this again after a
    /// partial failure or a reload finishes the remaining work.
    pub fn sign(&mut self, signer: &impl TxSigner) -> Result<(), Error> {
        for transaction in &mut self.transactions {
            transaction.sign(signer)?;
        }
        Ok(())
    }

    /// Number of transactions still waiting for a signature.
    pub fn unsigned_count(&self) -> usize {
        self.transactions.iter().filter(|tx| !tx.is_signed()).count()
    }

    /// Whether any transaction still needs a signature.
    pub fn has_unsigned(&self) -> bool {
        self.unsigned_count() > 0
    }
}

impl Pollable for StakingOperation {
    fn kind(&self) -> &'static str {
        "staking operation"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn absorb(&mut self, mut fresh: Self) {
        fresh.transactions = merge_transactions(&self.transactions, fresh.transactions);
        *self = fresh;
    }
}

#[derive(Serialize)]
struct CreateStakingOperationRequest<'a> {
    action: &'a str,
    amount: &'a str,
    asset_id: &'a str,
}

#[derive(Serialize)]
struct BroadcastStakingOperationRequest<'a> {
    signed_payload: &'a str,
    transaction_index: usize,
}

/// Staking operations, created via [`Cdp::staking`](crate::Cdp::staking).
pub struct StakingOperations {
    api: Arc<ApiClient>,
}

impl StakingOperations {
    pub(crate) fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Create a staking operation.
    ///
    /// Fails with [`Error::InvalidArgument`] before any network call when the
    /// amount is not positive or an identifier is empty.
    pub async fn create(
        &self,
        wallet_id: &str,
        address_id: &str,
        action: StakingAction,
        amount: &str,
        asset_id: &str,
    ) -> Result<StakingOperation, Error> {
        require_id("wallet_id", wallet_id)?;
        require_id("address_id", address_id)?;
        require_id("asset_id", asset_id)?;
        require_positive_amount(amount)?;

        let path = format!("/v1/wallets/{wallet_id}/addresses/{address_id}/staking_operations");
        self.api
            .post(
                &path,
                &CreateStakingOperationRequest {
                    action: action.as_str(),
                    amount,
                    asset_id,
                },
            )
            .await
    }

    /// Fetch the current snapshot of a staking operation.
    pub async fn get(
        &self,
        wallet_id: &str,
        address_id: &str,
        operation_id: &str,
    ) -> Result<StakingOperation, Error> {
        let path = format!(
            "/v1/wallets/{wallet_id}/addresses/{address_id}/staking_operations/{operation_id}"
        );
        self.api.get(&path).await
    }

    /// List all staking operations for an address, across all pages.
    pub async fn list(
        &self,
        wallet_id: &str,
        address_id: &str,
    ) -> Result<Vec<StakingOperation>, Error> {
        require_id("wallet_id", wallet_id)?;
        require_id("address_id", address_id)?;

        let path = format!("/v1/wallets/{wallet_id}/addresses/{address_id}/staking_operations");
        fetch_all(
            |cursor, limit| self.fetch_page(&path, cursor, limit),
            DEFAULT_PAGE_SIZE,
        )
        .await
    }

    /// Broadcast one signed transaction of a staking operation.
    pub async fn broadcast(
        &self,
        operation: &StakingOperation,
        transaction_index: usize,
    ) -> Result<StakingOperation, Error> {
        let transaction = operation.transactions.get(transaction_index).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "transaction index {transaction_index} out of range ({} transactions)",
                operation.transactions.len()
            ))
        })?;
        let signed_payload = transaction.signed_payload.as_deref().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "transaction {transaction_index} is not signed"
            ))
        })?;

        let path = format!(
            "/v1/wallets/{}/addresses/{}/staking_operations/{}/broadcast",
            operation.wallet_id, operation.address_id, operation.id
        );
        self.api
            .post(
                &path,
                &BroadcastStakingOperationRequest {
                    signed_payload,
                    transaction_index,
                },
            )
            .await
    }

    /// Poll a staking operation until it completes or fails, with the
    /// default budget.
    pub async fn wait(&self, operation: &mut StakingOperation) -> Result<(), Error> {
        self.wait_with(
            operation,
            WaitOptions::new(STAKING_WAIT_TIMEOUT).interval(STAKING_POLL_INTERVAL),
        )
        .await
    }

    /// Poll a staking operation with custom timing.
    pub async fn wait_with(
        &self,
        operation: &mut StakingOperation,
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
    ) -> Result<Page<StakingOperation>, Error> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(page) = cursor {
            query.push(("page", page));
        }
        self.api.get_with_query(path, &query).await
    }
}

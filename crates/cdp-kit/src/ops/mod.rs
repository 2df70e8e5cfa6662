//! Long-running platform operations: transfers, trades, staking, funding.
//!
//! Every module here follows the same shape: a handle created from the
//! [`Cdp`](crate::Cdp) client, thin wire models with a per-variant status
//! enum, create/get/list calls, and a `wait` that drives the operation to a
//! terminal status through [`crate::client::wait`].
//!
//! # Example
//!
//! ```rust,no_run
//! use cdp_kit::*;
//!
//! # async fn example() -> Result<(), cdp_kit::Error> {
//! let cdp = Cdp::from_env()?;
//!
//! // Transfers: create, then poll to completion
//! let transfers = cdp.transfers();
//! let mut transfer = transfers
//!     .create("wallet-id", "address-id", "0.5", "eth", "0xdead...beef")
//!     .await?;
//! transfers.wait(&mut transfer).await?;
//!
//! // Staking: create, sign locally, broadcast, then poll
//! let staking = cdp.staking();
//! let mut op = staking
//!     .create("wallet-id", "address-id", StakingAction::Stake, "32", "eth")
//!     .await?;
//! op.sign(&|payload: &[u8]| -> Result<Vec<u8>, SignerError> {
//!     // plug in your blockchain signing library here
//!     # let _ = payload;
//!     # unimplemented!()
//! })?;
//! for index in 0..op.transactions.len() {
//!     staking.broadcast(&op, index).await?;
//! }
//! staking.wait(&mut op).await?;
//! # Ok(())
//! # }
//! ```

mod fund;
mod staking;
mod trade;
mod transfer;

pub use fund::*;
pub use staking::*;
pub use trade::*;
pub use transfer::*;

use crate::error::Error;

/// Reject empty or whitespace-only identifiers before any network call.
pub(crate) fn require_id(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{field} is empty")));
    }
    Ok(())
}

/// Reject non-numeric or non-positive amounts before any network call.
pub(crate) fn require_positive_amount(amount: &str) -> Result<(), Error> {
    match amount.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(()),
        Ok(_) => Err(Error::InvalidArgument(format!(
            "amount '{amount}' must be positive"
        ))),
        Err(_) => Err(Error::InvalidArgument(format!(
            "amount '{amount}' is not a number"
        ))),
    }
}

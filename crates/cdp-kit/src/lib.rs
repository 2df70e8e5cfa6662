//! A clean, ergonomic Rust client for the Coinbase Developer Platform.
//!
//! **cdp-kit** authenticates every API call with a short-lived signed JWT and
//! drives long-running platform operations — transfers, trades, staking
//! operations, fund operations — to a terminal status.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cdp_kit::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cdp_kit::Error> {
//!     // Configure once
//!     let cdp = Cdp::from_env()?;
//!
//!     // Create a transfer and poll it to completion
//!     let transfers = cdp.transfers();
//!     let mut transfer = transfers
//!         .create("wallet-id", "address-id", "0.5", "eth", "0xdead...beef")
//!         .await?;
//!     transfers.wait(&mut transfer).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Design Principles
//!
//! 1. **Single entry point**: Everything hangs off the [`Cdp`] client
//! 2. **Configure once**: Credential and base URL set at client creation
//! 3. **Fresh tokens, always**: A new signed JWT per request, never cached —
//!    a captured token is useless outside its 60-second window
//! 4. **Never lose local work**: Reloading an operation merges by payload
//!    identity, so signatures you applied locally survive every poll
//! 5. **Explicit injection**: The poller and the page fetcher take plain
//!    functions; there is no ambient global client
//!
//! # Core Types
//!
//! - [`Cdp`] - The client; build it with [`CdpBuilder`]
//! - [`Credential`] - API key id plus parsed signing material
//! - [`SecretKey`] - EC P-256 (ES256) or Ed25519 (EdDSA) key material
//! - [`Transaction`], [`TxSigner`] - Signable payloads and the signing seam
//! - [`Pollable`], [`WaitOptions`] - The wait-until-terminal surface
//! - [`Page`] - One page of any cursor-paginated collection
//!
//! # Signing Onchain Payloads
//!
//! cdp-kit never produces onchain signatures itself. Operations that need
//! them (staking, self-custodied transfers) expose their unsigned payloads,
//! and you plug in a blockchain signing library through [`TxSigner`]:
//!
//! ```rust,no_run
//! use cdp_kit::*;
//!
//! # async fn example(cdp: Cdp, mut op: StakingOperation) -> Result<(), Error> {
//! op.sign(&|payload: &[u8]| -> Result<Vec<u8>, SignerError> {
//!     // hand the payload to your wallet/HSM/library of choice
//!     # let _ = payload;
//!     # unimplemented!()
//! })?;
//! cdp.staking().wait(&mut op).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod ops;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ApiError, Error, KeyFormatError, SignerError};
pub use types::*;

// Re-export client types
pub use client::{
    ApiClient, AuthHeaders, Authenticator, Cdp, CdpBuilder, Credential, DEFAULT_BASE_URL,
    DEFAULT_PAGE_SIZE, DEFAULT_POLL_INTERVAL, Page, Pollable, RetryConfig, WaitOptions, fetch_all,
    wait,
};

// Re-export operation types
pub use ops::{
    FUND_WAIT_TIMEOUT, FundOperation, FundOperationStatus, FundOperations, STAKING_POLL_INTERVAL,
    STAKING_WAIT_TIMEOUT, StakingAction, StakingOperation, StakingOperationStatus,
    StakingOperations, TRADE_WAIT_TIMEOUT, TRANSFER_WAIT_TIMEOUT, Trade, TradeStatus, Trades,
    Transfer, TransferStatus, Transfers,
};

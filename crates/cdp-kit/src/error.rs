//! Error types for cdp-kit.
//!
//! # Error Hierarchy
//!
//! - [`Error`](enum@Error) — Main error type, returned by most operations
//!   - [`ApiError`] — Transport and platform API errors
//!   - [`KeyFormatError`] — Malformed or unsupported API key material
//!   - [`SignerError`] — Signing operation failures
//!
//! # Error Handling Examples
//!
//! ## Handling a wait timeout
//!
//! A [`Error::WaitTimeout`] is reported, not fatal: the operation you were
//! polling stays in your hands and can be inspected or waited on again.
//!
//! ```rust,no_run
//! use cdp_kit::*;
//!
//! # async fn example(cdp: Cdp, mut transfer: Transfer) -> Result<(), Error> {
//! let transfers = cdp.transfers();
//! match transfers.wait(&mut transfer).await {
//!     Ok(()) => println!("done: {:?}", transfer.status),
//!     Err(Error::WaitTimeout { kind, id, .. }) => {
//!         println!("{} {} is still running", kind, id);
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Checking retryable errors
//!
//! ```rust,no_run
//! use cdp_kit::ApiError;
//!
//! fn should_retry(err: &ApiError) -> bool {
//!     err.is_retryable()
//! }
//! ```

use thiserror::Error;

/// Error parsing API key material.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyFormatError {
    #[error("Invalid EC private key PEM: {0}")]
    InvalidPem(String),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(String),

    #[error("Invalid Ed25519 secret length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Ed25519 secret bytes do not form a valid keypair")]
    InvalidKeypair,
}

/// Error during signing operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid unsigned payload: {0}")]
    InvalidPayload(String),
}

// ============================================================================
// API Errors
// ============================================================================

/// Transport and platform API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    // ─── Network/Transport ───
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network error: {message}")]
    Network {
        message: String,
        status_code: Option<u16>,
        retryable: bool,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed after {0} attempts")]
    RetriesExhausted(u32),

    // ─── Platform Error ───
    #[error("API error {code} (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
}

impl ApiError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_timeout() || e.is_connect(),
            ApiError::Network { retryable, .. } => *retryable,
            ApiError::Api { status, .. } => {
                *status == 408 || *status == 429 || (500..600).contains(status)
            }
            _ => false,
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>, status_code: Option<u16>, retryable: bool) -> Self {
        ApiError::Network {
            message: message.into(),
            status_code,
            retryable,
        }
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// Main error type for cdp-kit operations.
#[derive(Debug, Error)]
pub enum Error {
    // ─── Configuration ───
    #[error(
        "No API credential configured. Call .credential() on CdpBuilder or use Cdp::from_env()."
    )]
    NoCredential,

    #[error("Invalid configuration: {0}")]
    Config(String),

    // ─── Key Material ───
    #[error(transparent)]
    ParseKey(#[from] KeyFormatError),

    // ─── Signing ───
    #[error(transparent)]
    Signing(#[from] SignerError),

    // ─── API ───
    #[error(transparent)]
    Api(#[from] ApiError),

    // ─── Arguments ───
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─── Polling ───
    #[error(
        "Timed out waiting for {kind} {id} to reach a terminal status after {timeout_secs} seconds"
    )]
    WaitTimeout {
        kind: &'static str,
        id: String,
        timeout_secs: u64,
    },

    // ─── Serialization ───
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//! Onchain transaction payloads carried by long-running operations.
//!
//! Operations that need the caller's signature (staking operations, transfers
//! from self-custodied addresses) carry one or more [`Transaction`]s: an
//! unsigned payload produced by the platform, plus the signature once the
//! caller has applied one. Producing the signature itself is the job of an
//! external signing library, injected through [`TxSigner`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, SignerError};

/// Lifecycle status of a single onchain transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Signed,
    Broadcast,
    Complete,
    Failed,
    #[serde(other)]
    Unspecified,
}

/// A signable onchain transaction.
///
/// Identity, for reconciliation purposes, is the unsigned payload content —
/// never the position in the parent operation's sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub status: TransactionStatus,
    /// Hex-encoded unsigned transaction payload.
    pub unsigned_payload: String,
    /// Hex-encoded signature, present once the caller has signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_payload: Option<String>,
    /// Onchain hash, present once broadcast.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl Transaction {
    /// Create an unsigned transaction from a hex payload.
    pub fn unsigned(unsigned_payload: impl Into<String>) -> Self {
        Self {
            status: TransactionStatus::Pending,
            unsigned_payload: unsigned_payload.into(),
            signed_payload: None,
            transaction_hash: None,
        }
    }

    /// Whether a signature has been applied.
    pub fn is_signed(&self) -> bool {
        self.signed_payload.is_some()
    }

    /// Sign the unsigned payload in place with the supplied signer.
    ///
    /// Signing an already-signed transaction is a no-op, so this is safe to
    /// call again after a partial failure.
    pub fn sign(&mut self, signer: &impl TxSigner) -> Result<(), Error> {
        if self.is_signed() {
            return Ok(());
        }
        let raw = hex::decode(&self.unsigned_payload)
            .map_err(|e| SignerError::InvalidPayload(e.to_string()))?;
        let signature = signer.sign_payload(&raw)?;
        self.signed_payload = Some(hex::encode(signature));
        self.status = TransactionStatus::Signed;
        Ok(())
    }
}

/// Signer for onchain transaction payloads.
///
/// cdp-kit never produces these signatures itself; the caller plugs in a
/// blockchain signing library (or a custom backend) through this trait.
/// Closures work directly:
///
/// ```rust
/// use cdp_kit::{SignerError, Transaction};
///
/// let mut tx = Transaction::unsigned("deadbeef");
/// tx.sign(&|payload: &[u8]| -> Result<Vec<u8>, SignerError> {
///     Ok(payload.iter().rev().copied().collect())
/// })
/// .unwrap();
/// assert!(tx.is_signed());
/// ```
pub trait TxSigner {
    /// Sign a raw unsigned payload, returning the signature bytes.
    fn sign_payload(&self, unsigned_payload: &[u8]) -> Result<Vec<u8>, SignerError>;
}

impl<F> TxSigner for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, SignerError>,
{
    fn sign_payload(&self, unsigned_payload: &[u8]) -> Result<Vec<u8>, SignerError> {
        self(unsigned_payload)
    }
}

/// Reconcile locally-held transactions with a freshly fetched snapshot.
///
/// For each fresh transaction, the local object is kept when one with the
/// same unsigned payload already exists (it may carry a signature the server
/// snapshot does not know about yet); otherwise the fresh one is taken as-is.
/// The result follows the server's order. A reload can therefore never
/// un-sign work already done locally, while still picking up transactions the
/// server appended since the last fetch.
pub fn merge_transactions(local: &[Transaction], fresh: Vec<Transaction>) -> Vec<Transaction> {
    fresh
        .into_iter()
        .map(|remote| {
            match local
                .iter()
                .find(|l| l.unsigned_payload == remote.unsigned_payload)
            {
                Some(existing) => existing.clone(),
                None => remote,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed(payload: &str) -> Transaction {
        let mut tx = Transaction::unsigned(payload);
        tx.signed_payload = Some(format!("sig-over-{payload}"));
        tx.status = TransactionStatus::Signed;
        tx
    }

    // ========================================================================
    // Signing tests
    // ========================================================================

    #[test]
    fn test_sign_applies_signature() {
        let mut tx = Transaction::unsigned("deadbeef");
        tx.sign(&|payload: &[u8]| -> Result<Vec<u8>, SignerError> { Ok(payload.to_vec()) })
            .unwrap();
        assert_eq!(tx.signed_payload.as_deref(), Some("deadbeef"));
        assert_eq!(tx.status, TransactionStatus::Signed);
    }

    #[test]
    fn test_sign_is_idempotent() {
        let mut tx = Transaction::unsigned("deadbeef");
        let first = |payload: &[u8]| -> Result<Vec<u8>, SignerError> { Ok(payload.to_vec()) };
        tx.sign(&first).unwrap();

        // A second signer never runs; the first signature stays.
        let second =
            |_: &[u8]| -> Result<Vec<u8>, SignerError> { Err(SignerError::SigningFailed("called twice".into())) };
        tx.sign(&second).unwrap();
        assert_eq!(tx.signed_payload.as_deref(), Some("deadbeef"));
    }

    #[test]
    fn test_sign_rejects_non_hex_payload() {
        let mut tx = Transaction::unsigned("not hex at all");
        let err = tx
            .sign(&|payload: &[u8]| -> Result<Vec<u8>, SignerError> { Ok(payload.to_vec()) })
            .unwrap_err();
        assert!(matches!(err, Error::Signing(SignerError::InvalidPayload(_))));
        assert!(!tx.is_signed());
    }

    #[test]
    fn test_sign_propagates_signer_failure() {
        let mut tx = Transaction::unsigned("deadbeef");
        let err = tx
            .sign(&|_: &[u8]| -> Result<Vec<u8>, SignerError> {
                Err(SignerError::SigningFailed("hsm offline".into()))
            })
            .unwrap_err();
        assert!(matches!(err, Error::Signing(SignerError::SigningFailed(_))));
        assert!(!tx.is_signed());
    }

    // ========================================================================
    // Merge tests
    // ========================================================================

    #[test]
    fn test_merge_preserves_local_signatures() {
        let local = vec![signed("aa"), signed("bb"), Transaction::unsigned("cc")];
        let fresh = vec![
            Transaction::unsigned("aa"),
            Transaction::unsigned("bb"),
            Transaction::unsigned("cc"),
            Transaction::unsigned("dd"),
            Transaction::unsigned("ee"),
        ];

        let merged = merge_transactions(&local, fresh);

        assert_eq!(merged.len(), 5);
        assert_eq!(merged[0].signed_payload.as_deref(), Some("sig-over-aa"));
        assert_eq!(merged[1].signed_payload.as_deref(), Some("sig-over-bb"));
        assert!(!merged[2].is_signed());
        assert!(!merged[3].is_signed());
        assert!(!merged[4].is_signed());
        let payloads: Vec<_> = merged.iter().map(|t| t.unsigned_payload.as_str()).collect();
        assert_eq!(payloads, ["aa", "bb", "cc", "dd", "ee"]);
    }

    #[test]
    fn test_merge_follows_server_order() {
        let local = vec![signed("aa"), signed("bb")];
        let fresh = vec![Transaction::unsigned("bb"), Transaction::unsigned("aa")];

        let merged = merge_transactions(&local, fresh);

        let payloads: Vec<_> = merged.iter().map(|t| t.unsigned_payload.as_str()).collect();
        assert_eq!(payloads, ["bb", "aa"]);
        assert!(merged.iter().all(Transaction::is_signed));
    }

    #[test]
    fn test_merge_drops_items_the_server_no_longer_reports() {
        let local = vec![signed("aa"), signed("bb")];
        let fresh = vec![Transaction::unsigned("bb")];

        let merged = merge_transactions(&local, fresh);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].unsigned_payload, "bb");
        assert!(merged[0].is_signed());
    }

    #[test]
    fn test_merge_with_no_local_state() {
        let fresh = vec![Transaction::unsigned("aa"), Transaction::unsigned("bb")];
        let merged = merge_transactions(&[], fresh);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|t| !t.is_signed()));
    }

    // ========================================================================
    // Serde tests
    // ========================================================================

    #[test]
    fn test_transaction_deserializes_wire_shape() {
        let tx: Transaction = serde_json::from_str(
            r#"{"status":"pending","unsigned_payload":"deadbeef"}"#,
        )
        .unwrap();
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(tx.signed_payload.is_none());
        assert!(tx.transaction_hash.is_none());
    }

    #[test]
    fn test_transaction_status_unknown_value() {
        let tx: Transaction = serde_json::from_str(
            r#"{"status":"some_future_status","unsigned_payload":"00"}"#,
        )
        .unwrap();
        assert_eq!(tx.status, TransactionStatus::Unspecified);
    }

    #[test]
    fn test_transaction_serialization_skips_absent_fields() {
        let tx = Transaction::unsigned("00ff");
        let json = serde_json::to_string(&tx).unwrap();
        assert!(!json.contains("signed_payload"));
        assert!(!json.contains("transaction_hash"));
    }
}

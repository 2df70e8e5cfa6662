//! Polling long-running operations to a terminal status.
//!
//! Transfers, trades, staking operations, and fund operations all complete
//! asynchronously on the platform side. [`wait`] drives any of them — anything
//! implementing [`Pollable`] — by reloading the server snapshot at a fixed
//! interval until the status is terminal or a timeout budget runs out.
//!
//! The caller keeps ownership of the operation: `wait` holds a `&mut` borrow
//! for its whole duration, which both rules out concurrent mutation and
//! leaves the operation inspectable after a timeout. A timeout is a reported
//! condition, not a poisoned state; waiting again on the same operation is
//! fine.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::Error;

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Timing knobs for [`wait`].
///
/// Each operation module supplies its own default timeout budget; the
/// interval defaults to [`DEFAULT_POLL_INTERVAL`].
#[derive(Clone, Copy, Debug)]
pub struct WaitOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl WaitOptions {
    /// Options with the given timeout and the default poll interval.
    pub fn new(timeout: Duration) -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout,
        }
    }

    /// Override the poll interval.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Uniform surface the poller needs from a long-running operation.
///
/// Each operation variant brings its own status enum and decides which subset
/// is terminal; `absorb` is how a fresh server snapshot replaces the local
/// one. The default `absorb` is plain replacement — operations that carry
/// signable transactions override it to reconcile instead (see
/// [`merge_transactions`](crate::types::merge_transactions)), so a reload
/// never discards a locally-applied signature.
pub trait Pollable: Sized {
    /// Human-readable operation kind, used in timeout errors.
    fn kind(&self) -> &'static str;

    /// The operation's id.
    fn id(&self) -> &str;

    /// Whether the current status will never change again.
    fn is_terminal(&self) -> bool;

    /// Replace local state with a freshly fetched snapshot.
    fn absorb(&mut self, fresh: Self) {
        *self = fresh;
    }
}

/// Poll an operation until it reaches a terminal status.
///
/// An already-terminal operation returns immediately, without calling
/// `reload`. Otherwise the loop reloads, absorbs, and sleeps until either a
/// terminal status shows up or the timeout budget is spent, at which point
/// the call fails with [`Error::WaitTimeout`] naming the operation. A reload
/// error aborts the wait and propagates as-is.
pub async fn wait<O, F, Fut>(op: &mut O, mut reload: F, options: WaitOptions) -> Result<(), Error>
where
    O: Pollable,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<O, Error>>,
{
    if op.is_terminal() {
        return Ok(());
    }

    let started = Instant::now();
    while started.elapsed() < options.timeout {
        let fresh = reload().await?;
        op.absorb(fresh);
        if op.is_terminal() {
            return Ok(());
        }
        tokio::time::sleep(options.interval).await;
    }

    Err(Error::WaitTimeout {
        kind: op.kind(),
        id: op.id().to_string(),
        timeout_secs: options.timeout.as_secs(),
    })
}

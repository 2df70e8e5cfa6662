//! Client internals: authentication, transport, pagination, and polling.
//!
//! The pieces here are deliberately independent. [`Authenticator`] only knows
//! how to stamp one request; [`ApiClient`] owns the wire and the retry
//! policy; [`fetch_all`] and [`wait`] take plain injected functions and know
//! nothing about HTTP. The operation modules in [`crate::ops`] compose them.

mod auth;
mod cdp;
mod credential;
mod http;
mod page;
mod wait;

pub use auth::{AuthHeaders, Authenticator};
pub use cdp::{Cdp, CdpBuilder, DEFAULT_BASE_URL};
pub use credential::Credential;
pub use http::{ApiClient, RetryConfig};
pub use page::{DEFAULT_PAGE_SIZE, Page, fetch_all};
pub use wait::{DEFAULT_POLL_INTERVAL, Pollable, WaitOptions, wait};

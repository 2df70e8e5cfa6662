//! The main Cdp client.

use std::sync::Arc;

use crate::client::auth::Authenticator;
use crate::client::credential::Credential;
use crate::client::http::{ApiClient, RetryConfig};
use crate::error::Error;
use crate::ops::{FundOperations, StakingOperations, Trades, Transfers};

/// Default platform API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.cdp.coinbase.com/platform";

/// The main client for the Coinbase Developer Platform.
///
/// The `Cdp` client is the single entry point for all platform operations.
/// Configure it once with a credential, then reach the operation surfaces
/// through [`transfers`](Cdp::transfers), [`trades`](Cdp::trades),
/// [`staking`](Cdp::staking), and [`funds`](Cdp::funds).
///
/// # Example
///
/// ```rust,no_run
/// use cdp_kit::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), cdp_kit::Error> {
///     let credential = Credential::from_json_file("api_key.json")?;
///     let cdp = Cdp::builder().credential(credential).build();
///
///     let mut transfer = cdp
///         .transfers()
///         .create("wallet-id", "address-id", "0.5", "eth", "0xdead...beef")
///         .await?;
///     cdp.transfers().wait(&mut transfer).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Cdp {
    api: Arc<ApiClient>,
}

impl Cdp {
    /// Create a builder with the default base URL.
    pub fn builder() -> CdpBuilder {
        CdpBuilder::new(DEFAULT_BASE_URL)
    }

    /// Create a client from a credential with all defaults.
    pub fn new(credential: Credential) -> Self {
        Self::builder().credential(credential).build()
    }

    /// Create a configured client from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `CDP_API_KEY_ID` (required): API key id.
    /// - `CDP_API_KEY_SECRET` (required): key material (EC PEM or base64
    ///   Ed25519).
    /// - `CDP_API_URL` (optional): base URL override.
    ///
    /// # Errors
    ///
    /// Returns an error if either required variable is missing or the key
    /// material does not parse.
    pub fn from_env() -> Result<Self, Error> {
        let key_id = std::env::var("CDP_API_KEY_ID").ok();
        let secret = std::env::var("CDP_API_KEY_SECRET").ok();
        let base_url = std::env::var("CDP_API_URL").ok();

        let credential = match (key_id, secret) {
            (Some(key_id), Some(secret)) => Credential::new(key_id, secret)?,
            (Some(_), None) => {
                return Err(Error::Config(
                    "CDP_API_KEY_ID is set but CDP_API_KEY_SECRET is missing".into(),
                ));
            }
            (None, Some(_)) => {
                return Err(Error::Config(
                    "CDP_API_KEY_SECRET is set but CDP_API_KEY_ID is missing".into(),
                ));
            }
            (None, None) => {
                return Err(Error::Config(
                    "CDP_API_KEY_ID and CDP_API_KEY_SECRET are not set".into(),
                ));
            }
        };

        let mut builder = Cdp::builder().credential(credential);
        if let Some(url) = base_url {
            builder = builder.base_url(url);
        }
        Ok(builder.build())
    }

    /// Get the underlying API client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    // ========================================================================
    // Operation surfaces
    // ========================================================================

    /// Transfer operations.
    pub fn transfers(&self) -> Transfers {
        Transfers::new(self.api.clone())
    }

    /// Trade operations.
    pub fn trades(&self) -> Trades {
        Trades::new(self.api.clone())
    }

    /// Staking operations.
    pub fn staking(&self) -> StakingOperations {
        StakingOperations::new(self.api.clone())
    }

    /// Fund operations.
    pub fn funds(&self) -> FundOperations {
        FundOperations::new(self.api.clone())
    }
}

/// Builder for [`Cdp`].
pub struct CdpBuilder {
    base_url: String,
    credential: Option<Credential>,
    retry_config: RetryConfig,
    debug: bool,
}

impl CdpBuilder {
    /// Create a builder with a custom base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credential: None,
            retry_config: RetryConfig::default(),
            debug: false,
        }
    }

    /// Set the API credential.
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Override the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the transport retry configuration.
    pub fn retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Log method and URL of every authenticated request.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build the client.
    ///
    /// A client built without a credential fails with
    /// [`Error::NoCredential`](crate::Error::NoCredential) on its first call.
    pub fn build(self) -> Cdp {
        let auth = self
            .credential
            .map(|credential| Authenticator::new(credential, self.debug));
        Cdp {
            api: Arc::new(ApiClient::with_retry_config(
                self.base_url,
                auth,
                self.retry_config,
            )),
        }
    }
}

impl From<CdpBuilder> for Cdp {
    fn from(builder: CdpBuilder) -> Self {
        builder.build()
    }
}

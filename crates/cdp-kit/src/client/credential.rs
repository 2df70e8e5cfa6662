//! API credentials.
//!
//! A [`Credential`] is a key id plus parsed signing material, with optional
//! source attribution for the `Correlation-Context` header. Construct one
//! directly, from the JSON key file the platform hands out at key creation,
//! or from environment variables.
//!
//! # Example
//!
//! ```rust,no_run
//! use cdp_kit::{Cdp, Credential};
//!
//! # fn example() -> Result<(), cdp_kit::Error> {
//! let credential = Credential::from_json_file("api_key.json")?
//!     .with_source("my-trading-bot")
//!     .with_source_version("1.4.0");
//!
//! let cdp = Cdp::builder().credential(credential).build();
//! # Ok(())
//! # }
//! ```

use std::fmt::{self, Debug};
use std::path::Path;

use crate::error::Error;
use crate::types::{KeyType, SecretKey};

/// An immutable API credential: key id + signing key.
#[derive(Clone)]
pub struct Credential {
    key_id: String,
    secret: SecretKey,
    source: Option<String>,
    source_version: Option<String>,
}

/// Key file format as downloaded from the platform at key creation.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyFile {
    #[serde(alias = "id")]
    name: String,
    #[serde(alias = "private_key")]
    private_key: String,
}

impl Credential {
    /// Create a credential from a key id and raw key material.
    ///
    /// The material is parsed eagerly: an EC P-256 PEM block selects ES256
    /// signing, a base64-encoded 64-byte Ed25519 secret selects EdDSA, and
    /// anything else fails with a key-format error.
    pub fn new(key_id: impl Into<String>, raw_secret: impl AsRef<str>) -> Result<Self, Error> {
        let key_id = key_id.into();
        if key_id.is_empty() {
            return Err(Error::Config("API key id is empty".to_string()));
        }
        let secret: SecretKey = raw_secret.as_ref().parse()?;
        Ok(Self {
            key_id,
            secret,
            source: None,
            source_version: None,
        })
    }

    /// Load a credential from a platform key file.
    ///
    /// Accepts both the downloaded spelling (`name`/`privateKey`) and the
    /// snake_case variant some tooling writes (`id`/`private_key`).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read key file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let key_file: KeyFile = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse key file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::new(key_file.name, key_file.private_key)
    }

    /// Load a credential from the default key file location,
    /// `~/.cdp/api_key.json`.
    #[cfg(feature = "key-file")]
    pub fn from_default_file() -> Result<Self, Error> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
        Self::from_json_file(home.join(".cdp").join("api_key.json"))
    }

    /// Load from `CDP_API_KEY_ID` and `CDP_API_KEY_SECRET` environment
    /// variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_env_vars("CDP_API_KEY_ID", "CDP_API_KEY_SECRET")
    }

    /// Load from custom environment variable names.
    pub fn from_env_vars(id_var: &str, secret_var: &str) -> Result<Self, Error> {
        let key_id = std::env::var(id_var)
            .map_err(|_| Error::Config(format!("Environment variable {} not set", id_var)))?;
        let raw_secret = std::env::var(secret_var)
            .map_err(|_| Error::Config(format!("Environment variable {} not set", secret_var)))?;
        Self::new(key_id, raw_secret)
    }

    /// Attach a source tag for the `Correlation-Context` header.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach a source version for the `Correlation-Context` header.
    pub fn with_source_version(mut self, version: impl Into<String>) -> Self {
        self.source_version = Some(version.into());
        self
    }

    /// The API key id.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// The parsed signing key.
    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// The key type of the signing material.
    pub fn key_type(&self) -> KeyType {
        self.secret.key_type()
    }

    /// The configured source tag, if any.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// The configured source version, if any.
    pub fn source_version(&self) -> Option<&str> {
        self.source_version.as_deref()
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key_id", &self.key_id)
            .field("key_type", &self.key_type())
            .field("source", &self.source)
            .field("source_version", &self.source_version)
            .finish()
    }
}

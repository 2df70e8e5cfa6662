//! Per-request JWT authentication.
//!
//! Every outbound API call carries a short-lived signed JWT in the
//! `Authorization` header and an attribution string in `Correlation-Context`.
//! Tokens are built fresh for every request and are never cached: two tokens
//! for the same request a second apart differ in `nbf`, `exp`, and nonce,
//! which keeps a captured token useless outside its 60-second window.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use reqwest::Url;
use serde::Serialize;

use crate::client::credential::Credential;
use crate::error::Error;

/// Issuer claim stamped into every token.
pub(crate) const JWT_ISSUER: &str = "coinbase-cloud";

/// Audience claim stamped into every token.
pub(crate) const JWT_AUDIENCE: &str = "cdp_service";

/// Token validity window in seconds. `exp` is always `nbf` plus this.
pub(crate) const TOKEN_TTL_SECS: u64 = 60;

const NONCE_LEN: usize = 16;
const SDK_LANGUAGE: &str = "rust";
const DEFAULT_SOURCE: &str = "cdp-kit";

/// Headers produced for one outbound request.
#[derive(Debug, Clone)]
pub struct AuthHeaders {
    /// Full `Authorization` header value, `Bearer <jwt>`.
    pub authorization: String,
    /// `Correlation-Context` header value.
    pub correlation_context: String,
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'a str,
    kid: &'a str,
    typ: &'static str,
    nonce: &'a str,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    sub: &'a str,
    iss: &'static str,
    aud: [&'static str; 1],
    nbf: u64,
    exp: u64,
    uri: &'a str,
}

/// Builds authentication headers for outbound requests.
///
/// Stateless apart from its credential; safe to call concurrently for
/// independent requests since every call allocates a fresh token.
pub struct Authenticator {
    credential: Credential,
    debug: bool,
}

impl Authenticator {
    /// Create an authenticator around a credential.
    pub fn new(credential: Credential, debug: bool) -> Self {
        Self { credential, debug }
    }

    /// The credential this authenticator signs with.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Build the headers for one request.
    pub fn authenticate(&self, method: &str, url: &Url) -> Result<AuthHeaders, Error> {
        if self.debug {
            tracing::debug!(%method, %url, "authenticating request");
        }
        let token = self.build_jwt(method, url)?;
        Ok(AuthHeaders {
            authorization: format!("Bearer {token}"),
            correlation_context: self.correlation_context(),
        })
    }

    fn build_jwt(&self, method: &str, url: &Url) -> Result<String, Error> {
        let uri = request_uri(method, url);
        let nbf = unix_now()?;
        let nonce = numeric_nonce();

        let header = JwtHeader {
            alg: self.credential.secret().jwt_alg(),
            kid: self.credential.key_id(),
            typ: "JWT",
            nonce: &nonce,
        };
        let claims = JwtClaims {
            sub: self.credential.key_id(),
            iss: JWT_ISSUER,
            aud: [JWT_AUDIENCE],
            nbf,
            exp: nbf + TOKEN_TTL_SECS,
            uri: &uri,
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?),
        );
        let signature = self.credential.secret().sign(signing_input.as_bytes())?;

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    fn correlation_context(&self) -> String {
        let mut context = format!(
            "sdk_version={},sdk_language={},source={}",
            env!("CARGO_PKG_VERSION"),
            SDK_LANGUAGE,
            self.credential.source().unwrap_or(DEFAULT_SOURCE),
        );
        if let Some(version) = self.credential.source_version() {
            context.push_str(",source_version=");
            context.push_str(version);
        }
        context
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("credential", &self.credential)
            .field("debug", &self.debug)
            .finish()
    }
}

/// The `uri` claim: method, host (with any explicit port), and path.
/// Scheme and query string are excluded.
fn request_uri(method: &str, url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{} {}:{}{}", method, host, port, url.path()),
        None => format!("{} {}{}", method, host, url.path()),
    }
}

fn unix_now() -> Result<u64, Error> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| Error::Config("System clock is set before the Unix epoch".to_string()))
}

/// 16 digits drawn uniformly from 0-9. Uniqueness inside the token's
/// 60-second window is the only requirement, so the thread RNG is enough.
fn numeric_nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..NONCE_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use p256::pkcs8::LineEnding;
    use rand::rngs::OsRng;

    fn ec_credential() -> Credential {
        let secret = p256::SecretKey::random(&mut OsRng);
        let pem = secret.to_sec1_pem(LineEnding::LF).unwrap().to_string();
        Credential::new("organizations/x/apiKeys/y", pem).unwrap()
    }

    fn ed25519_credential() -> Credential {
        let key = ed25519_dalek::SigningKey::generate(&mut OsRng);
        Credential::new("key-ed", STANDARD.encode(key.to_keypair_bytes())).unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn decode_segment(segment: &str) -> serde_json::Value {
        let bytes = URL_SAFE_NO_PAD.decode(segment).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn token_of(headers: &AuthHeaders) -> &str {
        headers.authorization.strip_prefix("Bearer ").unwrap()
    }

    // ========================================================================
    // Token shape tests
    // ========================================================================

    #[test]
    fn test_token_has_three_segments() {
        let auth = Authenticator::new(ec_credential(), false);
        let headers = auth
            .authenticate("GET", &url("https://api.cdp.coinbase.com/platform/v1/wallets"))
            .unwrap();
        let segments: Vec<_> = token_of(&headers).split('.').collect();
        assert_eq!(segments.len(), 3);
        for segment in segments {
            assert!(!segment.is_empty());
        }
    }

    #[test]
    fn test_claims_window_is_sixty_seconds() {
        let auth = Authenticator::new(ec_credential(), false);
        let headers = auth
            .authenticate("GET", &url("https://api.example.com/v1/things"))
            .unwrap();
        let claims = decode_segment(token_of(&headers).split('.').nth(1).unwrap());
        let nbf = claims["nbf"].as_u64().unwrap();
        let exp = claims["exp"].as_u64().unwrap();
        assert_eq!(exp - nbf, 60);
    }

    #[test]
    fn test_claims_content() {
        let auth = Authenticator::new(ec_credential(), false);
        let headers = auth
            .authenticate("POST", &url("https://api.example.com/v1/transfers?limit=5"))
            .unwrap();
        let claims = decode_segment(token_of(&headers).split('.').nth(1).unwrap());
        assert_eq!(claims["sub"], "organizations/x/apiKeys/y");
        assert_eq!(claims["iss"], "coinbase-cloud");
        assert_eq!(claims["aud"], serde_json::json!(["cdp_service"]));
        // Scheme stripped, query excluded.
        assert_eq!(claims["uri"], "POST api.example.com/v1/transfers");
    }

    #[test]
    fn test_uri_keeps_explicit_port() {
        let auth = Authenticator::new(ec_credential(), false);
        let headers = auth
            .authenticate("GET", &url("http://localhost:8080/v1/trades"))
            .unwrap();
        let claims = decode_segment(token_of(&headers).split('.').nth(1).unwrap());
        assert_eq!(claims["uri"], "GET localhost:8080/v1/trades");
    }

    #[test]
    fn test_header_for_ec_key() {
        let auth = Authenticator::new(ec_credential(), false);
        let headers = auth
            .authenticate("GET", &url("https://api.example.com/v1/things"))
            .unwrap();
        let header = decode_segment(token_of(&headers).split('.').next().unwrap());
        assert_eq!(header["alg"], "ES256");
        assert_eq!(header["kid"], "organizations/x/apiKeys/y");
        assert_eq!(header["typ"], "JWT");
    }

    #[test]
    fn test_header_for_ed25519_key() {
        let auth = Authenticator::new(ed25519_credential(), false);
        let headers = auth
            .authenticate("GET", &url("https://api.example.com/v1/things"))
            .unwrap();
        let header = decode_segment(token_of(&headers).split('.').next().unwrap());
        assert_eq!(header["alg"], "EdDSA");
        assert_eq!(header["kid"], "key-ed");
    }

    #[test]
    fn test_nonce_is_sixteen_digits() {
        let auth = Authenticator::new(ec_credential(), false);
        let headers = auth
            .authenticate("GET", &url("https://api.example.com/v1/things"))
            .unwrap();
        let header = decode_segment(token_of(&headers).split('.').next().unwrap());
        let nonce = header["nonce"].as_str().unwrap();
        assert_eq!(nonce.len(), 16);
        assert!(nonce.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_debug_logging_does_not_alter_tokens() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
        let auth = Authenticator::new(ec_credential(), true);
        let headers = auth
            .authenticate("GET", &url("https://api.example.com/v1/things"))
            .unwrap();
        assert!(headers.authorization.starts_with("Bearer "));
        assert_eq!(token_of(&headers).split('.').count(), 3);
    }

    #[test]
    fn test_tokens_are_never_reused() {
        // Same request, back to back: the nonce alone must differ even when
        // both tokens land in the same second.
        let auth = Authenticator::new(ec_credential(), false);
        let target = url("https://api.example.com/v1/things");
        let first = auth.authenticate("GET", &target).unwrap();
        let second = auth.authenticate("GET", &target).unwrap();
        assert_ne!(first.authorization, second.authorization);
    }

    // ========================================================================
    // Correlation-Context tests
    // ========================================================================

    #[test]
    fn test_correlation_context_defaults() {
        let auth = Authenticator::new(ec_credential(), false);
        let headers = auth
            .authenticate("GET", &url("https://api.example.com/v1/things"))
            .unwrap();
        assert_eq!(
            headers.correlation_context,
            format!(
                "sdk_version={},sdk_language=rust,source=cdp-kit",
                env!("CARGO_PKG_VERSION")
            )
        );
    }

    #[test]
    fn test_correlation_context_with_source_and_version() {
        let credential = ec_credential()
            .with_source("my-app")
            .with_source_version("3.2.1");
        let auth = Authenticator::new(credential, false);
        let headers = auth
            .authenticate("GET", &url("https://api.example.com/v1/things"))
            .unwrap();
        assert!(headers.correlation_context.ends_with("source=my-app,source_version=3.2.1"));
    }

    #[test]
    fn test_correlation_context_omits_unset_source_version() {
        let credential = ec_credential().with_source("my-app");
        let auth = Authenticator::new(credential, false);
        let headers = auth
            .authenticate("GET", &url("https://api.example.com/v1/things"))
            .unwrap();
        assert!(!headers.correlation_context.contains("source_version"));
    }
}

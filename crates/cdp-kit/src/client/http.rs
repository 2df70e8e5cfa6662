//! Low-level REST client for the platform API.

use std::time::Duration;

use reqwest::{Method, Url, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::client::auth::{AuthHeaders, Authenticator};
use crate::error::{ApiError, Error};

/// Retry configuration for API calls.
///
/// Retry lives here, in the transport; the poller and the page fetcher never
/// retry on their own.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retries.
    pub max_retries: u32,
    /// Initial delay in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

/// Error body returned by the platform on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Low-level REST client.
///
/// Every request is authenticated through the configured [`Authenticator`];
/// a fresh token is minted per attempt, retries included.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    auth: Option<Authenticator>,
    retry_config: RetryConfig,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(base_url: impl Into<String>, auth: Option<Authenticator>) -> Self {
        Self::with_retry_config(base_url, auth, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration.
    pub fn with_retry_config(
        base_url: impl Into<String>,
        auth: Option<Authenticator>,
        retry_config: RetryConfig,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            auth,
            retry_config,
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a credential has been configured.
    pub fn has_credential(&self) -> bool {
        self.auth.is_some()
    }

    /// Issue a GET request.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, Error> {
        self.request(Method::GET, path, &[], None).await
    }

    /// Issue a GET request with query parameters.
    pub async fn get_with_query<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<R, Error> {
        self.request(Method::GET, path, query, None).await
    }

    /// Issue a POST request with a JSON body.
    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, Error> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, &[], Some(body)).await
    }

    /// Make an authenticated request with retries.
    async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<R, Error> {
        let auth = self.auth.as_ref().ok_or(Error::NoCredential)?;
        let url = self.build_url(path, query)?;
        let total_attempts = self.retry_config.max_retries + 1;

        for attempt in 0..total_attempts {
            // Tokens are single-use: mint a new one per attempt.
            let headers = auth.authenticate(method.as_str(), &url)?;

            match self.try_request(&method, &url, &headers, body.as_ref()).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < total_attempts - 1 => {
                    let delay = std::cmp::min(
                        self.retry_config.initial_delay_ms * 2u64.pow(attempt),
                        self.retry_config.max_delay_ms,
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ApiError::RetriesExhausted(total_attempts).into())
    }

    /// Single request attempt.
    async fn try_request<R: DeserializeOwned>(
        &self,
        method: &Method,
        url: &Url,
        headers: &AuthHeaders,
        body: Option<&serde_json::Value>,
    ) -> Result<R, ApiError> {
        let mut builder = self
            .client
            .request(method.clone(), url.clone())
            .header(header::AUTHORIZATION, headers.authorization.as_str())
            .header("Correlation-Context", headers.correlation_context.as_str())
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(parse_error_response(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(ApiError::Json)
    }

    fn build_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, Error> {
        let mut url = Url::parse(&format!("{}{}", self.base_url.trim_end_matches('/'), path))
            .map_err(|e| Error::Config(format!("Invalid request URL: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_credential", &self.auth.is_some())
            .field("retry_config", &self.retry_config)
            .finish()
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Map a non-2xx response to an error.
///
/// Structured platform errors carry `{code, message}`; anything else is a
/// plain network error with status-based retryability.
fn parse_error_response(status: u16, body: &str) -> ApiError {
    if let Ok(error) = serde_json::from_str::<ErrorBody>(body) {
        return ApiError::Api {
            status,
            code: error.code,
            message: error.message,
        };
    }
    ApiError::network(
        format!("HTTP {}: {}", status, body),
        Some(status),
        is_retryable_status(status),
    )
}

/// Check if an HTTP status code is retryable.
fn is_retryable_status(status: u16) -> bool {
    // 408 Request Timeout - retryable
    // 429 Too Many Requests - retryable (rate limiting)
    // 5xx Server Errors - retryable
    status == 408 || status == 429 || (500..600).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::credential::Credential;
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use rand::rngs::OsRng;

    fn test_auth() -> Authenticator {
        let key = ed25519_dalek::SigningKey::generate(&mut OsRng);
        let credential =
            Credential::new("key-id", STANDARD.encode(key.to_keypair_bytes())).unwrap();
        Authenticator::new(credential, false)
    }

    // ========================================================================
    // RetryConfig tests
    // ========================================================================

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay_ms, 500);
        assert_eq!(config.max_delay_ms, 5000);
    }

    // ========================================================================
    // ApiClient tests
    // ========================================================================

    #[test]
    fn test_api_client_new() {
        let client = ApiClient::new("https://api.example.com/platform", Some(test_auth()));
        assert_eq!(client.base_url(), "https://api.example.com/platform");
        assert!(client.has_credential());
    }

    #[test]
    fn test_api_client_without_credential() {
        let client = ApiClient::new("https://api.example.com/platform", None);
        assert!(!client.has_credential());
    }

    #[tokio::test]
    async fn test_request_without_credential_fails_before_network() {
        // Unroutable base URL: the call must fail on configuration, not I/O.
        let client = ApiClient::new("https://invalid.invalid", None);
        let result: Result<serde_json::Value, Error> = client.get("/v1/wallets").await;
        assert!(matches!(result, Err(Error::NoCredential)));
    }

    #[test]
    fn test_build_url_joins_path() {
        let client = ApiClient::new("https://api.example.com/platform/", Some(test_auth()));
        let url = client.build_url("/v1/wallets", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/platform/v1/wallets");
    }

    #[test]
    fn test_build_url_appends_query() {
        let client = ApiClient::new("https://api.example.com", Some(test_auth()));
        let url = client
            .build_url(
                "/v1/wallets",
                &[("limit", "100".to_string()), ("page", "abc".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/wallets?limit=100&page=abc"
        );
    }

    #[test]
    fn test_api_client_debug_hides_auth() {
        let client = ApiClient::new("https://api.example.com", Some(test_auth()));
        let debug = format!("{:?}", client);
        assert!(debug.contains("api.example.com"));
        assert!(!debug.contains("key-id"));
    }

    // ========================================================================
    // parse_error_response tests
    // ========================================================================

    #[test]
    fn test_parse_error_response_structured() {
        let err = parse_error_response(404, r#"{"code":"not_found","message":"No such wallet"}"#);
        match err {
            ApiError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 404);
                assert_eq!(code, "not_found");
                assert_eq!(message, "No such wallet");
            }
            _ => panic!("Expected Api error, got {:?}", err),
        }
    }

    #[test]
    fn test_parse_error_response_unstructured() {
        let err = parse_error_response(502, "<html>Bad Gateway</html>");
        match err {
            ApiError::Network {
                status_code,
                retryable,
                ..
            } => {
                assert_eq!(status_code, Some(502));
                assert!(retryable);
            }
            _ => panic!("Expected Network error, got {:?}", err),
        }
    }

    #[test]
    fn test_parse_error_response_unstructured_client_error() {
        let err = parse_error_response(400, "bad request");
        match err {
            ApiError::Network { retryable, .. } => assert!(!retryable),
            _ => panic!("Expected Network error, got {:?}", err),
        }
    }

    // ========================================================================
    // is_retryable_status tests
    // ========================================================================

    #[test]
    fn test_is_retryable_status() {
        // Retryable statuses
        assert!(is_retryable_status(408)); // Request Timeout
        assert!(is_retryable_status(429)); // Too Many Requests
        assert!(is_retryable_status(500)); // Internal Server Error
        assert!(is_retryable_status(502)); // Bad Gateway
        assert!(is_retryable_status(503)); // Service Unavailable
        assert!(is_retryable_status(599)); // Edge of 5xx range

        // Non-retryable statuses
        assert!(!is_retryable_status(200)); // OK
        assert!(!is_retryable_status(400)); // Bad Request
        assert!(!is_retryable_status(401)); // Unauthorized
        assert!(!is_retryable_status(404)); // Not Found
        assert!(!is_retryable_status(422)); // Unprocessable Entity
    }
}

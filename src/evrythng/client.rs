//! ThngReader - resolves a single Thng over the platform REST API.

use std::time::Duration;

use super::model::{ErrorEnvelope, Thng};

/// The environment variable name for the platform API key.
pub const EVRYTHNG_API_KEY_ENV: &str = "EVRYTHNG_API_KEY";

/// Default base URL for the platform API.
pub const EVRYTHNG_API_BASE_URL: &str = "https://api.evrythng.com";

/// Default timeout for HTTP requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Validate a Thng id before issuing a request.
///
/// # Returns
/// `Ok(())` if the id is non-blank, `Err(ThngError::MissingThngId)` otherwise.
pub fn validate_thng_id(thng_id: &str) -> Result<(), ThngError> {
    if thng_id.trim().is_empty() {
        return Err(ThngError::MissingThngId);
    }

    Ok(())
}

/// One-shot reader for a single Thng resource.
///
/// Holds the Thng id it was created for, an optional API key, and a reusable
/// HTTP client. The id is fixed at construction; the key may be swapped
/// between reads with [`set_api_key`](Self::set_api_key).
///
/// Each [`read`](Self::read) issues at most one request and resolves exactly
/// once. There is no retry, no caching, and no cancellation beyond dropping
/// the returned future.
pub struct ThngReader {
    thng_id: String,
    api_key: Option<String>,
    base_url: String,
    http_client: reqwest::Client,
}

impl ThngReader {
    /// Create a reader for the given Thng id.
    ///
    /// The API key is taken from the `EVRYTHNG_API_KEY` environment variable
    /// if set; reads without a key are issued unauthenticated and the server
    /// decides whether the resource is visible.
    ///
    /// # Errors
    ///
    /// Returns `ThngError::Transport` if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(thng_id: String) -> Result<Self, ThngError> {
        let api_key = std::env::var(EVRYTHNG_API_KEY_ENV).ok();
        Self::with_base_url(thng_id, api_key, EVRYTHNG_API_BASE_URL.to_string())
    }

    /// Create a reader with an explicit API key.
    pub fn with_api_key(thng_id: String, api_key: String) -> Result<Self, ThngError> {
        Self::with_base_url(thng_id, Some(api_key), EVRYTHNG_API_BASE_URL.to_string())
    }

    /// Create a reader from a loaded `[api]` configuration table.
    ///
    /// Unset fields fall back to the defaults: no key, platform base URL.
    pub fn from_config(
        thng_id: String,
        api: &crate::config::ApiConfig,
    ) -> Result<Self, ThngError> {
        let base_url = api
            .base_url
            .clone()
            .unwrap_or_else(|| EVRYTHNG_API_BASE_URL.to_string());
        Self::with_base_url(thng_id, api.key.clone(), base_url)
    }

    /// Create a reader with a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(
        thng_id: String,
        api_key: Option<String>,
        base_url: String,
    ) -> Result<Self, ThngError> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            thng_id,
            api_key,
            base_url,
            http_client,
        })
    }

    /// Get the Thng id this reader was created for.
    pub fn thng_id(&self) -> &str {
        &self.thng_id
    }

    /// Get the API key, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Replace the API key used for subsequent reads.
    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = api_key;
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read the Thng from the platform.
    ///
    /// Sends `GET {base_url}/thngs/{thng_id}` with the API key in the
    /// `Authorization` header when one is configured, then classifies the
    /// response by status class:
    ///
    /// - 2xx: the body is decoded as a [`Thng`].
    /// - non-2xx: the body is decoded as an [`ErrorEnvelope`] and returned
    ///   inside `ThngError::Response`.
    ///
    /// # Errors
    ///
    /// Returns `ThngError::MissingThngId` without issuing a request if the
    /// id is blank, `ThngError::Transport` if no response was received,
    /// `ThngError::Decoding` if a received body does not match the expected
    /// schema for its status class, or `ThngError::Response` for a non-2xx
    /// response with a decodable error payload.
    pub async fn read(&self) -> Result<Thng, ThngError> {
        validate_thng_id(&self.thng_id)?;

        let url = format!("{}/thngs/{}", self.base_url, self.thng_id);

        let mut request = self
            .http_client
            .get(&url)
            .header("Accept", "application/json");
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", api_key.as_str());
        }

        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;

        log::debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        if status.is_success() {
            match serde_json::from_str::<Thng>(&body) {
                Ok(thng) => Ok(thng),
                Err(source) => Err(ThngError::Decoding { source, body }),
            }
        } else {
            log::warn!("Thng read failed with status {}: {}", status, body);
            match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(mut envelope) => {
                    envelope.raw = body;
                    Err(ThngError::Response {
                        status: status.as_u16(),
                        envelope,
                    })
                }
                Err(source) => Err(ThngError::Decoding { source, body }),
            }
        }
    }
}

/// Errors that can occur while reading a Thng.
#[derive(Debug, thiserror::Error)]
pub enum ThngError {
    /// The reader was given a blank Thng id; no request was issued.
    #[error("thng id is empty")]
    MissingThngId,

    /// The request never reached a server or no response was received.
    /// The underlying transport error is forwarded unchanged.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response was received but its body did not match the expected
    /// schema for its status class.
    #[error("failed to decode response body: {source}")]
    Decoding {
        source: serde_json::Error,
        /// The body that failed to decode.
        body: String,
    },

    /// The server answered with a non-2xx status and a decodable error
    /// payload.
    #[error("API returned {status}: {envelope}")]
    Response { status: u16, envelope: ErrorEnvelope },
}

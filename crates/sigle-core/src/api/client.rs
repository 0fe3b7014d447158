//! HTTP client for the Sigle API authentication endpoints.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use super::{ApiError, BackendSession};

// ============================================================================
// Constants
// ============================================================================

/// Default base URL of the Sigle API
pub const DEFAULT_API_URL: &str = "https://api.sigle.io";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

const CSRF_PATH: &str = "/api/auth/csrf";
const SIGN_OUT_PATH: &str = "/api/auth/signout";

#[derive(Debug, Deserialize)]
struct CsrfResponse {
    #[serde(rename = "csrfToken")]
    csrf_token: String,
}

/// API client for the Sigle backend.
/// Clone is cheap - reqwest::Client uses Arc internally, including the cookie jar.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: reqwest::Response) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .header(header::ACCEPT, "application/json")
                .send()
                .await
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response.json().await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    fn parse_csrf(response: CsrfResponse) -> Result<String> {
        if response.csrf_token.trim().is_empty() {
            return Err(ApiError::InvalidResponse("empty csrfToken".to_string()).into());
        }
        Ok(response.csrf_token)
    }
}

#[async_trait]
impl BackendSession for ApiClient {
    async fn get_nonce(&self) -> Result<String> {
        let response: CsrfResponse = self.get(&self.url(CSRF_PATH)).await?;
        let nonce = Self::parse_csrf(response)?;
        debug!("Fetched sign-in nonce");
        Ok(nonce)
    }

    async fn sign_out(&self) -> Result<()> {
        // next-auth only accepts sign-out with a CSRF token bound to the cookie
        let csrf_token = self.get_nonce().await?;
        let url = self.url(SIGN_OUT_PATH);

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .form(&[("csrfToken", csrf_token.as_str()), ("json", "true")])
            .send()
            .await
            .context("Failed to send sign-out request")?;

        Self::check_response(response).await?;
        debug!("Signed out of backend session");
        Ok(())
    }
}

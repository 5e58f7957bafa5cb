//! API client factory.
//!
//! # Responsibilities
//! - Resolve the API base URL (config first, then environment)
//! - Report a missing base URL once, at construction, without failing
//! - Send `Content-Type: application/json` on every request
//! - Join request paths onto the base URL

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::{ApiConfig, EnvVars};

/// Errors produced by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// No base URL was configured; relative requests cannot be sent.
    #[error("API base URL is not configured (set {0})")]
    MissingBaseUrl(String),

    /// Base URL and path do not form a valid URL.
    #[error("invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Building the underlying HTTP client failed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Connection, timeout or body decoding failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("API returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// HTTP client preconfigured for the app's API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Option<Url>,
    base_url_env: String,
}

impl ApiClient {
    /// Build a client from config and the loaded environment.
    ///
    /// A missing or malformed base URL is logged and leaves the client
    /// unconfigured; only a failure to build the HTTP stack is an error.
    pub fn from_config(config: &ApiConfig, env: &EnvVars) -> Result<Self, ApiError> {
        let raw = config
            .base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| env.get(&config.base_url_env));

        let base_url = match raw {
            Some(raw) => match Url::parse(raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::error!(
                        env = %config.base_url_env,
                        value = %raw,
                        error = %e,
                        "API base URL is invalid, requests will fail"
                    );
                    None
                }
            },
            None => {
                tracing::error!(env = %config.base_url_env, "{} environment variable is not set", config.base_url_env);
                None
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ApiError::Build)?;

        if let Some(url) = &base_url {
            tracing::info!(base_url = %url, "API client configured");
        }

        Ok(Self {
            client,
            base_url,
            base_url_env: config.base_url_env.clone(),
        })
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Full URL for `path`. Absolute URLs pass through unchanged.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        if let Ok(absolute) = Url::parse(path) {
            return Ok(absolute);
        }
        let base = self
            .base_url
            .as_ref()
            .ok_or_else(|| ApiError::MissingBaseUrl(self.base_url_env.clone()))?;

        let joined = combine_urls(base.as_str(), path);
        Url::parse(&joined).map_err(|source| ApiError::InvalidUrl { url: joined, source })
    }

    /// Start a request with the default headers applied.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.request(method, self.url(path)?))
    }

    /// GET `path` and decode a JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path)?.send().await?;
        decode(response).await
    }

    /// POST `body` as JSON to `path` and decode a JSON body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(Method::POST, path)?.json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status { status, body });
    }
    Ok(response.json().await?)
}

/// Join with exactly one slash between base and path.
pub fn combine_urls(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

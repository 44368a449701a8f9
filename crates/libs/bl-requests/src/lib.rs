//! HTTP client library for the build lights watcher.
//!
//! A small wrapper around reqwest used both to query the build server and to
//! drive network attached indicator devices.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bl_requests::ApiClient;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new("https://ci.example.com", Duration::from_secs(10))?;
//! let data: serde_json::Value = client.get("api/json", &[("tree", "jobs[name]")]).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{StatusCode, header};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// Request errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The client could not be built.
    #[error("Failed to build http client - {0}")]
    Client(reqwest::Error),

    /// No response within the configured timeout.
    #[error("Request to {0} timed out")]
    Timeout(String),

    /// Connection refused, reset, dns failure and friends.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non success status.
    #[error("{url} answered {status}")]
    Status { url: String, status: StatusCode },

    /// The body could not be decoded.
    #[error("Malformed response from {url} - {source}")]
    Malformed {
        url: String,
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns true when the server reported it cannot serve requests right now.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, Error::Status { status, .. } if status.is_server_error())
    }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Basic auth credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub token: Option<String>,
}

/// HTTP client for making API requests with JSON and form support.
#[derive(Debug, Clone)]
pub struct ApiClient {
    url: String,
    credentials: Option<Credentials>,
    pub client: reqwest::Client,
}

impl ApiClient {
    /// Creates a new API client with the given base URL and request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let client = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(Error::Client)?;
        Ok(Self {
            url: url.into().trim_end_matches('/').to_string(),
            credentials: None,
            client,
        })
    }

    /// Authenticate every request with basic auth.
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Base url this client was created with.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Constructs the full URL path for an endpoint.
    fn path(&self, endpoint: &str) -> String {
        if endpoint.is_empty() {
            format!("{}/", self.url)
        } else {
            format!("{}/{}", self.url, endpoint.trim_start_matches('/'))
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(credentials) => request.basic_auth(&credentials.user, credentials.token.as_ref()),
            None => request,
        }
    }

    async fn send(&self, url: &str, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = self.authorize(request).send().await.map_err(|err| {
            if err.is_timeout() {
                Error::Timeout(url.to_string())
            } else {
                Error::Transport(err)
            }
        })?;
        let status = response.status();
        trace!("{url} answered {status}");
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    /// Makes a GET request with query parameters and deserializes the JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.path(endpoint);
        debug!("GET {url}");
        let response = self.send(&url, self.client.get(&url).query(params)).await?;
        let body = response.text().await.map_err(|err| {
            if err.is_timeout() {
                Error::Timeout(url.clone())
            } else {
                Error::Transport(err)
            }
        })?;
        serde_json::from_str(&body).map_err(|source| Error::Malformed { url, source })
    }

    /// POSTs `fields` as an `application/x-www-form-urlencoded` body.
    pub async fn post_form(
        &self,
        endpoint: &str,
        fields: &[(String, String)],
    ) -> Result<StatusCode> {
        let url = self.path(endpoint);
        debug!("POST {url} with {} field(s)", fields.len());
        let response = self.send(&url, self.client.post(&url).form(fields)).await?;
        Ok(response.status())
    }
}

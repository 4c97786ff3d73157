//! HTTP client wrapper

use cbnode_errors::{Error, NetworkError};
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600), // packages are several hundred MB
            connect_timeout: Duration::from_secs(30),
            user_agent: format!("cbnode/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

/// HTTP client wrapper
///
/// Requests are attempted once. Up to `max_redirects` redirects are followed;
/// a redirect chain longer than that (or a loop) fails with
/// `NetworkError::RedirectFailed`. A failed request is reported, never retried.
#[derive(Clone)]
pub struct NetClient {
    client: Client,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: &NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| NetworkError::DownloadFailed(format!("client setup: {e}")))?;

        Ok(Self { client })
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, connection failure or any other transport
    /// error. HTTP error statuses are returned as a normal response.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| map_transport_error(url, &e))
    }
}

pub(crate) fn map_transport_error(url: &str, e: &reqwest::Error) -> Error {
    if e.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
        .into()
    } else if e.is_connect() {
        NetworkError::ConnectionRefused(format!("{url}: {e}")).into()
    } else if e.is_redirect() {
        NetworkError::RedirectFailed {
            url: url.to_string(),
            message: e.to_string(),
        }
        .into()
    } else {
        NetworkError::DownloadFailed(format!("{url}: {e}")).into()
    }
}

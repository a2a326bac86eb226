//! Asset fetch capability

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::FetchError;

/// Timeout applied to every request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// GitHub rejects API requests without a user agent
pub const USER_AGENT: &str = concat!("easyinstall/", env!("CARGO_PKG_VERSION"));

/// Fetch a URL into memory
pub trait AssetFetch {
    /// GET `url` and return the full body
    ///
    /// The body is returned as received. There is no length or checksum
    /// verification.
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`AssetFetch`] over a blocking reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client with [`REQUEST_TIMEOUT`] and [`USER_AGENT`]
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Build a client with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl AssetFetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })?;
        log::debug!("{} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

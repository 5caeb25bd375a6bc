//! Single HTTP GET against the catalog with explicit timeouts.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::{config::Settings, error::FetchError};

#[async_trait]
pub trait BookFetcher: Send + Sync {
    /// Body text on HTTP 200, a typed failure otherwise.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

pub struct HttpBookFetcher {
    client: Client,
}

impl HttpBookFetcher {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()
            .map_err(|err| FetchError::Connection(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Self::new(settings.connect_timeout(), settings.read_timeout())
    }
}

#[async_trait]
impl BookFetcher for HttpBookFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let started = Instant::now();
        debug!(%url, "requesting volumes");

        // The response owns the connection; every return below drops it.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "catalog returned non-200 status");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(classify)?;
        debug!(
            %url,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "received volumes response"
        );
        Ok(body)
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Connection(err.to_string())
    }
}

#[cfg(test)]
#[path = "tests/fetch_tests.rs"]
mod tests;

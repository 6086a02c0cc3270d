//! Retried, size-bounded asset downloads.

use crate::config::CrawlConfig;
use crate::error::{AssetError, CloneError};
use std::future::Future;
use std::time::Duration;

/// Downloads the bytes behind a URL. `None` means the asset should be skipped.
pub trait FetchAsset: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Option<Vec<u8>>> + Send;
}

/// Asset fetcher backed by reqwest
#[derive(Clone)]
pub struct AssetFetcher {
    client: reqwest::Client,
    max_bytes: u64,
    attempts: u32,
    backoff_base: Duration,
}

impl AssetFetcher {
    /// Fails only when the HTTP client cannot be built (bad user agent, TLS setup)
    pub fn new(
        max_bytes: u64,
        attempts: u32,
        backoff_base: Duration,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, CloneError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            max_bytes,
            attempts: attempts.max(1),
            backoff_base,
        })
    }

    pub fn from_config(config: &CrawlConfig) -> Result<Self, CloneError> {
        Self::new(
            config.max_asset_size_bytes,
            config.retry_attempts,
            Duration::from_millis(config.retry_base_ms),
            config.timeout(),
            &config.user_agent,
        )
    }

    /// Download with retries. Oversized assets fail immediately without retrying.
    pub async fn try_fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let mut attempt = 0u32;
        loop {
            match self.fetch_once(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(e @ AssetError::TooLarge { .. }) => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.attempts {
                        return Err(e);
                    }
                    let delay = self.backoff_base * 2u32.pow(attempt - 1);
                    ::log::debug!(
                        "Retrying {} in {:?} (attempt {} of {}): {}",
                        url,
                        delay,
                        attempt + 1,
                        self.attempts,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let download_error = |detail: String| AssetError::Download {
            url: url.to_string(),
            detail,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(format!("HTTP {}", status.as_u16())));
        }

        // Reject on the length hint before reading the body
        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(AssetError::TooLarge {
                    url: url.to_string(),
                    size: length,
                    max: self.max_bytes,
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| download_error(e.to_string()))?
        {
            body.extend_from_slice(&chunk);
            if body.len() as u64 > self.max_bytes {
                return Err(AssetError::TooLarge {
                    url: url.to_string(),
                    size: body.len() as u64,
                    max: self.max_bytes,
                });
            }
        }

        Ok(body)
    }
}

impl FetchAsset for AssetFetcher {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        match self.try_fetch(url).await {
            Ok(bytes) => {
                ::log::debug!("Downloaded {} ({} bytes)", url, bytes.len());
                Some(bytes)
            }
            Err(e) => {
                ::log::warn!("Skipping asset: {}", e);
                None
            }
        }
    }
}

// src/services/fetch.rs
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use std::time::Duration;

use crate::error::{Result, SyncError};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Returns the body of `url`, failing on transport errors and non-success statuses.
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        info!("Fetching document from URL: {}", url);

        let body = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| SyncError::from_reqwest(url, e))?
            .text()
            .await
            .map_err(|e| SyncError::from_reqwest(url, e))?;

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

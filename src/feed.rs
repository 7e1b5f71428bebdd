use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::config::Feed;
use crate::model::ScanRecord;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("feed body is not a JSON array of scan records: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client for the scanner feed endpoint.
pub struct FeedClient {
    http: Client,
    url: String,
}

impl FeedClient {
    pub fn new(cfg: &Feed) -> Result<Self, FeedError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("scan-reportbot/0.1")
            .build()?;
        Ok(Self {
            http,
            url: cfg.url.clone(),
        })
    }

    /// Fetch the whole feed in one GET.
    ///
    /// Any failure degrades to an empty record set: a broken feed reads as
    /// "no data today", not a crashed run. The next scheduled invocation is
    /// the retry mechanism.
    pub async fn fetch(&self) -> Vec<ScanRecord> {
        match self.try_fetch().await {
            Ok(records) => {
                info!(count = records.len(), "fetched scan records");
                records
            }
            Err(err) => {
                error!(%err, url = %self.url, "failed to fetch scan feed; continuing with no records");
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self) -> Result<Vec<ScanRecord>, FeedError> {
        let res = self.http.get(&self.url).send().await?;
        if !res.status().is_success() {
            return Err(FeedError::Status(res.status()));
        }
        // Read the body as text first so a decode failure carries the JSON
        // error rather than a bare transport error.
        let body = res.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

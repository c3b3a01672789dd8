//! Feed sources
//!
//! HTTP download of the CSV feeds, behind a trait so the updater can be
//! driven from memory in tests.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

use super::IngestError;

/// Something that can produce the body of a feed URL
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fetch the full CSV body behind `url`
    async fn fetch(&self, url: &str) -> Result<String, IngestError>;
}

/// Downloads feeds over HTTP(S)
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    /// Create a source whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, IngestError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("covid-dash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IngestError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str) -> Result<String, IngestError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                IngestError::Timeout(url.to_string())
            } else {
                IngestError::Fetch {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| IngestError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Serves fixed bodies keyed by URL
#[derive(Debug, Clone, Default)]
pub struct StaticFeedSource {
    bodies: HashMap<String, String>,
}

impl StaticFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: serve `body` for `url`
    pub fn with_feed(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, url: &str) -> Result<String, IngestError> {
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| IngestError::Fetch {
                url: url.to_string(),
                message: "no such feed".to_string(),
            })
    }
}

//! Page Fetcher
//!
//! Source of page detail payloads for the preloader.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::PreloadError;

// == Page Fetcher Trait ==
/// Fetches the detail payload of one page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, page_id: &str) -> Result<Value, PreloadError>;
}

// == HTTP Page Fetcher ==
/// Fetches `<base_url>/page/<id>` and decodes the JSON body.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    base_url: String,
}

impl HttpPageFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// URL the detail payload of `page_id` is fetched from.
    pub fn page_url(&self, page_id: &str) -> String {
        format!("{}/page/{}", self.base_url, page_id)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, page_id: &str) -> Result<Value, PreloadError> {
        let response = self.client.get(self.page_url(page_id)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreloadError::Status(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}

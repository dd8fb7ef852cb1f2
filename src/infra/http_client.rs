use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::app::ports::Fetcher;
use crate::config::Config;
use crate::error::{Result, ScraperError};
use crate::types::FetchedPage;

/// `Fetcher` backed by reqwest, with the configured timeout and client signature
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let parsed = Url::parse(url)?;
        let resp = self.client.get(parsed).send().await?;
        let status = resp.status();
        // Redirects are followed; relative links resolve against where we landed
        let final_url = resp.url().clone();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                status: status.as_u16(),
                url: final_url.to_string(),
            });
        }
        let body = resp.text().await?;
        debug!("HTTP response: status={}, size={} bytes, final_url={}", status, body.len(), final_url);
        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            body,
        })
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants::USER_AGENT;
use crate::error::{Result, ScraperError};

/// Pipeline settings. Every field has a default, so a partial `config.toml` is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listing page used by the binary when `--url` is not given
    pub source_url: Option<String>,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Attempts for the initial source fetch; detail pages are fetched once
    pub fetch_attempts: u32,
    pub retry_pause_ms: u64,
    pub max_candidates: usize,
    /// Listing pages followed from a site home page
    pub max_listing_pages: usize,
    /// Run-wide cap on detail-page fetches
    pub max_detail_fetches: usize,
    /// Pause between consecutive detail-page fetches
    pub enrich_delay_ms: u64,
    pub excerpt_max_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: None,
            user_agent: USER_AGENT.to_string(),
            request_timeout_secs: 20,
            fetch_attempts: 2,
            retry_pause_ms: 1000,
            max_candidates: 300,
            max_listing_pages: 60,
            max_detail_fetches: 100,
            enrich_delay_ms: 600,
            excerpt_max_chars: 500,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `SOURCE_URL` and `MAX_DETAIL_FETCHES` from the environment (and `.env`).
    pub fn with_env_overrides(mut self) -> Result<Self> {
        dotenv::dotenv().ok();
        if let Ok(url) = std::env::var("SOURCE_URL") {
            if !url.trim().is_empty() {
                self.source_url = Some(url.trim().to_string());
            }
        }
        if let Ok(raw) = std::env::var("MAX_DETAIL_FETCHES") {
            self.max_detail_fetches = raw.trim().parse().map_err(|_| {
                ScraperError::Config(format!("MAX_DETAIL_FETCHES must be an integer, got '{}'", raw))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch_attempts == 0 {
            return Err(ScraperError::Config("fetch_attempts must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ScraperError::Config("request_timeout_secs must be at least 1".to_string()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ScraperError::Config("user_agent must not be empty".to_string()));
        }
        if self.excerpt_max_chars == 0 {
            return Err(ScraperError::Config("excerpt_max_chars must be positive".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_pause(&self) -> Duration {
        Duration::from_millis(self.retry_pause_ms)
    }

    pub fn enrich_delay(&self) -> Duration {
        Duration::from_millis(self.enrich_delay_ms)
    }
}

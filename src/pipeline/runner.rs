use std::sync::Arc;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::processing::dedup::Deduplicator;
use super::processing::enrich::{apply_excerpt_fallback, extract_detail, fill};
use super::processing::records::records_from_candidate;
use crate::apis::ExtractorRegistry;
use crate::app::ports::{Clock, Fetcher};
use crate::config::Config;
use crate::error::{Result, ScraperError};
use crate::infra::{ReqwestFetcher, SystemClock};
use crate::types::{is_detail_url, EventRecord, FetchedPage};

/// State owned by one invocation of the pipeline. Never shared between runs.
#[derive(Debug, Default)]
struct RunState {
    seen: Deduplicator,
    detail_fetches: usize,
}

/// Listing page in, deduplicated and enriched event records out
pub struct Pipeline {
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    clock: Arc<dyn Clock>,
    registry: ExtractorRegistry,
}

impl Pipeline {
    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>, clock: Arc<dyn Clock>) -> Self {
        let registry = ExtractorRegistry::new(config.max_candidates);
        Self {
            config,
            fetcher,
            clock,
            registry,
        }
    }

    /// Pipeline with the HTTP fetcher and the system clock
    pub fn with_defaults(config: Config) -> Result<Self> {
        let fetcher = Arc::new(ReqwestFetcher::new(&config)?);
        Ok(Self::new(config, fetcher, Arc::new(SystemClock)))
    }

    /// Replaces the candidate extractors, e.g. to register an extra site
    pub fn with_registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn normalize(&self, source_url: &str) -> Result<Vec<EventRecord>> {
        self.normalize_with_cancel(source_url, &CancellationToken::new()).await
    }

    /// Runs the whole pipeline on one listing page.
    ///
    /// Only the listing fetch is fatal. Once `cancel` is set no new fetch starts and the
    /// records gathered so far are returned.
    #[instrument(skip(self, cancel))]
    pub async fn normalize_with_cancel(&self, source_url: &str, cancel: &CancellationToken) -> Result<Vec<EventRecord>> {
        Url::parse(source_url)?;
        let today = self.clock.today();
        info!("Starting run for {}", source_url);

        let page = self.fetch_source(source_url, cancel).await?;
        let mut state = RunState::default();
        let mut records = Vec::new();
        self.collect_records(&page, today, &mut state, &mut records);
        info!("{} records after deduplication", records.len());

        self.enrich(&mut records, &mut state, today, cancel).await;

        info!(
            "Run finished: {} records, {} detail pages fetched",
            records.len(),
            state.detail_fetches
        );
        Ok(records)
    }

    pub async fn normalize_site(&self, hub_url: &str) -> Result<Vec<EventRecord>> {
        self.normalize_site_with_cancel(hub_url, &CancellationToken::new()).await
    }

    /// Follows the listing links of a site home page and runs every listing through one
    /// shared run state, so deduplication and the detail-fetch cap span the whole site.
    ///
    /// The hub fetch is fatal; a listing that fails to load is skipped. A hub without
    /// listing links is treated as a listing itself.
    #[instrument(skip(self, cancel))]
    pub async fn normalize_site_with_cancel(&self, hub_url: &str, cancel: &CancellationToken) -> Result<Vec<EventRecord>> {
        Url::parse(hub_url)?;
        let today = self.clock.today();
        info!("Starting site run from {}", hub_url);

        let hub = self.fetch_source(hub_url, cancel).await?;
        let mut listings = self.registry.select(&hub.url).listing_links(&hub);
        listings.truncate(self.config.max_listing_pages);

        let mut state = RunState::default();
        let mut records = Vec::new();
        if listings.is_empty() {
            info!("No listing links on {}, reading it as a listing", hub.url);
            self.collect_records(&hub, today, &mut state, &mut records);
        } else {
            info!("Following {} listing pages from {}", listings.len(), hub.url);
        }

        for (i, listing) in listings.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.enrich_delay()).await;
            }
            if cancel.is_cancelled() {
                info!("Run cancelled after {} listing pages", i);
                break;
            }
            match self.fetcher.fetch(listing).await {
                Ok(page) => self.collect_records(&page, today, &mut state, &mut records),
                Err(e) => warn!("Skipping listing {}: {}", listing, e),
            }
        }
        info!("{} records after deduplication", records.len());

        self.enrich(&mut records, &mut state, today, cancel).await;

        info!(
            "Site run finished: {} records, {} detail pages fetched",
            records.len(),
            state.detail_fetches
        );
        Ok(records)
    }

    /// Extract, split and deduplicate the announcements of one listing page
    fn collect_records(&self, page: &FetchedPage, today: NaiveDate, state: &mut RunState, records: &mut Vec<EventRecord>) {
        let extractor = self.registry.select(&page.url);
        let candidates = extractor.extract(page);
        info!("{} extractor found {} candidates on {}", extractor.name(), candidates.len(), page.url);

        for candidate in &candidates {
            for record in records_from_candidate(candidate, today, self.config.excerpt_max_chars) {
                if state.seen.insert(&record) {
                    records.push(record);
                } else {
                    debug!("Dropping duplicate record '{}'", record.title);
                }
            }
        }
    }

    async fn fetch_source(&self, url: &str, cancel: &CancellationToken) -> Result<FetchedPage> {
        let attempts = self.config.fetch_attempts.max(1);
        let mut attempt = 1;
        loop {
            if cancel.is_cancelled() {
                return Err(ScraperError::Cancelled(url.to_string()));
            }
            match self.fetcher.fetch(url).await {
                Ok(page) => return Ok(page),
                Err(e @ (ScraperError::Network(_) | ScraperError::HttpStatus { .. })) if attempt < attempts => {
                    warn!("Fetch attempt {}/{} for {} failed: {}", attempt, attempts, url, e);
                    attempt += 1;
                    tokio::time::sleep(self.config.retry_pause()).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Detail-page pass. Records pointing at a detail page are enriched while the run's
    /// fetch budget lasts; every other record gets the excerpt-only pass.
    async fn enrich(&self, records: &mut [EventRecord], state: &mut RunState, today: NaiveDate, cancel: &CancellationToken) {
        for record in records.iter_mut() {
            let Some(url) = record.url.clone().filter(|u| is_detail_url(u)) else {
                apply_excerpt_fallback(record, today);
                continue;
            };
            if state.detail_fetches >= self.config.max_detail_fetches {
                apply_excerpt_fallback(record, today);
                continue;
            }
            if state.detail_fetches > 0 {
                tokio::time::sleep(self.config.enrich_delay()).await;
            }
            if cancel.is_cancelled() {
                apply_excerpt_fallback(record, today);
                continue;
            }

            state.detail_fetches += 1;
            match self.fetcher.fetch(&url).await {
                Ok(page) => {
                    fill(record, extract_detail(&page, today));
                    debug!("Enriched '{}' from {}", record.title, url);
                }
                Err(e) => warn!("Enrichment of {} failed, keeping listing fields: {}", url, e),
            }
        }
    }
}

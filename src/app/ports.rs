use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::types::FetchedPage;

/// HTTP GET capability used for listing and detail pages
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, failing with `Network` on transport errors or `HttpStatus` on non-2xx.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// Source of "today", used to resolve year-less and relative dates
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

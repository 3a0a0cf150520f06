pub mod config;
pub mod crawl;
pub mod fetch;
pub mod property_ie;
mod user_agent;

use async_trait::async_trait;
use dubprop_core::{Listing, ListingTable, Result};
use std::sync::Arc;
use url::Url;

pub use config::{CrawlConfig, CrawlMode};
pub use fetch::{HttpFetcher, MemoryFetcher, PageFetcher};
pub use property_ie::PropertyIeScraper;
pub use user_agent::UserAgentPool;

/// Enum representing the supported listing sites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScraperType {
    /// property.ie - Irish property-for-sale listings
    PropertyIe,
}

/// Everything read from one results page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    pub listings: Vec<Listing>,
    /// Raw href of the "Next" pagination link, if any.
    pub next_href: Option<String>,
    /// Number shown on the pagination link just before "Next".
    pub page_count: Option<u32>,
}

/// Trait for scraping listings from a paginated results site
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Name of the site this scraper reads
    fn source_name(&self) -> &'static str;

    /// Where pages are fetched from
    fn fetcher(&self) -> &dyn PageFetcher;

    /// Parse one results page
    fn parse_page(&self, html: &str) -> Result<ParsedPage>;

    /// Fetch and parse a single page; `None` if the page could not be fetched
    async fn scrape_page(&self, url: &Url) -> Result<Option<ParsedPage>> {
        match self.fetcher().fetch(url).await {
            Some(html) => self.parse_page(&html).map(Some),
            None => Ok(None),
        }
    }

    /// Crawl every results page reachable from the configured start URL
    async fn crawl(&self, config: &CrawlConfig) -> Result<ListingTable> {
        match config.mode {
            CrawlMode::Follow => crawl::follow_next_links(self, config).await,
            CrawlMode::Paged => crawl::fetch_all_pages(self, config).await,
        }
    }
}

/// Factory for creating scraper instances
pub struct ScraperFactory;

impl ScraperFactory {
    /// Create a scraper that fetches over HTTP
    pub fn create_scraper(scraper_type: ScraperType) -> Result<Arc<dyn Scraper>> {
        Self::with_fetcher(scraper_type, Arc::new(HttpFetcher::new()?))
    }

    /// Create a scraper that reads pages from the given fetcher
    pub fn with_fetcher(scraper_type: ScraperType, fetcher: Arc<dyn PageFetcher>) -> Result<Arc<dyn Scraper>> {
        match scraper_type {
            ScraperType::PropertyIe => Ok(Arc::new(PropertyIeScraper::new(fetcher)?)),
        }
    }
}

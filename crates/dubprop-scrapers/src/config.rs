use dubprop_core::{DubpropError, Result};
use url::Url;

pub const DEFAULT_START_URL: &str = "https://www.property.ie/property-for-sale/dublin/";
pub const DEFAULT_PAGE_TEMPLATE: &str =
    "https://www.property.ie/property-for-sale/dublin/price_international_rental-onceoff_standard/p_{page}/";
/// Placeholder replaced by the page number in a page template.
pub const PAGE_TOKEN: &str = "{page}";
pub const REFERER: &str = "https://www.google.com/";

/// How result pages are discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CrawlMode {
    /// Follow the "Next" link from page to page.
    Follow,
    /// Read the page count from the first page and fetch the rest concurrently.
    Paged,
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub start_url: Url,
    pub page_template: String,
    pub mode: CrawlMode,
    pub concurrency: usize,
    pub max_pages: Option<u32>,
}

impl CrawlConfig {
    pub fn new(start_url: &str, page_template: &str, mode: CrawlMode) -> Result<Self> {
        if !page_template.contains(PAGE_TOKEN) {
            return Err(DubpropError::Scraping(format!(
                "page template must contain {}: {}",
                PAGE_TOKEN, page_template
            )));
        }

        Ok(Self {
            start_url: Url::parse(start_url)?,
            page_template: page_template.to_string(),
            mode,
            concurrency: default_concurrency(),
            max_pages: None,
        })
    }

    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> Self {
        if let Some(concurrency) = concurrency {
            self.concurrency = concurrency.max(1);
        }
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// The URL of page `page` built from the template.
    pub fn page_url(&self, page: u32) -> Result<Url> {
        let url = self.page_template.replace(PAGE_TOKEN, &page.to_string());
        Ok(Url::parse(&url)?)
    }
}

/// Worker count for paged crawls: available cores plus four, capped at 32.
pub fn default_concurrency() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cores + 4).min(32)
}

//! Page discovery strategies.

use crate::{CrawlConfig, ParsedPage, Scraper};
use dubprop_core::{DubpropError, ListingTable, Result};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tracing::{info, warn};
use url::Url;

/// Walks the "Next" links one page at a time, starting at the configured URL.
///
/// Stops at the last page, at `max_pages`, at the first page that cannot be
/// fetched, or at a Next link that does not resolve. Listings already
/// collected are kept in every case.
pub async fn follow_next_links<S>(scraper: &S, config: &CrawlConfig) -> Result<ListingTable>
where
    S: Scraper + ?Sized,
{
    let mut table = ListingTable::new();
    let mut visited = HashSet::new();
    let mut next = Some(config.start_url.clone());
    let mut pages = 0u32;

    while let Some(url) = next.take() {
        if config.max_pages.map_or(false, |max| pages >= max) {
            info!("Reached the limit of {} pages", pages);
            break;
        }
        if !visited.insert(url.clone()) {
            warn!("Pagination loops back to {}, stopping", url);
            break;
        }

        info!("Scraping page {}: {}", pages + 1, url);
        let Some(page) = scraper.scrape_page(&url).await? else {
            if pages == 0 {
                return Err(start_page_unavailable(&url));
            }
            warn!("Skipping {} and the pages after it", url);
            break;
        };

        pages += 1;
        info!("Found {} listings", page.listings.len());
        table.extend(page.listings);

        next = match page.next_href {
            Some(href) => match url.join(&href) {
                Ok(next_url) => Some(next_url),
                Err(e) => {
                    warn!("Invalid next link {:?} on {}: {}, stopping", href, url, e);
                    None
                }
            },
            None => {
                info!("No more pages after page {}", pages);
                None
            }
        };
    }

    info!("Scraped {} listings from {} pages", table.len(), pages);
    Ok(table)
}

/// Reads the page count from the first page, then fetches pages `2..=N` from
/// the page template with at most `concurrency` requests in flight.
///
/// Results are appended in page order once every request has finished.
/// Pages that fail are left out; they never abort the batch.
pub async fn fetch_all_pages<S>(scraper: &S, config: &CrawlConfig) -> Result<ListingTable>
where
    S: Scraper + ?Sized,
{
    info!("Scraping first page: {}", config.start_url);
    let first = scraper
        .scrape_page(&config.start_url)
        .await?
        .ok_or_else(|| start_page_unavailable(&config.start_url))?;

    let mut last_page = first.page_count.unwrap_or(1);
    if let Some(max) = config.max_pages {
        last_page = last_page.min(max);
    }

    let urls = (2..=last_page)
        .map(|page| config.page_url(page))
        .collect::<Result<Vec<Url>>>()?;
    info!(
        "Fetching {} more pages with {} workers",
        urls.len(),
        config.concurrency
    );

    let mut table = ListingTable::new();
    table.extend(first.listings);

    let fetches = urls.into_iter().map(|url| async move {
        match scraper.scrape_page(&url).await {
            Ok(Some(page)) => Some(page),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to parse {}: {}", url, e);
                None
            }
        }
    });
    let pages: Vec<Option<ParsedPage>> = stream::iter(fetches)
        .buffered(config.concurrency.max(1))
        .collect()
        .await;

    let fetched = pages.iter().filter(|page| page.is_some()).count();
    for page in pages.into_iter().flatten() {
        table.extend(page.listings);
    }

    info!(
        "Scraped {} listings from {} of {} pages",
        table.len(),
        fetched + 1,
        last_page
    );
    Ok(table)
}

fn start_page_unavailable(url: &Url) -> DubpropError {
    DubpropError::Scraping(format!("could not fetch start page {}", url))
}

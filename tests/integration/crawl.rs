use dubprop_integration_tests::{page_url, site, ListingHtml, PAGE_TEMPLATE, START_URL};
use dubprop_scrapers::{CrawlConfig, CrawlMode, MemoryFetcher, ScraperFactory, ScraperType};
use std::sync::Arc;

fn config(mode: CrawlMode) -> CrawlConfig {
    CrawlConfig::new(START_URL, PAGE_TEMPLATE, mode).unwrap()
}

fn urls(listings: &[ListingHtml]) -> Vec<String> {
    listings.iter().map(ListingHtml::url).collect()
}

#[tokio::test]
async fn test_follow_mode_collects_every_page_in_order() {
    let (fetcher, expected) = site(5, 4);
    let fetcher = Arc::new(fetcher);
    let scraper = ScraperFactory::with_fetcher(ScraperType::PropertyIe, fetcher.clone()).unwrap();

    let table = scraper.crawl(&config(CrawlMode::Follow)).await.unwrap();

    let scraped: Vec<String> = table.iter().map(|l| l.url.clone()).collect();
    assert_eq!(scraped, urls(&expected));
    assert_eq!(fetcher.requests().len(), 5);
}

#[tokio::test]
async fn test_paged_mode_matches_follow_mode() {
    let (fetcher, _) = site(6, 3);
    let scraper = ScraperFactory::with_fetcher(ScraperType::PropertyIe, Arc::new(fetcher)).unwrap();

    let followed = scraper.crawl(&config(CrawlMode::Follow)).await.unwrap();
    let paged = scraper
        .crawl(&config(CrawlMode::Paged).with_concurrency(Some(3)))
        .await
        .unwrap();

    assert_eq!(paged.len(), 18);
    assert_eq!(followed, paged);
}

#[tokio::test]
async fn test_paged_mode_skips_failed_pages() {
    let (full, expected) = site(4, 2);
    let scraper = ScraperFactory::with_fetcher(ScraperType::PropertyIe, Arc::new(full)).unwrap();
    let complete = scraper.crawl(&config(CrawlMode::Paged)).await.unwrap();
    assert_eq!(complete.len(), expected.len());

    // Rebuild the site without page 3.
    let mut partial = MemoryFetcher::new();
    for page in [1u32, 2, 4] {
        let listings = &expected[(page as usize - 1) * 2..page as usize * 2];
        let url = if page == 1 { START_URL.to_string() } else { page_url(page) };
        partial = partial.with_page(&url, dubprop_integration_tests::results_page(listings, page, 4));
    }
    let scraper = ScraperFactory::with_fetcher(ScraperType::PropertyIe, Arc::new(partial)).unwrap();

    let table = scraper.crawl(&config(CrawlMode::Paged)).await.unwrap();
    assert_eq!(table.len(), 6);
    assert!(table.iter().all(|l| !l.url.contains("listing-4/") && !l.url.contains("listing-5/")));
}

#[tokio::test]
async fn test_parsed_fields_are_normalized() {
    let (fetcher, _) = site(1, 3);
    let scraper = ScraperFactory::with_fetcher(ScraperType::PropertyIe, Arc::new(fetcher)).unwrap();

    let table = scraper.crawl(&config(CrawlMode::Follow)).await.unwrap();
    let first = table.iter().next().unwrap();

    assert_eq!(first.address, "0 Canal View, Dublin 2");
    assert_eq!(first.postcode, "2");
    assert_eq!(first.normalized_postcode(), "D02");
    assert_eq!(first.price, 250_000);
    assert_eq!(first.ber, "A2");
    assert_eq!(first.bedrooms, "1");
    assert_eq!(first.bathrooms, "1");
    assert_eq!(first.property, "Terraced House For Sale");
}

use dubprop_core::transform::{BER_BLOCK, POSTCODE_BLOCK, PROPERTY_BLOCK};
use dubprop_core::{transform, CleanTable, ListingTable};
use dubprop_integration_tests::{listing, site, PAGE_TEMPLATE, START_URL};
use dubprop_scrapers::{CrawlConfig, CrawlMode, ScraperFactory, ScraperType};
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn test_scrape_save_and_transform() {
    let temp_dir = tempdir().unwrap();
    let raw_path = temp_dir.path().join("results.json");
    let clean_path = temp_dir.path().join("clean.csv");

    let (fetcher, _) = site(12, 10);
    let scraper = ScraperFactory::with_fetcher(ScraperType::PropertyIe, Arc::new(fetcher)).unwrap();
    let config = CrawlConfig::new(START_URL, PAGE_TEMPLATE, CrawlMode::Paged).unwrap();

    let table = scraper.crawl(&config).await.unwrap();
    assert_eq!(table.len(), 120);
    table.save(&raw_path).unwrap();

    let raw = ListingTable::load(&raw_path).unwrap();
    assert_eq!(raw, table);

    let clean = transform(raw.as_slice());
    assert_eq!(clean.len(), 120);
    clean.write_csv(&clean_path).unwrap();

    let loaded = CleanTable::read_csv(&clean_path).unwrap();
    assert_eq!(loaded, clean);
    assert_eq!(
        loaded.block(POSTCODE_BLOCK).unwrap().categories,
        ["D02", "D04", "D06", "D08", "D12"]
    );
    assert_eq!(loaded.block(BER_BLOCK).unwrap().categories, ["A2", "B3", "C1"]);
    assert_eq!(loaded.block(PROPERTY_BLOCK).unwrap().categories, ["Terraced House"]);
}

#[test]
fn test_csv_raw_artifact_feeds_transform() {
    let temp_dir = tempdir().unwrap();
    let raw_path = temp_dir.path().join("results.csv");

    let table: ListingTable = (0..110).map(|n| listing(n, 300_000, "6", "House For Sale")).collect();
    table.save(&raw_path).unwrap();

    let clean = transform(ListingTable::load(&raw_path).unwrap().as_slice());
    assert_eq!(clean.len(), 110);
}

#[test]
fn test_zero_price_and_group_listings_are_removed() {
    let mut listings: Vec<_> = (0..120).map(|n| listing(n, 320_000, "8", "Apartment For Sale")).collect();
    let free = listing(900, 0, "8", "Apartment For Sale");
    let group = listing(901, 150_000, "8", "XYZ Group For Sale");
    let kept = listing(902, 410_000, "8", "Apartment For Sale");
    listings.extend([free.clone(), group.clone(), kept.clone()]);

    let clean = transform(&listings);
    let urls: Vec<&str> = clean.records().iter().map(|r| r.url.as_str()).collect();

    assert_eq!(clean.len(), 121);
    assert!(!urls.contains(&free.url.as_str()));
    assert!(!urls.contains(&group.url.as_str()));
    assert!(urls.contains(&kept.url.as_str()));
}

#[test]
fn test_boundaries_and_exhaustive_encoding() {
    let mut listings: Vec<_> = (0..150).map(|n| listing(n, 300_000 + n as u64, ["1", "7", "24"][n % 3], "Bungalow For Sale")).collect();
    listings[0].price = 700_000;
    listings[1].bedrooms = "7".to_string();
    listings[2].bathrooms = "5".to_string();
    listings[3].ber.clear();

    let clean = transform(&listings);
    assert_eq!(clean.len(), 147);
    assert!(clean.records().iter().all(|r| r.price < 700_000.0 && r.bedrooms < 7.0 && r.bathrooms < 5.0));
    assert!(clean.records().iter().any(|r| r.ber == "Unrated"));

    for record in clean.records() {
        for block in clean.blocks() {
            let indicators = clean.indicators(record, &block.name).unwrap();
            assert_eq!(indicators.iter().filter(|v| **v).count(), 1);
        }
    }
}

#[test]
fn test_second_pass_keeps_row_count() {
    let mut listings: Vec<_> = (0..200).map(|n| listing(n, 280_000, ["3", "5"][n % 2], "Detached House For Sale")).collect();
    for n in 0..15 {
        let mut unlabeled = listing(500 + n, 520_000, "", "Detached House For Sale");
        unlabeled.address = format!("{} Church Road, Lucan", n);
        listings.push(unlabeled);
    }

    let first = transform(&listings);
    assert_eq!(first.len(), 215);
    assert_eq!(first.records().iter().filter(|r| r.postcode == "Lucan").count(), 15);

    let second = transform(&first.to_listings());
    assert_eq!(second.len(), first.len());
}

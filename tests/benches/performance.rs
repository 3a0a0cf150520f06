use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dubprop_core::{transform, Listing};
use dubprop_scrapers::{CrawlConfig, CrawlMode, MemoryFetcher, ScraperFactory, ScraperType};
use fake::faker::address::en::StreetName;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

const START_URL: &str = "https://www.property.ie/property-for-sale/dublin/";
const PAGE_TEMPLATE: &str = "https://www.property.ie/property-for-sale/dublin/p_{page}/";
const PROPERTY_TYPES: [&str; 4] = [
    "Terraced House For Sale",
    "Semi-Detached House For Sale",
    "Apartment For Sale",
    "Detached House For Sale",
];
const BER_RATINGS: [&str; 6] = ["A2", "B3", "C1", "C3", "D1", ""];

// Helper function to generate fake raw listings
fn generate_fake_listings(count: usize) -> Vec<Listing> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|n| {
            let district = rng.gen_range(1..=24);
            let street: String = StreetName().fake();
            Listing {
                url: format!("https://www.property.ie/property-for-sale/listing-{}/", n),
                price: rng.gen_range(100_000..1_500_000),
                address: format!("{} {}, Dublin {}", n, street, district),
                postcode: if rng.gen_bool(0.9) { district.to_string() } else { String::new() },
                property: PROPERTY_TYPES.choose(&mut rng).copied().unwrap_or_default().to_string(),
                bedrooms: rng.gen_range(1..9).to_string(),
                bathrooms: rng.gen_range(1..6).to_string(),
                ber: BER_RATINGS.choose(&mut rng).copied().unwrap_or_default().to_string(),
            }
        })
        .collect()
}

// Helper function to render listings as a results page
fn results_page(listings: &[Listing], page: u32, last: u32) -> String {
    let body: String = listings
        .iter()
        .map(|l| {
            format!(
                r#"<div class="search_result">
                    <h2><a href="{}">{}, Ireland</a></h2>
                    <h3>€{}</h3>
                    <div class="ber-search-results"><img src="/static/ber_{}.png"></div>
                    <h4>{} Bed, {} Bath, {}</h4>
                </div>"#,
                l.url, l.address, l.price, l.ber, l.bedrooms, l.bathrooms, l.property
            )
        })
        .collect();

    let mut pagination: String = (1..=last)
        .map(|n| format!(r#"<a href="/property-for-sale/dublin/p_{n}/">{n}</a>"#))
        .collect();
    if page < last {
        pagination.push_str(&format!(r#"<a href="/property-for-sale/dublin/p_{}/">Next &gt;</a>"#, page + 1));
    }

    format!(r#"<html><body>{}<div id="pages">{}</div></body></html>"#, body, pagination)
}

fn fake_site(pages: u32, per_page: usize) -> MemoryFetcher {
    (1..=pages).fold(MemoryFetcher::new(), |fetcher, page| {
        let url = if page == 1 {
            START_URL.to_string()
        } else {
            PAGE_TEMPLATE.replace("{page}", &page.to_string())
        };
        fetcher.with_page(&url, results_page(&generate_fake_listings(per_page), page, pages))
    })
}

fn bench_parse_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let scraper = ScraperFactory::with_fetcher(ScraperType::PropertyIe, Arc::new(MemoryFetcher::new())).unwrap();

    for size in [10, 20, 100].iter() {
        let html = results_page(&generate_fake_listings(*size), 1, 57);
        group.bench_with_input(BenchmarkId::new("results_page", size), &html, |b, html| {
            b.iter(|| black_box(scraper.parse_page(html).unwrap()));
        });
    }

    group.finish();
}

fn bench_transform_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");

    for size in [100, 1000, 10000].iter() {
        let listings = generate_fake_listings(*size);
        group.bench_with_input(BenchmarkId::new("clean", size), &listings, |b, listings| {
            b.iter(|| black_box(transform(listings)));
        });
    }

    group.finish();
}

fn bench_crawl_operations(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("crawl");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    let scraper = ScraperFactory::with_fetcher(ScraperType::PropertyIe, Arc::new(fake_site(20, 20))).unwrap();
    for mode in [CrawlMode::Follow, CrawlMode::Paged] {
        let config = CrawlConfig::new(START_URL, PAGE_TEMPLATE, mode).unwrap();
        group.bench_with_input(BenchmarkId::new("site", format!("{:?}", mode)), &config, |b, config| {
            b.to_async(&rt).iter(|| async { black_box(scraper.crawl(config).await.unwrap()) });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_operations,
    bench_transform_operations,
    bench_crawl_operations
);

criterion_main!(benches);

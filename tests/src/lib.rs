//! Shared fixtures for the integration suite.

use dubprop_core::Listing;
use dubprop_scrapers::MemoryFetcher;

pub const START_URL: &str = "https://www.property.ie/property-for-sale/dublin/";
pub const PAGE_TEMPLATE: &str = "https://www.property.ie/property-for-sale/dublin/p_{page}/";

/// One listing as it appears on a results page.
#[derive(Debug, Clone)]
pub struct ListingHtml {
    pub slug: String,
    pub address: String,
    pub price: String,
    pub ber: Option<String>,
    pub summary: String,
}

impl ListingHtml {
    pub fn new(slug: &str, address: &str, price: &str, ber: Option<&str>, summary: &str) -> Self {
        Self {
            slug: slug.to_string(),
            address: address.to_string(),
            price: price.to_string(),
            ber: ber.map(str::to_string),
            summary: summary.to_string(),
        }
    }

    pub fn url(&self) -> String {
        format!("https://www.property.ie/property-for-sale/{}/", self.slug)
    }

    fn render(&self) -> String {
        let badge = self
            .ber
            .as_ref()
            .map(|ber| {
                format!(
                    r#"<div class="ber-search-results"><img src="https://www.property.ie/static/ber_{}.png"></div>"#,
                    ber
                )
            })
            .unwrap_or_default();

        format!(
            r#"<div class="search_result">
                <h2><a href="{}">{}</a></h2>
                <h3>{}</h3>
                {}
                <h4>
                    {}
                </h4>
            </div>"#,
            self.url(),
            self.address,
            self.price,
            badge,
            self.summary
        )
    }
}

pub fn page_url(page: u32) -> String {
    PAGE_TEMPLATE.replace("{page}", &page.to_string())
}

/// A results page; `page` and `last` drive the pagination block.
pub fn results_page(listings: &[ListingHtml], page: u32, last: u32) -> String {
    let mut pagination = String::from(r#"<div id="pages">"#);
    for n in 1..=last {
        pagination.push_str(&format!(r#"<a href="/property-for-sale/dublin/p_{n}/">{n}</a>"#));
    }
    if page < last {
        pagination.push_str(&format!(
            r#"<a href="/property-for-sale/dublin/p_{}/">Next &gt;</a>"#,
            page + 1
        ));
    }
    pagination.push_str("</div>");

    let body: String = listings.iter().map(ListingHtml::render).collect();
    format!("<html><body><div id=\"results\">{}</div>{}</body></html>", body, pagination)
}

/// A site of `pages` results pages with `per_page` listings each.
///
/// Page 1 is served at [`START_URL`]; later pages at the template URLs.
pub fn site(pages: u32, per_page: usize) -> (MemoryFetcher, Vec<ListingHtml>) {
    let districts = ["2", "4", "6", "8", "12"];
    let mut fetcher = MemoryFetcher::new();
    let mut all = Vec::new();

    for page in 1..=pages {
        let listings: Vec<ListingHtml> = (0..per_page)
            .map(|i| {
                let n = (page as usize - 1) * per_page + i;
                ListingHtml::new(
                    &format!("listing-{}", n),
                    &format!("{} Canal View, Dublin {}, Ireland", n, districts[n % districts.len()]),
                    &format!("€{},000", 250 + n % 300),
                    Some(["A2", "B3", "C1"][n % 3]),
                    &format!("{} Bed, {} Bath, Terraced House For Sale", 1 + n % 4, 1 + n % 2),
                )
            })
            .collect();

        let html = results_page(&listings, page, pages);
        let url = if page == 1 { START_URL.to_string() } else { page_url(page) };
        fetcher = fetcher.with_page(&url, html);
        all.extend(listings);
    }

    (fetcher, all)
}

/// A raw listing with sensible defaults for pipeline tests.
pub fn listing(n: usize, price: u64, postcode: &str, property: &str) -> Listing {
    Listing {
        url: format!("https://www.property.ie/property-for-sale/listing-{}/", n),
        price,
        address: format!("{} Canal View, Dublin {}", n, postcode),
        postcode: postcode.to_string(),
        property: property.to_string(),
        bedrooms: (1 + n % 4).to_string(),
        bathrooms: (1 + n % 2).to_string(),
        ber: ["A2", "B3", "C1"][n % 3].to_string(),
    }
}

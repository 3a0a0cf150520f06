use crate::fetch::PageFetcher;
use crate::{ParsedPage, Scraper};
use async_trait::async_trait;
use dubprop_core::{DubpropError, Listing, Result};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::debug;

lazy_static! {
    static ref BER_RE: Regex = Regex::new(r"ber_(.*?)\.").unwrap();
    static ref BEDROOMS_RE: Regex = Regex::new(r"(\d+) Bed").unwrap();
    static ref BATHROOMS_RE: Regex = Regex::new(r"(\d+) Bath").unwrap();
    static ref POSTCODE_RE: Regex = Regex::new(r"Dublin (\d+)").unwrap();
}

const ADDRESS_NOISE: [&str; 4] = [", Ireland", ", Co. Dublin", "\\", "\n"];
const NEXT_MARKER: &str = "Next";

/// Compiled CSS selectors for a property.ie results page.
#[derive(Debug)]
struct Selectors {
    listing_item: Selector,
    link: Selector,
    price: Selector,
    ber_image: Selector,
    summary: Selector,
    pagination: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            listing_item: parse_selector("div.search_result")?,
            link: parse_selector("h2 a")?,
            price: parse_selector("h3")?,
            ber_image: parse_selector(".ber-search-results img")?,
            summary: parse_selector("h4")?,
            pagination: parse_selector("#pages a")?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| DubpropError::Selector(e.to_string()))
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

/// Keeps only the digits of a price; anything unreadable is zero.
pub fn parse_price(text: &str) -> u64 {
    text.chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

/// Extracts the rating code from a BER badge image URL such as `.../ber_B3.png`.
pub fn parse_ber(src: &str) -> String {
    BER_RE
        .captures(src)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

pub fn clean_address(text: &str) -> String {
    ADDRESS_NOISE
        .iter()
        .fold(text.to_string(), |address, noise| address.replace(noise, ""))
        .trim()
        .to_string()
}

/// The Dublin district number in an address, or an empty string.
pub fn extract_postcode(address: &str) -> String {
    POSTCODE_RE
        .captures(address)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Bedrooms, bathrooms and property type from a summary line like
/// `"3 Bed, 2 Bath, Semi-Detached House For Sale"`.
pub fn parse_summary(text: &str) -> (String, String, String) {
    let summary = text.replace('\n', "");
    let summary = summary.trim();

    let capture = |re: &Regex| {
        re.captures(summary)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };
    let property = summary.split(',').last().unwrap_or_default().trim().to_string();

    (capture(&BEDROOMS_RE), capture(&BATHROOMS_RE), property)
}

pub struct PropertyIeScraper {
    fetcher: Arc<dyn PageFetcher>,
    selectors: Selectors,
}

impl PropertyIeScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        Ok(Self {
            fetcher,
            selectors: Selectors::new()?,
        })
    }

    /// Reads every field from inside one listing node, so a listing with a
    /// missing badge or summary cannot shift values onto its neighbours.
    fn parse_listing(&self, item: ElementRef) -> Listing {
        let link = item.select(&self.selectors.link).next();

        let url = link
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default()
            .to_string();

        let address = link
            .map(element_text)
            .map(|text| clean_address(&text))
            .unwrap_or_default();

        let price = item.select(&self.selectors.price)
            .next()
            .map(element_text)
            .map(|text| parse_price(&text))
            .unwrap_or(0);

        let ber = item.select(&self.selectors.ber_image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(parse_ber)
            .unwrap_or_default();

        let (bedrooms, bathrooms, property) = item.select(&self.selectors.summary)
            .next()
            .map(element_text)
            .map(|text| parse_summary(&text))
            .unwrap_or_default();

        let postcode = extract_postcode(&address);

        Listing {
            url,
            price,
            address,
            postcode,
            property,
            bedrooms,
            bathrooms,
            ber,
        }
    }

    /// Href of the "Next" pagination link and the number on the link before it.
    fn parse_pagination(&self, document: &Html) -> (Option<String>, Option<u32>) {
        let anchors: Vec<ElementRef> = document.select(&self.selectors.pagination).collect();
        let Some(next_idx) = anchors
            .iter()
            .position(|a| element_text(*a).contains(NEXT_MARKER))
        else {
            return (None, None);
        };

        let next_href = anchors[next_idx].value().attr("href").map(str::to_string);
        let page_count = next_idx
            .checked_sub(1)
            .and_then(|i| element_text(anchors[i]).trim().parse().ok());

        (next_href, page_count)
    }
}

#[async_trait]
impl Scraper for PropertyIeScraper {
    fn source_name(&self) -> &'static str {
        "property.ie"
    }

    fn fetcher(&self) -> &dyn PageFetcher {
        self.fetcher.as_ref()
    }

    fn parse_page(&self, html: &str) -> Result<ParsedPage> {
        let document = Html::parse_document(html);

        let listings: Vec<Listing> = document
            .select(&self.selectors.listing_item)
            .map(|item| self.parse_listing(item))
            .collect();
        let (next_href, page_count) = self.parse_pagination(&document);

        debug!(
            "Parsed {} listings, next page: {:?}, page count: {:?}",
            listings.len(),
            next_href,
            page_count
        );
        Ok(ParsedPage {
            listings,
            next_href,
            page_count,
        })
    }
}

use serde::{Deserialize, Serialize};

mod error;
mod table;
pub mod onehot;
pub mod transform;
pub mod dashboard;
mod display;

pub use error::{DubpropError, Result};
pub use table::ListingTable;
pub use onehot::{OneHotBlock, OneHotEncoder};
pub use transform::{transform, CleanRecord, CleanTable};
pub use dashboard::{DashboardState, FilterControls, RangeSlider, SearchFilter, SearchRow, Summary};
pub use display::{create_search_table, create_summary_table, SearchTableRow};

/// Postcode assigned to listings whose address carries no Dublin district.
pub const UNKNOWN_POSTCODE: &str = "D00";

/// A single listing as scraped from a results page.
///
/// Text fields that could not be found are empty strings; a price that could
/// not be read is zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Price")]
    pub price: u64,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Postcode")]
    pub postcode: String,
    #[serde(rename = "Property")]
    pub property: String,
    #[serde(rename = "Bedrooms")]
    pub bedrooms: String,
    #[serde(rename = "Bathrooms")]
    pub bathrooms: String,
    #[serde(rename = "BER")]
    pub ber: String,
}

impl Listing {
    /// The postcode in `Dnn` form.
    pub fn normalized_postcode(&self) -> String {
        normalize_postcode(&self.postcode)
    }
}

/// Turns raw district digits into a `Dnn` code.
///
/// Empty input maps to [`UNKNOWN_POSTCODE`]. Values that are not purely
/// numeric (already normalized codes, suburb names) pass through unchanged.
pub fn normalize_postcode(raw: &str) -> String {
    let raw = raw.trim();
    if raw.chars().all(|c| c.is_ascii_digit()) {
        format!("D{:0>2}", raw)
    } else {
        raw.to_string()
    }
}

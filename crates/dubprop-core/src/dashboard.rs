//! Application state and filtering behind the search view.
//!
//! Tables are loaded once per source path and shared behind an `Arc`; a
//! filter change re-applies every mask to the cached rows.

use crate::{normalize_postcode, CleanTable, Listing, ListingTable, Result};
use colored::Colorize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub const PRICE_STEP: u64 = 5_000;
const MISSING_POSTCODE: &str = "NA";

/// A loaded value remembered together with the key it was loaded from.
#[derive(Debug)]
pub struct TableCache<K, T> {
    entry: Option<(K, Arc<T>)>,
}

impl<K: PartialEq + Clone, T> TableCache<K, T> {
    pub fn new() -> Self {
        Self { entry: None }
    }

    /// Returns the cached value for `key`, loading it on first use or when
    /// the key differs from the cached one.
    pub fn get_or_load<F>(&mut self, key: &K, load: F) -> Result<Arc<T>>
    where
        F: FnOnce(&K) -> Result<T>,
    {
        if let Some((cached_key, value)) = &self.entry {
            if cached_key == key {
                return Ok(Arc::clone(value));
            }
        }

        let value = Arc::new(load(key)?);
        self.entry = Some((key.clone(), Arc::clone(&value)));
        Ok(value)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

impl<K: PartialEq + Clone, T> Default for TableCache<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A raw listing prepared for display and filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRow {
    pub url: String,
    pub price: Option<f64>,
    pub address: String,
    pub postcode: String,
    pub property: String,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub ber: Option<String>,
}

impl From<&Listing> for SearchRow {
    fn from(listing: &Listing) -> Self {
        let postcode = if listing.postcode.trim().is_empty() {
            MISSING_POSTCODE.to_string()
        } else {
            normalize_postcode(&listing.postcode)
        };

        Self {
            url: listing.url.clone(),
            price: Some(listing.price as f64),
            address: listing.address.clone(),
            postcode,
            property: listing.property.clone(),
            bedrooms: listing.bedrooms.trim().parse().ok(),
            bathrooms: listing.bathrooms.trim().parse().ok(),
            ber: Some(listing.ber.trim().to_string()).filter(|ber| !ber.is_empty()),
        }
    }
}

/// An integer slider with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSlider {
    pub min: u64,
    pub max: u64,
    pub step: u64,
}

impl RangeSlider {
    fn from_max(max: Option<f64>, step: u64) -> Self {
        let max = max.map(|m| m.max(1.0) as u64).unwrap_or(1);
        Self { min: 1, max, step }
    }

    pub fn full(&self) -> (u64, u64) {
        (self.min, self.max)
    }

    /// Keeps a selection inside the slider bounds. Bounds off the step grid
    /// are kept as given.
    pub fn clamp(&self, low: u64, high: u64) -> (u64, u64) {
        let low = low.clamp(self.min, self.max);
        let high = high.clamp(self.min, self.max);
        (low.min(high), high)
    }
}

/// The choices offered by the search view, derived from the loaded rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterControls {
    /// Leading empty entry means "any".
    pub ber_options: Vec<String>,
    /// Leading empty entry means "any".
    pub postcode_options: Vec<String>,
    pub bedrooms: RangeSlider,
    pub bathrooms: RangeSlider,
    pub price: RangeSlider,
}

impl FilterControls {
    pub fn from_rows(rows: &[SearchRow]) -> Self {
        let options = |values: BTreeSet<&str>| {
            std::iter::once(String::new())
                .chain(values.into_iter().map(str::to_string))
                .collect::<Vec<_>>()
        };
        let max = |f: fn(&SearchRow) -> Option<f64>| rows.iter().filter_map(f).reduce(f64::max);

        Self {
            ber_options: options(rows.iter().filter_map(|r| r.ber.as_deref()).collect()),
            postcode_options: options(rows.iter().map(|r| r.postcode.as_str()).collect()),
            bedrooms: RangeSlider::from_max(max(|r| r.bedrooms), 1),
            bathrooms: RangeSlider::from_max(max(|r| r.bathrooms), 1),
            price: RangeSlider::from_max(max(|r| r.price), PRICE_STEP),
        }
    }
}

/// Current selections of the search controls.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub ber: Option<String>,
    pub postcode: Option<String>,
    pub price: (u64, u64),
    pub bedrooms: (u64, u64),
    pub bathrooms: (u64, u64),
    controls: FilterControls,
}

impl SearchFilter {
    /// Selects everything the controls allow.
    pub fn new(controls: &FilterControls) -> Self {
        Self {
            ber: None,
            postcode: None,
            price: controls.price.full(),
            bedrooms: controls.bedrooms.full(),
            bathrooms: controls.bathrooms.full(),
            controls: controls.clone(),
        }
    }

    pub fn with_ber(mut self, ber: Option<&str>) -> Self {
        self.ber = ber.filter(|b| !b.is_empty()).map(str::to_string);
        self
    }

    pub fn with_postcode(mut self, postcode: Option<&str>) -> Self {
        self.postcode = postcode.filter(|p| !p.is_empty()).map(str::to_string);
        self
    }

    pub fn with_price_range(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        let slider = self.controls.price;
        self.price = slider.clamp(min.unwrap_or(slider.min), max.unwrap_or(slider.max));
        self
    }

    pub fn with_bedroom_range(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        let slider = self.controls.bedrooms;
        self.bedrooms = slider.clamp(min.unwrap_or(slider.min), max.unwrap_or(slider.max));
        self
    }

    pub fn with_bathroom_range(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        let slider = self.controls.bathrooms;
        self.bathrooms = slider.clamp(min.unwrap_or(slider.min), max.unwrap_or(slider.max));
        self
    }

    pub fn controls(&self) -> &FilterControls {
        &self.controls
    }

    fn matches(&self, row: &SearchRow) -> bool {
        let within = |value: Option<f64>, (low, high): (u64, u64)| {
            value.map_or(false, |v| v >= low as f64 && v <= high as f64)
        };

        within(row.price, self.price)
            && within(row.bedrooms, self.bedrooms)
            && within(row.bathrooms, self.bathrooms)
            && self.postcode.as_ref().map_or(true, |p| &row.postcode == p)
            && self.ber.as_ref().map_or(true, |b| row.ber.as_ref() == Some(b))
    }

    /// Filters all rows from scratch.
    pub fn apply<'a>(&self, rows: &'a [SearchRow]) -> Vec<&'a SearchRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

/// Per-postcode figures shown on the overview.
#[derive(Debug, Clone, PartialEq)]
pub struct PostcodeSummary {
    pub postcode: String,
    pub listings: usize,
    pub median_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub raw_rows: usize,
    pub clean_rows: usize,
    pub median_price: Option<f64>,
    pub postcodes: Vec<PostcodeSummary>,
}

impl Summary {
    pub fn new(rows: &[SearchRow], clean: &CleanTable) -> Self {
        let mut by_postcode: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for row in rows {
            let prices = by_postcode.entry(row.postcode.as_str()).or_default();
            if let Some(price) = row.price.filter(|p| *p > 0.0) {
                prices.push(price);
            }
        }

        let all_prices: Vec<f64> = by_postcode.values().flatten().copied().collect();
        let postcodes = by_postcode
            .into_iter()
            .map(|(postcode, prices)| PostcodeSummary {
                postcode: postcode.to_string(),
                listings: rows.iter().filter(|r| r.postcode == postcode).count(),
                median_price: median(prices),
            })
            .collect();

        Self {
            raw_rows: rows.len(),
            clean_rows: clean.len(),
            median_price: median(all_prices),
            postcodes,
        }
    }

    pub fn headline(&self) -> String {
        let median = self
            .median_price
            .map(|p| format!("€{}k", (p / 1000.0).round() as i64))
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "{}\n{} listings scraped, {} clean rows, median asking price {}",
            "Dublin Property Prices".bold(),
            self.raw_rows,
            self.clean_rows,
            median
        )
    }
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Explicit state for the search view: where the artifacts live and the
/// tables loaded from them.
#[derive(Debug)]
pub struct DashboardState {
    raw_path: PathBuf,
    clean_path: PathBuf,
    raw: TableCache<PathBuf, Vec<SearchRow>>,
    clean: TableCache<PathBuf, CleanTable>,
}

impl DashboardState {
    pub fn new(raw_path: impl Into<PathBuf>, clean_path: impl Into<PathBuf>) -> Self {
        Self {
            raw_path: raw_path.into(),
            clean_path: clean_path.into(),
            raw: TableCache::new(),
            clean: TableCache::new(),
        }
    }

    pub fn set_raw_path(&mut self, path: impl Into<PathBuf>) {
        self.raw_path = path.into();
    }

    pub fn raw_rows(&mut self) -> Result<Arc<Vec<SearchRow>>> {
        self.raw.get_or_load(&self.raw_path, |path| {
            debug!("Loading raw listings from {}", path.display());
            let table = ListingTable::load(path)?;
            Ok(table.iter().map(SearchRow::from).collect())
        })
    }

    pub fn clean_table(&mut self) -> Result<Arc<CleanTable>> {
        self.clean.get_or_load(&self.clean_path, |path| {
            debug!("Loading clean table from {}", path.display());
            CleanTable::read_csv(path)
        })
    }

    /// Drops both cached tables so the next access reads the files again.
    pub fn invalidate(&mut self) {
        self.raw.invalidate();
        self.clean.invalidate();
    }

    pub fn controls(&mut self) -> Result<FilterControls> {
        Ok(FilterControls::from_rows(&self.raw_rows()?))
    }

    pub fn search(&mut self, filter: &SearchFilter) -> Result<Vec<SearchRow>> {
        let rows = self.raw_rows()?;
        Ok(filter.apply(&rows).into_iter().cloned().collect())
    }

    pub fn summary(&mut self) -> Result<Summary> {
        let rows = self.raw_rows()?;
        let clean = self.clean_table()?;
        Ok(Summary::new(&rows, &clean))
    }
}

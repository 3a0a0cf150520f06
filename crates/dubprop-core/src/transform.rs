//! Cleaning and one-hot encoding of the raw listings table.
//!
//! The steps run in a fixed order and several of them depend on the rows
//! that survived the previous one, so reordering them changes the output.

use crate::onehot::{OneHotBlock, OneHotEncoder};
use crate::{normalize_postcode, DubpropError, Listing, Result, UNKNOWN_POSTCODE};
use csv::{Reader, Writer};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Minimum occurrences for a postcode re-derived from the address.
pub const MIN_DERIVED_POSTCODE_COUNT: usize = 10;
/// Prices at or above this are treated as outliers.
pub const MAX_PRICE: f64 = 700_000.0;
/// Minimum occurrences for a property type to stay in the clean table.
pub const MIN_PROPERTY_COUNT: usize = 100;
pub const MAX_BEDROOMS: f64 = 7.0;
pub const MAX_BATHROOMS: f64 = 5.0;

pub const UNRATED_BER: &str = "Unrated";
const BULK_LISTING_MARKER: &str = "Group";
const PROPERTY_SUFFIX: &str = " For Sale";

pub const POSTCODE_BLOCK: &str = "Postcode";
pub const BER_BLOCK: &str = "BER";
pub const PROPERTY_BLOCK: &str = "Property";

const FIXED_COLUMNS: [&str; 7] = ["URL", "Price", "Postcode", "Property", "Bedrooms", "Bathrooms", "BER"];

/// A listing after type coercion; `None` marks a missing value.
#[derive(Debug, Clone)]
struct WorkingRow {
    url: Option<String>,
    price: Option<f64>,
    address: Option<String>,
    postcode: Option<String>,
    property: Option<String>,
    bedrooms: Option<f64>,
    bathrooms: Option<f64>,
    ber: Option<String>,
}

impl WorkingRow {
    fn coerce(listing: &Listing) -> Self {
        Self {
            url: non_empty(&listing.url),
            price: Some(listing.price as f64),
            address: non_empty(&listing.address),
            postcode: non_empty(&listing.normalized_postcode()),
            property: non_empty(&listing.property),
            bedrooms: parse_number(&listing.bedrooms),
            bathrooms: parse_number(&listing.bathrooms),
            ber: non_empty(&listing.ber),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One row of the clean table.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub url: String,
    pub price: f64,
    pub postcode: String,
    pub property: String,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub ber: String,
    /// Indicator values for every block, concatenated in block order.
    pub indicators: Vec<bool>,
}

/// Numeric columns plus the Postcode, BER and Property one-hot blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanTable {
    blocks: Vec<OneHotBlock>,
    records: Vec<CleanRecord>,
}

/// Runs the full cleaning pipeline over a raw listings table.
pub fn transform(listings: &[Listing]) -> CleanTable {
    info!("Transforming {} raw listings", listings.len());

    let rows: Vec<WorkingRow> = listings
        .iter()
        .filter(|listing| listing.price > 0)
        .map(WorkingRow::coerce)
        .collect();
    debug!("{} rows with a positive price", rows.len());

    let rows = repair_postcodes(rows);
    debug!("{} rows after postcode repair", rows.len());

    let mut rows: Vec<WorkingRow> = rows
        .into_iter()
        .filter(|row| row.price.map_or(false, |price| price < MAX_PRICE))
        .filter(|row| {
            !row.property
                .as_deref()
                .map_or(false, |property| property.contains(BULK_LISTING_MARKER))
        })
        .collect();
    debug!("{} rows after outlier removal", rows.len());

    for row in &mut rows {
        if let Some(property) = row.property.as_mut() {
            *property = property.replace(PROPERTY_SUFFIX, "");
        }
        if row.ber.is_none() {
            row.ber = Some(UNRATED_BER.to_string());
        }
    }

    let postcode = OneHotEncoder::fit(rows.iter().map(|row| row.postcode.as_deref()));
    let ber = OneHotEncoder::fit(rows.iter().map(|row| row.ber.as_deref()));
    let property = OneHotEncoder::fit(rows.iter().map(|row| row.property.as_deref()));

    let mut records: Vec<CleanRecord> = rows
        .into_iter()
        .filter_map(|row| {
            let mut indicators = postcode.transform(row.postcode.as_deref());
            indicators.extend(ber.transform(row.ber.as_deref()));
            indicators.extend(property.transform(row.property.as_deref()));

            Some(CleanRecord {
                url: row.url?,
                price: row.price?,
                postcode: row.postcode?,
                property: row.property?,
                bedrooms: row.bedrooms?,
                bathrooms: row.bathrooms?,
                ber: row.ber?,
                indicators,
            })
        })
        .collect();
    debug!("{} rows without missing values", records.len());

    records.retain(|record| record.bedrooms < MAX_BEDROOMS && record.bathrooms < MAX_BATHROOMS);
    debug!("{} rows after bedroom and bathroom limits", records.len());

    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in &records {
        *counts.entry(record.property.clone()).or_default() += 1;
    }
    records.retain(|record| counts[&record.property] >= MIN_PROPERTY_COUNT);

    info!("Clean table has {} rows", records.len());
    CleanTable {
        blocks: vec![
            postcode.into_block(POSTCODE_BLOCK),
            ber.into_block(BER_BLOCK),
            property.into_block(PROPERTY_BLOCK),
        ],
        records,
    }
}

/// Re-derives the postcode of `D00` rows from the last address token.
///
/// Rows that already had a code come first, followed by the repaired rows
/// whose derived postcode is common enough.
fn repair_postcodes(rows: Vec<WorkingRow>) -> Vec<WorkingRow> {
    let (mut coded, mut uncoded): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .partition(|row| row.postcode.as_deref() != Some(UNKNOWN_POSTCODE));

    for row in &mut uncoded {
        row.postcode = row
            .address
            .as_deref()
            .and_then(|address| address.split(", ").last())
            .map(str::to_string);
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for postcode in uncoded.iter().filter_map(|row| row.postcode.clone()) {
        *counts.entry(postcode).or_default() += 1;
    }

    let before = uncoded.len();
    uncoded.retain(|row| {
        row.postcode
            .as_ref()
            .map_or(false, |postcode| counts[postcode] >= MIN_DERIVED_POSTCODE_COUNT)
    });
    debug!("Kept {} of {} rows without a Dublin postcode", uncoded.len(), before);

    coded.extend(uncoded);
    coded
}

impl CleanRecord {
    fn fixed_fields(&self) -> [String; 7] {
        [
            self.url.clone(),
            format_float(self.price),
            self.postcode.clone(),
            self.property.clone(),
            format_float(self.bedrooms),
            format_float(self.bathrooms),
            self.ber.clone(),
        ]
    }
}

fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim() {
        "True" | "true" | "1" => Ok(true),
        "False" | "false" | "0" => Ok(false),
        other => Err(DubpropError::InvalidTable(format!("not a boolean: {}", other))),
    }
}

fn parse_float(column: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| DubpropError::InvalidTable(format!("{} is not numeric: {}", column, value)))
}

impl CleanTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CleanRecord] {
        &self.records
    }

    pub fn blocks(&self) -> &[OneHotBlock] {
        &self.blocks
    }

    pub fn block(&self, name: &str) -> Option<&OneHotBlock> {
        self.blocks.iter().find(|block| block.name == name)
    }

    /// The indicator slice of `record` belonging to block `name`.
    pub fn indicators<'r>(&self, record: &'r CleanRecord, name: &str) -> Option<&'r [bool]> {
        let mut start = 0;
        for block in &self.blocks {
            if block.name == name {
                return record.indicators.get(start..start + block.width());
            }
            start += block.width();
        }
        None
    }

    pub fn columns(&self) -> Vec<String> {
        FIXED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.blocks.iter().flat_map(|block| block.column_names()))
            .collect()
    }

    /// Maps the clean rows back to raw listings so they can be re-cleaned.
    pub fn to_listings(&self) -> Vec<Listing> {
        self.records
            .iter()
            .map(|record| Listing {
                url: record.url.clone(),
                price: record.price as u64,
                address: String::new(),
                postcode: record.postcode.clone(),
                property: record.property.clone(),
                bedrooms: record.bedrooms.to_string(),
                bathrooms: record.bathrooms.to_string(),
                ber: record.ber.clone(),
            })
            .collect()
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = Writer::from_path(path)?;
        writer.write_record(self.columns())?;
        for record in &self.records {
            let row = record
                .fixed_fields()
                .into_iter()
                .chain(record.indicators.iter().map(|v| format_bool(*v).to_string()));
            writer.write_record(row)?;
        }
        writer.flush()?;
        info!("Saved {} clean rows to {}", self.len(), path.display());
        Ok(())
    }

    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        for (i, expected) in FIXED_COLUMNS.iter().enumerate() {
            if headers.get(i) != Some(*expected) {
                return Err(DubpropError::InvalidTable(format!(
                    "expected column {} at position {}",
                    expected, i
                )));
            }
        }

        let mut blocks: Vec<OneHotBlock> = [POSTCODE_BLOCK, BER_BLOCK, PROPERTY_BLOCK]
            .into_iter()
            .map(|name| OneHotBlock {
                name: name.to_string(),
                categories: Vec::new(),
            })
            .collect();
        let mut current = 0;
        for header in headers.iter().skip(FIXED_COLUMNS.len()) {
            // Blocks appear in a fixed order, so only move forward.
            while current < blocks.len() && blocks[current].category_of(header).is_none() {
                current += 1;
            }
            let block = blocks.get_mut(current).ok_or_else(|| {
                DubpropError::InvalidTable(format!("unexpected column {}", header))
            })?;
            let category = block.category_of(header).unwrap_or_default().to_string();
            block.categories.push(category);
        }

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let field = |i: usize| row.get(i).unwrap_or_default();
            let indicators = (FIXED_COLUMNS.len()..headers.len())
                .map(|i| parse_bool(field(i)))
                .collect::<Result<Vec<bool>>>()?;

            records.push(CleanRecord {
                url: field(0).to_string(),
                price: parse_float("Price", field(1))?,
                postcode: field(2).to_string(),
                property: field(3).to_string(),
                bedrooms: parse_float("Bedrooms", field(4))?,
                bathrooms: parse_float("Bathrooms", field(5))?,
                ber: field(6).to_string(),
                indicators,
            });
        }

        Ok(Self { blocks, records })
    }
}

use crate::{Listing, Result};
use csv::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Listings in the order they were scraped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingTable {
    listings: Vec<Listing>,
}

impl ListingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, listing: Listing) {
        self.listings.push(listing);
    }

    pub fn extend(&mut self, listings: impl IntoIterator<Item = Listing>) {
        self.listings.extend(listings);
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Listing> {
        self.listings.iter()
    }

    pub fn as_slice(&self) -> &[Listing] {
        &self.listings
    }

    /// Writes the whole table, replacing any existing file.
    ///
    /// A `.csv` extension selects CSV; anything else is written as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        if is_csv(path) {
            self.write_csv(path)?;
        } else {
            self.write_json(path)?;
        }
        info!("Saved {} listings to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = if is_csv(path) {
            Self::read_csv(path)?
        } else {
            Self::read_json(path)?
        };
        debug!("Loaded {} listings from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &self.listings)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let listings: Vec<Listing> = serde_json::from_reader(reader)?;
        Ok(Self { listings })
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = Writer::from_path(path)?;
        for listing in &self.listings {
            writer.serialize(listing)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = Reader::from_path(path)?;
        let listings = reader
            .deserialize()
            .collect::<std::result::Result<Vec<Listing>, _>>()?;
        Ok(Self { listings })
    }
}

impl From<Vec<Listing>> for ListingTable {
    fn from(listings: Vec<Listing>) -> Self {
        Self { listings }
    }
}

impl FromIterator<Listing> for ListingTable {
    fn from_iter<I: IntoIterator<Item = Listing>>(iter: I) -> Self {
        Self {
            listings: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ListingTable {
    type Item = &'a Listing;
    type IntoIter = std::slice::Iter<'a, Listing>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.iter()
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

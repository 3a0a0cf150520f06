use crate::dashboard::{SearchRow, Summary};
use tabled::{Table, Tabled};
use tabled::settings::{Style, Width, object::Columns, Modify};

#[derive(Tabled)]
pub struct SearchTableRow {
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Price", display_with = "display_right_10")]
    pub price: String,
    #[tabled(rename = "Postcode")]
    pub postcode: String,
    #[tabled(rename = "Property")]
    pub property: String,
    #[tabled(rename = "Beds", display_with = "display_right_4")]
    pub bedrooms: String,
    #[tabled(rename = "Baths", display_with = "display_right_5")]
    pub bathrooms: String,
    #[tabled(rename = "BER")]
    pub ber: String,
    #[tabled(rename = "URL")]
    pub url: String,
}

fn display_right_10(s: &str) -> String {
    format!("{:>10}", s)
}

fn display_right_4(s: &str) -> String {
    format!("{:>4}", s)
}

fn display_right_5(s: &str) -> String {
    format!("{:>5}", s)
}

fn count_or_na(value: Option<f64>) -> String {
    value
        .map(|v| (v.round() as i64).to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

impl SearchTableRow {
    pub fn from_search_row(row: &SearchRow) -> Self {
        let price = row.price
            .filter(|p| *p > 0.0)
            .map(|p| format!("€{}", p.round() as i64))
            .unwrap_or_else(|| "N/A".to_string());

        Self {
            address: row.address.clone(),
            price,
            postcode: row.postcode.clone(),
            property: row.property.clone(),
            bedrooms: count_or_na(row.bedrooms),
            bathrooms: count_or_na(row.bathrooms),
            ber: row.ber.clone().unwrap_or_default(),
            url: row.url.clone(),
        }
    }
}

pub fn create_search_table(rows: &[SearchRow]) -> String {
    let table_rows: Vec<SearchTableRow> = rows.iter()
        .map(SearchTableRow::from_search_row)
        .collect();

    let mut table = Table::new(&table_rows);

    table
        .with(Style::modern())
        .with(Modify::new(Columns::single(0)).with(Width::wrap(40)))     // Address column
        .with(Modify::new(Columns::single(3)).with(Width::truncate(24)))  // Property column
        .with(Modify::new(Columns::single(7)).with(Width::truncate(60))); // URL column

    table.to_string()
}

#[derive(Tabled)]
struct SummaryTableRow {
    #[tabled(rename = "Postcode")]
    postcode: String,
    #[tabled(rename = "Listings", display_with = "display_right_10")]
    listings: String,
    #[tabled(rename = "Median price", display_with = "display_right_10")]
    median_price: String,
}

pub fn create_summary_table(summary: &Summary) -> String {
    let rows: Vec<SummaryTableRow> = summary.postcodes.iter()
        .map(|p| SummaryTableRow {
            postcode: p.postcode.clone(),
            listings: p.listings.to_string(),
            median_price: p.median_price
                .map(|m| format!("€{}k", (m / 1000.0).round() as i64))
                .unwrap_or_else(|| "N/A".to_string()),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    format!("{}\n{}", summary.headline(), table)
}

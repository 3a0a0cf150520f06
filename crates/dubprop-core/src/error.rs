use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DubpropError {
    #[error("Scraping error: {0}")]
    Scraping(String),
    #[error("Invalid selector: {0}")]
    Selector(String),
    #[error("Invalid table: {0}")]
    InvalidTable(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, DubpropError>;

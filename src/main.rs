use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dubprop_core::{
    create_search_table, create_summary_table, transform, DashboardState, ListingTable, SearchFilter,
};
use dubprop_scrapers::config::{DEFAULT_PAGE_TEMPLATE, DEFAULT_START_URL};
use dubprop_scrapers::{CrawlConfig, CrawlMode, ScraperFactory, ScraperType as CoreScraperType};
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log debug output (-v, --verbose)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape property listings into a raw JSON or CSV file
    #[command(about = "Scrape property listings into a raw JSON or CSV file")]
    #[command(long_about = "Scrape Dublin property-for-sale listings, either by following the Next links or by fetching every results page concurrently, and save them as JSON or CSV.")]
    Scrape(ScrapeCommand),

    /// Clean and one-hot encode a raw listings file
    #[command(about = "Clean and one-hot encode a raw listings file")]
    #[command(long_about = "Drop outliers and rare categories, repair postcodes, and write the numeric and one-hot encoded columns to CSV.")]
    Transform(TransformCommand),

    /// Search the raw listings with BER, postcode and range filters
    #[command(about = "Search the raw listings")]
    #[command(long_about = "Filter the raw listings by BER, postcode, price, bedrooms and bathrooms and print the matches.")]
    Search(SearchCommand),

    /// Show an overview of the scraped and cleaned data
    #[command(about = "Show an overview of the scraped and cleaned data")]
    Summary(SummaryCommand),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliScraperType {
    PropertyIe,
}

impl From<CliScraperType> for CoreScraperType {
    fn from(value: CliScraperType) -> Self {
        match value {
            CliScraperType::PropertyIe => CoreScraperType::PropertyIe,
        }
    }
}

#[derive(Parser)]
#[command(about = "Scrape property listings")]
struct ScrapeCommand {
    /// The scraper to use (-x, --scraper)
    #[arg(short = 'x', long, value_enum, default_value_t = CliScraperType::PropertyIe)]
    scraper: CliScraperType,

    /// First results page (-u, --start-url)
    #[arg(short = 'u', long, default_value = DEFAULT_START_URL)]
    start_url: String,

    /// Results page URL with a {page} placeholder (-t, --page-template)
    #[arg(short = 't', long, default_value = DEFAULT_PAGE_TEMPLATE)]
    page_template: String,

    /// How to discover result pages (-m, --mode)
    #[arg(short = 'm', long, value_enum, default_value_t = CrawlMode::Follow)]
    mode: CrawlMode,

    /// Concurrent requests in paged mode (-j, --concurrency)
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Maximum number of pages to scrape (-c, --max-pages)
    #[arg(short = 'c', long)]
    max_pages: Option<u32>,

    /// Output file; .csv for CSV, JSON otherwise (-o, --output)
    #[arg(short = 'o', long, default_value = "results.json")]
    output: PathBuf,
}

#[derive(Parser)]
#[command(about = "Clean and encode a raw listings file")]
struct TransformCommand {
    /// Raw listings file (-i, --input)
    #[arg(short = 'i', long, default_value = "results.json")]
    input: PathBuf,

    /// Clean CSV output (-o, --output)
    #[arg(short = 'o', long, default_value = "clean.csv")]
    output: PathBuf,
}

#[derive(Parser)]
#[command(about = "Search the raw listings")]
struct SearchCommand {
    /// Raw listings file (-r, --raw)
    #[arg(short = 'r', long, default_value = "results.json")]
    raw: PathBuf,

    /// BER rating to match (--ber)
    #[arg(long)]
    ber: Option<String>,

    /// Postcode to match, e.g. D04 (--postcode)
    #[arg(long)]
    postcode: Option<String>,

    /// Minimum price in EUR (--min-price)
    #[arg(long)]
    min_price: Option<u64>,

    /// Maximum price in EUR (--max-price)
    #[arg(long)]
    max_price: Option<u64>,

    /// Minimum bedrooms (--min-beds)
    #[arg(long)]
    min_beds: Option<u64>,

    /// Maximum bedrooms (--max-beds)
    #[arg(long)]
    max_beds: Option<u64>,

    /// Minimum bathrooms (--min-baths)
    #[arg(long)]
    min_baths: Option<u64>,

    /// Maximum bathrooms (--max-baths)
    #[arg(long)]
    max_baths: Option<u64>,

    /// Maximum number of listings to display (-l, --limit)
    #[arg(short = 'l', long, default_value_t = 20)]
    limit: usize,
}

#[derive(Parser)]
#[command(about = "Show an overview of the data")]
struct SummaryCommand {
    /// Raw listings file (-r, --raw)
    #[arg(short = 'r', long, default_value = "results.json")]
    raw: PathBuf,

    /// Clean CSV file (-k, --clean)
    #[arg(short = 'k', long, default_value = "clean.csv")]
    clean: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    match cli.command {
        Commands::Scrape(cmd) => {
            let config = CrawlConfig::new(&cmd.start_url, &cmd.page_template, cmd.mode)?
                .with_concurrency(cmd.concurrency)
                .with_max_pages(cmd.max_pages);
            let scraper = ScraperFactory::create_scraper(cmd.scraper.into())?;

            info!("Scraping {} from {} ({:?} mode)", scraper.source_name(), config.start_url, config.mode);
            let table = scraper.crawl(&config).await?;

            info!("Saving data on {} properties", table.len());
            table
                .save(&cmd.output)
                .with_context(|| format!("failed to write {}", cmd.output.display()))?;
        }
        Commands::Transform(cmd) => {
            let table = ListingTable::load(&cmd.input)
                .with_context(|| format!("failed to read {}", cmd.input.display()))?;

            let clean = transform(table.as_slice());
            clean
                .write_csv(&cmd.output)
                .with_context(|| format!("failed to write {}", cmd.output.display()))?;
            info!("Wrote {} of {} listings to {}", clean.len(), table.len(), cmd.output.display());
        }
        Commands::Search(cmd) => {
            let mut state = DashboardState::new(&cmd.raw, PathBuf::new());
            let controls = state
                .controls()
                .with_context(|| format!("failed to load {}", cmd.raw.display()))?;

            let filter = SearchFilter::new(&controls)
                .with_ber(cmd.ber.as_deref())
                .with_postcode(cmd.postcode.as_deref())
                .with_price_range(cmd.min_price, cmd.max_price)
                .with_bedroom_range(cmd.min_beds, cmd.max_beds)
                .with_bathroom_range(cmd.min_baths, cmd.max_baths);

            let rows = state.search(&filter)?;
            info!("{} listings match", rows.len());

            let shown = &rows[..rows.len().min(cmd.limit)];
            println!("{}", create_search_table(shown));
        }
        Commands::Summary(cmd) => {
            let mut state = DashboardState::new(&cmd.raw, &cmd.clean);
            let summary = state
                .summary()
                .with_context(|| format!("failed to load {} and {}", cmd.raw.display(), cmd.clean.display()))?;

            println!("{}", create_summary_table(&summary));
        }
    }

    Ok(())
}

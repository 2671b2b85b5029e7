mod scrape_error;
mod scraper;
pub mod strategies;

pub use scrape_error::ScrapeError;
pub use scraper::{ExtractionOutcome, PriceScraper};

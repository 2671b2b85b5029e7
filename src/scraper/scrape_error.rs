use std::error::Error;
use std::fmt;

/// Failures inside the acquisition pipeline. None of these ever reach a
/// caller of `PriceScraper::acquire`; they are logged and converted into a
/// synthetic fallback sample at the pipeline boundary.
#[derive(Debug)]
pub enum ScrapeError {
    Network(String),
    Status(u16),
    Selector(String),
}

impl fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapeError::Network(msg) => write!(f, "Network error: {msg}"),
            ScrapeError::Status(code) => write!(f, "Unexpected HTTP status: {code}"),
            ScrapeError::Selector(msg) => write!(f, "Selector error: {msg}"),
        }
    }
}

impl Error for ScrapeError {}

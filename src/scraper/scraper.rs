use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use reqwest::blocking::Client;

use crate::domain::product::{Platform, PriceSample};
use crate::domain::round2;
use crate::scraper::ScrapeError;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

// One bounded fetch per acquisition; a slow page converts to fallback
// instead of retrying.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// How an acquisition produced its price: extracted from the live page, or
/// synthesized from the platform's fallback range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtractionOutcome {
    Scraped(f64),
    Fallback(f64),
}

/// Fetches listing pages and turns them into price samples.
///
/// `acquire` is total: whatever happens underneath (unsupported platform,
/// wrong host, network failure, selector misses), the caller always gets a
/// usable `PriceSample`.
#[derive(Clone)]
pub struct PriceScraper {
    client: Client,
}

impl PriceScraper {
    pub fn new() -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| ScrapeError::Network(e.to_string()))?;

        Ok(Self { client })
    }

    /// Obtain a current price for a listing.
    ///
    /// Availability is simulated (80% in stock), a placeholder carried for
    /// compatibility rather than a real stock check.
    pub fn acquire(&self, url: &str, platform: Platform) -> PriceSample {
        match self.check_price(url, platform) {
            Ok(outcome) => {
                let (price, scraped) = match outcome {
                    ExtractionOutcome::Scraped(price) => (price, true),
                    ExtractionOutcome::Fallback(price) => (price, false),
                };

                PriceSample {
                    price,
                    availability: rand::thread_rng().gen_bool(0.8),
                    timestamp: Utc::now(),
                    scraped,
                }
            }
            Err(e) => {
                log::error!("❌ Price check failed for {platform}: {e}");
                PriceSample {
                    price: synthetic_price(platform),
                    availability: true,
                    timestamp: Utc::now(),
                    scraped: false,
                }
            }
        }
    }

    fn check_price(&self, url: &str, platform: Platform) -> Result<ExtractionOutcome, ScrapeError> {
        if let Some(strategy) = platform.strategy() {
            if strategy.matches_url(url) {
                match self.fetch_page(url) {
                    Ok(html) => {
                        if let Some(price) = strategy.extract(&html)? {
                            log::info!("✅ {platform} price found: {price}");
                            return Ok(ExtractionOutcome::Scraped(price));
                        }
                        log::warn!("⚠️ No {platform} selector matched, using fallback");
                    }
                    Err(e) => {
                        log::warn!("⚠️ Fetch failed for {platform} ({e}), using fallback");
                    }
                }
            } else {
                log::warn!("⚠️ URL host does not look like {platform}, using fallback");
            }
        }

        Ok(ExtractionOutcome::Fallback(synthetic_price(platform)))
    }

    fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        let resp = self
            .client
            .get(url)
            .header("Accept-Language", "en-IN,en;q=0.9")
            .send()
            .map_err(|e| ScrapeError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }

        resp.text().map_err(|e| ScrapeError::Network(e.to_string()))
    }
}

/// Draw a pseudo-random price from the platform's fallback range, rounded to
/// two decimals.
pub fn synthetic_price(platform: Platform) -> f64 {
    let (base, spread) = platform.fallback_range();
    round2(base + rand::thread_rng().gen_range(0.0..spread))
}

//! Per-platform extraction rules and fallback price ranges.
//!
//! Each supported platform carries an ordered list of CSS selectors; the
//! first selector whose text parses to a strictly positive price wins.
//! Platforms without rules (and URLs on the wrong host) skip extraction and
//! go straight to the synthetic fallback range.

use scraper::{Html, Selector};
use url::Url;

use crate::domain::product::Platform;
use crate::scraper::ScrapeError;

/// Ordered selector chain for one platform, plus the hostname fragment a
/// listing URL must contain for the chain to apply.
pub struct ExtractionStrategy {
    pub host: &'static str,
    pub selectors: &'static [&'static str],
}

static AMAZON: ExtractionStrategy = ExtractionStrategy {
    host: "amazon",
    selectors: &[
        ".a-price-whole",
        "#priceblock_ourprice",
        "#priceblock_dealprice",
        ".a-price .a-offscreen",
        "span.a-price-whole",
    ],
};

static FLIPKART: ExtractionStrategy = ExtractionStrategy {
    host: "flipkart",
    selectors: &["._30jeq3._16Jk6d", "._30jeq3", ".CEmiEU div", "._1vC4OE"],
};

impl Platform {
    /// Extraction rules for this platform, if any are defined.
    pub fn strategy(&self) -> Option<&'static ExtractionStrategy> {
        match self {
            Platform::Amazon => Some(&AMAZON),
            Platform::Flipkart => Some(&FLIPKART),
            // No stable public selectors; these always use the fallback.
            Platform::Ebay | Platform::Other => None,
        }
    }

    /// (base, spread) of the synthetic fallback price range.
    pub fn fallback_range(&self) -> (f64, f64) {
        match self {
            Platform::Amazon => (50_000.0, 100_000.0),
            Platform::Flipkart => (40_000.0, 110_000.0),
            Platform::Ebay => (30_000.0, 120_000.0),
            Platform::Other => (20_000.0, 130_000.0),
        }
    }
}

impl ExtractionStrategy {
    /// True when the URL parses and its host contains this strategy's
    /// hostname fragment ("amazon" matches amazon.in, amazon.com, ...).
    pub fn matches_url(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.contains(self.host)))
            .unwrap_or(false)
    }

    /// Run the selector chain against fetched page content.
    ///
    /// Returns `Ok(None)` when every rule misses or fails to parse, an
    /// expected outcome, not an error. Only a malformed selector is an `Err`.
    pub fn extract(&self, html: &str) -> Result<Option<f64>, ScrapeError> {
        let document = Html::parse_document(html);

        for css in self.selectors {
            let selector =
                Selector::parse(css).map_err(|e| ScrapeError::Selector(e.to_string()))?;

            let Some(element) = document.select(&selector).next() else {
                continue;
            };

            let text: String = element.text().collect();
            match parse_price(&text) {
                Some(price) => return Ok(Some(price)),
                // Unparseable or non-positive text: fall through to the next rule.
                None => continue,
            }
        }

        Ok(None)
    }
}

/// Parse a displayed price into a positive number.
///
/// Strips thousands separators, currency glyphs and whitespace, then reads the
/// leading numeric run ("₹1,299.00 incl. tax" -> 1299.00). Anything without a
/// positive leading number yields `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '₹' | '$' | '€' | '£') && !c.is_whitespace())
        .collect();

    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in cleaned.char_indices() {
        if c.is_ascii_digit() {
            end = i + 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            end = i + 1;
        } else {
            break;
        }
    }

    let value: f64 = cleaned[..end].parse().ok()?;
    if value > 0.0 {
        Some(value)
    } else {
        None
    }
}

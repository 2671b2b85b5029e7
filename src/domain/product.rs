use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplaces a product can be tracked on. Closed set: each platform knows
/// its own extraction rules and fallback price range (see scraper::strategies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Amazon,
    Flipkart,
    #[serde(rename = "eBay")]
    Ebay,
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Amazon => "Amazon",
            Platform::Flipkart => "Flipkart",
            Platform::Ebay => "eBay",
            Platform::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Amazon" => Some(Platform::Amazon),
            "Flipkart" => Some(Platform::Flipkart),
            "eBay" => Some(Platform::Ebay),
            "Other" => Some(Platform::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "INR" => Some(Currency::Inr),
            "USD" => Some(Currency::Usd),
            _ => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Inr
    }
}

/// One timestamped price observation. `scraped` distinguishes a value actually
/// extracted from the page from a synthetic fallback. Immutable once appended
/// to a product's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSample {
    pub price: f64,
    pub availability: bool,
    pub timestamp: DateTime<Utc>,
    pub scraped: bool,
}

/// Engagement counters. Both only ever go up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub views: i64,
    pub price_checks: i64,
}

/// A tracked product listing, with its price history embedded in the
/// serialized form. History rows live in their own append-only table and are
/// joined in on read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub url: String,
    pub platform: Platform,
    pub currency: Currency,
    pub current_price: f64,
    pub target_price: Option<f64>,
    pub price_history: Vec<PriceSample>,
    pub last_checked: DateTime<Utc>,
    pub is_active: bool,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Target-reached check, evaluated at read time.
    pub fn target_reached(&self) -> bool {
        self.target_price
            .map(|target| self.current_price <= target)
            .unwrap_or(false)
    }
}

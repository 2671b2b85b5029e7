//! Derived analytics over a user's tracked products.
//!
//! Everything here is a pure function over a snapshot of products (with their
//! history already loaded). Nothing is persisted; trend points are regenerated
//! on every call.

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::domain::product::Product;
use crate::domain::round2;

/// Daily price statistics across every sample of every product that falls on
/// one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: String,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceEntry {
    pub product: String,
    pub views: i64,
    pub price_checks: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_products: usize,
    pub tracked_products: usize,
    pub avg_price: f64,
    pub price_alerts: usize,
}

/// Bucket all history samples by calendar day over `[today - days_back, today]`
/// and compute avg/min/max per day, oldest day first.
///
/// Days with no samples are omitted entirely rather than emitted as zero
/// points, so the series is sparse and at most `days_back + 1` long.
pub fn price_trends(products: &[Product], days_back: i64) -> Vec<TrendPoint> {
    let today = Utc::now().date_naive();
    let mut trends = Vec::new();

    for offset in (0..=days_back).rev() {
        let day = today - Duration::days(offset);

        let prices: Vec<f64> = products
            .iter()
            .flat_map(|p| &p.price_history)
            .filter(|s| s.timestamp.date_naive() == day)
            .map(|s| s.price)
            .collect();

        if prices.is_empty() {
            continue;
        }

        let sum: f64 = prices.iter().sum();
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        trends.push(TrendPoint {
            date: day.format("%Y-%m-%d").to_string(),
            avg_price: round2(sum / prices.len() as f64),
            min_price: round2(min),
            max_price: round2(max),
        });
    }

    trends
}

/// Rank products by view count, most viewed first, truncated to `limit`.
/// Names are clipped to 20 characters for compact display.
pub fn performance(products: &[Product], limit: usize) -> Vec<PerformanceEntry> {
    let mut ranked: Vec<&Product> = products.iter().collect();
    ranked.sort_by(|a, b| b.metadata.views.cmp(&a.metadata.views));

    ranked
        .into_iter()
        .take(limit)
        .map(|p| PerformanceEntry {
            product: p.name.chars().take(20).collect(),
            views: p.metadata.views,
            price_checks: p.metadata.price_checks,
        })
        .collect()
}

/// Headline numbers for the dashboard. An empty product set yields all zeros;
/// the average is defined as 0 rather than dividing by zero.
pub fn overview(products: &[Product]) -> Overview {
    let total_products = products.len();
    let tracked_products = products.iter().filter(|p| p.is_active).count();

    let avg_price = if total_products == 0 {
        0.0
    } else {
        let sum: f64 = products.iter().map(|p| p.current_price).sum();
        round2(sum / total_products as f64)
    };

    let price_alerts = products.iter().filter(|p| p.target_reached()).count();

    Overview {
        total_products,
        tracked_products,
        avg_price,
        price_alerts,
    }
}

//! Analytics reads: dashboard overview, daily trends, performance ranking.
//!
//! These bypass the listing cache entirely and aggregate over a fresh
//! snapshot of the user's products on every request.

use serde_json::json;

use crate::db::products;
use crate::domain::analytics;
use crate::errors::ResultResp;
use crate::responses::json_response;
use crate::router::AppState;

const DEFAULT_TREND_DAYS: i64 = 30;
const MAX_TREND_DAYS: i64 = 365;
const DEFAULT_PERFORMANCE_LIMIT: usize = 10;

/// GET /api/analytics/overview
pub fn overview(state: &AppState, user_id: &str) -> ResultResp {
    let products = products::get_products(&state.db, user_id)?;
    json_response(200, &analytics::overview(&products))
}

/// GET /api/analytics/trends?days=N
pub fn trends(state: &AppState, user_id: &str, days: Option<i64>) -> ResultResp {
    let days = days.unwrap_or(DEFAULT_TREND_DAYS).clamp(0, MAX_TREND_DAYS);

    let products = products::get_products(&state.db, user_id)?;
    let trends = analytics::price_trends(&products, days);

    json_response(200, &json!({ "trends": trends }))
}

/// GET /api/analytics/performance?limit=N
pub fn performance(state: &AppState, user_id: &str, limit: Option<usize>) -> ResultResp {
    let limit = limit.unwrap_or(DEFAULT_PERFORMANCE_LIMIT);

    let products = products::get_products(&state.db, user_id)?;
    let performance = analytics::performance(&products, limit);

    json_response(200, &json!({ "performance": performance }))
}

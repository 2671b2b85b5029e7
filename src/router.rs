use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use astra::{Body, Request};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::cache::ListingCache;
use crate::config::Config;
use crate::db::Database;
use crate::errors::{ResultResp, ServerError};
use crate::handlers;
use crate::responses::json_response;
use crate::scraper::PriceScraper;

/// Everything a handler needs. Cloned into the server's service closure;
/// the cache is shared behind an Arc, the DB handle and HTTP client are
/// cheap clones.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub cache: Arc<ListingCache>,
    pub scraper: PriceScraper,
}

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    if req.method().as_str() == "GET" && req.uri().path() == "/" {
        return json_response(
            200,
            &json!({
                "message": "pricewatch API",
                "version": env!("CARGO_PKG_VERSION"),
                "status": "active",
            }),
        );
    }

    // Authentication lives upstream; handlers trust the scope header.
    let user_id = user_scope(&req)?;

    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_string();
    let method = parts.method.as_str();
    let query = parse_query(parts.uri.query());

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method, segments.as_slice()) {
        ("GET", ["api", "products"]) => handlers::products::list(state, &user_id),
        ("POST", ["api", "products"]) => {
            handlers::products::create(state, &user_id, read_json_body(body)?)
        }
        ("GET", ["api", "products", id]) => {
            handlers::products::detail(state, &user_id, parse_id(id)?)
        }
        ("PUT", ["api", "products", id]) => {
            handlers::products::update(state, &user_id, parse_id(id)?, read_json_body(body)?)
        }
        ("DELETE", ["api", "products", id]) => {
            handlers::products::delete(state, &user_id, parse_id(id)?)
        }
        ("POST", ["api", "products", id, "check"]) => {
            handlers::products::check(state, &user_id, parse_id(id)?)
        }
        ("GET", ["api", "products", id, "history"]) => {
            let days = query.get("days").and_then(|d| d.parse().ok());
            handlers::products::history(state, &user_id, parse_id(id)?, days)
        }
        ("GET", ["api", "analytics", "overview"]) => {
            handlers::analytics::overview(state, &user_id)
        }
        ("GET", ["api", "analytics", "trends"]) => {
            let days = query.get("days").and_then(|d| d.parse().ok());
            handlers::analytics::trends(state, &user_id, days)
        }
        ("GET", ["api", "analytics", "performance"]) => {
            let limit = query.get("limit").and_then(|l| l.parse().ok());
            handlers::analytics::performance(state, &user_id, limit)
        }
        _ => Err(ServerError::NotFound),
    }
}

fn user_scope(req: &Request) -> Result<String, ServerError> {
    req.headers()
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ServerError::Unauthorized)
}

fn parse_id(raw: &str) -> Result<i64, ServerError> {
    raw.parse().map_err(|_| ServerError::NotFound)
}

fn read_json_body<T: DeserializeOwned>(body: Body) -> Result<T, ServerError> {
    let mut body = body;
    let mut buf = String::new();
    body.reader()
        .read_to_string(&mut buf)
        .map_err(|_| ServerError::BadRequest("unreadable request body".to_string()))?;

    serde_json::from_str(&buf)
        .map_err(|e| ServerError::BadRequest(format!("invalid JSON body: {e}")))
}

fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut map = HashMap::new();

    if let Some(q) = query {
        for pair in q.split('&') {
            let mut parts = pair.splitn(2, '=');
            if let (Some(k), Some(v)) = (parts.next(), parts.next()) {
                map.insert(k.to_string(), v.to_string());
            }
        }
    }

    map
}

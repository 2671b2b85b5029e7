//! Product CRUD, price checks and history reads.
//!
//! Every mutation in a user's scope invalidates that scope's collection
//! cache before the response goes out; the collection read repopulates it.

use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::cache::ListingCache;
use crate::db::{history, products};
use crate::domain::product::{Currency, Platform};
use crate::errors::{ResultResp, ServerError};
use crate::responses::json_response;
use crate::router::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub url: String,
    pub platform: String,
    pub currency: Option<String>,
    pub target_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub url: Option<String>,
    pub target_price: Option<f64>,
    pub is_active: Option<bool>,
}

/// GET /api/products: read-through cached collection.
pub fn list(state: &AppState, user_id: &str) -> ResultResp {
    let key = ListingCache::products_key(user_id);

    if let Some(snapshot) = state.cache.get(&key) {
        if let Ok(products) = serde_json::from_str::<serde_json::Value>(&snapshot) {
            return json_response(200, &json!({ "products": products, "cached": true }));
        }
        // Unreadable snapshot: fall through and repopulate.
    }

    let products = products::get_products(&state.db, user_id)?;

    let snapshot = serde_json::to_string(&products).map_err(|_| ServerError::InternalError)?;
    state.cache.put(&key, snapshot, state.config.cache_ttl);

    json_response(200, &json!({ "products": products }))
}

/// POST /api/products: acquire a first price and register the product.
pub fn create(state: &AppState, user_id: &str, body: CreateProductRequest) -> ResultResp {
    if body.name.trim().is_empty() {
        return Err(ServerError::BadRequest("name is required".to_string()));
    }
    if Url::parse(&body.url).is_err() {
        return Err(ServerError::BadRequest("url is not a valid URL".to_string()));
    }

    let platform = Platform::parse(&body.platform)
        .ok_or_else(|| ServerError::BadRequest(format!("unknown platform: {}", body.platform)))?;

    let currency = match body.currency.as_deref() {
        Some(tag) => Currency::parse(tag)
            .ok_or_else(|| ServerError::BadRequest(format!("unknown currency: {tag}")))?,
        None => Currency::default(),
    };

    let sample = state.scraper.acquire(&body.url, platform);

    if let Some(target) = body.target_price {
        if target >= sample.price {
            return Err(ServerError::BadRequest(
                "Target price must be lower than current price".to_string(),
            ));
        }
    }

    let new = products::NewProduct {
        name: body.name.trim().to_string(),
        url: body.url,
        platform,
        currency,
        target_price: body.target_price,
    };

    let product = products::create_product(&state.db, user_id, &new, &sample)?;

    state
        .cache
        .invalidate(&ListingCache::products_key(user_id));

    json_response(
        201,
        &json!({ "message": "Product added successfully", "product": product }),
    )
}

/// GET /api/products/{id}: fetch one product and bump its view counter.
pub fn detail(state: &AppState, user_id: &str, product_id: i64) -> ResultResp {
    let product = products::increment_views(&state.db, user_id, product_id)?
        .ok_or(ServerError::NotFound)?;

    state
        .cache
        .invalidate(&ListingCache::products_key(user_id));

    json_response(200, &json!({ "product": product }))
}

/// PUT /api/products/{id}: partial update.
pub fn update(
    state: &AppState,
    user_id: &str,
    product_id: i64,
    body: UpdateProductRequest,
) -> ResultResp {
    let existing = products::get_product(&state.db, user_id, product_id)?
        .ok_or(ServerError::NotFound)?;

    if let Some(url) = &body.url {
        if Url::parse(url).is_err() {
            return Err(ServerError::BadRequest("url is not a valid URL".to_string()));
        }
    }

    if let Some(target) = body.target_price {
        if target >= existing.current_price {
            return Err(ServerError::BadRequest(
                "Target price must be lower than current price".to_string(),
            ));
        }
    }

    let changes = products::ProductUpdate {
        name: body.name,
        url: body.url,
        target_price: body.target_price,
        is_active: body.is_active,
    };

    let product = products::update_product(&state.db, user_id, product_id, &changes)?
        .ok_or(ServerError::NotFound)?;

    state
        .cache
        .invalidate(&ListingCache::products_key(user_id));

    json_response(
        200,
        &json!({ "message": "Product updated successfully", "product": product }),
    )
}

/// DELETE /api/products/{id}
pub fn delete(state: &AppState, user_id: &str, product_id: i64) -> ResultResp {
    if !products::delete_product(&state.db, user_id, product_id)? {
        return Err(ServerError::NotFound);
    }

    state
        .cache
        .invalidate(&ListingCache::products_key(user_id));

    json_response(200, &json!({ "message": "Product deleted successfully" }))
}

/// POST /api/products/{id}/check: externally-triggered re-acquisition.
pub fn check(state: &AppState, user_id: &str, product_id: i64) -> ResultResp {
    let product = products::get_product(&state.db, user_id, product_id)?
        .ok_or(ServerError::NotFound)?;

    let sample = state.scraper.acquire(&product.url, product.platform);

    let updated = products::record_price_check(&state.db, user_id, product_id, &sample)?
        .ok_or(ServerError::NotFound)?;

    state
        .cache
        .invalidate(&ListingCache::products_key(user_id));

    if updated.target_reached() {
        log::info!(
            "🎯 Price alert: {} reached its target ({} <= {:?})",
            updated.name,
            updated.current_price,
            updated.target_price
        );
    }

    json_response(
        200,
        &json!({
            "message": "Price check recorded",
            "product": updated,
            "sample": sample,
            "targetReached": updated.target_reached(),
        }),
    )
}

/// GET /api/products/{id}/history?days=N: ledger range query, default 30.
pub fn history(
    state: &AppState,
    user_id: &str,
    product_id: i64,
    days: Option<i64>,
) -> ResultResp {
    // Ownership check without counting a view.
    let product = products::get_product(&state.db, user_id, product_id)?
        .ok_or(ServerError::NotFound)?;

    let days = days.unwrap_or(30).clamp(0, 365);
    let to = Utc::now();
    let from = to - Duration::days(days);

    let samples: Vec<_> = history::query_history(&state.db, &[product.id], from, to)?
        .into_iter()
        .map(|entry| entry.sample)
        .collect();

    json_response(
        200,
        &json!({ "productId": product.id, "history": samples }),
    )
}

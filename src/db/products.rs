use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::connection::Database;
use crate::db::history;
use crate::domain::product::{Currency, Metadata, Platform, PriceSample, Product};
use crate::errors::ServerError;

// Collection reads are capped; the dashboard never pages deeper than this.
const COLLECTION_LIMIT: i64 = 100;

const PRODUCT_COLUMNS: &str = r#"
    id, user_id, name, url, platform, currency,
    current_price, target_price, is_active,
    views, price_checks, last_checked, created_at
"#;

/// Fields supplied by the client when registering a product. The current
/// price and seed history entry come from the acquisition, not the client.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub url: String,
    pub platform: Platform,
    pub currency: Currency,
    pub target_price: Option<f64>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub url: Option<String>,
    pub target_price: Option<f64>,
    pub is_active: Option<bool>,
}

fn product_from_row(row: &Row) -> rusqlite::Result<Product> {
    let platform: String = row.get(4)?;
    let currency: String = row.get(5)?;

    Ok(Product {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        url: row.get(3)?,
        // Unknown stored tags collapse to the catch-all platform.
        platform: Platform::parse(&platform).unwrap_or(Platform::Other),
        currency: Currency::parse(&currency).unwrap_or_default(),
        current_price: row.get(6)?,
        target_price: row.get(7)?,
        is_active: row.get(8)?,
        metadata: Metadata {
            views: row.get(9)?,
            price_checks: row.get(10)?,
        },
        last_checked: row.get(11)?,
        created_at: row.get(12)?,
        price_history: Vec::new(),
    })
}

fn load_product_conn(
    conn: &Connection,
    user_id: &str,
    product_id: i64,
) -> rusqlite::Result<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND user_id = ?2");

    let product = conn
        .prepare(&sql)?
        .query_row(params![product_id, user_id], product_from_row)
        .optional()?;

    match product {
        Some(mut product) => {
            product.price_history = history::samples_for_product(conn, product.id)?;
            Ok(Some(product))
        }
        None => Ok(None),
    }
}

/// Register a product. The acquired sample becomes the current price and the
/// first history entry, written in one transaction.
pub fn create_product(
    db: &Database,
    user_id: &str,
    new: &NewProduct,
    sample: &PriceSample,
) -> Result<Product, ServerError> {
    let now = Utc::now();

    db.with_conn(|conn| {
        let tx = conn
            .transaction()
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO products (
                user_id, name, url, platform, currency,
                current_price, target_price, is_active,
                views, price_checks, last_checked, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, 0, 0, ?8, ?9)
            "#,
            params![
                user_id,
                new.name,
                new.url,
                new.platform.as_str(),
                new.currency.as_str(),
                sample.price,
                new.target_price,
                sample.timestamp,
                now,
            ],
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;

        let product_id = tx.last_insert_rowid();

        history::append_sample_conn(&tx, product_id, sample)
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        tx.commit()
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        load_product_conn(conn, user_id, product_id)
            .map_err(|e| ServerError::DbError(e.to_string()))?
            .ok_or(ServerError::InternalError)
    })
}

/// A user's product collection, newest first, history embedded.
pub fn get_products(db: &Database, user_id: &str) -> Result<Vec<Product>, ServerError> {
    db.with_conn(|conn| {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT {COLLECTION_LIMIT}"
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], product_from_row)
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let mut products = Vec::new();
        for row in rows {
            let mut product = row.map_err(|e| ServerError::DbError(e.to_string()))?;
            product.price_history = history::samples_for_product(conn, product.id)
                .map_err(|e| ServerError::DbError(e.to_string()))?;
            products.push(product);
        }
        Ok(products)
    })
}

pub fn get_product(
    db: &Database,
    user_id: &str,
    product_id: i64,
) -> Result<Option<Product>, ServerError> {
    db.with_conn(|conn| {
        load_product_conn(conn, user_id, product_id).map_err(|e| ServerError::DbError(e.to_string()))
    })
}

/// Apply a partial update. Returns the updated product, or `None` when the
/// product does not exist for this user.
pub fn update_product(
    db: &Database,
    user_id: &str,
    product_id: i64,
    changes: &ProductUpdate,
) -> Result<Option<Product>, ServerError> {
    db.with_conn(|conn| {
        let existing = load_product_conn(conn, user_id, product_id)
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let name = changes.name.as_deref().unwrap_or(&existing.name);
        let url = changes.url.as_deref().unwrap_or(&existing.url);
        let target_price = changes.target_price.or(existing.target_price);
        let is_active = changes.is_active.unwrap_or(existing.is_active);

        conn.execute(
            r#"
            UPDATE products
            SET name = ?1, url = ?2, target_price = ?3, is_active = ?4
            WHERE id = ?5 AND user_id = ?6
            "#,
            params![name, url, target_price, is_active, product_id, user_id],
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;

        load_product_conn(conn, user_id, product_id).map_err(|e| ServerError::DbError(e.to_string()))
    })
}

/// Delete a product and its history rows. Returns false when nothing matched.
pub fn delete_product(
    db: &Database,
    user_id: &str,
    product_id: i64,
) -> Result<bool, ServerError> {
    db.with_conn(|conn| {
        let tx = conn
            .transaction()
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let owned: Option<i64> = tx
            .query_row(
                "SELECT id FROM products WHERE id = ?1 AND user_id = ?2",
                params![product_id, user_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        if owned.is_none() {
            return Ok(false);
        }

        tx.execute(
            "DELETE FROM price_history WHERE product_id = ?1",
            params![product_id],
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;

        tx.execute(
            "DELETE FROM products WHERE id = ?1 AND user_id = ?2",
            params![product_id, user_id],
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;

        tx.commit()
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        Ok(true)
    })
}

/// Bump the view counter and return the product with the new count.
pub fn increment_views(
    db: &Database,
    user_id: &str,
    product_id: i64,
) -> Result<Option<Product>, ServerError> {
    db.with_conn(|conn| {
        let changed = conn
            .execute(
                "UPDATE products SET views = views + 1 WHERE id = ?1 AND user_id = ?2",
                params![product_id, user_id],
            )
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        if changed == 0 {
            return Ok(None);
        }

        load_product_conn(conn, user_id, product_id).map_err(|e| ServerError::DbError(e.to_string()))
    })
}

/// Record the result of a price check: update the current-price snapshot and
/// `last_checked`, bump the check counter, and append the sample, all in one
/// transaction, so concurrent checks for the same product serialize and the
/// last committed write wins for the snapshot while every sample lands in
/// the history.
pub fn record_price_check(
    db: &Database,
    user_id: &str,
    product_id: i64,
    sample: &PriceSample,
) -> Result<Option<Product>, ServerError> {
    db.with_conn(|conn| {
        let tx = conn
            .transaction()
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let changed = tx
            .execute(
                r#"
                UPDATE products
                SET current_price = ?1, last_checked = ?2, price_checks = price_checks + 1
                WHERE id = ?3 AND user_id = ?4
                "#,
                params![sample.price, sample.timestamp, product_id, user_id],
            )
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        if changed == 0 {
            return Ok(None);
        }

        history::append_sample_conn(&tx, product_id, sample)
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        tx.commit()
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        load_product_conn(conn, user_id, product_id).map_err(|e| ServerError::DbError(e.to_string()))
    })
}

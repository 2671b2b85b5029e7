//! Append-only price history log.
//!
//! One row per acquisition, keyed by product id. Rows are never updated,
//! deduplicated or reordered; a product's samples read back in insertion
//! order, which is chronological order. Same-day duplicates are expected
//! (one row per price check).

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::db::connection::Database;
use crate::domain::product::PriceSample;
use crate::errors::ServerError;

/// A history row joined with the product it belongs to, as returned by range
/// queries across several products.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSample {
    pub product_id: i64,
    pub sample: PriceSample,
}

/// Append one sample to a product's history.
pub fn append_sample(
    db: &Database,
    product_id: i64,
    sample: &PriceSample,
) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        append_sample_conn(conn, product_id, sample)
            .map_err(|e| ServerError::DbError(e.to_string()))
    })
}

/// Connection-level append, used inside product-mutation transactions so the
/// history write commits atomically with the `current_price` update.
pub(crate) fn append_sample_conn(
    conn: &Connection,
    product_id: i64,
    sample: &PriceSample,
) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT INTO price_history (product_id, price, availability, scraped, observed_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            product_id,
            sample.price,
            sample.availability,
            sample.scraped,
            sample.timestamp,
        ],
    )?;
    Ok(())
}

/// All samples for one product, oldest first.
pub(crate) fn samples_for_product(
    conn: &Connection,
    product_id: i64,
) -> rusqlite::Result<Vec<PriceSample>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT price, availability, scraped, observed_at
        FROM price_history
        WHERE product_id = ?1
        ORDER BY id
        "#,
    )?;

    let rows = stmt.query_map(params![product_id], |row| {
        Ok(PriceSample {
            price: row.get(0)?,
            availability: row.get(1)?,
            scraped: row.get(2)?,
            timestamp: row.get(3)?,
        })
    })?;

    rows.collect()
}

/// All samples across the given products whose timestamp falls within
/// `[from, to]`. Each product's samples stay internally chronological; no
/// ordering is guaranteed between products.
pub fn query_history(
    db: &Database,
    product_ids: &[i64],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<ProductSample>, ServerError> {
    if product_ids.is_empty() {
        return Ok(Vec::new());
    }

    db.with_conn(|conn| {
        let placeholders = vec!["?"; product_ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT product_id, price, availability, scraped, observed_at
            FROM price_history
            WHERE product_id IN ({placeholders})
            ORDER BY product_id, id
            "#
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(product_ids.iter()), |row| {
                Ok(ProductSample {
                    product_id: row.get(0)?,
                    sample: PriceSample {
                        price: row.get(1)?,
                        availability: row.get(2)?,
                        scraped: row.get(3)?,
                        timestamp: row.get(4)?,
                    },
                })
            })
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let mut out = Vec::new();
        for row in rows {
            let entry = row.map_err(|e| ServerError::DbError(e.to_string()))?;
            // Range filter on the parsed timestamp keeps the SQL free of
            // text-format comparisons.
            if entry.sample.timestamp >= from && entry.sample.timestamp <= to {
                out.push(entry);
            }
        }
        Ok(out)
    })
}

//! Short-TTL read-through cache for listing collections.
//!
//! Stands in for an external key-value store: values are opaque serialized
//! snapshots, keys are per-user scopes. Mutations never patch a snapshot in
//! place; they invalidate the scope and let the next read repopulate it.
//! If the store is unusable (a poisoned lock), every operation degrades to a
//! miss instead of surfacing an error.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry {
    payload: String,
    expires_at: Instant,
}

#[derive(Default)]
pub struct ListingCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope key for one user's product collection.
    pub fn products_key(user_id: &str) -> String {
        format!("products:{user_id}")
    }

    /// Cached snapshot for a scope, or `None` on miss/expiry/unavailability.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(_) => return None,
        };

        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: &str, payload: String, ttl: Duration) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key.to_string(),
                Entry {
                    payload,
                    expires_at: Instant::now() + ttl,
                },
            );
        }
    }

    /// Drop a scope's snapshot. Called on every mutation in that scope,
    /// before the response goes out.
    pub fn invalidate(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

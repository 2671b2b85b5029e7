use std::net::SocketAddr;
use std::sync::Arc;

use astra::Server;

use crate::cache::ListingCache;
use crate::config::Config;
use crate::db::{init_db, Database};
use crate::router::{handle, AppState};
use crate::scraper::PriceScraper;

mod cache;
mod config;
mod db;
mod domain;
mod errors;
mod handlers;
mod responses;
mod router;
mod scraper;

#[cfg(test)]
mod tests;

fn main() {
    env_logger::init();

    let config = Config::from_env();

    let db = Database::new(config.database_path.clone());
    if let Err(e) = init_db(&db, "sql/schema.sql") {
        log::error!("❌ Database initialization failed: {e}");
        std::process::exit(1);
    }

    let scraper = match PriceScraper::new() {
        Ok(scraper) => scraper,
        Err(e) => {
            log::error!("❌ HTTP client initialization failed: {e}");
            std::process::exit(1);
        }
    };

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            log::error!("❌ Invalid BIND_ADDR {:?}: {e}", config.bind_addr);
            std::process::exit(1);
        }
    };

    let state = AppState {
        config,
        db,
        cache: Arc::new(ListingCache::new()),
        scraper,
    };

    log::info!("🚀 Starting server at http://{addr}");

    let server = Server::bind(addr).max_workers(8);

    let result = server.serve(move |req, _info| match handle(req, &state) {
        Ok(resp) => resp,
        Err(err) => responses::error_to_response(err),
    });

    if let Err(e) = result {
        log::error!("Server ended with error: {e}");
    }
}

pub mod analytics;
pub mod products;

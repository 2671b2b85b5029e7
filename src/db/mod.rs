pub mod connection;
pub mod history;
pub mod products;

pub use connection::{init_db, Database};

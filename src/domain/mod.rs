pub mod analytics;
pub mod product;

pub use product::{Currency, Metadata, Platform, PriceSample, Product};

/// Round to two decimal places, the precision used for every reported price.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

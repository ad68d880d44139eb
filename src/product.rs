//! Product listing value type shared by every site client.

use serde::{Deserialize, Serialize};

/// A single product listing extracted from a rendered result page.
///
/// The `url` field is the item's identity: two items with the same normalized
/// URL are the same logical product and never appear together in one result
/// set. Downstream consumers upsert by `url`, so it is always absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductItem {
    /// Listing title as shown on the result page (never empty).
    pub title: String,

    /// Price in BRL, absent when the card exposed nothing parsable.
    pub price: Option<f64>,

    /// Absolute product URL.
    pub url: String,

    /// Absolute image URL when the card exposed one.
    pub image: Option<String>,

    /// Site tag the item came from ("kabum", "pichau").
    pub source: String,

    /// 1-based result page the item was found on.
    pub page: u32,
}

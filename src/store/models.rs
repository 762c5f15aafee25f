//! Data model for scraped catalog entries.

use crate::store::price::{self, parse_price};
use serde::{Deserialize, Serialize};

/// Link placeholder for entries whose response carried no page slug.
pub const NO_LINK: &str = "No link";

/// One product entry taken from a catalog response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Product title, absent when the response had none
    pub title: Option<String>,
    /// Original price exactly as formatted by the store
    pub original_price: String,
    /// Discounted price exactly as formatted by the store
    pub discount_price: String,
    /// Original minus discounted price, rounded to cents
    pub savings: f64,
    /// Product page URL or [`NO_LINK`]
    pub link: String,
}

impl CatalogRecord {
    /// Builds a record, deriving savings from the two formatted prices.
    pub fn new(
        title: Option<String>,
        original_price: impl Into<String>,
        discount_price: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        let original_price = original_price.into();
        let discount_price = discount_price.into();
        let savings = price::savings(&original_price, &discount_price);

        Self { title, original_price, discount_price, savings, link: link.into() }
    }

    /// Title for display, empty when missing.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Returns true when the record points at a product page.
    pub fn has_link(&self) -> bool {
        self.link != NO_LINK
    }

    /// Discount relative to the original price, when both prices are known.
    pub fn discount_percent(&self) -> Option<u8> {
        let original = parse_price(&self.original_price);
        if original <= 0.0 || self.savings <= 0.0 {
            return None;
        }
        let percent = (self.savings / original * 100.0).round() as u8;
        Some(percent.min(100))
    }
}

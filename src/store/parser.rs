//! Parser for `searchStoreQuery` GraphQL responses.

use crate::store::capture::CapturedResponse;
use crate::store::locale::Locale;
use crate::store::models::{CatalogRecord, NO_LINK};
use crate::store::price::NOT_AVAILABLE;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

// Every level is optional: the store omits or nulls containers freely and a
// missing piece only ever degrades one field of one record.

#[derive(Debug, Default, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseData {
    #[serde(rename = "Catalog", default)]
    catalog: Option<Catalog>,
}

#[derive(Debug, Default, Deserialize)]
struct Catalog {
    #[serde(rename = "searchStore", default)]
    search_store: Option<SearchStore>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchStore {
    #[serde(default)]
    elements: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct Element {
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "catalogNs", default)]
    catalog_ns: Option<CatalogNamespace>,
    #[serde(default)]
    price: Option<PriceContainer>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogNamespace {
    #[serde(default)]
    mappings: Option<Vec<Mapping>>,
}

#[derive(Debug, Default, Deserialize)]
struct Mapping {
    #[serde(rename = "pageSlug", default)]
    page_slug: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PriceContainer {
    #[serde(rename = "totalPrice", default)]
    total_price: Option<TotalPrice>,
}

#[derive(Debug, Default, Deserialize)]
struct TotalPrice {
    #[serde(rename = "fmtPrice", default)]
    fmt_price: Option<FormattedPrice>,
}

#[derive(Debug, Default, Deserialize)]
struct FormattedPrice {
    #[serde(rename = "originalPrice", default)]
    original_price: Option<String>,
    #[serde(rename = "discountPrice", default)]
    discount_price: Option<String>,
}

/// Turns catalog response bodies into [`CatalogRecord`]s.
pub struct CatalogParser {
    locale: Locale,
}

impl CatalogParser {
    /// Creates a parser building product links for the given locale.
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Parses one response body. Fails only when the body is not JSON.
    pub fn parse_response(&self, body: &str) -> Result<Vec<CatalogRecord>> {
        let response: GraphqlResponse =
            serde_json::from_str(body).context("Catalog response is not valid JSON")?;

        if let Some(errors) = response.errors.as_ref().filter(|e| !e.is_empty()) {
            warn!("Catalog response reported {} GraphQL error(s): {}", errors.len(), errors[0]);
        }

        let elements = response
            .data
            .and_then(|d| d.catalog)
            .and_then(|c| c.search_store)
            .and_then(|s| s.elements)
            .unwrap_or_default();

        let mut records = Vec::with_capacity(elements.len());
        for (index, value) in elements.into_iter().enumerate() {
            match serde_json::from_value::<Element>(value) {
                Ok(element) => {
                    let record = self.build_record(element);
                    trace!("Parsed record: {:?} ({})", record.title, record.savings);
                    records.push(record);
                }
                Err(e) => {
                    warn!("Skipping unreadable catalog element #{}: {}", index, e);
                }
            }
        }

        debug!("Parsed {} records from catalog response", records.len());
        Ok(records)
    }

    /// Parses every captured response in order, skipping bodies that fail.
    pub fn parse_responses(&self, responses: &[CapturedResponse]) -> Vec<CatalogRecord> {
        let mut records = Vec::new();
        for response in responses {
            match self.parse_response(&response.body) {
                Ok(parsed) => records.extend(parsed),
                Err(e) => warn!("Ignoring response from {}: {:#}", response.url, e),
            }
        }
        records
    }

    fn build_record(&self, element: Element) -> CatalogRecord {
        let slug = element
            .catalog_ns
            .and_then(|ns| ns.mappings)
            .and_then(|mappings| mappings.into_iter().next())
            .and_then(|mapping| mapping.page_slug)
            .filter(|slug| !slug.is_empty());

        let link = match slug {
            Some(slug) => self.locale.product_url(&slug),
            None => NO_LINK.to_string(),
        };

        let prices = element
            .price
            .and_then(|p| p.total_price)
            .and_then(|t| t.fmt_price)
            .unwrap_or_default();

        CatalogRecord::new(
            element.title,
            prices.original_price.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            prices.discount_price.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            link,
        )
    }
}

impl Default for CatalogParser {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

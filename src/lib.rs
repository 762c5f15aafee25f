//! egs-deals - Rank discounted Epic Games Store listings by savings
//!
//! Loads the store's browse page in Chromium, listens for the catalog GraphQL
//! responses the page requests, and exports the entries sorted by savings.

pub mod commands;
pub mod config;
pub mod export;
pub mod format;
pub mod store;

pub use config::Config;
pub use store::{CatalogRecord, Locale};

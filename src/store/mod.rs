//! Epic Games Store catalog capture, parsing and ranking.

pub mod browser;
pub mod capture;
pub mod locale;
pub mod models;
pub mod parser;
pub mod price;
pub mod ranking;

pub use browser::{BrowserCapture, CaptureError};
pub use capture::{
    CaptureState, CaptureWindow, CapturedResponse, CatalogSource, ResponseMatcher,
};
pub use locale::Locale;
pub use models::CatalogRecord;
pub use parser::CatalogParser;
pub use price::parse_price;
pub use ranking::rank_by_savings;

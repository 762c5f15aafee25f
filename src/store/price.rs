//! Price text normalization.
//!
//! The store hands prices out pre-formatted (`"NOK\u{a0}299.00"`, `"$19.99"`,
//! `"0"`). Savings are computed from those strings, so parsing is deliberately
//! lossy: anything that does not read as a plain non-negative number counts
//! as zero.

/// Placeholder used when the response carries no formatted price.
pub const NOT_AVAILABLE: &str = "N/A";

/// Currency markers stripped before parsing. No other locale handling.
const CURRENCY_MARKERS: &[&str] = &["NOK", "\u{a0}", "$", "€", "£"];

/// Parses a formatted price into a non-negative number, `0.0` on any failure.
pub fn parse_price(raw: &str) -> f64 {
    if raw.is_empty() || raw == "0" || raw == NOT_AVAILABLE {
        return 0.0;
    }

    let mut cleaned = raw.to_string();
    for marker in CURRENCY_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }

    match cleaned.trim().replace(',', "").parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}

/// Difference between the two formatted prices, rounded to cents.
pub fn savings(original: &str, discount: &str) -> f64 {
    round_cents(parse_price(original) - parse_price(discount))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

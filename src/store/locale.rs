//! Epic Games Store locales and the URLs derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store front host shared by every locale.
pub const STORE_HOST: &str = "https://store.epicgames.com";

/// Store locales, as they appear in the first path segment of store URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "de")]
    De,
    #[serde(rename = "fr")]
    Fr,
    #[serde(rename = "es-ES")]
    EsEs,
    #[serde(rename = "es-MX")]
    EsMx,
    #[serde(rename = "it")]
    It,
    #[serde(rename = "ja")]
    Ja,
    #[serde(rename = "ko")]
    Ko,
    #[serde(rename = "pl")]
    Pl,
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "ru")]
    Ru,
    #[serde(rename = "tr")]
    Tr,
    #[serde(rename = "zh-CN")]
    ZhCn,
}

impl Locale {
    /// Returns the path segment used by the store for this locale.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::De => "de",
            Locale::Fr => "fr",
            Locale::EsEs => "es-ES",
            Locale::EsMx => "es-MX",
            Locale::It => "it",
            Locale::Ja => "ja",
            Locale::Ko => "ko",
            Locale::Pl => "pl",
            Locale::PtBr => "pt-BR",
            Locale::Ru => "ru",
            Locale::Tr => "tr",
            Locale::ZhCn => "zh-CN",
        }
    }

    /// Human readable language name.
    pub fn language(&self) -> &'static str {
        match self {
            Locale::EnUs => "English",
            Locale::De => "Deutsch",
            Locale::Fr => "Français",
            Locale::EsEs => "Español (España)",
            Locale::EsMx => "Español (LA)",
            Locale::It => "Italiano",
            Locale::Ja => "日本語",
            Locale::Ko => "한국어",
            Locale::Pl => "Polski",
            Locale::PtBr => "Português (Brasil)",
            Locale::Ru => "Русский",
            Locale::Tr => "Türkçe",
            Locale::ZhCn => "简体中文",
        }
    }

    /// Returns the locale root, e.g. `https://store.epicgames.com/en-US`.
    pub fn base_url(&self) -> String {
        format!("{}/{}", STORE_HOST, self.code())
    }

    /// Returns the product page URL for a page slug.
    pub fn product_url(&self, slug: &str) -> String {
        format!("{}/p/{}", self.base_url(), slug)
    }

    /// Returns all supported locales.
    pub fn all() -> &'static [Locale] {
        &[
            Locale::EnUs,
            Locale::De,
            Locale::Fr,
            Locale::EsEs,
            Locale::EsMx,
            Locale::It,
            Locale::Ja,
            Locale::Ko,
            Locale::Pl,
            Locale::PtBr,
            Locale::Ru,
            Locale::Tr,
            Locale::ZhCn,
        ]
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Locale {
    type Err = LocaleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-");
        Locale::all()
            .iter()
            .copied()
            .find(|l| l.code().eq_ignore_ascii_case(&wanted))
            .or(match wanted.to_lowercase().as_str() {
                "en" | "us" => Some(Locale::EnUs),
                "es" => Some(Locale::EsEs),
                "pt" | "br" => Some(Locale::PtBr),
                "zh" | "cn" => Some(Locale::ZhCn),
                _ => None,
            })
            .ok_or_else(|| LocaleParseError(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct LocaleParseError(String);

impl fmt::Display for LocaleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid: Vec<&str> = Locale::all().iter().map(|l| l.code()).collect();
        write!(f, "Unknown locale '{}'. Valid locales: {}", self.0, valid.join(", "))
    }
}

impl std::error::Error for LocaleParseError {}

// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Locale identifiers for localized catalog text.
//!
//! A [`Locale`] names a language/region variant a record may carry text or
//! release data for. Region variants share a language-level locale (the
//! English market regions all read English card text), exposed via
//! [`Locale::language`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// A language/region variant of record text.
///
/// Declaration order is the canonical sort order used wherever locales are
/// iterated in a deterministic sequence (for example the name sorter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "na")]
    NorthAmerica,
    #[serde(rename = "eu")]
    Europe,
    #[serde(rename = "oc")]
    Oceania,
    #[serde(rename = "ae")]
    AsianEnglish,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "zh-cn")]
    SimplifiedChinese,
    #[serde(rename = "zh-tw")]
    TraditionalChinese,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "fr-ca")]
    CanadianFrench,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "pt")]
    Portuguese,
}

impl Locale {
    /// Every known locale.
    pub const ALL: &'static [Locale] = &[
        Locale::English,
        Locale::NorthAmerica,
        Locale::Europe,
        Locale::Oceania,
        Locale::AsianEnglish,
        Locale::Japanese,
        Locale::Korean,
        Locale::SimplifiedChinese,
        Locale::TraditionalChinese,
        Locale::French,
        Locale::CanadianFrench,
        Locale::German,
        Locale::Italian,
        Locale::Spanish,
        Locale::Portuguese,
    ];

    /// The catalog's two home locales, installed when a query names none.
    pub const HOME: &'static [Locale] = &[Locale::English, Locale::Japanese];

    /// Canonical short code, as used in `locale:` query predicates and in
    /// serialized catalog data.
    pub fn code(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::NorthAmerica => "na",
            Locale::Europe => "eu",
            Locale::Oceania => "oc",
            Locale::AsianEnglish => "ae",
            Locale::Japanese => "ja",
            Locale::Korean => "ko",
            Locale::SimplifiedChinese => "zh-cn",
            Locale::TraditionalChinese => "zh-tw",
            Locale::French => "fr",
            Locale::CanadianFrench => "fr-ca",
            Locale::German => "de",
            Locale::Italian => "it",
            Locale::Spanish => "es",
            Locale::Portuguese => "pt",
        }
    }

    /// The language-level locale whose text this locale reads.
    ///
    /// Market regions collapse onto the language they print in; language-level
    /// locales map to themselves.
    pub fn language(self) -> Locale {
        match self {
            Locale::NorthAmerica | Locale::Europe | Locale::Oceania | Locale::AsianEnglish => {
                Locale::English
            }
            Locale::CanadianFrench => Locale::French,
            other => other,
        }
    }

    /// English display name, used when restating a query in prose.
    pub fn translated(self) -> &'static str {
        match self {
            Locale::English => "English",
            Locale::NorthAmerica => "English (North America)",
            Locale::Europe => "English (Europe)",
            Locale::Oceania => "English (Oceania)",
            Locale::AsianEnglish => "Asian-English",
            Locale::Japanese => "Japanese",
            Locale::Korean => "Korean",
            Locale::SimplifiedChinese => "Simplified Chinese",
            Locale::TraditionalChinese => "Traditional Chinese",
            Locale::French => "French",
            Locale::CanadianFrench => "French (Canada)",
            Locale::German => "German",
            Locale::Italian => "Italian",
            Locale::Spanish => "Spanish",
            Locale::Portuguese => "Portuguese",
        }
    }

    /// Resolve user input to a locale. Input is trimmed and lowercased; both
    /// the short code and the English name are accepted.
    pub fn resolve(input: &str) -> Option<Locale> {
        let normalized = input.trim().to_lowercase();
        Locale::ALL
            .iter()
            .copied()
            .find(|l| l.code() == normalized || l.translated().to_lowercase() == normalized)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Read-only data model for the card catalog.
//!
//! The catalog is owned by the calling application; the query engine only
//! borrows it for the duration of one execution and never mutates it. Records
//! come in four kinds (cards, sets, sealed products, series) surfaced to the
//! engine as the [`Record`] sum type so every filter and sorter matches
//! exhaustively over the closed set of kinds.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// Localized text block printed on a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardText {
    pub name: String,
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub pendulum_effect: Option<String>,
    /// Whether this text is an official translation rather than fan-supplied.
    #[serde(default)]
    pub official: bool,
}

/// A printed combat stat. Some cards carry a textual sentinel (for example
/// `"?"`) instead of a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stat {
    Num(i64),
    Text(String),
}

/// A single game card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: u64,
    /// Broad category: "monster", "spell", "trap", "skill", "token".
    pub category: String,
    /// Text blocks keyed by language-level locale.
    #[serde(default)]
    pub text: BTreeMap<Locale, CardText>,
    #[serde(default)]
    pub attribute: Option<String>,
    /// Monster race or spell/trap kind, e.g. "dragon" or "quick-play".
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub skill_type: Option<String>,
    #[serde(default)]
    pub monster_types: Vec<String>,
    #[serde(default)]
    pub classifications: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub atk: Option<Stat>,
    #[serde(default)]
    pub def: Option<Stat>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub rank: Option<i64>,
    #[serde(default)]
    pub scale: Option<i64>,
    /// Link arrows; the card's link rating is the arrow count.
    #[serde(default)]
    pub link_arrows: Vec<String>,
}

/// Per-region release data for a set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SetLocale {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// One content grouping inside a set: which cards were printed for which
/// locales.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SetContents {
    #[serde(default)]
    pub locales: Vec<Locale>,
    /// Card ids printed in this grouping.
    #[serde(default)]
    pub cards: Vec<u64>,
}

/// A released card set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Set {
    pub id: u64,
    #[serde(default)]
    pub name: BTreeMap<Locale, String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub locales: BTreeMap<Locale, SetLocale>,
    #[serde(default)]
    pub contents: Vec<SetContents>,
}

/// Per-region release data for a sealed product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductLocale {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// A sealed product (tins, structure decks, bundles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealedProduct {
    pub id: u64,
    #[serde(default)]
    pub name: BTreeMap<Locale, String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub locales: BTreeMap<Locale, ProductLocale>,
}

/// A series or archetype grouping of cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: u64,
    #[serde(default)]
    pub name: BTreeMap<Locale, String>,
}

/// The record kinds a query can select over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Card,
    Set,
    SealedProduct,
    Series,
}

impl RecordKind {
    /// Plural noun used when restating a class predicate in prose.
    pub fn plural(self) -> &'static str {
        match self {
            RecordKind::Card => "cards",
            RecordKind::Set => "sets",
            RecordKind::SealedProduct => "sealed products",
            RecordKind::Series => "series/archetypes",
        }
    }
}

/// A borrowed reference to one catalog record of any kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Record<'a> {
    Card(&'a Card),
    Set(&'a Set),
    SealedProduct(&'a SealedProduct),
    Series(&'a Series),
}

impl<'a> Record<'a> {
    pub fn kind(self) -> RecordKind {
        match self {
            Record::Card(_) => RecordKind::Card,
            Record::Set(_) => RecordKind::Set,
            Record::SealedProduct(_) => RecordKind::SealedProduct,
            Record::Series(_) => RecordKind::Series,
        }
    }

    /// Stable identity within the record's kind.
    pub fn id(self) -> u64 {
        match self {
            Record::Card(c) => c.id,
            Record::Set(s) => s.id,
            Record::SealedProduct(p) => p.id,
            Record::Series(s) => s.id,
        }
    }

    /// The record's name as read in `locale`, if that text exists.
    ///
    /// Lookups go through the locale's language: asking for the European
    /// English name of a card reads its English text block.
    pub fn localized_name(self, locale: Locale) -> Option<&'a str> {
        let language = locale.language();
        match self {
            Record::Card(c) => c.text.get(&language).map(|t| t.name.as_str()),
            Record::Set(s) => s.name.get(&language).map(String::as_str),
            Record::SealedProduct(p) => p.name.get(&language).map(String::as_str),
            Record::Series(s) => s.name.get(&language).map(String::as_str),
        }
    }
}

/// The full read-only catalog handed to [`crate::query::Search::execute`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub sets: Vec<Set>,
    #[serde(default)]
    pub products: Vec<SealedProduct>,
    #[serde(default)]
    pub series: Vec<Series>,
}

impl Catalog {
    /// All records, in the canonical card, set, product, series order. The
    /// stable sort at the end of execution preserves this order between
    /// records with equal sort keys.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.cards
            .iter()
            .map(Record::Card)
            .chain(self.sets.iter().map(Record::Set))
            .chain(self.products.iter().map(Record::SealedProduct))
            .chain(self.series.iter().map(Record::Series))
    }
}

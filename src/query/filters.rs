// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Filter registry: the named predicate capabilities a query can invoke.
//!
//! Each filter declares its name and aliases, tests one record against a
//! predicate, and renders the predicate back into a prose clause. Adding a
//! capability means implementing [`Filter`] and appending the instance to
//! [`FILTERS`]; nothing else changes.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use chrono::NaiveDate;

use crate::catalog::{Card, Catalog, Record, RecordKind, Stat};
use crate::error::{Result, SearchError};
use crate::locale::Locale;
use crate::query::ast::{FilterMode, Predicate};

/// A named predicate capability.
///
/// `matches` tests a single record. A record that lacks the property a filter
/// reads simply does not match; only contract violations (a comparison mode
/// the filter does not accept, a malformed value) are errors.
pub trait Filter: Sync {
    /// Primary name first, then aliases.
    fn names(&self) -> &'static [&'static str];

    /// One-line capability description for help surfaces.
    fn blurb(&self) -> &'static str;

    fn matches(
        &self,
        catalog: &Catalog,
        locales: &BTreeSet<Locale>,
        predicate: &Predicate,
        record: Record<'_>,
    ) -> Result<bool>;

    /// Prose clause restating the predicate, e.g. `whose name contains 'x'`.
    fn clause(&self, predicate: &Predicate) -> String;
}

/// Every registered filter.
pub const FILTERS: &[&'static dyn Filter] = &[
    &NameFilter,
    &EffectFilter,
    &ClassFilter,
    &TypeFilter,
    &AttributeFilter,
    &AtkFilter,
    &DefFilter,
    &LevelFilter,
    &RankFilter,
    &ScaleFilter,
    &LinkRatingFilter,
    &ReleaseDateFilter,
];

/// The filter behind bare-word predicates.
pub(crate) const NAME: &dyn Filter = &NameFilter;
/// The filter behind the class-shorthand production.
pub(crate) const CLASS: &dyn Filter = &ClassFilter;

/// Look a filter up by name or alias. Callers are expected to have trimmed
/// and lowercased the name already.
pub fn lookup(name: &str) -> Option<&'static dyn Filter> {
    static BY_NAME: OnceLock<HashMap<&'static str, &'static dyn Filter>> = OnceLock::new();
    BY_NAME
        .get_or_init(|| {
            let mut map = HashMap::new();
            for filter in FILTERS {
                for name in filter.names() {
                    map.insert(*name, *filter);
                }
            }
            map
        })
        .get(name)
        .copied()
}

fn bad_mode(filter: &str, mode: FilterMode) -> SearchError {
    SearchError::new(format!(
        "Search filter '{filter}' does not accept filter mode '{}'!",
        mode.symbol()
    ))
}

/// Reject the ordering modes for text-only filters.
fn ensure_text_mode(filter: &str, mode: FilterMode) -> Result<()> {
    match mode {
        FilterMode::Default | FilterMode::Eq => Ok(()),
        other => Err(bad_mode(filter, other)),
    }
}

fn contains_or_eq(mode: FilterMode, needle: &str, haystack: &str) -> bool {
    if mode == FilterMode::Eq {
        haystack == needle
    } else {
        haystack.contains(needle)
    }
}

fn mode_phrase(mode: FilterMode) -> &'static str {
    match mode {
        FilterMode::Default => "is",
        FilterMode::Eq => "is exactly",
        FilterMode::Gt => "is greater than",
        FilterMode::Lt => "is less than",
        FilterMode::Ge => "is greater than or equal to",
        FilterMode::Le => "is less than or equal to",
    }
}

// =============================================================================
// Text filters
// =============================================================================

struct NameFilter;

impl Filter for NameFilter {
    fn names(&self) -> &'static [&'static str] {
        &["name", "n"]
    }

    fn blurb(&self) -> &'static str {
        "Filter by record name in the selected locales."
    }

    fn matches(
        &self,
        _catalog: &Catalog,
        locales: &BTreeSet<Locale>,
        predicate: &Predicate,
        record: Record<'_>,
    ) -> Result<bool> {
        ensure_text_mode("name", predicate.mode)?;
        let needle = predicate.value.trim().to_lowercase();
        Ok(locales.iter().any(|locale| {
            record
                .localized_name(*locale)
                .is_some_and(|name| contains_or_eq(predicate.mode, &needle, &name.to_lowercase()))
        }))
    }

    fn clause(&self, predicate: &Predicate) -> String {
        match predicate.mode {
            FilterMode::Default => format!("whose name contains '{}'", predicate.value),
            FilterMode::Eq => format!("named '{}'", predicate.value),
            other => format!("<ERROR: bad mode '{}'>", other.symbol()),
        }
    }
}

struct EffectFilter;

impl Filter for EffectFilter {
    fn names(&self) -> &'static [&'static str] {
        &["effect", "e"]
    }

    fn blurb(&self) -> &'static str {
        "Filter by effect text or card lore in the selected locales."
    }

    fn matches(
        &self,
        _catalog: &Catalog,
        locales: &BTreeSet<Locale>,
        predicate: &Predicate,
        record: Record<'_>,
    ) -> Result<bool> {
        ensure_text_mode("effect", predicate.mode)?;
        let needle = predicate.value.trim().to_lowercase();
        let Record::Card(card) = record else {
            return Ok(false);
        };
        Ok(locales.iter().any(|locale| {
            card.text.get(&locale.language()).is_some_and(|text| {
                let joined = format!(
                    "{}\n{}",
                    text.pendulum_effect.as_deref().unwrap_or(""),
                    text.effect.as_deref().unwrap_or("")
                );
                contains_or_eq(predicate.mode, &needle, joined.trim().to_lowercase().as_str())
            })
        }))
    }

    fn clause(&self, predicate: &Predicate) -> String {
        match predicate.mode {
            FilterMode::Default => format!("whose effect contains '{}'", predicate.value),
            FilterMode::Eq => format!("whose effect is '{}'", predicate.value),
            other => format!("<ERROR: bad mode '{}'>", other.symbol()),
        }
    }
}

// =============================================================================
// Class filter
// =============================================================================

/// The accepted `class:` vocabulary.
fn class_option(value: &str) -> Option<RecordKind> {
    match value {
        "card" | "c" => Some(RecordKind::Card),
        "set" | "pack" | "s" => Some(RecordKind::Set),
        "product" | "sealed" | "sealedproduct" | "sealed-product" | "sealed_product" | "p"
        | "sp" => Some(RecordKind::SealedProduct),
        "series" | "archetype" | "a" => Some(RecordKind::Series),
        _ => None,
    }
}

struct ClassFilter;

impl Filter for ClassFilter {
    fn names(&self) -> &'static [&'static str] {
        // The empty alias backs the class-shorthand production (`:card`).
        &["class", "cl", ""]
    }

    fn blurb(&self) -> &'static str {
        "Filter by what kind of record you want to see: card, set, product, or series."
    }

    fn matches(
        &self,
        _catalog: &Catalog,
        _locales: &BTreeSet<Locale>,
        predicate: &Predicate,
        record: Record<'_>,
    ) -> Result<bool> {
        ensure_text_mode("class", predicate.mode)?;
        let value = predicate.value.trim().to_lowercase();
        let kind = class_option(&value).ok_or_else(|| {
            SearchError::new(format!(
                "Search filter 'class' does not accept value '{value}'!\n\
                 Acceptable values include 'card' (or 'c'), 'pack'/'set' (or 's'), \
                 'sealed'/'product' (or 'p'), or 'series'/'archetype' (or 'a')."
            ))
        })?;
        Ok(record.kind() == kind)
    }

    fn clause(&self, predicate: &Predicate) -> String {
        match class_option(&predicate.value.trim().to_lowercase()) {
            Some(kind) => format!("that are {}", kind.plural()),
            None => format!("<ERROR: bad value '{}'>", predicate.value),
        }
    }
}

// =============================================================================
// Typeline and attribute filters
// =============================================================================

/// Newline-joined bag of everything type-like printed on a card.
fn typeline(card: &Card) -> String {
    let mut lines: Vec<&str> = vec![card.category.as_str()];
    lines.extend(card.subtype.as_deref());
    lines.extend(card.subcategory.as_deref());
    lines.extend(card.character.as_deref());
    lines.extend(card.skill_type.as_deref());
    lines.extend(card.monster_types.iter().map(String::as_str));
    lines.extend(card.classifications.iter().map(String::as_str));
    lines.extend(card.abilities.iter().map(String::as_str));
    lines.join("\n").to_lowercase()
}

struct TypeFilter;

impl Filter for TypeFilter {
    fn names(&self) -> &'static [&'static str] {
        &["type", "t"]
    }

    fn blurb(&self) -> &'static str {
        "Filter by the contents of a card's typeline."
    }

    fn matches(
        &self,
        _catalog: &Catalog,
        _locales: &BTreeSet<Locale>,
        predicate: &Predicate,
        record: Record<'_>,
    ) -> Result<bool> {
        ensure_text_mode("type", predicate.mode)?;
        let needle = predicate.value.trim().to_lowercase();
        let Record::Card(card) = record else {
            return Ok(false);
        };
        let bag = typeline(card);
        Ok(match predicate.mode {
            // Exact mode matches one whole line of the bag.
            FilterMode::Eq => bag.split('\n').any(|line| line == needle),
            _ => bag.contains(&needle),
        })
    }

    fn clause(&self, predicate: &Predicate) -> String {
        match predicate.mode {
            FilterMode::Default => format!("whose typeline contains '{}'", predicate.value),
            FilterMode::Eq => format!("whose typeline contains exactly '{}'", predicate.value),
            other => format!("<ERROR: bad mode '{}'>", other.symbol()),
        }
    }
}

struct AttributeFilter;

impl Filter for AttributeFilter {
    fn names(&self) -> &'static [&'static str] {
        &["attribute", "attr", "a"]
    }

    fn blurb(&self) -> &'static str {
        "Filter by a card's attribute."
    }

    fn matches(
        &self,
        _catalog: &Catalog,
        _locales: &BTreeSet<Locale>,
        predicate: &Predicate,
        record: Record<'_>,
    ) -> Result<bool> {
        ensure_text_mode("attribute", predicate.mode)?;
        let needle = predicate.value.trim().to_lowercase();
        let Record::Card(card) = record else {
            return Ok(false);
        };
        Ok(card
            .attribute
            .as_deref()
            .is_some_and(|attr| contains_or_eq(predicate.mode, &needle, &attr.to_lowercase())))
    }

    fn clause(&self, predicate: &Predicate) -> String {
        format!("whose attribute is '{}'", predicate.value)
    }
}

// =============================================================================
// Numeric filters
// =============================================================================

/// A record's numeric property as seen by the numeric filter template: either
/// a real number or a textual sentinel printed where the number would be.
pub(crate) enum IntProp<'a> {
    Num(i64),
    Text(&'a str),
}

pub(crate) fn stat_prop(stat: &Stat) -> IntProp<'_> {
    match stat {
        Stat::Num(n) => IntProp::Num(*n),
        Stat::Text(t) => IntProp::Text(t),
    }
}

/// Shared comparison template for the numeric filters.
///
/// A numeric query value compares numerically; ordering modes never match a
/// textual sentinel. A non-numeric query value only supports equality, against
/// the sentinel text.
fn int_matches(
    filter: &str,
    mode: FilterMode,
    raw_value: &str,
    prop: Option<IntProp<'_>>,
) -> Result<bool> {
    let value = raw_value.trim().to_lowercase();
    let Some(prop) = prop else {
        return Ok(false);
    };
    match value.parse::<i64>() {
        Ok(query) => Ok(match (mode, prop) {
            (FilterMode::Default | FilterMode::Eq, IntProp::Num(n)) => n == query,
            (FilterMode::Gt, IntProp::Num(n)) => n > query,
            (FilterMode::Ge, IntProp::Num(n)) => n >= query,
            (FilterMode::Lt, IntProp::Num(n)) => n < query,
            (FilterMode::Le, IntProp::Num(n)) => n <= query,
            (_, IntProp::Text(_)) => false,
        }),
        Err(_) => match mode {
            FilterMode::Default | FilterMode::Eq => {
                Ok(matches!(prop, IntProp::Text(t) if t.trim().to_lowercase() == value))
            }
            other => Err(SearchError::new(format!(
                "Search filter '{filter}' does not accept filter mode '{}' for non-number values!",
                other.symbol()
            ))),
        },
    }
}

macro_rules! numeric_filter {
    ($type:ident, $names:expr, $blurb:expr, $noun:expr, $prop:expr) => {
        struct $type;

        impl Filter for $type {
            fn names(&self) -> &'static [&'static str] {
                $names
            }

            fn blurb(&self) -> &'static str {
                $blurb
            }

            fn matches(
                &self,
                _catalog: &Catalog,
                _locales: &BTreeSet<Locale>,
                predicate: &Predicate,
                record: Record<'_>,
            ) -> Result<bool> {
                let prop = match record {
                    Record::Card(card) => $prop(card),
                    _ => None,
                };
                int_matches(self.names()[0], predicate.mode, &predicate.value, prop)
            }

            fn clause(&self, predicate: &Predicate) -> String {
                format!(
                    "whose {} {} {}",
                    $noun,
                    mode_phrase(predicate.mode),
                    predicate.value
                )
            }
        }
    };
}

fn atk_prop(card: &Card) -> Option<IntProp<'_>> {
    card.atk.as_ref().map(stat_prop)
}

fn def_prop(card: &Card) -> Option<IntProp<'_>> {
    card.def.as_ref().map(stat_prop)
}

numeric_filter!(
    AtkFilter,
    &["attack", "atk", "at"],
    "Filter by cards with, greater than, or less than a certain ATK.",
    "ATK",
    atk_prop
);

numeric_filter!(
    DefFilter,
    &["defence", "defense", "def", "de"],
    "Filter by cards with, greater than, or less than a certain DEF.",
    "DEF",
    def_prop
);

numeric_filter!(
    LevelFilter,
    &["level", "lvl", "lv", "l"],
    "Filter by cards with, greater than, or less than a certain level. \
     This does NOT match to Xyz monsters.",
    "level",
    |card: &Card| card.level.map(IntProp::Num)
);

numeric_filter!(
    RankFilter,
    &["rank", "r"],
    "Filter by cards with, greater than, or less than a certain rank. \
     This does NOT match to non-Xyz monsters.",
    "rank",
    |card: &Card| card.rank.map(IntProp::Num)
);

numeric_filter!(
    ScaleFilter,
    &["scale", "sc"],
    "Filter by cards with, greater than, or less than a certain pendulum scale.",
    "pendulum scale",
    |card: &Card| card.scale.map(IntProp::Num)
);

numeric_filter!(
    LinkRatingFilter,
    &["linkrating", "link", "lr"],
    "Filter by cards with, greater than, or less than a certain link rating.",
    "link rating",
    |card: &Card| Some(IntProp::Num(card.link_arrows.len() as i64))
);

// =============================================================================
// Date filter
// =============================================================================

/// Midnight timestamp for day-granularity comparison.
pub(crate) fn date_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp()
}

fn parse_query_date(filter: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        SearchError::new(format!(
            "Search filter '{filter}' does not accept non-date values!\n\
             Dates are expected in ISO format (YYYY-MM-DD)."
        ))
    })
}

/// First release date of a record.
///
/// Cards take the earliest date across every (set, locale) printing, falling
/// back to a set's own date when the printing has no locale-specific dates.
/// Sets and products use their own date, else their earliest locale date.
/// Series have no release date.
pub(crate) fn release_date(catalog: &Catalog, record: Record<'_>) -> Option<NaiveDate> {
    match record {
        Record::Card(card) => {
            let mut dates = Vec::new();
            for set in &catalog.sets {
                let mut locales: BTreeSet<Locale> = BTreeSet::new();
                let mut printed = false;
                for contents in &set.contents {
                    if contents.cards.contains(&card.id) {
                        printed = true;
                        locales.extend(contents.locales.iter().copied());
                    }
                }
                if !printed {
                    continue;
                }
                if locales.is_empty() {
                    dates.extend(set.date);
                }
                for locale in locales {
                    if let Some(set_locale) = set.locales.get(&locale) {
                        dates.extend(set_locale.date);
                    }
                }
            }
            dates.into_iter().min()
        }
        Record::Set(set) => set
            .date
            .or_else(|| set.locales.values().filter_map(|l| l.date).min()),
        Record::SealedProduct(product) => product
            .date
            .or_else(|| product.locales.values().filter_map(|l| l.date).min()),
        Record::Series(_) => None,
    }
}

struct ReleaseDateFilter;

impl Filter for ReleaseDateFilter {
    fn names(&self) -> &'static [&'static str] {
        &["date", "d"]
    }

    fn blurb(&self) -> &'static str {
        "Filter by cards and/or sets that came out for the first time at, \
         before, or after the given date."
    }

    fn matches(
        &self,
        catalog: &Catalog,
        _locales: &BTreeSet<Locale>,
        predicate: &Predicate,
        record: Record<'_>,
    ) -> Result<bool> {
        let query = date_timestamp(parse_query_date("date", &predicate.value)?);
        let Some(date) = release_date(catalog, record) else {
            return Ok(false);
        };
        let actual = date_timestamp(date);
        Ok(match predicate.mode {
            FilterMode::Default | FilterMode::Eq => actual == query,
            FilterMode::Gt => actual > query,
            FilterMode::Ge => actual >= query,
            FilterMode::Lt => actual < query,
            FilterMode::Le => actual <= query,
        })
    }

    fn clause(&self, predicate: &Predicate) -> String {
        let phrase = match predicate.mode {
            FilterMode::Default => "on",
            FilterMode::Eq => "on exactly",
            FilterMode::Gt => "after",
            FilterMode::Lt => "before",
            FilterMode::Ge => "on or after",
            FilterMode::Le => "on or before",
        };
        format!("who were released {phrase} {}", predicate.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predicate(filter: &'static dyn Filter, mode: FilterMode, value: &str) -> Predicate {
        Predicate {
            filter,
            mode,
            value: value.to_string(),
        }
    }

    fn card(atk: Option<Stat>) -> Card {
        Card {
            id: 1,
            category: "monster".into(),
            text: Default::default(),
            attribute: None,
            subtype: None,
            subcategory: None,
            character: None,
            skill_type: None,
            monster_types: vec![],
            classifications: vec![],
            abilities: vec![],
            atk,
            def: None,
            level: None,
            rank: None,
            scale: None,
            link_arrows: vec![],
        }
    }

    #[test]
    fn lookup_resolves_aliases() {
        assert!(lookup("atk").is_some());
        assert!(lookup("defense").is_some());
        assert_eq!(lookup("atk").unwrap().names()[0], "attack");
        assert!(lookup("bogus").is_none());
    }

    #[test]
    fn numeric_ordering_excludes_text_stats() {
        let catalog = Catalog::default();
        let locales = BTreeSet::new();
        let question = card(Some(Stat::Text("?".into())));
        let strong = card(Some(Stat::Num(3200)));

        let p = predicate(lookup("atk").unwrap(), FilterMode::Gt, "3000");
        assert!(!p
            .filter
            .matches(&catalog, &locales, &p, Record::Card(&question))
            .unwrap());
        assert!(p
            .filter
            .matches(&catalog, &locales, &p, Record::Card(&strong))
            .unwrap());
    }

    #[test]
    fn numeric_text_fallback_is_equality_only() {
        let catalog = Catalog::default();
        let locales = BTreeSet::new();
        let question = card(Some(Stat::Text("?".into())));

        let eq = predicate(lookup("atk").unwrap(), FilterMode::Eq, "?");
        assert!(eq
            .filter
            .matches(&catalog, &locales, &eq, Record::Card(&question))
            .unwrap());

        let gt = predicate(lookup("atk").unwrap(), FilterMode::Gt, "?");
        let err = gt
            .filter
            .matches(&catalog, &locales, &gt, Record::Card(&question))
            .unwrap_err();
        assert!(err.to_string().contains("non-number values"));
    }

    #[test]
    fn text_filter_rejects_ordering_modes() {
        let catalog = Catalog::default();
        let locales = BTreeSet::new();
        let c = card(None);
        let p = predicate(lookup("name").unwrap(), FilterMode::Lt, "x");
        let err = p
            .filter
            .matches(&catalog, &locales, &p, Record::Card(&c))
            .unwrap_err();
        assert!(err.to_string().contains("does not accept filter mode '<'"));
    }

    #[test]
    fn class_filter_rejects_unknown_vocabulary() {
        let catalog = Catalog::default();
        let locales = BTreeSet::new();
        let c = card(None);
        let p = predicate(lookup("class").unwrap(), FilterMode::Default, "planet");
        let err = p
            .filter
            .matches(&catalog, &locales, &p, Record::Card(&c))
            .unwrap_err();
        assert!(err.to_string().contains("does not accept value 'planet'"));
    }

    #[test]
    fn date_filter_rejects_non_iso_values() {
        let catalog = Catalog::default();
        let locales = BTreeSet::new();
        let c = card(None);
        let p = predicate(lookup("date").unwrap(), FilterMode::Default, "yesterday");
        let err = p
            .filter
            .matches(&catalog, &locales, &p, Record::Card(&c))
            .unwrap_err();
        assert!(err.to_string().contains("ISO format"));
    }

    #[test]
    fn typeline_eq_matches_whole_lines() {
        let catalog = Catalog::default();
        let locales = BTreeSet::new();
        let mut c = card(None);
        c.subtype = Some("dragon".into());
        c.abilities.push("effect".into());

        let eq = predicate(lookup("type").unwrap(), FilterMode::Eq, "dragon");
        assert!(eq
            .filter
            .matches(&catalog, &locales, &eq, Record::Card(&c))
            .unwrap());

        // "drag" is a substring of a line but not a whole line.
        let partial = predicate(lookup("type").unwrap(), FilterMode::Eq, "drag");
        assert!(!partial
            .filter
            .matches(&catalog, &locales, &partial, Record::Card(&c))
            .unwrap());
        let contains = predicate(lookup("type").unwrap(), FilterMode::Default, "drag");
        assert!(contains
            .filter
            .matches(&catalog, &locales, &contains, Record::Card(&c))
            .unwrap());
    }
}

// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Sorter registry: the named key-extraction capabilities behind `sort:`.
//!
//! Every sorter maps a record to a totally ordered [`SortKey`]. Records a
//! sorter does not apply to take a maximal key so they land at the end in
//! either direction, leaving later links of the sort chain to break the tie.
//! Descending order lives inside the key itself (negated numbers, negated
//! code points), never in a final list reversal, so multi-key chains
//! tie-break correctly per key.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use crate::catalog::{Card, Catalog, Record, RecordKind};
use crate::locale::Locale;
use crate::query::ast::{Sort, SortDir};
use crate::query::filters::{date_timestamp, release_date, stat_prop, IntProp};

/// A totally ordered sort key.
///
/// Variant order matters: every real value sorts before `NonNumeric` (a
/// textual stat printed where a number would be), which sorts before
/// `Missing` (the record has no such property at all).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Int(i64),
    Text(String),
    /// Negated code points of a string, for descending text order.
    RevText(Vec<i64>),
    NonNumeric,
    Missing,
}

/// A named key-extraction capability.
pub trait Sorter: Sync {
    /// Primary name first, then aliases.
    fn names(&self) -> &'static [&'static str];

    /// One-line capability description for help surfaces.
    fn blurb(&self) -> &'static str;

    fn key(
        &self,
        catalog: &Catalog,
        locales: &BTreeSet<Locale>,
        record: Record<'_>,
        dir: SortDir,
    ) -> SortKey;

    /// Noun used when restating the sort chain, e.g. `release date`.
    fn describe(&self) -> &'static str;
}

/// Every registered sorter.
pub const SORTERS: &[&'static dyn Sorter] = &[
    &ClassSorter,
    &NameSorter,
    &AtkSorter,
    &DefSorter,
    &LevelSorter,
    &RankSorter,
    &ScaleSorter,
    &LinkSorter,
    &DateSorter,
];

/// Default sort chain heads when a query specifies none.
pub(crate) const CLASS: &dyn Sorter = &ClassSorter;
pub(crate) const NAME: &dyn Sorter = &NameSorter;

/// Look a sorter up by name or alias (case-sensitive).
pub fn lookup(name: &str) -> Option<&'static dyn Sorter> {
    static BY_NAME: OnceLock<HashMap<&'static str, &'static dyn Sorter>> = OnceLock::new();
    BY_NAME
        .get_or_init(|| {
            let mut map = HashMap::new();
            for sorter in SORTERS {
                for name in sorter.names() {
                    map.insert(*name, *sorter);
                }
            }
            map
        })
        .get(name)
        .copied()
}

impl Sort {
    pub fn key(&self, catalog: &Catalog, locales: &BTreeSet<Locale>, record: Record<'_>) -> SortKey {
        self.sorter.key(catalog, locales, record, self.dir)
    }

    pub fn describe(&self) -> String {
        match self.dir {
            SortDir::Asc => self.sorter.describe().to_string(),
            SortDir::Desc => format!("{} (descending)", self.sorter.describe()),
        }
    }
}

fn int_key(dir: SortDir, value: i64) -> SortKey {
    match dir {
        SortDir::Asc => SortKey::Int(value),
        SortDir::Desc => SortKey::Int(-value),
    }
}

/// Key for the numeric-stat sorters: numbers by direction, the textual
/// sentinel and outright absence at the two maximal tiers.
fn stat_key(dir: SortDir, prop: Option<IntProp<'_>>) -> SortKey {
    match prop {
        Some(IntProp::Num(n)) => int_key(dir, n),
        Some(IntProp::Text(_)) => SortKey::NonNumeric,
        None => SortKey::Missing,
    }
}

struct ClassSorter;

impl Sorter for ClassSorter {
    fn names(&self) -> &'static [&'static str] {
        &["classes", "class", "cl"]
    }

    fn blurb(&self) -> &'static str {
        "Sort by what kind of record it is, in card -> set -> sealed product -> \
         series/archetype order."
    }

    fn key(
        &self,
        _catalog: &Catalog,
        _locales: &BTreeSet<Locale>,
        record: Record<'_>,
        dir: SortDir,
    ) -> SortKey {
        let ordinal = match record.kind() {
            RecordKind::Card => 1,
            RecordKind::Set => 2,
            RecordKind::SealedProduct => 3,
            RecordKind::Series => 4,
        };
        int_key(dir, ordinal)
    }

    fn describe(&self) -> &'static str {
        "class"
    }
}

struct NameSorter;

impl Sorter for NameSorter {
    fn names(&self) -> &'static [&'static str] {
        &["names", "name", "n"]
    }

    fn blurb(&self) -> &'static str {
        "Sort by names in the selected locales."
    }

    fn key(
        &self,
        _catalog: &Catalog,
        locales: &BTreeSet<Locale>,
        record: Record<'_>,
        dir: SortDir,
    ) -> SortKey {
        // One line per selected locale, in canonical locale order, with a
        // replacement-character sentinel standing in for missing locales so
        // the key shape is identical across records.
        let joined = locales
            .iter()
            .map(|locale| {
                record
                    .localized_name(*locale)
                    .map(str::to_lowercase)
                    .unwrap_or_else(|| "\u{FFFD}".to_string())
            })
            .collect::<Vec<_>>()
            .join("\n");
        match dir {
            SortDir::Asc => SortKey::Text(joined),
            SortDir::Desc => SortKey::RevText(joined.chars().map(|c| -(c as i64)).collect()),
        }
    }

    fn describe(&self) -> &'static str {
        "name"
    }
}

macro_rules! numeric_sorter {
    ($type:ident, $names:expr, $blurb:expr, $noun:expr, $prop:expr) => {
        struct $type;

        impl Sorter for $type {
            fn names(&self) -> &'static [&'static str] {
                $names
            }

            fn blurb(&self) -> &'static str {
                $blurb
            }

            fn key(
                &self,
                _catalog: &Catalog,
                _locales: &BTreeSet<Locale>,
                record: Record<'_>,
                dir: SortDir,
            ) -> SortKey {
                let prop = match record {
                    Record::Card(card) => $prop(card),
                    _ => None,
                };
                stat_key(dir, prop)
            }

            fn describe(&self) -> &'static str {
                $noun
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

numeric_sorter!(
    AtkSorter,
    &["attack", "atk", "at"],
    "Sort by ATK.",
    "ATK",
    atk_prop
);

numeric_sorter!(
    DefSorter,
    &["defence", "defense", "def", "de"],
    "Sort by DEF.",
    "DEF",
    def_prop
);

numeric_sorter!(
    LevelSorter,
    &["level", "lvl", "lv", "l"],
    "Sort by level. Does NOT sort ranks in with levels.",
    "level",
    |card: &Card| card.level.map(IntProp::Num)
);

numeric_sorter!(
    RankSorter,
    &["rank", "r"],
    "Sort by rank. Does NOT sort levels in with ranks.",
    "rank",
    |card: &Card| card.rank.map(IntProp::Num)
);

numeric_sorter!(
    ScaleSorter,
    &["scale", "sc"],
    "Sort by pendulum scale.",
    "pendulum scale",
    |card: &Card| card.scale.map(IntProp::Num)
);

numeric_sorter!(
    LinkSorter,
    &["linkranking", "link", "lr"],
    "Sort by link rating.",
    "link rating",
    |card: &Card| Some(IntProp::Num(card.link_arrows.len() as i64))
);

struct DateSorter;

impl Sorter for DateSorter {
    fn names(&self) -> &'static [&'static str] {
        &["date", "d"]
    }

    fn blurb(&self) -> &'static str {
        "Sort by first release date."
    }

    fn key(
        &self,
        catalog: &Catalog,
        _locales: &BTreeSet<Locale>,
        record: Record<'_>,
        dir: SortDir,
    ) -> SortKey {
        match release_date(catalog, record) {
            Some(date) => int_key(dir, date_timestamp(date)),
            None => SortKey::Missing,
        }
    }

    fn describe(&self) -> &'static str {
        "release date"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_tiers_order_real_values_first() {
        assert!(SortKey::Int(i64::MAX) < SortKey::NonNumeric);
        assert!(SortKey::NonNumeric < SortKey::Missing);
        assert!(SortKey::Text("zzz".into()) < SortKey::Missing);
    }

    #[test]
    fn descending_text_compares_by_negated_code_points() {
        // A shared prefix still sorts shorter-first under negation, which is
        // not the same as reversing the ascending list.
        let key = |s: &str| SortKey::RevText(s.chars().map(|c| -(c as i64)).collect());
        assert!(key("b") < key("a"));
        assert!(key("ab") < key("abc"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(lookup("atk").is_some());
        assert!(lookup("ATK").is_none());
    }
}

// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Search integration tests
//!
//! End-to-end tests covering the parser, filters, sorters, and executor
//! against a small fixture catalog.

use cardql::catalog::{Catalog, Record};
use cardql::locale::Locale;
use cardql::query::Search;
use serde_json::json;

/// Fixture catalog: five cards, two sets, one product, four series.
///
/// Release dates: cards 1 and 2 print in set 10 (en 2002-03-08, ja
/// 1999-03-01), card 5 prints in set 11 whose only date is its own
/// 2020-01-01. Card 3 never printed; card 4 and series 33 carry Japanese
/// text only; set 11 has no locale-keyed data at all.
fn catalog() -> Catalog {
    serde_json::from_value(json!({
        "cards": [
            {
                "id": 1,
                "category": "monster",
                "text": {
                    "en": {"name": "Blue-Eyes White Dragon", "effect": "This legendary dragon is a powerful engine of destruction.", "official": true},
                    "ja": {"name": "青眼の白龍", "effect": "高い攻撃力を誇る伝説のドラゴン。", "official": true}
                },
                "attribute": "light",
                "subtype": "dragon",
                "classifications": ["normal"],
                "atk": 3000,
                "def": 2500,
                "level": 8
            },
            {
                "id": 2,
                "category": "monster",
                "text": {
                    "en": {"name": "Dark Magician", "effect": "The ultimate wizard in terms of attack and defense.", "official": true},
                    "ja": {"name": "ブラック・マジシャン", "effect": "魔法使いとしては、攻撃力・守備力ともに最高クラス。", "official": true}
                },
                "attribute": "dark",
                "subtype": "spellcaster",
                "classifications": ["normal"],
                "atk": 2500,
                "def": 2100,
                "level": 7
            },
            {
                "id": 3,
                "category": "monster",
                "text": {
                    "en": {"name": "Slifer the Sky Dragon", "effect": "Its attack cannot be measured.", "official": true}
                },
                "attribute": "divine",
                "subtype": "divine-beast",
                "classifications": ["effect"],
                "atk": "?",
                "def": "?",
                "level": 10
            },
            {
                "id": 4,
                "category": "spell",
                "text": {
                    "ja": {"name": "強欲な壺", "effect": "デッキからカードを２枚ドローする。", "official": true}
                },
                "subcategory": "normal"
            },
            {
                "id": 5,
                "category": "monster",
                "text": {
                    "en": {"name": "Decode Talker", "effect": "Gains ATK for each monster it points to.", "official": true},
                    "ja": {"name": "デコード・トーカー", "effect": "リンク先のモンスターの数だけ攻撃力アップ。", "official": true}
                },
                "attribute": "dark",
                "subtype": "cyberse",
                "abilities": ["effect"],
                "atk": 2500,
                "link_arrows": ["top", "bottom-left", "bottom-right"]
            }
        ],
        "sets": [
            {
                "id": 10,
                "name": {
                    "en": "Legend of Blue Eyes White Dragon",
                    "ja": "青眼の白龍伝説"
                },
                "locales": {
                    "en": {"date": "2002-03-08"},
                    "ja": {"date": "1999-03-01"}
                },
                "contents": [
                    {"locales": ["en"], "cards": [1, 2]},
                    {"locales": ["ja"], "cards": [1, 2]}
                ]
            },
            {
                "id": 11,
                "name": {"en": "Starter Deck: Codebreaker"},
                "date": "2020-01-01",
                "contents": [
                    {"locales": [], "cards": [5]}
                ]
            }
        ],
        "products": [
            {
                "id": 20,
                "name": {"en": "Mega Tin"},
                "date": "2010-08-31",
                "locales": {"en": {}}
            }
        ],
        "series": [
            {"id": 30, "name": {"en": "Blue-Eyes"}},
            {"id": 31, "name": {"en": "Blue-Eyes White"}},
            {"id": 32, "name": {"en": "Toon"}},
            {"id": 33, "name": {"ja": "古代の機械"}}
        ]
    }))
    .expect("fixture catalog should deserialize")
}

fn ids(results: &[Record<'_>]) -> Vec<u64> {
    results.iter().map(|r| r.id()).collect()
}

fn run(catalog: &Catalog, query: &str) -> Vec<u64> {
    let mut search = Search::new(query).expect("query should parse");
    ids(&search.execute(catalog).expect("query should execute"))
}

// ============================================================================
// Defaults and ordering
// ============================================================================

#[test]
fn empty_query_returns_everything_default_sorted() {
    let catalog = catalog();
    // Class ascending, then name ascending over the default en+ja locale
    // pair; records without a given locale's name sort last within their
    // class via the sentinel line.
    assert_eq!(
        run(&catalog, ""),
        vec![1, 2, 5, 3, 4, 10, 11, 20, 30, 31, 32, 33]
    );
}

#[test]
fn execute_is_idempotent() {
    let catalog = catalog();
    let mut search = Search::new("type:monster atk>2000").unwrap();
    let first = ids(&search.execute(&catalog).unwrap());
    let second = ids(&search.execute(&catalog).unwrap());
    assert_eq!(first, second);
}

#[test]
fn default_locales_do_not_prefilter() {
    // A query with no locale: predicate must not restrict the candidate set,
    // even though the default pair governs filters and sorters afterwards.
    let catalog = catalog();
    let mut search = Search::new("").unwrap();
    assert!(search.locales().is_empty());
    let results = search.execute(&catalog).unwrap();
    // Japanese-only card 4, locale-less set 11, Japanese-only series 33 all
    // survive.
    assert!(ids(&results).contains(&4));
    assert!(ids(&results).contains(&11));
    assert!(ids(&results).contains(&33));
    assert_eq!(
        search.locales().iter().copied().collect::<Vec<_>>(),
        vec![Locale::English, Locale::Japanese]
    );
}

// ============================================================================
// Boolean semantics
// ============================================================================

#[test]
fn and_stages_intersect() {
    let catalog = catalog();
    let dark = run(&catalog, "attr:dark");
    let high_level = run(&catalog, "level>=7");
    let both = run(&catalog, "attr:dark level>=7");

    assert_eq!(dark, vec![2, 5]);
    assert_eq!(high_level, vec![1, 2, 3]);
    let expected: Vec<u64> = dark.iter().copied().filter(|id| high_level.contains(id)).collect();
    assert_eq!(both, expected);
}

#[test]
fn or_matches_either_operand() {
    let catalog = catalog();
    assert_eq!(run(&catalog, "atk>2900 OR level>=10"), vec![1, 3]);
}

#[test]
fn negation_is_the_complement() {
    let catalog = catalog();
    let all = run(&catalog, "");
    let matched = run(&catalog, "attr:dark");
    let negated = run(&catalog, "-attr:dark");

    for id in &all {
        assert_eq!(negated.contains(id), !matched.contains(id));
    }
}

#[test]
fn class_union_has_no_duplicates_and_no_other_kinds() {
    let catalog = catalog();
    let mut result = run(&catalog, "class:card OR class:set");
    assert_eq!(result.len(), 7);
    result.sort_unstable();
    assert_eq!(result, vec![1, 2, 3, 4, 5, 10, 11]);
}

#[test]
fn negated_group_inverts_the_conjunction() {
    let catalog = catalog();
    // Cards that are not (dark AND atk 2500): everything but 2 and 5.
    assert_eq!(run(&catalog, "class:card -(attr:dark atk:2500)"), vec![1, 3, 4]);
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn numeric_ordering_excludes_unmeasured_stats() {
    let catalog = catalog();
    // Slifer's "?" ATK is not a number and never satisfies an ordering.
    assert_eq!(run(&catalog, "atk>2600"), vec![1]);
    assert_eq!(run(&catalog, "atk>2400"), vec![1, 2, 5]);
    assert_eq!(run(&catalog, "atk:?"), vec![3]);
}

#[test]
fn link_rating_counts_arrows() {
    let catalog = catalog();
    assert_eq!(run(&catalog, "link:3"), vec![5]);
    assert_eq!(run(&catalog, "class:card link:0"), vec![1, 2, 3, 4]);
}

#[test]
fn release_date_round_trip() {
    let catalog = catalog();
    // Card 5's release date is exactly 2020-01-01 via set 11's own date.
    assert_eq!(run(&catalog, "class:card date=2020-01-01"), vec![5]);
    assert_eq!(run(&catalog, "class:card date<=2020-01-01"), vec![1, 2, 5]);
    assert_eq!(run(&catalog, "class:card date>=2020-01-01"), vec![5]);
    assert_eq!(run(&catalog, "class:card date<2020-01-01"), vec![1, 2]);
}

#[test]
fn card_release_date_is_earliest_printing() {
    let catalog = catalog();
    // Cards 1 and 2 print in set 10; the Japanese locale date is earliest.
    assert_eq!(run(&catalog, "class:card date=1999-03-01"), vec![1, 2]);
    assert_eq!(run(&catalog, "class:card date=2002-03-08"), Vec::<u64>::new());
}

#[test]
fn name_phrase_matches_substring() {
    let catalog = catalog();
    assert_eq!(run(&catalog, "\"white dragon\""), vec![1, 10]);
    assert_eq!(run(&catalog, "name=dark magician"), Vec::<u64>::new());
    assert_eq!(run(&catalog, "name=\"dark magician\""), vec![2]);
}

// ============================================================================
// Locales
// ============================================================================

#[test]
fn locale_restricts_candidates() {
    let catalog = catalog();
    assert_eq!(
        run(&catalog, "locale:en"),
        vec![1, 2, 5, 3, 10, 20, 30, 31, 32]
    );
}

#[test]
fn locale_restricts_name_comparisons() {
    let catalog = catalog();
    // Card 2 survives the Japanese pre-filter but its Japanese name does not
    // contain "magician".
    assert_eq!(run(&catalog, "locale:ja class:card magician"), Vec::<u64>::new());
    assert_eq!(run(&catalog, "locale:ja class:card マジシャン"), vec![2]);
}

// ============================================================================
// Sorting
// ============================================================================

#[test]
fn explicit_sort_overrides_the_default_chain() {
    let catalog = catalog();
    // Levels: card 3 is 10, card 1 is 8, card 2 is 7; cards 4 and 5 have no
    // level and keep their catalog order at the end.
    assert_eq!(run(&catalog, "class:card sort:level-desc"), vec![3, 1, 2, 4, 5]);
}

#[test]
fn chained_sorts_tie_break_per_key() {
    let catalog = catalog();
    // Cards 2 and 5 share ATK 2500; the name link breaks the tie.
    assert_eq!(
        run(&catalog, "class:card sort:atk sort:name"),
        vec![2, 5, 1, 3, 4]
    );
}

#[test]
fn descending_name_order_negates_code_points() {
    let catalog = catalog();
    let asc = run(&catalog, "locale:en class:series sort:name");
    let desc = run(&catalog, "locale:en class:series sort:name-desc");

    assert_eq!(asc, vec![30, 31, 32]);
    // "Blue-Eyes" is a prefix of "Blue-Eyes White": under code-point
    // negation the shorter name still sorts first, so the descending order
    // is not the ascending list reversed.
    assert_eq!(desc, vec![32, 30, 31]);
    let mut reversed = asc.clone();
    reversed.reverse();
    assert_ne!(desc, reversed);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn unknown_names_fail_eagerly() {
    assert!(Search::new("bogus:foo").is_err());
    assert!(Search::new("sort:bogus").is_err());
    assert!(Search::new("locale:zz").is_err());
    assert!(Search::new("sort:atk-sideways").is_err());
}

#[test]
fn mode_violations_fail_on_first_evaluation() {
    let catalog = catalog();
    let mut search = Search::new("name>zzz").expect("mode errors are lazy");
    let err = search.execute(&catalog).unwrap_err();
    assert!(err
        .to_string()
        .contains("Search filter 'name' does not accept filter mode '>'"));
}

#[test]
fn class_vocabulary_violations_fail_on_first_evaluation() {
    let catalog = catalog();
    let mut search = Search::new("class:planet").expect("value errors are lazy");
    assert!(search.execute(&catalog).is_err());
}

// ============================================================================
// Model
// ============================================================================

#[test]
fn catalog_round_trips_through_serde() {
    let catalog = catalog();
    let value = serde_json::to_value(&catalog).unwrap();
    let back: Catalog = serde_json::from_value(value).unwrap();
    assert_eq!(back, catalog);
}

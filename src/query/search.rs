// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! The search aggregate: one parsed query, executable against a catalog.

use std::collections::BTreeSet;
use std::time::Instant;

use crate::catalog::{Catalog, Record};
use crate::error::Result;
use crate::locale::Locale;
use crate::query::ast::{Sort, SortDir, Term};
use crate::query::{parser, sorters};

impl Term {
    /// Test one candidate. Boolean combinators re-test the candidate
    /// independently against each child rather than carrying a shared
    /// intermediate projection.
    fn matches(
        &self,
        catalog: &Catalog,
        locales: &BTreeSet<Locale>,
        record: Record<'_>,
    ) -> Result<bool> {
        match self {
            Term::Predicate(predicate) => {
                predicate.filter.matches(catalog, locales, predicate, record)
            }
            Term::Or(children) => {
                for child in children {
                    if child.matches(catalog, locales, record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            // NOT of the implicit AND over the children.
            Term::Negate(children) => {
                for child in children {
                    if !child.matches(catalog, locales, record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    fn clause(&self) -> String {
        match self {
            Term::Predicate(predicate) => predicate.filter.clause(predicate),
            Term::Or(children) => {
                let clauses: Vec<String> = children.iter().map(Term::clause).collect();
                format!("({})", clauses.join(" OR "))
            }
            Term::Negate(children) => {
                let clauses: Vec<String> = children.iter().map(Term::clause).collect();
                format!("NOT ({})", clauses.join(" AND "))
            }
        }
    }
}

/// A parsed search query over the catalog.
///
/// Built once per request. The only state that changes after construction is
/// the locale set, which receives the default home pair on first execution if
/// the query named no locales itself.
pub struct Search {
    query: String,
    terms: Vec<Term>,
    sorts: Vec<Sort>,
    locales: BTreeSet<Locale>,
}

impl Search {
    /// Parse a raw query string.
    ///
    /// Fails on syntax errors and on any name that does not resolve (filters,
    /// sorters, sort directions, locales). Mode and value mismatches are only
    /// detected once the offending term is evaluated.
    pub fn new(query: &str) -> Result<Self> {
        let parsed = parser::parse(query)?;
        let mut sorts = parsed.sorts;
        if sorts.is_empty() {
            sorts = vec![
                Sort {
                    sorter: sorters::CLASS,
                    dir: SortDir::Asc,
                },
                Sort {
                    sorter: sorters::NAME,
                    dir: SortDir::Asc,
                },
            ];
        }
        Ok(Self {
            query: query.to_string(),
            terms: parsed.terms,
            sorts,
            locales: parsed.locales,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The selected locales. Empty until either the query names some or
    /// [`Search::execute`] installs the defaults.
    pub fn locales(&self) -> &BTreeSet<Locale> {
        &self.locales
    }

    /// Run the query: locale pre-filter, each term as an AND-stage, then one
    /// stable multi-key sort.
    pub fn execute<'a>(&mut self, catalog: &'a Catalog) -> Result<Vec<Record<'a>>> {
        let start = Instant::now();

        // The pre-filter runs with the user-specified locale set; an empty
        // set means no restriction. Only afterwards do the defaults land, so
        // locale-aware filters and sorters always see a non-empty set.
        let mut results: Vec<Record<'a>> = catalog
            .records()
            .filter(|record| self.in_selected_locale(*record))
            .collect();
        let candidates = results.len();
        if self.locales.is_empty() {
            self.locales.extend(Locale::HOME);
        }

        for term in &self.terms {
            let mut kept = Vec::with_capacity(results.len());
            for record in results {
                if term.matches(catalog, &self.locales, record)? {
                    kept.push(record);
                }
            }
            results = kept;
        }

        let sorts = &self.sorts;
        let locales = &self.locales;
        results.sort_by_cached_key(|record| {
            sorts
                .iter()
                .map(|sort| sort.key(catalog, locales, *record))
                .collect::<Vec<_>>()
        });

        tracing::debug!(
            query = %self.query,
            candidates,
            matched = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "executed search"
        );
        Ok(results)
    }

    fn in_selected_locale(&self, record: Record<'_>) -> bool {
        if self.locales.is_empty() {
            return true;
        }
        match record {
            Record::Card(card) => self.locales.iter().any(|l| {
                card.text
                    .get(&l.language())
                    .is_some_and(|text| text.official)
            }),
            Record::Set(set) => self.locales.iter().any(|l| set.locales.contains_key(l)),
            Record::SealedProduct(product) => {
                self.locales.iter().any(|l| product.locales.contains_key(l))
            }
            Record::Series(series) => self
                .locales
                .iter()
                .any(|l| series.name.contains_key(&l.language())),
        }
    }

    /// Restate the parsed query in prose, without executing it.
    pub fn describe(&self) -> String {
        let mut out = String::from("all things");
        if !self.terms.is_empty() {
            let clauses: Vec<String> = self.terms.iter().map(Term::clause).collect();
            out.push(' ');
            out.push_str(&clauses.join(" AND "));
        }
        if !self.sorts.is_empty() {
            let chain: Vec<String> = self.sorts.iter().map(Sort::describe).collect();
            out.push_str(", sorted by ");
            out.push_str(&chain.join(" and then "));
        }
        if !self.locales.is_empty() {
            let names: Vec<&str> = self.locales.iter().map(|l| l.translated()).collect();
            out.push_str(", in ");
            out.push_str(&names.join(" / "));
        }
        out
    }
}

// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Parsed query representation: comparison modes, the boolean term tree, and
//! sort specifications.

use std::fmt;

use crate::query::filters::Filter;
use crate::query::sorters::Sorter;

/// Comparison operator requested in a predicate.
///
/// `Default` is the operator behind `:`. Text filters read it as substring
/// containment; everything else treats it as equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Default,
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FilterMode {
    /// The operator as written in a query.
    pub fn symbol(self) -> &'static str {
        match self {
            FilterMode::Default => ":",
            FilterMode::Eq => "=",
            FilterMode::Lt => "<",
            FilterMode::Le => "<=",
            FilterMode::Gt => ">",
            FilterMode::Ge => ">=",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Sort direction for one link of the sort chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

/// A leaf test: one filter, a comparison mode, and the literal value.
#[derive(Clone)]
pub struct Predicate {
    pub filter: &'static dyn Filter,
    pub mode: FilterMode,
    pub value: String,
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("filter", &self.filter.names()[0])
            .field("mode", &self.mode)
            .field("value", &self.value)
            .finish()
    }
}

/// A node of the boolean query tree.
///
/// Predicates are the only leaves. `Or` passes when any child passes;
/// `Negate` passes when the conjunction of its children does not.
#[derive(Debug, Clone)]
pub enum Term {
    Predicate(Predicate),
    Or(Vec<Term>),
    Negate(Vec<Term>),
}

/// One link of the sort chain: a sorter plus its direction.
#[derive(Clone)]
pub struct Sort {
    pub sorter: &'static dyn Sorter,
    pub dir: SortDir,
}

impl fmt::Debug for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sort")
            .field("sorter", &self.sorter.names()[0])
            .field("dir", &self.dir)
            .finish()
    }
}

// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Structured search-query engine for a trading-card catalog.
//!
//! One [`query::Search`] is built per request from a raw query string and
//! executed against a borrowed, read-only [`catalog::Catalog`], yielding an
//! ordered list of matching records and a prose restatement of the query.

pub mod catalog;
pub mod error;
pub mod locale;
pub mod query;

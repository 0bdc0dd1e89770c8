// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// The single error kind the search engine produces.
///
/// Every failure mode (syntax errors, unknown filter/sorter/locale names,
/// invalid comparison modes, malformed values) carries a message meant to be
/// shown to the end user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SearchError(pub String);

impl SearchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Query parser: a hand-rolled lexer plus a recursive descent parser.
//!
//! Grammar:
//!   query     = term* ;
//!   term      = negation | alternation | item ;
//!   negation  = "-" item ;
//!   alternation = item { "OR" item } ;
//!   item      = group | predicate ;
//!   group     = "(" term* ")" ;
//!   predicate = value                  (* name filter, substring *)
//!             | comparator value       (* class shorthand *)
//!             | WORD comparator value ;
//!   value     = WORD | PHRASE ;
//!
//! The parser resolves filter names against the registries as it goes and
//! intercepts the `sort:` and `locale:` pseudo-filters, so its output is the
//! final flat shape a query needs: top-level terms, the sort chain, and the
//! selected locale set. A group used as an `OR` operand or behind a negation
//! contributes its terms individually, which is why productions hand back
//! term lists rather than single nodes.

use std::collections::BTreeSet;

use crate::error::{Result, SearchError};
use crate::locale::Locale;
use crate::query::ast::{FilterMode, Predicate, Sort, SortDir, Term};
use crate::query::{filters, sorters};

const SORT_FILTER: &str = "sort";
const LOCALE_FILTER: &str = "locale";

/// Token types for the lexer.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Phrase(String),
    Cmp(FilterMode),
    LParen,
    RParen,
    Or,
    Neg,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{w}'"),
            Token::Phrase(p) => format!("'\"{p}\"'"),
            Token::Cmp(mode) => format!("'{}'", mode.symbol()),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Or => "'OR'".to_string(),
            Token::Neg => "'-'".to_string(),
        }
    }
}

/// Characters that end a bare word.
fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '"' | ':' | '=' | '<' | '>')
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        match c {
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ':' => {
                chars.next();
                tokens.push(Token::Cmp(FilterMode::Default));
            }
            '=' => {
                chars.next();
                tokens.push(Token::Cmp(FilterMode::Eq));
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Cmp(FilterMode::Le));
                } else {
                    tokens.push(Token::Cmp(FilterMode::Lt));
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Cmp(FilterMode::Ge));
                } else {
                    tokens.push(Token::Cmp(FilterMode::Gt));
                }
            }
            '-' => {
                // Only a leading '-' negates; inside a word it is plain text
                // (sort:name-desc).
                chars.next();
                tokens.push(Token::Neg);
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        None => {
                            return Err(SearchError::new(
                                "Unterminated quoted phrase in the search query!",
                            ));
                        }
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('"') => value.push('"'),
                            Some('\\') => value.push('\\'),
                            Some(other) => {
                                value.push('\\');
                                value.push(other);
                            }
                            None => {
                                return Err(SearchError::new(
                                    "Unterminated quoted phrase in the search query!",
                                ));
                            }
                        },
                        Some(other) => value.push(other),
                    }
                }
                tokens.push(Token::Phrase(value));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if is_word_boundary(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                if word == "OR" {
                    tokens.push(Token::Or);
                } else {
                    tokens.push(Token::Word(word));
                }
            }
        }
    }

    Ok(tokens)
}

/// Everything one parsed query carries.
#[derive(Debug)]
pub struct ParsedQuery {
    pub terms: Vec<Term>,
    pub sorts: Vec<Sort>,
    pub locales: BTreeSet<Locale>,
}

/// Parse a raw query string.
pub fn parse(input: &str) -> Result<ParsedQuery> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        sorts: Vec::new(),
        locales: BTreeSet::new(),
    };
    let terms = parser.parse_sequence(false)?;
    Ok(ParsedQuery {
        terms,
        sorts: parser.sorts,
        locales: parser.locales,
    })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    sorts: Vec<Sort>,
    locales: BTreeSet<Locale>,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Parse terms until end of input, or until the `)` closing the group
    /// this call was entered for.
    fn parse_sequence(&mut self, in_group: bool) -> Result<Vec<Term>> {
        let mut terms = Vec::new();
        loop {
            match self.peek() {
                None => {
                    if in_group {
                        return Err(SearchError::new("Unclosed '(' in the search query!"));
                    }
                    break;
                }
                Some(Token::RParen) => {
                    if !in_group {
                        return Err(SearchError::new("Unexpected ')' in the search query!"));
                    }
                    self.next();
                    break;
                }
                Some(Token::Neg) => {
                    self.next();
                    let negated = self.parse_item()?;
                    terms.push(Term::Negate(negated));
                }
                Some(Token::Or) => {
                    return Err(SearchError::new(
                        "The OR keyword needs a search term on each side!",
                    ));
                }
                _ => {
                    let mut operands = self.parse_item()?;
                    if self.peek() == Some(&Token::Or) {
                        while self.peek() == Some(&Token::Or) {
                            self.next();
                            operands.extend(self.parse_item()?);
                        }
                        terms.push(Term::Or(operands));
                    } else {
                        terms.append(&mut operands);
                    }
                }
            }
        }
        Ok(terms)
    }

    /// Parse one item: a parenthesized group or a single predicate. Returns a
    /// term list because a group flattens into its members and the `sort:` /
    /// `locale:` pseudo-filters contribute no term at all.
    fn parse_item(&mut self) -> Result<Vec<Term>> {
        match self.next() {
            None => Err(SearchError::new("Expected a search term!")),
            Some(Token::LParen) => {
                if self.peek() == Some(&Token::RParen) {
                    return Err(SearchError::new("Empty '()' group in the search query!"));
                }
                self.parse_sequence(true)
            }
            Some(Token::Word(word)) => {
                if let Some(&Token::Cmp(mode)) = self.peek() {
                    self.next();
                    let value = self.expect_value(mode)?;
                    self.predicate_full(&word, mode, value)
                } else {
                    Ok(vec![simple_predicate(word)])
                }
            }
            Some(Token::Phrase(phrase)) => Ok(vec![simple_predicate(phrase)]),
            Some(Token::Cmp(mode)) => {
                let value = self.expect_value(mode)?;
                Ok(vec![Term::Predicate(Predicate {
                    filter: filters::CLASS,
                    mode,
                    value,
                })])
            }
            Some(token) => Err(SearchError::new(format!(
                "Expected a search term, found {}!",
                token.describe()
            ))),
        }
    }

    fn expect_value(&mut self, mode: FilterMode) -> Result<String> {
        match self.next() {
            Some(Token::Word(word)) => Ok(word),
            Some(Token::Phrase(phrase)) => Ok(phrase),
            _ => Err(SearchError::new(format!(
                "Expected a value after '{}'!",
                mode.symbol()
            ))),
        }
    }

    /// Resolve a `name comparator value` predicate. The `sort:` and `locale:`
    /// pseudo-filters update the query instead of producing a term.
    fn predicate_full(&mut self, name: &str, mode: FilterMode, value: String) -> Result<Vec<Term>> {
        let normalized = name.trim().to_lowercase();

        if normalized == SORT_FILTER {
            self.push_sort(&value)?;
            return Ok(Vec::new());
        }

        if normalized == LOCALE_FILTER {
            let locale = Locale::resolve(&value)
                .ok_or_else(|| SearchError::new(format!("Unknown locale '{value}'!")))?;
            self.locales.insert(locale);
            return Ok(Vec::new());
        }

        let filter = filters::lookup(&normalized)
            .ok_or_else(|| SearchError::new(format!("Unknown filter '{name}'!")))?;
        Ok(vec![Term::Predicate(Predicate { filter, mode, value })])
    }

    /// Parse a `sort:SORTER[-DIRECTION]` value and append to the sort chain.
    fn push_sort(&mut self, value: &str) -> Result<()> {
        let segments: Vec<&str> = value.split('-').map(str::trim).collect();
        if segments[0].is_empty() {
            return Err(SearchError::new(
                "No sorter given! You need something after the 'sort:'.",
            ));
        }
        if segments.len() > 2 {
            return Err(SearchError::new(
                "Too many arguments to the sorter given! The format is 'sort:SORTER[-DIRECTION]'.",
            ));
        }
        let dir = match segments.get(1) {
            None => SortDir::Asc,
            Some(&"asc") => SortDir::Asc,
            Some(&"desc") => SortDir::Desc,
            Some(other) => {
                return Err(SearchError::new(format!(
                    "Unknown sorting direction '{other}'!"
                )));
            }
        };
        let sorter = sorters::lookup(segments[0])
            .ok_or_else(|| SearchError::new(format!("Unknown sorter '{}'!", segments[0])))?;
        self.sorts.push(Sort { sorter, dir });
        Ok(())
    }
}

fn simple_predicate(value: String) -> Term {
    Term::Predicate(Predicate {
        filter: filters::NAME,
        mode: FilterMode::Default,
        value,
    })
}

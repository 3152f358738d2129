//! Raw grammar records as handed over by a grammar-file parser.
//!
//! These types mirror the attribute dictionaries of a TextMate grammar. They
//! carry no behaviour beyond construction helpers: turning them into a linked
//! pattern graph is the job of the reference registry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Capture map keyed by capture index (`"0"`, `"1"`, ...).
pub type RawCaptures = IndexMap<String, RawCapture>;

/// One parsed grammar file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGrammar {
    /// Unique scope name, e.g. `source.js`.
    pub scope_name: String,

    /// Human readable name of the language.
    #[serde(default)]
    pub name: Option<String>,

    /// File extensions handled by the grammar.
    #[serde(default)]
    pub file_types: Vec<String>,

    /// Root pattern list.
    #[serde(default)]
    pub patterns: Vec<RawPattern>,

    /// Top-level repository.
    #[serde(default)]
    pub repository: IndexMap<String, RawPattern>,
}

/// A single pattern record, either a rule or an `include`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPattern {
    #[serde(default)]
    pub include: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content_name: Option<String>,
    #[serde(default, rename = "match")]
    pub match_expr: Option<String>,
    #[serde(default)]
    pub begin: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default, rename = "while")]
    pub while_expr: Option<String>,
    #[serde(default)]
    pub captures: RawCaptures,
    #[serde(default)]
    pub begin_captures: RawCaptures,
    #[serde(default)]
    pub end_captures: RawCaptures,
    #[serde(default)]
    pub while_captures: RawCaptures,
    #[serde(default)]
    pub patterns: Vec<RawPattern>,
    /// Nested repository, visible to this record's patterns.
    #[serde(default)]
    pub repository: IndexMap<String, RawPattern>,
}

/// Capture entry; only the scope name is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCapture {
    #[serde(default)]
    pub name: Option<String>,
}

impl RawGrammar {
    pub fn new(scope_name: impl Into<String>) -> Self {
        Self {
            scope_name: scope_name.into(),
            ..Self::default()
        }
    }

    pub fn with_patterns(mut self, patterns: Vec<RawPattern>) -> Self {
        self.patterns = patterns;
        self
    }

    /// Adds (or replaces) a repository entry.
    pub fn with_entry(mut self, key: impl Into<String>, entry: RawPattern) -> Self {
        self.repository.insert(key.into(), entry);
        self
    }
}

impl RawPattern {
    /// An `{"include": reference}` record.
    pub fn include(reference: impl Into<String>) -> Self {
        Self {
            include: Some(reference.into()),
            ..Self::default()
        }
    }

    /// A single-regex rule.
    pub fn matching(name: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            match_expr: Some(regex.into()),
            ..Self::default()
        }
    }

    /// A rule that only groups nested patterns.
    pub fn group(patterns: Vec<RawPattern>) -> Self {
        Self {
            patterns,
            ..Self::default()
        }
    }

    pub fn with_repository(mut self, key: impl Into<String>, entry: RawPattern) -> Self {
        self.repository.insert(key.into(), entry);
        self
    }

    /// Whether this record denotes an inclusion rather than a rule.
    pub fn is_include(&self) -> bool {
        self.include.is_some()
    }

    /// True for records that carry no match rule of their own and only wrap
    /// `patterns`. Repository entries of this shape stand for their pattern
    /// list directly.
    pub fn is_bare_group(&self) -> bool {
        self.include.is_none()
            && self.match_expr.is_none()
            && self.begin.is_none()
            && self.end.is_none()
            && self.while_expr.is_none()
            && self.name.is_none()
            && self.content_name.is_none()
            && self.captures.is_empty()
            && self.begin_captures.is_empty()
            && self.end_captures.is_empty()
            && self.while_captures.is_empty()
            && self.repository.is_empty()
    }
}

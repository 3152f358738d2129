//! Pattern graph model for TextMate-style grammars.
//!
//! A grammar is a tree of pattern nodes in which some nodes are `include`
//! placeholders standing in for pattern lists defined elsewhere. This crate
//! provides the raw records handed over by a grammar-file parser, the arena
//! that owns the linked graph, and the include state machine. Building and
//! resolving the graph lives in `syntaxlink-resolve`.

pub mod arena;
pub mod error;
pub mod raw;
pub mod reference;
pub mod walk;

pub use arena::{ListId, MatchRule, NodeId, NodeKind, PatternArena, PatternNode, Repository, RepositoryId};
pub use error::ReferenceError;
pub use raw::{RawCapture, RawCaptures, RawGrammar, RawPattern};
pub use reference::{Include, IncludeKind, IncludeState};
pub use walk::ConcretePatterns;

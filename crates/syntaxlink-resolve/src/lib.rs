#![doc = include_str!("../README.md")]

pub mod error;
pub mod registry;
pub mod grammar;
pub mod global;
pub mod clone;
pub mod config;
pub mod core;

pub use error::{LinkError, Result};
pub use registry::ReferenceRegistry;
pub use grammar::Grammar;
pub use global::{resolve_inter_grammar, GlobalReport};
pub use clone::clone_grammar;
pub use config::{FailurePolicy, LinkConfig};
pub use crate::core::{DroppedGrammar, LinkedSet, Linker};

pub use syntaxlink_grammar as model;

//! Include placeholders and the reference-string grammar.
//!
//! | Form             | State                  |
//! |------------------|------------------------|
//! | `#name`          | `ToRepository`         |
//! | `$self`          | `ToSelf`               |
//! | `$base`          | `ToBase`               |
//! | `scope`          | `ToForeign`            |
//! | `scope#name`     | `ToForeignRepository`  |

use std::fmt;

use crate::arena::{ListId, RepositoryId};
use crate::error::ReferenceError;

/// Resolution state of an include.
///
/// The only legal transition is from one of the five pending variants to
/// `Resolved`; see [`Include::resolve_to`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IncludeState {
    /// `#name`: entry of the repository the include was declared in.
    ToRepository { name: String },
    /// `$self`: root pattern list of the owning grammar.
    ToSelf,
    /// `$base`: root pattern list of the base grammar of the load set.
    ToBase,
    /// `scope`: root pattern list of another grammar.
    ToForeign { scope: String },
    /// `scope#name`: repository entry of another grammar.
    ToForeignRepository { scope: String, name: String },
    /// The include now stands for the patterns of `target`.
    Resolved { target: ListId },
}

/// Fieldless mirror of [`IncludeState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IncludeKind {
    ToRepository,
    ToSelf,
    ToBase,
    ToForeign,
    ToForeignRepository,
    Resolved,
}

impl IncludeState {
    /// Parses an include string into its initial (pending) state.
    pub fn parse(reference: &str) -> Result<Self, ReferenceError> {
        if reference.is_empty() {
            return Err(ReferenceError::malformed(reference, "empty reference"));
        }
        if reference.chars().any(char::is_whitespace) {
            return Err(ReferenceError::malformed(reference, "contains whitespace"));
        }

        if let Some(name) = reference.strip_prefix('#') {
            if name.is_empty() {
                return Err(ReferenceError::malformed(reference, "missing repository key after `#`"));
            }
            if name.contains('#') {
                return Err(ReferenceError::malformed(reference, "more than one `#`"));
            }
            return Ok(IncludeState::ToRepository { name: name.to_string() });
        }

        if reference.starts_with('$') {
            return match reference {
                "$self" => Ok(IncludeState::ToSelf),
                "$base" => Ok(IncludeState::ToBase),
                _ => Err(ReferenceError::malformed(reference, "unknown `$` reference")),
            };
        }

        match reference.split_once('#') {
            None => Ok(IncludeState::ToForeign { scope: reference.to_string() }),
            Some((scope, name)) => {
                if name.is_empty() {
                    Err(ReferenceError::malformed(reference, "missing repository key after `#`"))
                } else if name.contains('#') {
                    Err(ReferenceError::malformed(reference, "more than one `#`"))
                } else {
                    Ok(IncludeState::ToForeignRepository {
                        scope: scope.to_string(),
                        name: name.to_string(),
                    })
                }
            }
        }
    }

    pub fn kind(&self) -> IncludeKind {
        match self {
            IncludeState::ToRepository { .. } => IncludeKind::ToRepository,
            IncludeState::ToSelf => IncludeKind::ToSelf,
            IncludeState::ToBase => IncludeKind::ToBase,
            IncludeState::ToForeign { .. } => IncludeKind::ToForeign,
            IncludeState::ToForeignRepository { .. } => IncludeKind::ToForeignRepository,
            IncludeState::Resolved { .. } => IncludeKind::Resolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, IncludeState::Resolved { .. })
    }

    pub fn target(&self) -> Option<ListId> {
        match self {
            IncludeState::Resolved { target } => Some(*target),
            _ => None,
        }
    }
}

impl IncludeKind {
    /// Kinds that can only be satisfied with the whole grammar set in view.
    pub fn is_cross_grammar(self) -> bool {
        matches!(
            self,
            IncludeKind::ToBase | IncludeKind::ToForeign | IncludeKind::ToForeignRepository
        )
    }
}

impl fmt::Display for IncludeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IncludeKind::ToRepository => "to-repository",
            IncludeKind::ToSelf => "to-self",
            IncludeKind::ToBase => "to-base",
            IncludeKind::ToForeign => "to-foreign",
            IncludeKind::ToForeignRepository => "to-foreign-repository",
            IncludeKind::Resolved => "resolved",
        };
        f.write_str(label)
    }
}

/// A deferred reference to another pattern group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Include {
    /// The include string exactly as written.
    pub reference: String,
    /// Repository in scope where the include was declared.
    pub repository: Option<RepositoryId>,
    state: IncludeState,
}

impl Include {
    pub fn new(reference: &str, repository: Option<RepositoryId>) -> Result<Self, ReferenceError> {
        Ok(Self {
            reference: reference.to_string(),
            repository,
            state: IncludeState::parse(reference)?,
        })
    }

    /// A fresh placeholder with the same reference and pending state as
    /// `self`, declared in `repository`.
    pub fn fresh_copy(&self, repository: Option<RepositoryId>) -> Self {
        Self {
            reference: self.reference.clone(),
            repository,
            state: self.state.clone(),
        }
    }

    /// An include already resolved to `target`.
    pub fn resolved(reference: &str, repository: Option<RepositoryId>, target: ListId) -> Self {
        Self {
            reference: reference.to_string(),
            repository,
            state: IncludeState::Resolved { target },
        }
    }

    pub fn state(&self) -> &IncludeState {
        &self.state
    }

    pub fn kind(&self) -> IncludeKind {
        self.state.kind()
    }

    pub fn is_resolved(&self) -> bool {
        self.state.is_resolved()
    }

    /// Moves a pending include to `Resolved { target }`.
    ///
    /// Returns `false`, leaving the include untouched, when it is already
    /// resolved.
    pub fn resolve_to(&mut self, target: ListId) -> bool {
        if self.state.is_resolved() {
            return false;
        }
        self.state = IncludeState::Resolved { target };
        true
    }
}

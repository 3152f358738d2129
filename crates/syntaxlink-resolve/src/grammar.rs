//! A grammar: root pattern list, repository and private reference registry.

use syntaxlink_grammar::{ConcretePatterns, ListId, NodeId, PatternArena, RawGrammar, RepositoryId};

use crate::clone::clone_grammar;
use crate::error::Result;
use crate::registry::ReferenceRegistry;

/// One syntax grammar, identified by its scope name.
///
/// The pattern graph itself lives in a [`PatternArena`]; a grammar holds the
/// ids of its root list and top-level repository, plus the registry of every
/// include built into it.
#[derive(Debug, PartialEq, Eq)]
pub struct Grammar {
    scope_name: String,
    name: Option<String>,
    root: ListId,
    repository: RepositoryId,
    registry: ReferenceRegistry,
}

impl Grammar {
    /// Builds the pattern tree of `raw` into `arena`. Every include is left
    /// pending.
    pub fn build(arena: &mut PatternArena, raw: &RawGrammar) -> Result<Self> {
        let mut registry = ReferenceRegistry::new(raw.scope_name.clone());
        let repository = registry.build_repository(arena, &raw.repository, None)?;
        let root = registry.build(arena, &raw.patterns, Some(repository), None)?;
        log::debug!(
            "built `{}`: {} root patterns, {} includes",
            raw.scope_name,
            arena.list(root).len(),
            registry.len()
        );
        Ok(Self {
            scope_name: raw.scope_name.clone(),
            name: raw.name.clone(),
            root,
            repository,
            registry,
        })
    }

    pub(crate) fn from_parts(
        scope_name: String,
        name: Option<String>,
        root: ListId,
        repository: RepositoryId,
        registry: ReferenceRegistry,
    ) -> Self {
        Self {
            scope_name,
            name,
            root,
            repository,
            registry,
        }
    }

    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn root(&self) -> ListId {
        self.root
    }

    pub fn repository(&self) -> RepositoryId {
        self.repository
    }

    pub fn registry(&self) -> &ReferenceRegistry {
        &self.registry
    }

    /// Resolves `#name` includes against this grammar's repository.
    pub fn resolve_repository_references(&self, arena: &mut PatternArena) -> Result<usize> {
        self.registry
            .resolve_repository_references(arena, self.repository)
    }

    /// Resolves `$self` includes to this grammar's root list.
    pub fn resolve_self_references(&self, arena: &mut PatternArena) -> usize {
        self.registry.resolve_self_references(arena, self.root)
    }

    /// Runs both local resolution steps. `$self` includes are resolved even
    /// when a repository key is missing; the missing key is still reported.
    pub fn resolve_local(&self, arena: &mut PatternArena) -> Result<()> {
        let repository = self.resolve_repository_references(arena);
        let own = self.resolve_self_references(arena);
        log::debug!("`{}`: local resolution done ({} `$self`)", self.scope_name, own);
        repository.map(|count| log::trace!("`{}`: {} repository include(s)", self.scope_name, count))
    }

    /// Registered includes that are still pending.
    pub fn pending(&self, arena: &PatternArena) -> Vec<NodeId> {
        self.registry.pending(arena).collect()
    }

    /// True once no registered include is pending.
    pub fn is_resolved(&self, arena: &PatternArena) -> bool {
        self.registry.pending(arena).next().is_none()
    }

    /// Rule nodes reachable from the root list, resolved includes inlined.
    pub fn concrete_patterns<'a>(&self, arena: &'a PatternArena) -> ConcretePatterns<'a> {
        arena.concrete_patterns(self.root)
    }

    /// Deep copy into `arena`; see [`clone_grammar`].
    pub fn clone_into(&self, arena: &mut PatternArena) -> Grammar {
        clone_grammar(arena, self)
    }
}

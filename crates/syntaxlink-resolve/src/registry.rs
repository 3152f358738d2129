// Build phase and local resolution.
//
// Building never resolves anything: every `include` record becomes a pending
// placeholder and is recorded here, so forward references are free. The
// registry list, not the tree, is what the resolvers walk afterwards.

use indexmap::IndexMap;
use syntaxlink_grammar::{
    Include, IncludeKind, IncludeState, ListId, MatchRule, NodeId, NodeKind, PatternArena,
    PatternNode, RawPattern, RepositoryId,
};

use crate::error::{LinkError, Result};

/// Every include created while building (or cloning into) one grammar.
///
/// A registry belongs to exactly one grammar and is never shared. Entries stay
/// in the list after they resolve; resolvers filter by state.
#[derive(Debug, PartialEq, Eq)]
pub struct ReferenceRegistry {
    owner: String,
    includes: Vec<NodeId>,
}

impl ReferenceRegistry {
    /// Creates an empty registry for the grammar named `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            includes: Vec::new(),
        }
    }

    pub fn includes(&self) -> &[NodeId] {
        &self.includes
    }

    pub fn len(&self) -> usize {
        self.includes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty()
    }

    pub(crate) fn register(&mut self, include: NodeId) {
        self.includes.push(include);
    }

    /// Registered includes that are not resolved yet.
    pub fn pending<'a>(&'a self, arena: &'a PatternArena) -> impl Iterator<Item = NodeId> + 'a {
        self.includes
            .iter()
            .copied()
            .filter(move |id| matches!(arena.include_kind(*id), Some(kind) if kind != IncludeKind::Resolved))
    }

    /// Registered includes currently in state `kind`.
    pub fn of_kind<'a>(
        &'a self,
        arena: &'a PatternArena,
        kind: IncludeKind,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.includes
            .iter()
            .copied()
            .filter(move |id| arena.include_kind(*id) == Some(kind))
    }

    // --- build phase ---

    /// Builds an ordered pattern list from raw records.
    ///
    /// Include records become pending placeholders registered here; rule
    /// records become nodes whose nested `patterns` are built recursively with
    /// the new node as parent. A rule carrying its own `repository` opens a
    /// nested repository enclosing `repository` for its children.
    pub fn build(
        &mut self,
        arena: &mut PatternArena,
        records: &[RawPattern],
        repository: Option<RepositoryId>,
        parent: Option<NodeId>,
    ) -> Result<ListId> {
        let items = self.build_items(arena, records, repository, parent)?;
        Ok(arena.alloc_list(items))
    }

    /// Builds the entries of a repository into a new repository enclosed by
    /// `parent`.
    pub fn build_repository(
        &mut self,
        arena: &mut PatternArena,
        entries: &IndexMap<String, RawPattern>,
        parent: Option<RepositoryId>,
    ) -> Result<RepositoryId> {
        let repository = arena.alloc_repository(parent);
        for (key, entry) in entries {
            let list = if entry.is_bare_group() {
                self.build(arena, &entry.patterns, Some(repository), None)?
            } else {
                self.build(arena, std::slice::from_ref(entry), Some(repository), None)?
            };
            arena.insert_entry(repository, key.clone(), list);
        }
        log::trace!("{}: built repository with {} entries", self.owner, entries.len());
        Ok(repository)
    }

    fn build_items(
        &mut self,
        arena: &mut PatternArena,
        records: &[RawPattern],
        repository: Option<RepositoryId>,
        parent: Option<NodeId>,
    ) -> Result<Vec<NodeId>> {
        let mut items = Vec::with_capacity(records.len());
        for raw in records {
            items.push(self.build_pattern(arena, raw, repository, parent)?);
        }
        Ok(items)
    }

    fn build_pattern(
        &mut self,
        arena: &mut PatternArena,
        raw: &RawPattern,
        repository: Option<RepositoryId>,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        if let Some(reference) = &raw.include {
            let include = Include::new(reference, repository)
                .map_err(|error| LinkError::malformed(&self.owner, error))?;
            let id = arena.alloc_node(PatternNode {
                name: raw.name.clone(),
                rule: MatchRule::default(),
                parent,
                kind: NodeKind::Include(include),
            });
            self.includes.push(id);
            return Ok(id);
        }

        let patterns = arena.alloc_list(Vec::new());
        let id = arena.alloc_node(PatternNode {
            name: raw.name.clone(),
            rule: MatchRule::from_raw(raw),
            parent,
            kind: NodeKind::Rule { patterns },
        });

        let scope = if raw.repository.is_empty() {
            repository
        } else {
            Some(self.build_repository(arena, &raw.repository, repository)?)
        };
        let children = self.build_items(arena, &raw.patterns, scope, Some(id))?;
        arena.set_list(patterns, children);
        Ok(id)
    }

    // --- local resolution ---

    /// Resolves every pending `#name` include.
    ///
    /// The key is looked up in the repository the include was declared in
    /// (innermost first), then in `repository` and its ancestors. Every
    /// include is attempted; the first key that could not be found is reported
    /// as `UnresolvedReference` once all others are done. Running it again
    /// after success resolves nothing.
    pub fn resolve_repository_references(
        &self,
        arena: &mut PatternArena,
        repository: RepositoryId,
    ) -> Result<usize> {
        let mut resolved = 0;
        let mut first_miss = None;

        for &id in &self.includes {
            let (target, reference) = match arena.include(id) {
                Some(include) => match include.state() {
                    IncludeState::ToRepository { name } => (
                        include
                            .repository
                            .and_then(|declared| arena.lookup(declared, name))
                            .or_else(|| arena.lookup(repository, name)),
                        include.reference.clone(),
                    ),
                    _ => continue,
                },
                None => continue,
            };

            match target {
                Some(list) => {
                    arena.resolve_include(id, list);
                    resolved += 1;
                    log::trace!("{}: `{}` -> {}", self.owner, reference, list);
                }
                None => {
                    log::debug!("{}: no repository entry for `{}`", self.owner, reference);
                    if first_miss.is_none() {
                        first_miss = Some(LinkError::unresolved(&self.owner, &reference));
                    }
                }
            }
        }

        match first_miss {
            Some(error) => Err(error),
            None => Ok(resolved),
        }
    }

    /// Resolves every pending `$self` include to `root`, the owning grammar's
    /// root list. The resulting cycle is kept as is.
    pub fn resolve_self_references(&self, arena: &mut PatternArena, root: ListId) -> usize {
        let mut resolved = 0;
        for &id in &self.includes {
            if arena.include_kind(id) == Some(IncludeKind::ToSelf) && arena.resolve_include(id, root) {
                resolved += 1;
            }
        }
        if resolved > 0 {
            log::trace!("{}: {} `$self` include(s) -> {}", self.owner, resolved, root);
        }
        resolved
    }
}

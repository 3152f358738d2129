//! Cycle-safe deep copy of a grammar.
//!
//! Nodes, lists and repositories are copied through identity maps that are
//! filled the moment a copy is allocated, before anything inside it is
//! visited. Lists are filled from a worklist, so a list reached a second time
//! (shared entry, `$self`, mutual inclusion) maps to its existing copy and the
//! copy has the same sharing and cycles as the source.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use syntaxlink_grammar::{
    Include, IncludeState, ListId, NodeId, NodeKind, PatternArena, PatternNode, RepositoryId,
};

use crate::grammar::Grammar;
use crate::registry::ReferenceRegistry;

/// Copies `source` into `arena` as an independent grammar.
///
/// Resolved includes are copied structurally and point at the copy of their
/// target. Pending includes become fresh placeholders registered only in the
/// clone's new registry, so the clone can be resolved later without touching
/// `source`. The clone keeps the scope name.
pub fn clone_grammar(arena: &mut PatternArena, source: &Grammar) -> Grammar {
    let mut cloner = Cloner::new(source.scope_name());

    let root = cloner.map_list(arena, source.root());
    let repository = cloner.map_repository(arena, source.repository());
    cloner.drain(arena);
    cloner.link_parents(arena);

    log::debug!(
        "cloned `{}`: {} nodes, {} lists, {} pending includes",
        source.scope_name(),
        cloner.nodes.len(),
        cloner.lists.len(),
        cloner.registry.len()
    );

    Grammar::from_parts(
        source.scope_name().to_string(),
        source.name().map(str::to_string),
        root,
        repository,
        cloner.registry,
    )
}

struct Cloner {
    registry: ReferenceRegistry,
    nodes: FxHashMap<NodeId, NodeId>,
    lists: FxHashMap<ListId, ListId>,
    repositories: FxHashMap<RepositoryId, RepositoryId>,
    /// Source lists whose copies are allocated but still empty.
    queue: VecDeque<ListId>,
}

impl Cloner {
    fn new(scope_name: &str) -> Self {
        Self {
            registry: ReferenceRegistry::new(scope_name),
            nodes: FxHashMap::default(),
            lists: FxHashMap::default(),
            repositories: FxHashMap::default(),
            queue: VecDeque::new(),
        }
    }

    fn map_list(&mut self, arena: &mut PatternArena, source: ListId) -> ListId {
        if let Some(&copy) = self.lists.get(&source) {
            return copy;
        }
        let copy = arena.alloc_list(Vec::new());
        self.lists.insert(source, copy);
        self.queue.push_back(source);
        copy
    }

    fn map_repository(&mut self, arena: &mut PatternArena, source: RepositoryId) -> RepositoryId {
        if let Some(&copy) = self.repositories.get(&source) {
            return copy;
        }
        let parent = arena.repository(source).parent;
        let parent = parent.map(|parent| self.map_repository(arena, parent));
        let copy = arena.alloc_repository(parent);
        self.repositories.insert(source, copy);

        let entries: Vec<(String, ListId)> = arena
            .repository(source)
            .entries
            .iter()
            .map(|(key, list)| (key.clone(), *list))
            .collect();
        for (key, list) in entries {
            let mapped = self.map_list(arena, list);
            arena.insert_entry(copy, key, mapped);
        }
        copy
    }

    fn map_node(&mut self, arena: &mut PatternArena, source: NodeId) -> NodeId {
        if let Some(&copy) = self.nodes.get(&source) {
            return copy;
        }

        let node = arena.node(source).clone();
        let mut pending = false;
        let kind = match &node.kind {
            NodeKind::Rule { patterns } => NodeKind::Rule {
                patterns: self.map_list(arena, *patterns),
            },
            NodeKind::Include(include) => {
                let repository = include
                    .repository
                    .map(|repository| self.map_repository(arena, repository));
                match include.state() {
                    IncludeState::Resolved { target } => {
                        let target = self.map_list(arena, *target);
                        NodeKind::Include(Include::resolved(&include.reference, repository, target))
                    }
                    _ => {
                        pending = true;
                        NodeKind::Include(include.fresh_copy(repository))
                    }
                }
            }
        };

        let copy = arena.alloc_node(PatternNode {
            name: node.name,
            rule: node.rule,
            parent: None,
            kind,
        });
        self.nodes.insert(source, copy);
        if pending {
            self.registry.register(copy);
        }
        copy
    }

    fn drain(&mut self, arena: &mut PatternArena) {
        while let Some(source) = self.queue.pop_front() {
            let items = arena.list(source).to_vec();
            let mut copies = Vec::with_capacity(items.len());
            for item in items {
                copies.push(self.map_node(arena, item));
            }
            let copy = self.lists[&source];
            arena.set_list(copy, copies);
        }
    }

    /// Parent links of copies point at the copy of the source parent, when
    /// that parent was copied at all.
    fn link_parents(&self, arena: &mut PatternArena) {
        for (&source, &copy) in &self.nodes {
            let parent = arena
                .node(source)
                .parent
                .and_then(|parent| self.nodes.get(&parent).copied());
            arena.node_mut(copy).parent = parent;
        }
    }
}

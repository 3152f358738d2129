//! Arena storage for pattern nodes, ordered pattern lists and repositories.
//!
//! Every node, list and repository is addressed by a dense index. Identity is
//! the index: two structurally identical nodes are different nodes unless they
//! share an id. Cycles (`$self`, mutually including grammars) are plain index
//! loops and need no reference counting.

use std::fmt::{self, Write as _};

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::raw::{RawCaptures, RawPattern};
use crate::reference::{Include, IncludeKind, IncludeState};

/// Identifier of a pattern node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Identifier of an ordered pattern list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListId(pub u32);

/// Identifier of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryId(pub u32);

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Opaque match specification of a rule. Owned, never interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRule {
    pub match_expr: Option<String>,
    pub begin: Option<String>,
    pub end: Option<String>,
    pub while_expr: Option<String>,
    pub content_name: Option<String>,
    pub captures: RawCaptures,
    pub begin_captures: RawCaptures,
    pub end_captures: RawCaptures,
    pub while_captures: RawCaptures,
}

impl MatchRule {
    pub fn from_raw(raw: &RawPattern) -> Self {
        Self {
            match_expr: raw.match_expr.clone(),
            begin: raw.begin.clone(),
            end: raw.end.clone(),
            while_expr: raw.while_expr.clone(),
            content_name: raw.content_name.clone(),
            captures: raw.captures.clone(),
            begin_captures: raw.begin_captures.clone(),
            end_captures: raw.end_captures.clone(),
            while_captures: raw.while_captures.clone(),
        }
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A concrete rule with ordered children.
    Rule { patterns: ListId },
    /// A deferred reference.
    Include(Include),
}

/// A node of the pattern graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternNode {
    pub name: Option<String>,
    pub rule: MatchRule,
    /// Navigational back-reference, not an ownership edge.
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

impl PatternNode {
    pub fn include(&self) -> Option<&Include> {
        match &self.kind {
            NodeKind::Include(include) => Some(include),
            NodeKind::Rule { .. } => None,
        }
    }

    pub fn is_rule(&self) -> bool {
        matches!(self.kind, NodeKind::Rule { .. })
    }
}

/// Named pattern groups local to one grammar, or to one rule for nested
/// repositories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    pub entries: IndexMap<String, ListId>,
    /// Enclosing repository, searched after this one.
    pub parent: Option<RepositoryId>,
}

/// Owner of every node, list and repository of a load set.
///
/// Nodes are never removed. Grammars hold ids into the arena; several
/// grammars (and their clones) live in the same arena so that cross-grammar
/// includes can point at each other's lists.
#[derive(Debug, Clone, Default)]
pub struct PatternArena {
    nodes: Vec<PatternNode>,
    lists: Vec<Vec<NodeId>>,
    repositories: Vec<Repository>,
}

impl PatternArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // --- allocation ---

    pub fn alloc_node(&mut self, node: PatternNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn alloc_list(&mut self, items: Vec<NodeId>) -> ListId {
        let id = ListId(self.lists.len() as u32);
        self.lists.push(items);
        id
    }

    pub fn alloc_repository(&mut self, parent: Option<RepositoryId>) -> RepositoryId {
        let id = RepositoryId(self.repositories.len() as u32);
        self.repositories.push(Repository {
            entries: IndexMap::new(),
            parent,
        });
        id
    }

    // --- access ---

    pub fn node(&self, id: NodeId) -> &PatternNode {
        &self.nodes[id.0 as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut PatternNode {
        &mut self.nodes[id.0 as usize]
    }

    pub fn list(&self, id: ListId) -> &[NodeId] {
        &self.lists[id.0 as usize]
    }

    /// Replaces the contents of a list. Used while a list is being filled.
    pub fn set_list(&mut self, id: ListId, items: Vec<NodeId>) {
        self.lists[id.0 as usize] = items;
    }

    pub fn repository(&self, id: RepositoryId) -> &Repository {
        &self.repositories[id.0 as usize]
    }

    pub fn insert_entry(&mut self, repository: RepositoryId, key: impl Into<String>, list: ListId) {
        self.repositories[repository.0 as usize]
            .entries
            .insert(key.into(), list);
    }

    pub fn include(&self, id: NodeId) -> Option<&Include> {
        self.node(id).include()
    }

    pub fn include_mut(&mut self, id: NodeId) -> Option<&mut Include> {
        match &mut self.node_mut(id).kind {
            NodeKind::Include(include) => Some(include),
            NodeKind::Rule { .. } => None,
        }
    }

    pub fn include_kind(&self, id: NodeId) -> Option<IncludeKind> {
        self.include(id).map(Include::kind)
    }

    /// Children of a rule, resolved content of an include, nothing for a
    /// pending include.
    pub fn subpatterns(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Rule { patterns } => self.list(*patterns),
            NodeKind::Include(include) => match include.state() {
                IncludeState::Resolved { target } => self.list(*target),
                _ => &[],
            },
        }
    }

    /// Looks `name` up in `repository` and then in its enclosing repositories.
    pub fn lookup(&self, repository: RepositoryId, name: &str) -> Option<ListId> {
        let mut current = Some(repository);
        while let Some(id) = current {
            let repo = self.repository(id);
            if let Some(list) = repo.entries.get(name) {
                return Some(*list);
            }
            current = repo.parent;
        }
        None
    }

    /// Resolves the include at `id` to `target`. Returns `false` when `id` is
    /// not an include or is already resolved.
    pub fn resolve_include(&mut self, id: NodeId, target: ListId) -> bool {
        match self.include_mut(id) {
            Some(include) => include.resolve_to(target),
            None => false,
        }
    }

    /// A list is grounded when, following resolved includes only, it reaches
    /// a rule or an empty list. A list whose includes lead nowhere but to
    /// pending includes (directly or through a chain of resolved ones) cannot
    /// yet stand in for anything.
    pub fn is_grounded(&self, list: ListId) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![list];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let items = self.list(current);
            if items.is_empty() {
                return true;
            }
            for id in items {
                match &self.node(*id).kind {
                    NodeKind::Rule { .. } => return true,
                    NodeKind::Include(include) => {
                        if let Some(target) = include.state().target() {
                            stack.push(target);
                        }
                    }
                }
            }
        }
        false
    }

    /// Indented dump of a list. Rule children are expanded; includes are
    /// printed with their state but their targets are not entered.
    pub fn render(&self, list: ListId) -> String {
        let mut out = String::new();
        self.render_into(&mut out, list, 0);
        out
    }

    fn render_into(&self, out: &mut String, list: ListId, depth: usize) {
        for id in self.list(list) {
            let node = self.node(*id);
            let indent = "  ".repeat(depth);
            match &node.kind {
                NodeKind::Rule { patterns } => {
                    let _ = write!(out, "{indent}rule {}", node.name.as_deref().unwrap_or("_"));
                    if let Some(regex) = &node.rule.match_expr {
                        let _ = write!(out, " /{regex}/");
                    }
                    if let Some(begin) = &node.rule.begin {
                        let _ = write!(out, " begin /{begin}/");
                    }
                    if let Some(end) = &node.rule.end {
                        let _ = write!(out, " end /{end}/");
                    }
                    out.push('\n');
                    self.render_into(out, *patterns, depth + 1);
                }
                NodeKind::Include(include) => {
                    let _ = write!(out, "{indent}include {} [{}", include.reference, include.kind());
                    if let IncludeState::Resolved { target } = include.state() {
                        let _ = write!(out, ", {} patterns", self.list(*target).len());
                    }
                    out.push_str("]\n");
                }
            }
        }
    }
}

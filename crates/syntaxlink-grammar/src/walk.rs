//! Cycle-safe traversal of a resolved pattern graph.
//!
//! A `$self` include makes a grammar's root list contain itself, and grammars
//! may include each other. Consumers that inline resolved includes must
//! therefore remember which lists they already entered.

use rustc_hash::FxHashSet;

use crate::arena::{ListId, NodeId, NodeKind, PatternArena};
use crate::reference::IncludeState;

/// Depth-first iterator over the rule nodes reachable from a list, with
/// resolved includes inlined in place.
///
/// Each list is entered at most once per walk. Pending includes contribute
/// nothing. Children of a rule are not yielded: they belong to the rule and
/// only become candidates once the rule is active.
pub struct ConcretePatterns<'a> {
    arena: &'a PatternArena,
    stack: Vec<(&'a [NodeId], usize)>,
    visited: FxHashSet<ListId>,
}

impl<'a> ConcretePatterns<'a> {
    pub(crate) fn new(arena: &'a PatternArena, list: ListId) -> Self {
        let mut visited = FxHashSet::default();
        visited.insert(list);
        Self {
            arena,
            stack: vec![(arena.list(list), 0)],
            visited,
        }
    }
}

impl Iterator for ConcretePatterns<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let (items, index) = self.stack.last_mut()?;
            let Some(&id) = items.get(*index) else {
                self.stack.pop();
                continue;
            };
            *index += 1;

            match &self.arena.node(id).kind {
                NodeKind::Rule { .. } => return Some(id),
                NodeKind::Include(include) => match include.state() {
                    IncludeState::Resolved { target } => {
                        if self.visited.insert(*target) {
                            self.stack.push((self.arena.list(*target), 0));
                        }
                    }
                    _ => log::trace!("skipping pending include `{}`", include.reference),
                },
            }
        }
    }
}

impl PatternArena {
    /// Rule nodes reachable from `list` through resolved includes.
    pub fn concrete_patterns(&self, list: ListId) -> ConcretePatterns<'_> {
        ConcretePatterns::new(self, list)
    }
}

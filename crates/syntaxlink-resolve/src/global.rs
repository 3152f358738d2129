//! Inter-grammar resolution of `$base`, `scope` and `scope#name` includes.
//!
//! Resolution runs in full passes over every registry of the set until
//! nothing of those kinds is pending. An include is only attached to a target
//! list that is grounded (see [`PatternArena::is_grounded`]); a target that
//! leads only to waiting includes is retried on the next pass, which makes the
//! outcome independent of the order grammars are listed in. A pass that
//! resolves nothing ends the run with an error instead of looping.

use rustc_hash::FxHashMap;
use syntaxlink_grammar::{IncludeState, ListId, NodeId, PatternArena};

use crate::error::{LinkError, Result};
use crate::grammar::Grammar;

/// Summary of a successful inter-grammar run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalReport {
    /// Full passes over the set, including the final one.
    pub passes: usize,
    /// Includes resolved across all passes.
    pub resolved: usize,
}

/// Resolves every cross-grammar include of `grammars`.
///
/// `base_scope` names the grammar `$base` refers to. Without one, `$base`
/// stands for the including grammar's own root, as for a grammar used at top
/// level, and resolves at once the way `$self` does.
///
/// Errors: `UnresolvedReference` for the first include whose scope or key
/// does not exist in the set, otherwise `UnsatisfiableReferenceCycle` when
/// the remaining includes only wait on each other. Includes that could be
/// resolved stay resolved either way.
pub fn resolve_inter_grammar(
    arena: &mut PatternArena,
    grammars: &[Grammar],
    base_scope: Option<&str>,
) -> Result<GlobalReport> {
    let by_scope: FxHashMap<&str, &Grammar> = grammars
        .iter()
        .map(|grammar| (grammar.scope_name(), grammar))
        .collect();
    let mut report = GlobalReport::default();

    loop {
        report.passes += 1;
        let mut progress = 0;
        let mut waiting: Vec<(&Grammar, NodeId)> = Vec::new();
        let mut missing: Option<LinkError> = None;

        for grammar in grammars {
            for &id in grammar.registry().includes() {
                let Some(include) = arena.include(id) else {
                    continue;
                };
                if !include.kind().is_cross_grammar() {
                    continue;
                }
                // `$base` without a base grammar is the grammar's own root and,
                // like `$self`, may close a cycle on it.
                let own_root = base_scope.is_none() && *include.state() == IncludeState::ToBase;
                let Some(target) = find_target(arena, &by_scope, grammar, include.state(), base_scope)
                else {
                    if missing.is_none() {
                        missing = Some(LinkError::unresolved(grammar.scope_name(), &include.reference));
                    }
                    continue;
                };

                if own_root || arena.is_grounded(target) {
                    arena.resolve_include(id, target);
                    progress += 1;
                    log::trace!("{}: {:?} -> {}", grammar.scope_name(), id, target);
                } else {
                    waiting.push((grammar, id));
                }
            }
        }

        report.resolved += progress;
        log::debug!(
            "inter-grammar pass {}: {} resolved, {} waiting, missing target: {}",
            report.passes,
            progress,
            waiting.len(),
            missing.is_some()
        );

        if waiting.is_empty() && missing.is_none() {
            log::debug!(
                "inter-grammar resolution reached a fixed point after {} pass(es)",
                report.passes
            );
            return Ok(report);
        }
        if progress == 0 {
            return Err(match missing {
                Some(error) => error,
                None => cycle_error(arena, &waiting),
            });
        }
    }
}

fn find_target(
    arena: &PatternArena,
    by_scope: &FxHashMap<&str, &Grammar>,
    grammar: &Grammar,
    state: &IncludeState,
    base_scope: Option<&str>,
) -> Option<ListId> {
    match state {
        IncludeState::ToBase => match base_scope {
            Some(base) => by_scope.get(base).map(|g| g.root()),
            None => Some(grammar.root()),
        },
        IncludeState::ToForeign { scope } => by_scope.get(scope.as_str()).map(|g| g.root()),
        IncludeState::ToForeignRepository { scope, name } => by_scope
            .get(scope.as_str())
            .and_then(|g| arena.lookup(g.repository(), name)),
        IncludeState::ToRepository { .. } | IncludeState::ToSelf | IncludeState::Resolved { .. } => {
            None
        }
    }
}

fn cycle_error(arena: &PatternArena, waiting: &[(&Grammar, NodeId)]) -> LinkError {
    let mut scopes: Vec<String> = waiting
        .iter()
        .map(|(grammar, _)| grammar.scope_name().to_string())
        .collect();
    scopes.sort();
    scopes.dedup();

    let references = waiting
        .iter()
        .filter_map(|(grammar, id)| {
            arena
                .include(*id)
                .map(|include| format!("{}: {}", grammar.scope_name(), include.reference))
        })
        .collect();

    LinkError::UnsatisfiableReferenceCycle { scopes, references }
}

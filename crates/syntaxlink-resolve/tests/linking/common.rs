use syntaxlink_resolve::model::{ListId, NodeId, PatternArena, RawGrammar, RawPattern};
use syntaxlink_resolve::Grammar;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn build(arena: &mut PatternArena, raw: &RawGrammar) -> Grammar {
    Grammar::build(arena, raw).expect("grammar should build")
}

/// A single-regex rule named `name`.
pub fn rule(name: &str) -> RawPattern {
    RawPattern::matching(name, format!("\\b{name}\\b"))
}

/// Names of the rule nodes reachable from `list`.
pub fn concrete_names(arena: &PatternArena, list: ListId) -> Vec<String> {
    arena
        .concrete_patterns(list)
        .map(|id| arena.node(id).name.clone().unwrap_or_default())
        .collect()
}

/// Target list of the include at `id`, if resolved.
pub fn target(arena: &PatternArena, id: NodeId) -> Option<ListId> {
    arena.include(id).and_then(|include| include.state().target())
}

/// Every include reachable from `list` through rule children, without
/// entering include targets.
pub fn tree_includes(arena: &PatternArena, list: ListId) -> Vec<NodeId> {
    let mut found = Vec::new();
    let mut stack: Vec<NodeId> = arena.list(list).iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        if arena.node(id).is_rule() {
            stack.extend(arena.subpatterns(id).iter().rev().copied());
        } else {
            found.push(id);
        }
    }
    found
}

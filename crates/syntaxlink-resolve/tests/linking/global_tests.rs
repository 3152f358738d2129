use syntaxlink_resolve::model::{IncludeKind, PatternArena, RawGrammar, RawPattern};
use syntaxlink_resolve::{resolve_inter_grammar, Grammar, LinkError};

use crate::common::{build, concrete_names, init_logging, rule, target};

fn embedding() -> RawGrammar {
    RawGrammar::new("source.a").with_patterns(vec![rule("a"), RawPattern::include("source.b#x")])
}

fn embedded() -> RawGrammar {
    RawGrammar::new("source.b")
        .with_patterns(vec![RawPattern::include("#x")])
        .with_entry("x", RawPattern::group(vec![RawPattern::include("$base")]))
}

fn base() -> RawGrammar {
    RawGrammar::new("source.base").with_patterns(vec![rule("base")])
}

fn build_all(arena: &mut PatternArena, raws: &[RawGrammar]) -> Vec<Grammar> {
    raws.iter()
        .map(|raw| {
            let grammar = build(arena, raw);
            grammar.resolve_local(arena).unwrap();
            grammar
        })
        .collect()
}

#[test]
fn chained_references_resolve_in_any_order() {
    init_logging();
    for order in [
        vec![embedding(), embedded(), base()],
        vec![base(), embedded(), embedding()],
    ] {
        let mut arena = PatternArena::new();
        let grammars = build_all(&mut arena, &order);

        let report = resolve_inter_grammar(&mut arena, &grammars, Some("source.base")).unwrap();

        assert_eq!(report.resolved, 2);
        assert!(grammars.iter().all(|g| g.is_resolved(&arena)));

        let a = grammars.iter().find(|g| g.scope_name() == "source.a").unwrap();
        let b = grammars.iter().find(|g| g.scope_name() == "source.b").unwrap();
        let into_b = a.registry().includes()[0];
        assert_eq!(target(&arena, into_b), arena.lookup(b.repository(), "x"));
        assert_eq!(concrete_names(&arena, a.root()), ["a", "base"]);
    }
}

#[test]
fn later_passes_pick_up_waiting_includes() {
    let mut arena = PatternArena::new();
    let grammars = build_all(&mut arena, &[embedding(), embedded(), base()]);

    let report = resolve_inter_grammar(&mut arena, &grammars, Some("source.base")).unwrap();

    // `source.b#x` only holds `$base`, which resolves during the first pass.
    assert_eq!(report.passes, 2);
}

#[test]
fn repository_only_cycle_is_unsatisfiable() {
    init_logging();
    let mut arena = PatternArena::new();
    let a = RawGrammar::new("source.a")
        .with_patterns(vec![RawPattern::include("#x")])
        .with_entry("x", RawPattern::group(vec![RawPattern::include("source.b#y")]));
    let b = RawGrammar::new("source.b")
        .with_patterns(vec![RawPattern::include("#y")])
        .with_entry("y", RawPattern::group(vec![RawPattern::include("source.a#x")]));
    let grammars = build_all(&mut arena, &[a, b]);

    let error = resolve_inter_grammar(&mut arena, &grammars, None).unwrap_err();

    assert_eq!(
        error,
        LinkError::UnsatisfiableReferenceCycle {
            scopes: vec!["source.a".into(), "source.b".into()],
            references: vec!["source.a: source.b#y".into(), "source.b: source.a#x".into()],
        }
    );
    assert_eq!(error.scopes(), ["source.a", "source.b"]);
}

#[test]
fn cycle_through_a_local_hop_is_unsatisfiable() {
    let mut arena = PatternArena::new();
    let a = RawGrammar::new("source.a")
        .with_patterns(vec![RawPattern::include("#x")])
        .with_entry("x", RawPattern::group(vec![RawPattern::include("#z")]))
        .with_entry("z", RawPattern::group(vec![RawPattern::include("source.b#y")]));
    let b = RawGrammar::new("source.b")
        .with_patterns(vec![RawPattern::include("#y")])
        .with_entry("y", RawPattern::group(vec![RawPattern::include("source.a#x")]));
    let grammars = build_all(&mut arena, &[a, b]);

    let error = resolve_inter_grammar(&mut arena, &grammars, None).unwrap_err();

    assert_eq!(
        error,
        LinkError::UnsatisfiableReferenceCycle {
            scopes: vec!["source.a".into(), "source.b".into()],
            references: vec!["source.a: source.b#y".into(), "source.b: source.a#x".into()],
        }
    );
    assert_eq!(grammars[0].pending(&arena).len(), 1);
    assert_eq!(grammars[1].pending(&arena).len(), 1);
    assert!(concrete_names(&arena, grammars[0].root()).is_empty());
}

#[test]
fn mutually_including_roots_are_a_legal_cycle() {
    let mut arena = PatternArena::new();
    let a = RawGrammar::new("source.a")
        .with_patterns(vec![rule("alpha"), RawPattern::include("source.b")]);
    let b = RawGrammar::new("source.b")
        .with_patterns(vec![rule("beta"), RawPattern::include("source.a")]);
    let grammars = build_all(&mut arena, &[a, b]);

    resolve_inter_grammar(&mut arena, &grammars, None).unwrap();

    assert_eq!(target(&arena, grammars[0].registry().includes()[0]), Some(grammars[1].root()));
    assert_eq!(target(&arena, grammars[1].registry().includes()[0]), Some(grammars[0].root()));
    assert_eq!(concrete_names(&arena, grammars[0].root()), ["alpha", "beta"]);
}

#[test]
fn missing_scope_is_unresolved_and_the_rest_still_links() {
    let mut arena = PatternArena::new();
    let a = RawGrammar::new("source.a").with_patterns(vec![
        RawPattern::include("source.b"),
        RawPattern::include("source.nowhere"),
    ]);
    let b = RawGrammar::new("source.b").with_patterns(vec![rule("beta")]);
    let grammars = build_all(&mut arena, &[a, b]);

    let error = resolve_inter_grammar(&mut arena, &grammars, None).unwrap_err();

    assert_eq!(
        error,
        LinkError::UnresolvedReference {
            scope: "source.a".into(),
            reference: "source.nowhere".into(),
        }
    );
    let includes = grammars[0].registry().includes();
    assert_eq!(target(&arena, includes[0]), Some(grammars[1].root()));
    assert_eq!(arena.include_kind(includes[1]), Some(IncludeKind::ToForeign));
}

#[test]
fn missing_foreign_key_is_unresolved() {
    let mut arena = PatternArena::new();
    let a = RawGrammar::new("source.a").with_patterns(vec![RawPattern::include("source.b#nope")]);
    let b = RawGrammar::new("source.b").with_entry("yes", rule("yes"));
    let grammars = build_all(&mut arena, &[a, b]);

    let error = resolve_inter_grammar(&mut arena, &grammars, None).unwrap_err();

    assert!(matches!(
        error,
        LinkError::UnresolvedReference { ref reference, .. } if reference == "source.b#nope"
    ));
}

#[test]
fn base_without_a_base_scope_is_the_own_root() {
    let mut arena = PatternArena::new();
    let raw = RawGrammar::new("source.a").with_patterns(vec![
        rule("alpha"),
        RawPattern::group(vec![RawPattern::include("$base")]),
    ]);
    let grammars = build_all(&mut arena, &[raw]);

    resolve_inter_grammar(&mut arena, &grammars, None).unwrap();

    let include = grammars[0].registry().includes()[0];
    assert_eq!(target(&arena, include), Some(grammars[0].root()));
}

#[test]
fn base_alone_links_like_self() {
    let mut arena = PatternArena::new();
    let raw = RawGrammar::new("source.a").with_patterns(vec![RawPattern::include("$base")]);
    let grammars = build_all(&mut arena, &[raw]);

    let report = resolve_inter_grammar(&mut arena, &grammars, None).unwrap();

    assert_eq!(report.resolved, 1);
    let include = grammars[0].registry().includes()[0];
    assert_eq!(target(&arena, include), Some(grammars[0].root()));
    assert!(concrete_names(&arena, grammars[0].root()).is_empty());
}

#[test]
fn configured_base_made_only_of_references_waits() {
    let mut arena = PatternArena::new();
    let base = RawGrammar::new("source.base").with_patterns(vec![RawPattern::include("source.a")]);
    let a = RawGrammar::new("source.a").with_patterns(vec![RawPattern::include("$base")]);
    let grammars = build_all(&mut arena, &[base, a]);

    let error = resolve_inter_grammar(&mut arena, &grammars, Some("source.base")).unwrap_err();

    assert!(matches!(error, LinkError::UnsatisfiableReferenceCycle { .. }));
}

#[test]
fn base_scope_outside_the_set_is_unresolved() {
    let mut arena = PatternArena::new();
    let raw = RawGrammar::new("source.a").with_patterns(vec![RawPattern::include("$base")]);
    let grammars = build_all(&mut arena, &[raw]);

    let error = resolve_inter_grammar(&mut arena, &grammars, Some("text.html.basic")).unwrap_err();

    assert!(matches!(
        error,
        LinkError::UnresolvedReference { ref scope, ref reference }
            if scope == "source.a" && reference == "$base"
    ));
}

#[test]
fn pending_local_includes_are_not_touched() {
    let mut arena = PatternArena::new();
    let raw = RawGrammar::new("source.a")
        .with_patterns(vec![RawPattern::include("#later"), rule("alpha")])
        .with_entry("later", rule("later"));
    let grammar = build(&mut arena, &raw);
    let grammars = vec![grammar];

    let report = resolve_inter_grammar(&mut arena, &grammars, None).unwrap();

    assert_eq!(report.resolved, 0);
    assert_eq!(report.passes, 1);
    let include = grammars[0].registry().includes()[0];
    assert_eq!(arena.include_kind(include), Some(IncludeKind::ToRepository));
}

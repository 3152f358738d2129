use syntaxlink_resolve::model::{IncludeKind, PatternArena, RawGrammar, RawPattern};
use syntaxlink_resolve::LinkError;

use crate::common::{build, concrete_names, init_logging, rule, target};

#[test]
fn repository_resolution_is_idempotent() {
    init_logging();
    let mut arena = PatternArena::new();
    let raw = RawGrammar::new("source.demo")
        .with_patterns(vec![RawPattern::include("#value"), RawPattern::include("#value")])
        .with_entry("value", rule("number"));
    let grammar = build(&mut arena, &raw);

    assert_eq!(grammar.resolve_repository_references(&mut arena), Ok(2));
    let first: Vec<_> = grammar
        .registry()
        .includes()
        .iter()
        .map(|id| target(&arena, *id))
        .collect();

    assert_eq!(grammar.resolve_repository_references(&mut arena), Ok(0));
    let second: Vec<_> = grammar
        .registry()
        .includes()
        .iter()
        .map(|id| target(&arena, *id))
        .collect();

    let entry = arena.lookup(grammar.repository(), "value");
    assert_eq!(first, vec![entry, entry]);
    assert_eq!(first, second);
}

#[test]
fn self_include_targets_the_grammar_root() {
    let mut arena = PatternArena::new();
    let raw = RawGrammar::new("source.demo").with_patterns(vec![
        rule("keyword"),
        RawPattern::group(vec![RawPattern::include("$self")]),
    ]);
    let grammar = build(&mut arena, &raw);

    assert_eq!(grammar.resolve_self_references(&mut arena), 1);

    let include = grammar.registry().includes()[0];
    assert_eq!(target(&arena, include), Some(grammar.root()));
    assert!(grammar.is_resolved(&arena));
}

#[test]
fn missing_key_is_reported_and_others_still_resolve() {
    init_logging();
    let mut arena = PatternArena::new();
    let raw = RawGrammar::new("source.demo")
        .with_patterns(vec![
            RawPattern::include("#present"),
            RawPattern::include("#missing"),
            RawPattern::include("$self"),
        ])
        .with_entry("present", rule("present"));
    let grammar = build(&mut arena, &raw);

    let error = grammar.resolve_local(&mut arena).unwrap_err();

    assert_eq!(
        error,
        LinkError::UnresolvedReference {
            scope: "source.demo".into(),
            reference: "#missing".into(),
        }
    );
    assert!(error.to_string().contains("#missing"));

    let includes = grammar.registry().includes();
    assert_eq!(target(&arena, includes[0]), arena.lookup(grammar.repository(), "present"));
    assert_eq!(arena.include_kind(includes[1]), Some(IncludeKind::ToRepository));
    assert_eq!(target(&arena, includes[2]), Some(grammar.root()));
    assert_eq!(grammar.pending(&arena), vec![includes[1]]);
}

#[test]
fn innermost_repository_wins() {
    let mut arena = PatternArena::new();
    let raw = RawGrammar::new("source.demo")
        .with_patterns(vec![RawPattern::group(vec![
            RawPattern::include("#inner"),
            RawPattern::include("#outer"),
        ])
        .with_repository("inner", rule("nested-inner"))])
        .with_entry("inner", rule("top-inner"))
        .with_entry("outer", rule("top-outer"));
    let grammar = build(&mut arena, &raw);

    grammar.resolve_local(&mut arena).unwrap();

    let includes = grammar.registry().includes();
    let inner = target(&arena, includes[0]).unwrap();
    let outer = target(&arena, includes[1]).unwrap();
    assert_eq!(concrete_names(&arena, inner), ["nested-inner"]);
    assert_eq!(concrete_names(&arena, outer), ["top-outer"]);
}

#[test]
fn mutually_referencing_entries_resolve_and_walk() {
    let mut arena = PatternArena::new();
    let raw = RawGrammar::new("source.demo")
        .with_patterns(vec![RawPattern::include("#a")])
        .with_entry("a", RawPattern::group(vec![rule("alpha"), RawPattern::include("#b")]))
        .with_entry("b", RawPattern::group(vec![RawPattern::include("#a"), rule("beta")]));
    let grammar = build(&mut arena, &raw);

    grammar.resolve_local(&mut arena).unwrap();

    assert!(grammar.is_resolved(&arena));
    let names: Vec<String> = grammar
        .concrete_patterns(&arena)
        .map(|id| arena.node(id).name.clone().unwrap_or_default())
        .collect();
    assert_eq!(names, ["alpha", "beta"]);
}

#[test]
fn local_resolution_leaves_cross_grammar_includes_pending() {
    let mut arena = PatternArena::new();
    let raw = RawGrammar::new("source.demo").with_patterns(vec![
        RawPattern::include("$base"),
        RawPattern::include("source.other"),
        RawPattern::include("source.other#key"),
    ]);
    let grammar = build(&mut arena, &raw);

    grammar.resolve_local(&mut arena).unwrap();

    let kinds: Vec<_> = grammar
        .pending(&arena)
        .into_iter()
        .filter_map(|id| arena.include_kind(id))
        .collect();
    assert_eq!(
        kinds,
        [IncludeKind::ToBase, IncludeKind::ToForeign, IncludeKind::ToForeignRepository]
    );
}

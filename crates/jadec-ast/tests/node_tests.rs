use super::*;

#[test]
fn test_builder_assigns_distinct_spans() {
    let mut arena = NodeArena::new();
    let a = arena.int(1);
    let b = arena.int(2);

    assert_ne!(arena.span(a), arena.span(b));
    assert_eq!(arena.kind(a), Some(&ExprKind::IntegerLiteral(1)));
}

#[test]
fn test_missing_node_has_dummy_span() {
    let arena = NodeArena::new();
    assert!(arena.get(NodeIndex::NONE).is_none());
    assert_eq!(arena.span(NodeIndex::NONE), Span::DUMMY);
}

#[test]
fn test_children_follow_evaluation_order() {
    let mut arena = NodeArena::new();
    let k1 = arena.text_lit("a");
    let v1 = arena.int(1);
    let k2 = arena.text_lit("b");
    let v2 = arena.int(2);
    let rest = arena.name("rest");
    let map = arena.map(vec![(k1, v1), (k2, v2)], Some(rest), None);

    let children = arena.kind(map).unwrap().children();
    assert_eq!(children.as_slice(), &[k1, v1, k2, v2, rest]);
}

#[test]
fn test_names_are_interned_once() {
    let mut arena = NodeArena::new();
    let x1 = arena.name("x");
    let x2 = arena.name("x");
    match (arena.kind(x1), arena.kind(x2)) {
        (Some(ExprKind::Name(a)), Some(ExprKind::Name(b))) => {
            assert_eq!(a, b);
            assert_eq!(arena.text(*a), "x");
        }
        other => panic!("expected names, got {other:?}"),
    }
}

#[test]
fn test_named_call_arguments_keep_names() {
    let mut arena = NodeArena::new();
    let n = arena.text_lit("Ann");
    let call = arena.call_named("Person", vec![("name", n)]);
    let Some(ExprKind::Call { args, .. }) = arena.kind(call) else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 1);
    assert_eq!(args[0].name.map(|a| arena.text(a).to_string()), Some("name".to_string()));
}

use super::*;
use kiln_ast::{NodeKind, SourceType, VariableKind};
use kiln_common::Comment;

#[derive(Default, Debug, PartialEq)]
struct Counter(u32);

fn program(body: Vec<Node>) -> Node {
    Node::new(NodeKind::Program {
        body,
        source_type: SourceType::Module,
        directives: Vec::new(),
        comments: Vec::new(),
    })
}

#[test]
fn test_new_builds_scope_tree() {
    let root = program(vec![Node::var_decl(VariableKind::Let, "a", None)]);
    let cx = CompilerContext::new("main.js", &root);
    assert_eq!(cx.file_name(), "main.js");
    assert!(cx.scopes.get_binding(cx.scopes.root(), "a").is_some());
    assert!(cx.diagnostics.is_empty());
}

#[test]
fn test_new_reports_duplicate_declarations() {
    let root = program(vec![
        Node::var_decl(VariableKind::Let, "a", None),
        Node::var_decl(VariableKind::Let, "a", None),
    ]);
    let cx = CompilerContext::new("main.js", &root);
    assert_eq!(cx.diagnostics.codes(), vec![9001]);
}

#[test]
fn test_debug_summarizes_context() {
    let root = program(vec![Node::var_decl(VariableKind::Let, "a", None)]);
    let mut cx = CompilerContext::new("main.js", &root);
    *cx.state.get_or_init::<Counter>("counter", root.id).unwrap() = Counter(1);
    let printed = format!("{cx:?}");
    assert!(printed.starts_with("CompilerContext {"));
    assert!(printed.contains("file_name: \"main.js\""));
    assert!(printed.contains("visitor_states: 1"));
}

#[test]
fn test_state_is_keyed_by_visitor_and_boundary() {
    let mut store = VisitorStateStore::default();
    let a = NodeId::fresh();
    let b = NodeId::fresh();

    store.get_or_init::<Counter>("one", a).unwrap().0 += 1;
    store.get_or_init::<Counter>("one", a).unwrap().0 += 1;
    store.get_or_init::<Counter>("one", b).unwrap().0 += 5;
    store.get_or_init::<Counter>("two", a).unwrap().0 += 10;

    assert_eq!(store.get::<Counter>("one", a), Some(&Counter(2)));
    assert_eq!(store.get::<Counter>("one", b), Some(&Counter(5)));
    assert_eq!(store.get::<Counter>("two", a), Some(&Counter(10)));
    assert_eq!(store.boundaries_of("one"), {
        let mut ids = vec![a, b];
        ids.sort();
        ids
    });
}

#[test]
fn test_state_with_wrong_type_is_an_invariant_error() {
    let mut store = VisitorStateStore::default();
    let boundary = NodeId::fresh();
    store.get_or_init::<Counter>("v", boundary).unwrap();
    let err = store.get_or_init::<String>("v", boundary).unwrap_err();
    assert!(matches!(err, CompileError::Invariant(_)));
    assert!(store.get::<String>("v", boundary).is_none());
}

#[test]
fn test_reset_boundary_drops_only_that_boundary() {
    let mut store = VisitorStateStore::default();
    let a = NodeId::fresh();
    let b = NodeId::fresh();
    store.get_or_init::<Counter>("one", a).unwrap();
    store.get_or_init::<Counter>("two", a).unwrap();
    store.get_or_init::<Counter>("one", b).unwrap();

    store.reset_boundary(a);
    assert_eq!(store.len(), 1);
    assert!(store.get::<Counter>("one", b).is_some());

    let taken = store.take::<Counter>("one", b);
    assert_eq!(taken, Some(Counter(0)));
    assert!(store.is_empty());
}

#[test]
fn test_comment_registry_upserts_by_id() {
    let mut registry = CommentRegistry::default();
    registry.upsert(Comment::block("header", "first"));
    registry.upsert(Comment::line("other", "x"));
    registry.upsert(Comment::block("header", "second"));
    assert_eq!(registry.len(), 2);

    let drained: Vec<_> = registry.drain().collect();
    assert_eq!(drained[0].value, "second");
    assert_eq!(drained[1].value, "x");
    assert!(registry.is_empty());
}

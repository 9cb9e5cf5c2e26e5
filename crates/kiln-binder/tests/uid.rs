use super::*;
use kiln_ast::{Node, NodeId, NodeKind, SourceType, VariableKind};
use kiln_common::Diagnostics;

use crate::build_scope;
use crate::scope::{BindingKind, ScopeKind};

fn tree_with(body: Vec<Node>) -> ScopeTree {
    let root = Node::new(NodeKind::Program {
        body,
        source_type: SourceType::Module,
        directives: Vec::new(),
        comments: Vec::new(),
    });
    build_scope(&root, &mut Diagnostics::new("uid.js"))
}

#[test]
fn test_sanitize_hint() {
    assert_eq!(sanitize_hint("Foo-Bar"), "foobar");
    assert_eq!(sanitize_hint("__obj2"), "obj");
    assert_eq!(sanitize_hint("123"), "ref");
    assert_eq!(sanitize_hint(""), "ref");
    assert_eq!(sanitize_hint("$el"), "$el");
}

#[test]
fn test_generate_uid_sequence_is_deterministic() {
    let mut tree = tree_with(vec![]);
    let root = tree.root();
    assert_eq!(tree.generate_uid(root, None), "_ref");
    assert_eq!(tree.generate_uid(root, None), "_ref1");
    assert_eq!(tree.generate_uid(root, Some("obj")), "_obj");
    assert_eq!(tree.generate_uid(root, None), "_ref2");
    assert!(tree.get(root).unwrap().is_generated("_ref1"));
}

#[test]
fn test_generate_uid_skips_declared_and_referenced_names() {
    let mut tree = tree_with(vec![
        Node::var_decl(VariableKind::Var, "_a", None),
        Node::expr_stmt(Node::ident("_a1")),
    ]);
    let root = tree.root();
    assert_eq!(tree.generate_uid(root, Some("a")), "_a2");
}

#[test]
fn test_generate_uid_is_unique_across_nested_scopes() {
    let mut tree = tree_with(vec![]);
    let root = tree.root();
    let child = tree.create_scope(ScopeKind::Function, Some(root), NodeId::fresh());
    let inner = tree.generate_uid(child, Some("this"));
    let outer = tree.generate_uid(root, Some("this"));
    assert_eq!(inner, "_this");
    assert_eq!(outer, "_this1");
    assert!(!tree.get(root).unwrap().is_generated("_this"));
}

#[test]
fn test_generated_name_sees_later_bindings() {
    let mut tree = tree_with(vec![]);
    let root = tree.root();
    tree.add_binding(root, "_tmp", BindingKind::Var, NodeId::NONE);
    assert_eq!(tree.generate_uid(root, Some("tmp")), "_tmp1");
}

use super::*;
use crate::test_support::{program, run_to_string, run_twice};
use kiln_ast::VariableKind;

fn lower(init: Node) -> String {
    let root = program(vec![Node::var_decl(VariableKind::Const, "x", Some(init))]);
    run_to_string(root, &[&ObjectSpread])
}

#[test]
fn test_spread_between_properties() {
    let object = Node::object(vec![
        Node::property("a", Node::number(1.0)),
        Node::spread(Node::ident("b")),
        Node::property("c", Node::number(2.0)),
    ]);
    assert_eq!(
        lower(object),
        "const x = Object.assign({ a: 1 }, b, { c: 2 });"
    );
}

#[test]
fn test_leading_spread_gets_fresh_target() {
    let object = Node::object(vec![Node::spread(Node::ident("b")), Node::spread(Node::ident("c"))]);
    assert_eq!(lower(object), "const x = Object.assign({}, b, c);");
}

#[test]
fn test_nested_spread_is_lowered_too() {
    let inner = Node::object(vec![Node::spread(Node::ident("d"))]);
    let object = Node::object(vec![Node::property("a", inner), Node::spread(Node::ident("b"))]);
    assert_eq!(
        lower(object),
        "const x = Object.assign({ a: Object.assign({}, d) }, b);"
    );
}

#[test]
fn test_object_without_spread_is_kept() {
    let object = Node::object(vec![Node::property("a", Node::number(1.0))]);
    assert_eq!(lower(object), "const x = { a: 1 };");
}

#[test]
fn test_second_run_changes_nothing() {
    let object = Node::object(vec![
        Node::spread(Node::ident("b")),
        Node::property("c", Node::number(2.0)),
    ]);
    let root = program(vec![Node::var_decl(VariableKind::Const, "x", Some(object))]);
    run_twice(root, &[&ObjectSpread]);
}

use super::*;
use crate::test_support::{program, run_to_string, run_twice};
use kiln_ast::VariableKind;

fn lower(init: Node) -> String {
    let root = program(vec![Node::var_decl(VariableKind::Const, "x", Some(init))]);
    run_to_string(root, &[&CallSpread])
}

fn spread(name: &str) -> Node {
    Node::spread(Node::ident(name))
}

#[test]
fn test_plain_call() {
    let call = Node::call(Node::ident("f"), vec![spread("args")]);
    assert_eq!(lower(call), "const x = f.apply(null, args);");
}

#[test]
fn test_method_call_keeps_receiver() {
    let call = Node::call(
        Node::member(Node::ident("o"), "m"),
        vec![Node::ident("a"), spread("b")],
    );
    assert_eq!(lower(call), "const x = o.m.apply(o, [a].concat(b));");
}

#[test]
fn test_impure_receiver_is_evaluated_once() {
    let receiver = Node::call(Node::ident("get"), Vec::new());
    let call = Node::call(Node::member(receiver, "m"), vec![spread("b")]);
    assert_eq!(
        lower(call),
        "var _ref;\nconst x = (_ref = get()).m.apply(_ref, b);"
    );
}

#[test]
fn test_new_expression() {
    let new = Node::new_expr(Node::ident("C"), vec![spread("args")]);
    assert_eq!(
        lower(new),
        "const x = new (Function.prototype.bind.apply(C, [null].concat(args)))();"
    );
}

#[test]
fn test_array_spread() {
    let array = Node::array(vec![Node::ident("a"), spread("b"), Node::ident("c")]);
    assert_eq!(lower(array), "const x = [a].concat(b, [c]);");

    let leading = Node::array(vec![spread("b")]);
    assert_eq!(lower(leading), "const x = [].concat(b);");
}

#[test]
fn test_super_call_is_kept() {
    let call = Node::call(Node::new(NodeKind::Super), vec![spread("args")]);
    assert_eq!(lower(call), "const x = super(...args);");
}

#[test]
fn test_second_run_changes_nothing() {
    let call = Node::call(
        Node::member(Node::call(Node::ident("o"), Vec::new()), "m"),
        vec![Node::ident("a"), spread("b")],
    );
    let array = Node::new(NodeKind::ArrayExpression {
        elements: vec![Node::ident("a"), spread("b")],
    });
    let root = program(vec![
        Node::var_decl(VariableKind::Const, "x", Some(call)),
        Node::var_decl(VariableKind::Const, "y", Some(array)),
    ]);
    run_twice(root, &[&CallSpread]);
}

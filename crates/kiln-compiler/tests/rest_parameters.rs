use super::*;
use crate::test_support::{emit, program, run, run_twice};
use kiln_ast::MethodKind;

fn rest(name: &str) -> Node {
    Node::new(NodeKind::RestElement {
        argument: Box::new(Node::binding(name)),
    })
}

#[test]
fn test_rest_moves_into_body() {
    let function = Node::new(NodeKind::FunctionDeclaration(Function {
        id: Some(Box::new(Node::binding("f"))),
        params: vec![Node::binding("a"), rest("others")],
        body: Box::new(Node::block(vec![Node::ret(Some(Node::ident("others")))])),
        is_async: false,
        is_generator: false,
    }));
    let function_id = function.id;
    let (out, cx) = run(program(vec![function]), &[&RestParameters]);
    assert_eq!(
        emit(&out),
        "function f(a) {\n    var others = Array.prototype.slice.call(arguments, 1);\n    return others;\n}"
    );

    let scope = cx.scopes.scope_for_node(function_id).unwrap();
    let binding = cx.scopes.get(scope).and_then(|s| s.get_own("others")).unwrap();
    assert_eq!(binding.kind, BindingKind::Var);
}

#[test]
fn test_object_method() {
    let method = Node::new(NodeKind::ObjectMethod {
        kind: MethodKind::Method,
        key: Box::new(Node::ident("m")),
        computed: false,
        params: vec![rest("r")],
        body: Box::new(Node::block(Vec::new())),
    });
    let root = program(vec![Node::var_decl(
        VariableKind::Const,
        "o",
        Some(Node::object(vec![method])),
    )]);
    let (out, _) = run(root, &[&RestParameters]);

    let mut lowered = None;
    out.for_each_descendant(&mut |n| {
        if let NodeKind::ObjectMethod { params, body, .. } = &n.kind {
            lowered = Some((params.len(), body.statements().map(<[Node]>::len)));
        }
    });
    assert_eq!(lowered, Some((0, Some(1))));
    assert!(emit(&out).contains("var r = Array.prototype.slice.call(arguments, 0);"));
}

#[test]
fn test_arrow_and_plain_functions_are_kept() {
    let arrow = Node::new(NodeKind::ArrowFunctionExpression {
        params: vec![rest("r")],
        body: Box::new(Node::ident("r")),
        is_async: false,
    });
    let plain = Node::function_expr(None, vec![Node::binding("a")], Vec::new());
    let root = program(vec![
        Node::var_decl(VariableKind::Const, "x", Some(arrow)),
        Node::var_decl(VariableKind::Const, "y", Some(plain)),
    ]);
    let (out, _) = run(root, &[&RestParameters]);
    assert_eq!(emit(&out), "const x = (...r) => r;\nconst y = function (a) { };");
}

#[test]
fn test_second_run_changes_nothing() {
    let function = Node::new(NodeKind::FunctionDeclaration(Function {
        id: Some(Box::new(Node::binding("f"))),
        params: vec![rest("others")],
        body: Box::new(Node::block(vec![Node::ret(Some(Node::ident("others")))])),
        is_async: false,
        is_generator: false,
    }));
    let out = run_twice(program(vec![function]), &[&RestParameters]);
    assert!(!emit(&out).contains("..."));
}

use super::*;
use crate::test_support::emit;
use kiln_ast::{BinaryOperator, VariableKind};

#[test]
fn test_replace_nodes_swaps_by_id() {
    let target = Node::ident("a");
    let target_id = target.id;
    let root = Node::binary(BinaryOperator::Addition, target, Node::ident("b"));

    let mut replacements = FxHashMap::default();
    replacements.insert(target_id, Node::number(1.0));
    let out = replace_nodes(root, &mut replacements);
    assert_eq!(emit(&out), "1 + b");
    assert!(replacements.is_empty());
}

#[test]
fn test_replace_this_stops_at_functions() {
    let inner = Node::function_expr(None, Vec::new(), vec![Node::ret(Some(Node::this()))]);
    let arrow = Node::new(NodeKind::ArrowFunctionExpression {
        params: Vec::new(),
        body: Box::new(Node::this()),
        is_async: false,
    });
    let root = Node::array(vec![Node::member(Node::this(), "x"), inner, arrow]);

    let out = replace_this(root, &|| Node::ident("C"));
    assert_eq!(
        emit(&out),
        "[C.x, function () {\n    return this;\n}, () => C]"
    );
}

#[test]
fn test_uses_this() {
    assert!(uses_this(&Node::member(Node::this(), "x")));
    assert!(!uses_this(&Node::member(Node::ident("a"), "x")));
    let nested = Node::function_expr(None, Vec::new(), vec![Node::expr_stmt(Node::this())]);
    assert!(!uses_this(&nested));
}

#[test]
fn test_declared_names_of_patterns() {
    let pattern = Node::new(NodeKind::ObjectPattern {
        properties: vec![
            Node::new(NodeKind::BindingProperty {
                key: Box::new(Node::ident("a")),
                computed: false,
                value: Box::new(Node::binding("x")),
            }),
            Node::new(NodeKind::RestElement {
                argument: Box::new(Node::binding("rest")),
            }),
        ],
    });
    let declaration = Node::new(NodeKind::VariableDeclaration {
        kind: VariableKind::Let,
        declarations: vec![
            Node::new(NodeKind::VariableDeclarator {
                id: Box::new(pattern),
                init: Some(Box::new(Node::ident("obj"))),
            }),
            Node::declarator("y", None),
        ],
    });
    assert_eq!(declared_names(&declaration), vec!["x", "rest", "y"]);
    assert_eq!(
        declared_names(&Node::class_decl("C", None, Vec::new())),
        vec!["C"]
    );
    assert!(declared_names(&Node::expr_stmt(Node::ident("z"))).is_empty());
}

#[test]
fn test_split_spreads() {
    let items = vec![
        Node::ident("a"),
        Node::ident("b"),
        Node::spread(Node::ident("c")),
        Node::ident("d"),
    ];
    assert!(has_spread(&items));
    let segments = split_spreads(items);
    assert_eq!(segments.len(), 3);
    assert!(matches!(&segments[0], Segment::Plain(run) if run.len() == 2));
    assert!(matches!(&segments[1], Segment::Spread(arg) if arg.is_identifier("c")));
    assert!(matches!(&segments[2], Segment::Plain(run) if run.len() == 1));

    assert!(!has_spread(&[Node::ident("a")]));
}

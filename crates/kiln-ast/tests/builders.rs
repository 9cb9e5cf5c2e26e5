use super::*;
use crate::node_type::NodeType;

#[test]
fn test_builders_allocate_fresh_ids() {
    let a = Node::ident("a");
    let b = Node::ident("a");
    assert_ne!(a.id, b.id);
    assert!(!a.id.is_none());
    // Structural equality ignores identity.
    assert_eq!(a, b);
}

#[test]
fn test_member_path_builds_left_nested_chain() {
    let node = Node::member_path("React.createElement");
    let NodeKind::MemberExpression {
        object, property, ..
    } = &node.kind
    else {
        panic!("expected member expression, got {:?}", node.node_type());
    };
    assert!(object.is_identifier("React"));
    assert_eq!(*property, MemberProperty::Static("createElement".into()));

    let single = Node::member_path("h");
    assert!(single.is_identifier("h"));
}

#[test]
fn test_void_0_shape() {
    let node = Node::void_0();
    assert_eq!(node.node_type(), NodeType::UnaryExpression);
    let NodeKind::UnaryExpression { operator, argument } = &node.kind else {
        unreachable!();
    };
    assert_eq!(*operator, UnaryOperator::Void);
    assert_eq!(argument.kind, NodeKind::NumericLiteral { value: 0.0 });
}

#[test]
fn test_var_decl_has_single_declarator() {
    let node = Node::var_decl(VariableKind::Let, "x", Some(Node::number(1.0)));
    let NodeKind::VariableDeclaration { kind, declarations } = &node.kind else {
        unreachable!();
    };
    assert_eq!(*kind, VariableKind::Let);
    assert_eq!(declarations.len(), 1);
    assert_eq!(declarations[0].node_type(), NodeType::VariableDeclarator);
}

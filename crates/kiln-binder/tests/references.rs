use super::*;
use kiln_ast::{AssignmentOperator, SourceType, UpdateOperator};
use kiln_common::Diagnostics;

use crate::build_scope;

fn program(body: Vec<Node>) -> Node {
    Node::new(NodeKind::Program {
        body,
        source_type: SourceType::Module,
        directives: Vec::new(),
        comments: Vec::new(),
    })
}

#[test]
fn test_member_usages_are_classified() {
    // NS.foo(); NS[key]; NS;
    let root = program(vec![
        Node::expr_stmt(Node::call(Node::member(Node::ident("NS"), "foo"), vec![])),
        Node::expr_stmt(Node::computed_member(Node::ident("NS"), Node::ident("key"))),
        Node::expr_stmt(Node::ident("NS")),
    ]);
    let scopes = build_scope(&root, &mut Diagnostics::new("r.js"));
    let refs = collect_references(&root, &scopes);

    let usages: Vec<(&str, &ReferenceUsage)> =
        refs.iter().map(|r| (r.name.as_str(), &r.usage)).collect();
    assert_eq!(
        usages,
        vec![
            (
                "NS",
                &ReferenceUsage::StaticMember {
                    property: "foo".into()
                }
            ),
            ("NS", &ReferenceUsage::ComputedMember),
            ("key", &ReferenceUsage::Value),
            ("NS", &ReferenceUsage::Value),
        ]
    );
    assert!(refs[0].parent.is_some());
    assert!(refs[0].is_member_access());
    assert!(refs[3].parent.is_none());
}

#[test]
fn test_assignment_targets_and_update_expressions() {
    let root = program(vec![
        Node::expr_stmt(Node::new(NodeKind::AssignmentExpression {
            operator: AssignmentOperator::Assign,
            left: Box::new(Node::ident("a")),
            right: Box::new(Node::ident("b")),
        })),
        Node::expr_stmt(Node::new(NodeKind::UpdateExpression {
            operator: UpdateOperator::Increment,
            prefix: false,
            argument: Box::new(Node::ident("c")),
        })),
    ]);
    let scopes = build_scope(&root, &mut Diagnostics::new("r.js"));
    let refs = collect_references(&root, &scopes);
    assert_eq!(refs[0].usage, ReferenceUsage::AssignmentTarget);
    assert_eq!(refs[1].usage, ReferenceUsage::Value);
    assert_eq!(refs[2].usage, ReferenceUsage::AssignmentTarget);
}

#[test]
fn test_non_computed_keys_are_not_references() {
    // ({ x: y, [z]: 1 })
    let object = Node::object(vec![
        Node::property("x", Node::ident("y")),
        Node::new(NodeKind::ObjectProperty {
            key: Box::new(Node::ident("z")),
            computed: true,
            value: Box::new(Node::number(1.0)),
            shorthand: false,
        }),
    ]);
    let root = program(vec![Node::expr_stmt(object)]);
    let scopes = build_scope(&root, &mut Diagnostics::new("r.js"));
    let names: Vec<String> = collect_references(&root, &scopes)
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["y", "z"]);
}

#[test]
fn test_declared_in_resolves_through_scopes() {
    let root = program(vec![
        Node::var_decl(kiln_ast::VariableKind::Const, "local", None),
        Node::expr_stmt(Node::ident("local")),
        Node::expr_stmt(Node::ident("globalThing")),
    ]);
    let scopes = build_scope(&root, &mut Diagnostics::new("r.js"));
    let refs = collect_references(&root, &scopes);
    assert_eq!(refs[0].declared_in, Some(scopes.root()));
    assert_eq!(refs[1].declared_in, None);
}

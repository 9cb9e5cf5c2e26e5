use super::*;
use kiln_ast::{Class, Function, SourceType};
use kiln_common::Diagnostics;

fn program(body: Vec<Node>) -> Node {
    Node::new(NodeKind::Program {
        body,
        source_type: SourceType::Module,
        directives: Vec::new(),
        comments: Vec::new(),
    })
}

fn function_decl(name: &str, params: &[&str], body: Vec<Node>) -> Node {
    Node::new(NodeKind::FunctionDeclaration(Function {
        id: Some(Box::new(Node::binding(name))),
        params: params.iter().map(|p| Node::binding(*p)).collect(),
        body: Box::new(Node::block(body)),
        is_async: false,
        is_generator: false,
    }))
}

fn build(root: &Node) -> (ScopeTree, Diagnostics) {
    let mut diagnostics = Diagnostics::new("test.js");
    let tree = build_scope(root, &mut diagnostics);
    (tree, diagnostics)
}

#[test]
fn test_var_hoists_out_of_blocks_let_does_not() {
    // function f(p) { { var a; let b; } }
    let inner_block = Node::block(vec![
        Node::var_decl(VariableKind::Var, "a", None),
        Node::var_decl(VariableKind::Let, "b", None),
    ]);
    let block_id = inner_block.id;
    let func = function_decl("f", &["p"], vec![inner_block]);
    let func_id = func.id;
    let root = program(vec![func]);
    let (tree, diagnostics) = build(&root);
    assert!(diagnostics.is_empty());

    let func_scope = tree.scope_for_node(func_id).unwrap();
    let block_scope = tree.scope_for_node(block_id).unwrap();
    assert_eq!(tree.get(func_scope).unwrap().kind, ScopeKind::Function);
    assert_eq!(tree.get(block_scope).unwrap().parent, Some(func_scope));

    let a = tree.get_binding(block_scope, "a").unwrap();
    assert_eq!(a.scope, func_scope);
    assert_eq!(a.kind, BindingKind::Var);
    let b = tree.get_binding(block_scope, "b").unwrap();
    assert_eq!(b.scope, block_scope);
    assert!(tree.get_binding(func_scope, "b").is_none());

    let p = tree.get_binding(block_scope, "p").unwrap();
    assert_eq!(p.kind, BindingKind::Parameter);

    let f = tree.get_binding(func_scope, "f").unwrap();
    assert_eq!(f.scope, tree.root());
    assert_eq!(f.kind, BindingKind::Function);
}

#[test]
fn test_function_body_block_shares_function_scope() {
    let func = function_decl("f", &[], vec![]);
    let NodeKind::FunctionDeclaration(Function { body, .. }) = &func.kind else {
        unreachable!();
    };
    let body_id = body.id;
    let root = program(vec![func]);
    let (tree, _) = build(&root);
    assert!(tree.scope_for_node(body_id).is_none());
    // module + function
    assert_eq!(tree.len(), 2);
}

#[test]
fn test_imports_register_in_module_scope_with_metadata() {
    let import = Node::new(NodeKind::ImportDeclaration {
        specifiers: vec![
            Node::new(NodeKind::ImportDefaultSpecifier {
                local: Box::new(Node::binding("React")),
            }),
            Node::new(NodeKind::ImportSpecifier {
                imported: "useState".into(),
                local: Box::new(Node::binding("useS")),
            }),
            Node::new(NodeKind::ImportNamespaceSpecifier {
                local: Box::new(Node::binding("NS")),
            }),
        ],
        source: "react".into(),
    });
    let root = program(vec![import]);
    let (tree, _) = build(&root);

    let module = tree.root();
    let react = tree.get_binding(module, "React").unwrap();
    assert_eq!(
        react.kind,
        BindingKind::Import(ImportMeta {
            source: "react".into(),
            imported: ImportedName::Default,
        })
    );
    let use_s = tree.get_binding(module, "useS").unwrap();
    assert_eq!(
        use_s.kind.import_meta().unwrap().imported,
        ImportedName::Named("useState".into())
    );
    let ns = tree.get_binding(module, "NS").unwrap();
    assert_eq!(ns.kind.import_meta().unwrap().imported, ImportedName::Namespace);
}

#[test]
fn test_duplicate_lexical_declaration_reports_diagnostic() {
    let root = program(vec![
        Node::var_decl(VariableKind::Let, "x", None),
        Node::var_decl(VariableKind::Const, "x", None),
        Node::var_decl(VariableKind::Var, "y", None),
        Node::var_decl(VariableKind::Var, "y", None),
    ]);
    let (tree, diagnostics) = build(&root);
    assert_eq!(
        diagnostics.codes(),
        vec![diagnostic_codes::DUPLICATE_DECLARATION]
    );
    // The first declaration wins.
    assert_eq!(
        tree.get_binding(tree.root(), "x").unwrap().kind,
        BindingKind::Let
    );
}

#[test]
fn test_class_declaration_name_binds_outside_class_expression_name_inside() {
    let decl = Node::class_decl("C", Some(Node::ident("D")), vec![]);
    let decl_id = decl.id;
    let expr = Node::new(NodeKind::ClassExpression(Class {
        id: Some(Box::new(Node::binding("Inner"))),
        super_class: None,
        body: vec![],
    }));
    let expr_id = expr.id;
    let root = program(vec![decl, Node::expr_stmt(expr)]);
    let (tree, _) = build(&root);

    assert_eq!(
        tree.get_binding(tree.root(), "C").unwrap().scope,
        tree.root()
    );
    assert!(tree.get_binding(tree.root(), "Inner").is_none());
    let expr_scope = tree.scope_for_node(expr_id).unwrap();
    assert_eq!(tree.get(expr_scope).unwrap().kind, ScopeKind::Class);
    assert!(tree.get_binding(expr_scope, "Inner").is_some());
    assert!(tree.scope_for_node(decl_id).is_some());
}

#[test]
fn test_catch_param_binds_in_catch_scope() {
    let catch = Node::new(NodeKind::CatchClause {
        param: Some(Box::new(Node::binding("err"))),
        body: Box::new(Node::block(vec![])),
    });
    let catch_id = catch.id;
    let try_stmt = Node::new(NodeKind::TryStatement {
        block: Box::new(Node::block(vec![])),
        handler: Some(Box::new(catch)),
        finalizer: None,
    });
    let root = program(vec![try_stmt]);
    let (tree, _) = build(&root);
    let catch_scope = tree.scope_for_node(catch_id).unwrap();
    assert!(tree.get(catch_scope).unwrap().has_own("err"));
    assert!(tree.get_binding(tree.root(), "err").is_none());
}

#[test]
fn test_enum_and_type_alias_kinds() {
    let enum_decl = Node::new(NodeKind::EnumDeclaration {
        id: Box::new(Node::binding("E")),
        members: vec![],
        is_const: false,
        declare: false,
    });
    let alias = Node::new(NodeKind::TypeAliasDeclaration {
        id: Box::new(Node::binding("T")),
        annotation: "string".into(),
    });
    let root = program(vec![enum_decl, alias]);
    let (tree, _) = build(&root);
    assert_eq!(tree.get_binding(tree.root(), "E").unwrap().kind, BindingKind::Let);
    assert_eq!(tree.get_binding(tree.root(), "T").unwrap().kind, BindingKind::Type);
}

#[test]
fn test_scope_kind_of_body_blocks() {
    let block = Node::block(vec![]);
    assert_eq!(scope_kind_of(&block, None), Some(ScopeKind::Block));
    assert_eq!(
        scope_kind_of(&block, Some((NodeType::ArrowFunctionExpression, Field::Body))),
        None
    );
    assert_eq!(
        scope_kind_of(&block, Some((NodeType::IfStatement, Field::Consequent))),
        Some(ScopeKind::Block)
    );
    assert!(uses_outer_scope(NodeType::FunctionDeclaration, Field::Id));
    assert!(!uses_outer_scope(NodeType::FunctionExpression, Field::Id));
}

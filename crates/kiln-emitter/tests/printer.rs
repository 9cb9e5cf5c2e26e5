use super::*;
use kiln_ast::{BinaryOperator, LogicalOperator, SourceType, VariableKind};

fn emit(node: &Node) -> String {
    Printer::emit_to_string(node)
}

fn program(body: Vec<Node>, comments: Vec<Comment>) -> Node {
    Node::new(NodeKind::Program {
        body,
        source_type: SourceType::Module,
        directives: Vec::new(),
        comments,
    })
}

#[test]
fn test_emit_literals_and_identifiers() {
    assert_eq!(emit(&Node::number(42.0)), "42");
    assert_eq!(emit(&Node::string("hello")), "\"hello\"");
    assert_eq!(emit(&Node::boolean(false)), "false");
    assert_eq!(emit(&Node::null()), "null");
    assert_eq!(emit(&Node::void_0()), "void 0");
    assert_eq!(emit(&Node::this()), "this");
    assert_eq!(emit(&Node::ident("foo")), "foo");
}

#[test]
fn test_emit_conditional_with_nested_assignment() {
    // (_a = a.b) == null ? void 0 : _a.c
    let test = Node::binary(
        BinaryOperator::Equality,
        Node::assign(Node::ident("_a"), Node::member(Node::ident("a"), "b")),
        Node::null(),
    );
    let expr = Node::conditional(test, Node::void_0(), Node::member(Node::ident("_a"), "c"));
    assert_eq!(emit(&expr), "(_a = a.b) == null ? void 0 : _a.c");
}

#[test]
fn test_emit_binary_precedence() {
    let sum = Node::binary(BinaryOperator::Addition, Node::ident("a"), Node::ident("b"));
    let product = Node::binary(BinaryOperator::Multiplication, sum, Node::ident("c"));
    assert_eq!(emit(&product), "(a + b) * c");

    let right = Node::binary(BinaryOperator::Subtraction, Node::ident("b"), Node::ident("c"));
    let diff = Node::binary(BinaryOperator::Subtraction, Node::ident("a"), right);
    assert_eq!(emit(&diff), "a - (b - c)");

    let concat = Node::binary(
        BinaryOperator::Addition,
        Node::binary(BinaryOperator::Addition, Node::string("a"), Node::ident("x")),
        Node::string("b"),
    );
    assert_eq!(emit(&concat), "\"a\" + x + \"b\"");
}

#[test]
fn test_emit_nullish_mixed_with_or_gets_parens() {
    let inner = Node::logical(LogicalOperator::Or, Node::ident("a"), Node::ident("b"));
    let expr = Node::logical(LogicalOperator::NullishCoalescing, inner, Node::ident("c"));
    assert_eq!(emit(&expr), "(a || b) ?? c");
}

#[test]
fn test_emit_call_apply() {
    let call = Node::call(
        Node::member(Node::ident("foo"), "apply"),
        vec![Node::null(), Node::ident("args")],
    );
    assert_eq!(emit(&call), "foo.apply(null, args)");
}

#[test]
fn test_emit_iife_statement() {
    // var E;
    // (function (E) { E[E["A"] = 0] = "A"; })(E || (E = {}));
    let assign_inner = Node::assign(
        Node::computed_member(Node::ident("E"), Node::string("A")),
        Node::number(0.0),
    );
    let assign_outer = Node::assign(
        Node::computed_member(Node::ident("E"), assign_inner),
        Node::string("A"),
    );
    let arg = Node::logical(
        LogicalOperator::Or,
        Node::ident("E"),
        Node::assign(Node::ident("E"), Node::object(vec![])),
    );
    let iife = Node::iife("E", vec![Node::expr_stmt(assign_outer)], arg);
    let root = program(
        vec![
            Node::var_decl(VariableKind::Var, "E", None),
            Node::expr_stmt(iife),
        ],
        vec![],
    );
    assert_eq!(
        emit(&root),
        "var E;\n(function (E) {\n    E[E[\"A\"] = 0] = \"A\";\n})(E || (E = {}));"
    );
}

#[test]
fn test_emit_object_with_getter_is_multiline() {
    let object = Node::object(vec![Node::getter(
        "foo",
        vec![Node::ret(Some(Node::ident("__m$1$foo")))],
    )]);
    let stmt = Node::var_decl(VariableKind::Var, "ns", Some(object));
    assert_eq!(
        emit(&stmt),
        "var ns = {\n    get foo() {\n        return __m$1$foo;\n    }\n};"
    );
}

#[test]
fn test_emit_object_literal_statement_is_parenthesized() {
    let stmt = Node::expr_stmt(Node::object(vec![Node::property("a", Node::number(1.0))]));
    assert_eq!(emit(&stmt), "({ a: 1 });");
}

#[test]
fn test_emit_class_with_constructor() {
    let ctor = Node::new(NodeKind::ClassMethod {
        kind: kiln_ast::MethodKind::Constructor,
        key: Box::new(Node::ident("constructor")),
        computed: false,
        is_static: false,
        params: vec![],
        body: Box::new(Node::block(vec![
            Node::expr_stmt(Node::call(Node::new(NodeKind::Super), vec![])),
            Node::expr_stmt(Node::assign(
                Node::member(Node::this(), "x"),
                Node::number(1.0),
            )),
        ])),
    });
    let class = Node::class_decl("C", Some(Node::ident("D")), vec![ctor]);
    assert_eq!(
        emit(&class),
        "class C extends D {\n    constructor() {\n        super();\n        this.x = 1;\n    }\n}"
    );
}

#[test]
fn test_emit_import_and_export_forms() {
    let import = Node::new(NodeKind::ImportDeclaration {
        specifiers: vec![
            Node::new(NodeKind::ImportDefaultSpecifier {
                local: Box::new(Node::binding("d")),
            }),
            Node::new(NodeKind::ImportSpecifier {
                imported: "foo".into(),
                local: Box::new(Node::binding("_foo")),
            }),
            Node::new(NodeKind::ImportSpecifier {
                imported: "bar".into(),
                local: Box::new(Node::binding("bar")),
            }),
        ],
        source: "m".into(),
    });
    assert_eq!(
        emit(&import),
        "import d, { foo as _foo, bar } from \"m\";"
    );

    let reexport = Node::new(NodeKind::ExportNamedDeclaration {
        declaration: None,
        specifiers: vec![Node::new(NodeKind::ExportSpecifier {
            local: "x".into(),
            exported: "y".into(),
        })],
        source: Some("s".into()),
    });
    assert_eq!(emit(&reexport), "export { x as y } from \"s\";");
}

#[test]
fn test_detached_comments_print_first() {
    let stmt = Node::expr_stmt(Node::ident("a"));
    let root = program(vec![stmt], vec![Comment::block("header", " bundled ")]);
    assert_eq!(emit(&root), "/* bundled */\na;");
}

#[test]
fn test_leading_comments_attach_to_statements() {
    let comment = Comment::line("c1", " note");
    let mut stmt = Node::expr_stmt(Node::ident("a"));
    stmt.leading_comments.push(comment.id.clone());
    let root = program(vec![stmt], vec![comment]);
    assert_eq!(emit(&root), "// note\na;");
}

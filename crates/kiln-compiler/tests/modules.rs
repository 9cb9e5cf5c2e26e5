use super::*;
use crate::test_support::{program, run, run_to_string, run_twice};

fn import(specifiers: Vec<Node>, source: &str) -> Node {
    Node::new(NodeKind::ImportDeclaration {
        specifiers,
        source: source.to_string(),
    })
}

fn named(imported: &str, local: &str) -> Node {
    Node::new(NodeKind::ImportSpecifier {
        imported: imported.to_string(),
        local: Box::new(Node::binding(local)),
    })
}

fn default_import(local: &str) -> Node {
    Node::new(NodeKind::ImportDefaultSpecifier {
        local: Box::new(Node::binding(local)),
    })
}

fn namespace(local: &str) -> Node {
    Node::new(NodeKind::ImportNamespaceSpecifier {
        local: Box::new(Node::binding(local)),
    })
}

fn export_list(pairs: &[(&str, &str)]) -> Node {
    let specifiers = pairs
        .iter()
        .map(|(local, exported)| {
            Node::new(NodeKind::ExportSpecifier {
                local: local.to_string(),
                exported: exported.to_string(),
            })
        })
        .collect();
    Node::new(NodeKind::ExportNamedDeclaration {
        declaration: None,
        specifiers,
        source: None,
    })
}

fn stmt(expression: Node) -> Node {
    Node::expr_stmt(expression)
}

#[test]
fn test_namespace_import_is_specialized() {
    let root = program(vec![
        import(vec![namespace("R")], "m"),
        stmt(Node::call(Node::member(Node::ident("R"), "foo"), Vec::new())),
        stmt(Node::member(Node::ident("R"), "bar")),
        stmt(Node::member(Node::ident("R"), "foo")),
    ]);
    let (out, cx) = run(root, &[&OptimizeImports]);
    assert_eq!(
        crate::test_support::emit(&out),
        "import { foo as _foo, bar as _bar } from \"m\";\n_foo();\n_bar;\n_foo;"
    );

    let module = cx.scopes.root();
    assert!(cx.scopes.get_binding(module, "R").is_none());
    let foo = cx.scopes.get_binding(module, "_foo").unwrap();
    assert_eq!(
        foo.kind.import_meta(),
        Some(&ImportMeta {
            source: "m".to_string(),
            imported: ImportedName::Named("foo".to_string()),
        })
    );
}

#[test]
fn test_namespace_next_to_default_import() {
    let root = program(vec![
        import(vec![default_import("D"), namespace("R")], "m"),
        stmt(Node::member(Node::ident("R"), "a")),
    ]);
    assert_eq!(
        run_to_string(root, &[&OptimizeImports]),
        "import D, { a as _a } from \"m\";\n_a;"
    );
}

#[test]
fn test_namespace_import_deoptimizes() {
    let uses = [
        stmt(Node::call(Node::ident("f"), vec![Node::ident("R")])),
        stmt(Node::computed_member(Node::ident("R"), Node::ident("k"))),
        stmt(Node::assign(
            Node::member(Node::ident("R"), "x"),
            Node::number(1.0),
        )),
        export_list(&[("R", "R")]),
    ];
    for usage in uses {
        let root = program(vec![
            import(vec![namespace("R")], "m"),
            stmt(Node::member(Node::ident("R"), "ok")),
            usage,
        ]);
        let out = run_to_string(root, &[&OptimizeImports]);
        assert!(out.starts_with("import * as R from \"m\";\nR.ok;"), "{out}");
    }
}

#[test]
fn test_shadowed_namespace_name_is_ignored() {
    let inner = Node::function_expr(
        None,
        vec![Node::binding("R")],
        vec![Node::ret(Some(Node::ident("R")))],
    );
    let root = program(vec![
        import(vec![namespace("R")], "m"),
        stmt(Node::member(Node::ident("R"), "a")),
        Node::var_decl(kiln_ast::VariableKind::Const, "g", Some(inner)),
    ]);
    let out = run_to_string(root, &[&OptimizeImports]);
    assert!(out.starts_with("import { a as _a } from \"m\";\n_a;"), "{out}");
}

#[test]
fn test_reexported_import_is_collapsed() {
    let root = program(vec![
        import(vec![named("x", "x")], "m"),
        export_list(&[("x", "y")]),
    ]);
    let (out, cx) = run(root, &[&OptimizeExports]);
    assert_eq!(
        crate::test_support::emit(&out),
        "export { x as y } from \"m\";"
    );
    assert!(cx.scopes.get_binding(cx.scopes.root(), "x").is_none());
}

#[test]
fn test_used_import_is_kept() {
    let root = program(vec![
        import(vec![named("x", "x"), named("z", "z")], "m"),
        stmt(Node::call(Node::ident("z"), Vec::new())),
        export_list(&[("x", "x"), ("z", "z")]),
    ]);
    assert_eq!(
        run_to_string(root, &[&OptimizeExports]),
        "import { z } from \"m\";\nz();\nexport { z };\nexport { x } from \"m\";"
    );
}

#[test]
fn test_default_and_namespace_reexports() {
    let root = program(vec![
        import(vec![default_import("d")], "a"),
        import(vec![namespace("ns")], "b"),
        export_list(&[("d", "d"), ("ns", "n")]),
    ]);
    assert_eq!(
        run_to_string(root, &[&OptimizeExports]),
        "export { default as d } from \"a\";\nexport * as n from \"b\";"
    );
}

#[test]
fn test_program_without_exports_is_untouched() {
    let root = program(vec![
        import(vec![named("x", "x")], "m"),
        stmt(Node::ident("x")),
    ]);
    assert_eq!(
        run_to_string(root, &[&OptimizeExports]),
        "import { x } from \"m\";\nx;"
    );
}

#[test]
fn test_second_run_changes_nothing() {
    let root = program(vec![
        import(vec![namespace("R")], "m"),
        stmt(Node::call(Node::member(Node::ident("R"), "foo"), Vec::new())),
    ]);
    run_twice(root, &[&OptimizeImports]);

    let root = program(vec![
        import(vec![named("x", "x")], "m"),
        export_list(&[("x", "y")]),
    ]);
    run_twice(root, &[&OptimizeExports]);
}

//! End-to-end runs of the shipped pipeline, printed back to source.

use std::cell::RefCell;
use std::rc::Rc;

use kiln_ast::{
    Class, Field, LogicalOperator, MemberProperty, MethodKind, Node, NodeKind, NodeType,
    SlotKind, SourceType, VariableKind,
};
use kiln_common::{ModuleId, diagnostic_codes};
use kiln_compiler::{
    BundleOptions, CompileError, CompileOptions, CompilerContext, Interest, Path, Pipeline,
    Signal, Stage, StageVisitors, Visitor, compile,
};
use kiln_emitter::Printer;

fn program(body: Vec<Node>) -> Node {
    Node::new(NodeKind::Program {
        body,
        source_type: SourceType::Module,
        directives: Vec::new(),
        comments: Vec::new(),
    })
}

fn compile_with(body: Vec<Node>, options: &CompileOptions) -> String {
    match compile(program(body), options, "input.js") {
        Ok(output) => {
            assert!(!output.has_errors(), "{:?}", output.diagnostics);
            Printer::emit_to_string(&output.program)
        }
        Err(err) => panic!("compile failed: {err}"),
    }
}

fn compile_default(body: Vec<Node>) -> String {
    compile_with(body, &CompileOptions::default())
}

fn const_x(init: Node) -> Node {
    Node::var_decl(VariableKind::Const, "x", Some(init))
}

#[test]
fn test_optional_member() {
    let member = Node::new(NodeKind::MemberExpression {
        object: Box::new(Node::ident("a")),
        property: MemberProperty::Static("b".to_string()),
        optional: true,
    });
    let chain = Node::new(NodeKind::ChainExpression {
        expression: Box::new(member),
    });
    assert_eq!(
        compile_default(vec![const_x(chain)]),
        "const x = a == null ? void 0 : a.b;"
    );
}

#[test]
fn test_nullish_coalescing() {
    let expr = Node::logical(LogicalOperator::NullishCoalescing, Node::ident("a"), Node::ident("b"));
    assert_eq!(
        compile_default(vec![const_x(expr)]),
        "const x = a == null ? b : a;"
    );
}

#[test]
fn test_spread_call() {
    let call = Node::call(Node::ident("foo"), vec![Node::spread(Node::ident("args"))]);
    assert_eq!(
        compile_default(vec![Node::expr_stmt(call)]),
        "foo.apply(null, args);"
    );
}

#[test]
fn test_field_assignment_follows_super() {
    let constructor = Node::new(NodeKind::ClassMethod {
        kind: MethodKind::Constructor,
        key: Box::new(Node::ident("constructor")),
        computed: false,
        is_static: false,
        params: Vec::new(),
        body: Box::new(Node::block(vec![Node::expr_stmt(Node::call(
            Node::new(NodeKind::Super),
            Vec::new(),
        ))])),
    });
    let field = Node::new(NodeKind::ClassProperty {
        key: Box::new(Node::ident("x")),
        computed: false,
        value: Some(Box::new(Node::number(1.0))),
        is_static: false,
    });
    let class = Node::new(NodeKind::ClassDeclaration(Class {
        id: Some(Box::new(Node::binding("C"))),
        super_class: Some(Box::new(Node::ident("D"))),
        body: vec![field, constructor],
    }));
    assert_eq!(
        compile_default(vec![class]),
        "class C extends D {\n    constructor() {\n        super();\n        this.x = 1;\n    }\n}"
    );
}

#[test]
fn test_enum_members_count_up() {
    let member = |name: &str, init: Option<f64>| {
        Node::new(NodeKind::EnumMember {
            name: name.to_string(),
            initializer: init.map(|v| Box::new(Node::number(v))),
        })
    };
    let decl = Node::new(NodeKind::EnumDeclaration {
        id: Box::new(Node::binding("E")),
        members: vec![member("A", None), member("B", Some(5.0)), member("C", None)],
        is_const: false,
        declare: false,
    });
    assert_eq!(
        compile_default(vec![decl]),
        "var E;\n(function (E) {\n    E[E[\"A\"] = 0] = \"A\";\n    E[E[\"B\"] = 5] = \"B\";\n    E[E[\"C\"] = 6] = \"C\";\n})(E || (E = {}));"
    );
}

#[test]
fn test_namespace_import_specialized() {
    let import = Node::new(NodeKind::ImportDeclaration {
        specifiers: vec![Node::new(NodeKind::ImportNamespaceSpecifier {
            local: Box::new(Node::binding("R")),
        })],
        source: "m".to_string(),
    });
    let body = vec![
        import,
        Node::expr_stmt(Node::call(Node::member(Node::ident("R"), "foo"), Vec::new())),
        Node::expr_stmt(Node::member(Node::ident("R"), "bar")),
    ];
    assert_eq!(
        compile_default(body),
        "import { foo as _foo, bar as _bar } from \"m\";\n_foo();\n_bar;"
    );
}

#[test]
fn test_temporaries_avoid_source_names() {
    let body = || {
        vec![
            Node::var_decl(VariableKind::Const, "_ref", Some(Node::number(1.0))),
            const_x(Node::logical(
                LogicalOperator::NullishCoalescing,
                Node::call(Node::ident("f"), Vec::new()),
                Node::number(0.0),
            )),
        ]
    };
    let first = compile_default(body());
    assert_eq!(
        first,
        "var _ref1;\nconst _ref = 1;\nconst x = (_ref1 = f()) == null ? 0 : _ref1;"
    );
    assert_eq!(compile_default(body()), first);
}

#[test]
fn test_bundle_stage_sees_compiled_tree() {
    let mut bundle = BundleOptions::new(ModuleId(1));
    bundle.resolutions.insert("./b", ModuleId(2));
    let options = CompileOptions {
        stages: vec![Stage::Pre, Stage::Compile, Stage::CompileForBundle],
        bundle: Some(bundle),
        ..CompileOptions::default()
    };
    let import = Node::new(NodeKind::ImportDeclaration {
        specifiers: vec![Node::new(NodeKind::ImportSpecifier {
            imported: "x".to_string(),
            local: Box::new(Node::binding("x")),
        })],
        source: "./b".to_string(),
    });
    let declaration = Node::var_decl(
        VariableKind::Const,
        "y",
        Some(Node::logical(
            LogicalOperator::NullishCoalescing,
            Node::ident("x"),
            Node::number(1.0),
        )),
    );
    let export = Node::new(NodeKind::ExportNamedDeclaration {
        declaration: Some(Box::new(declaration)),
        specifiers: Vec::new(),
        source: None,
    });
    assert_eq!(
        compile_with(vec![import, export], &options),
        "/* module 1 */\nconst __m$1$y = __m$2$x == null ? 1 : __m$2$x;"
    );
}

#[test]
fn test_bundle_stage_without_options_is_fatal() {
    let options = CompileOptions {
        stages: vec![Stage::CompileForBundle],
        ..CompileOptions::default()
    };
    let err = compile(program(Vec::new()), &options, "input.js").unwrap_err();
    assert!(matches!(
        err,
        CompileError::MissingBundleOptions(Stage::CompileForBundle)
    ));
}

#[test]
fn test_source_problems_are_diagnostics() {
    let body = vec![
        Node::var_decl(VariableKind::Let, "a", None),
        Node::var_decl(VariableKind::Let, "a", None),
    ];
    let output = compile(program(body), &CompileOptions::default(), "input.js").unwrap();
    assert!(output.has_errors());
    let codes: Vec<u32> = output.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![diagnostic_codes::DUPLICATE_DECLARATION]);
}

/// Appends its label to a shared log when the program is entered, and
/// renames `from` to `to`.
struct Stamp {
    label: &'static str,
    log: Rc<RefCell<Vec<String>>>,
    rename: Option<(&'static str, &'static str)>,
}

impl Visitor for Stamp {
    fn name(&self) -> &'static str {
        self.label
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[
            Interest::enter(NodeType::Program),
            Interest::enter(NodeType::Identifier),
        ];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        if node.node_type() == NodeType::Program {
            self.log.borrow_mut().push(self.label.to_string());
            return Ok(Signal::Retain);
        }
        let Some(name) = node.ident_name() else {
            return Ok(Signal::Retain);
        };
        self.log.borrow_mut().push(format!("{}:{name}", self.label));
        match self.rename {
            Some((from, to)) if name == from => Ok(Signal::replace(Node::ident(to))),
            _ => Ok(Signal::Retain),
        }
    }
}

#[test]
fn test_stages_run_in_order_on_previous_output() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let stamp = |label, rename| {
        Box::new(Stamp {
            label,
            log: Rc::clone(&log),
            rename,
        }) as Box<dyn Visitor>
    };
    let pipeline = Pipeline::from_stages(vec![
        StageVisitors::new(Stage::CompileForBundle, vec![stamp("bundle", None)]),
        StageVisitors::new(Stage::Pre, vec![stamp("pre", Some(("a", "b")))]),
        StageVisitors::new(Stage::Compile, vec![stamp("compile", Some(("b", "c")))]),
    ])
    .unwrap();
    assert_eq!(
        pipeline.stages().collect::<Vec<_>>(),
        vec![Stage::Pre, Stage::Compile, Stage::CompileForBundle]
    );

    let root = program(vec![Node::expr_stmt(Node::ident("a"))]);
    let mut cx = CompilerContext::new("input.js", &root);
    let out = pipeline.run(root, &mut cx).unwrap();
    assert_eq!(Printer::emit_to_string(&out), "c;");
    assert_eq!(
        *log.borrow(),
        vec![
            "pre", "pre:a", "pre:b", "compile", "compile:b", "compile:c", "bundle", "bundle:c"
        ]
    );
}

/// `export enum E { A } export const y = f() ?? E.A;`
fn enum_module() -> Vec<Node> {
    let enumeration = Node::new(NodeKind::EnumDeclaration {
        id: Box::new(Node::binding("E")),
        members: vec![Node::new(NodeKind::EnumMember {
            name: "A".to_string(),
            initializer: None,
        })],
        is_const: false,
        declare: false,
    });
    let fallback = Node::logical(
        LogicalOperator::NullishCoalescing,
        Node::call(Node::ident("f"), Vec::new()),
        Node::member(Node::ident("E"), "A"),
    );
    let export = |declaration| {
        Node::new(NodeKind::ExportNamedDeclaration {
            declaration: Some(Box::new(declaration)),
            specifiers: Vec::new(),
            source: None,
        })
    };
    vec![
        export(enumeration),
        export(Node::var_decl(VariableKind::Const, "y", Some(fallback))),
    ]
}

/// Run the shipped stages one at a time in the given order.
fn run_stages_in(order: &[Stage], body: Vec<Node>) -> String {
    let options = CompileOptions {
        stages: order.to_vec(),
        bundle: Some(BundleOptions::new(ModuleId(1))),
        ..CompileOptions::default()
    };
    let mut root = program(body);
    let mut cx = CompilerContext::new("input.js", &root);
    for stage in order {
        let visitors = StageVisitors::builtin(*stage, &options).unwrap();
        root = Pipeline::from_stages(vec![visitors])
            .unwrap()
            .run(root, &mut cx)
            .unwrap();
    }
    assert!(cx.diagnostics.is_empty(), "{:?}", cx.diagnostics);
    Printer::emit_to_string(&root)
}

#[test]
fn test_bundling_before_compiling_leaks_unprefixed_temporaries() {
    let in_order = run_stages_in(&[Stage::Compile, Stage::CompileForBundle], enum_module());
    assert_eq!(
        in_order,
        "/* module 1 */\n\
         var __m$1$_ref;\n\
         var __m$1$E;\n\
         (function (E) {\n    E[E[\"A\"] = 0] = \"A\";\n})(__m$1$E || (__m$1$E = {}));\n\
         const __m$1$y = (__m$1$_ref = f()) == null ? __m$1$E.A : __m$1$_ref;"
    );

    // Temporaries injected by the compile stage are module-level names the
    // bundle stage never got to prefix.
    let reversed = run_stages_in(&[Stage::CompileForBundle, Stage::Compile], enum_module());
    assert_ne!(reversed, in_order);
    assert!(reversed.contains("\nvar _ref;\n"), "{reversed}");
    assert!(reversed.contains("(function (__m$1$E) {"), "{reversed}");
}

/// Removes the test of every `if`, which the slot cannot allow.
struct DropTest;

impl Visitor for DropTest {
    fn name(&self) -> &'static str {
        "drop_test"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[Interest::enter(NodeType::Identifier)];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        if path.field() == Some(Field::Test) {
            return Ok(Signal::Remove);
        }
        Ok(Signal::Retain)
    }
}

#[test]
fn test_removing_required_child_is_fatal() {
    let pipeline =
        Pipeline::from_stages(vec![StageVisitors::new(Stage::Compile, vec![Box::new(DropTest)])])
            .unwrap();
    let root = program(vec![Node::new(NodeKind::IfStatement {
        test: Box::new(Node::ident("t")),
        consequent: Box::new(Node::block(Vec::new())),
        alternate: None,
    })]);
    let mut cx = CompilerContext::new("input.js", &root);
    let err = pipeline.run(root, &mut cx).unwrap_err();
    assert!(matches!(
        err,
        CompileError::InvalidReplacement {
            parent: Some(NodeType::IfStatement),
            field: Some(Field::Test),
            slot: SlotKind::Required,
            produced: 0,
        }
    ));
}

#[test]
fn test_overlapping_custom_stage_is_rejected() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let stamp = |label| {
        Box::new(Stamp {
            label,
            log: Rc::clone(&log),
            rename: None,
        }) as Box<dyn Visitor>
    };
    let result = Pipeline::from_stages(vec![StageVisitors::new(
        Stage::Pre,
        vec![stamp("one"), stamp("two")],
    )]);
    assert!(matches!(
        result,
        Err(CompileError::OverlappingVisitors {
            stage: Stage::Pre,
            first: "one",
            second: "two",
            ..
        })
    ));
}

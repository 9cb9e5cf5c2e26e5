use super::*;
use crate::test_support::{program, run, run_to_string};
use crate::traverse::traverse;
use kiln_ast::{Function, NodeType};
use kiln_binder::BindingKind;
use kiln_common::Comment;

/// Turns every `a` into `(_tmp = a)`.
struct Temp;

impl Visitor for Temp {
    fn name(&self) -> &'static str {
        "temp"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[Interest::enter(NodeType::Identifier)];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        if !node.is_identifier("a") {
            return Ok(Signal::Retain);
        }
        let binding = path.inject_binding(Some("tmp"), None)?;
        Ok(Signal::replace(binding.assign(node.clone())))
    }
}

/// Queues a banner comment twice on program enter; the second one wins.
struct Banner;

impl Visitor for Banner {
    fn name(&self) -> &'static str {
        "banner"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[Interest::enter(NodeType::Program)];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        path.inject_comment(Comment::block("banner", " draft "));
        path.inject_comment(Comment::block("banner", " final "));
        Ok(Signal::Retain)
    }
}

fn statement(name: &str) -> Node {
    Node::expr_stmt(Node::ident(name))
}

#[test]
fn test_injected_bindings_share_one_declaration() {
    let out = run_to_string(program(vec![statement("a"), statement("a")]), &[&Temp]);
    assert_eq!(out, "var _tmp, _tmp1;\n_tmp = a;\n_tmp1 = a;");
}

#[test]
fn test_injection_targets_nearest_block() {
    let function = Node::new(NodeKind::FunctionDeclaration(Function {
        id: Some(Box::new(Node::binding("f"))),
        params: Vec::new(),
        body: Box::new(Node::block(vec![statement("a")])),
        is_async: false,
        is_generator: false,
    }));
    let function_id = function.id;
    let (out, cx) = run(program(vec![function]), &[&Temp]);
    assert_eq!(
        crate::test_support::emit(&out),
        "function f() {\n    var _tmp;\n    _tmp = a;\n}"
    );

    let scope = cx.scopes.scope_for_node(function_id).unwrap();
    let binding = cx.scopes.get(scope).and_then(|s| s.get_own("_tmp")).unwrap();
    assert_eq!(binding.kind, BindingKind::Var);
    assert!(cx.scopes.get_binding(cx.scopes.root(), "_tmp").is_none());
}

#[test]
fn test_comments_are_merged_into_program() {
    let (out, cx) = run(program(vec![statement("b")]), &[&Banner]);
    let NodeKind::Program { comments, .. } = &out.kind else {
        panic!("expected a program");
    };
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].value, " final ");
    assert!(cx.comments.is_empty());
    assert_eq!(crate::test_support::emit(&out), "/* final */\nb;");
}

#[test]
fn test_reinjected_comment_replaces_attached_one() {
    let (first, _) = run(program(vec![statement("b")]), &[&Banner]);
    let (second, _) = run(first, &[&Banner]);
    let NodeKind::Program { comments, .. } = &second.kind else {
        panic!("expected a program");
    };
    assert_eq!(comments.len(), 1);
}

#[test]
fn test_check_flushed_reports_leftovers() {
    let root = program(vec![statement("a")]);
    let mut cx = CompilerContext::new("test.js", &root);
    assert!(check_flushed(&cx).is_ok());

    // Without the injector the declarator is never written out.
    traverse(root, &[&Temp], &mut cx).unwrap();
    assert!(matches!(check_flushed(&cx), Err(CompileError::Invariant(_))));

    cx.state.clear();
    cx.comments.upsert(Comment::line("stray", " x"));
    assert!(matches!(check_flushed(&cx), Err(CompileError::Invariant(_))));
}

#[test]
fn test_injected_binding_nodes() {
    let binding = InjectedBinding::new("_x".to_string());
    assert_eq!(binding.name(), "_x");
    assert_eq!(binding.reference(), Node::ident("_x"));
    assert_ne!(binding.reference().id, binding.assignment_target().id);
    assert_eq!(
        binding.assign(Node::number(1.0)),
        Node::assign(Node::ident("_x"), Node::number(1.0))
    );
}

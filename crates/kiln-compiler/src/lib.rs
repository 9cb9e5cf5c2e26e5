//! The kiln transform engine.
//!
//! A compilation unit is a [`kiln_ast::Node`] tree plus a
//! [`CompilerContext`] holding its scope tree, diagnostics, synthesized
//! comments and visitor state. Passes implement [`Visitor`]: they declare
//! the `(node type, phase)` pairs they handle and answer each call with a
//! [`Signal`] (retain, replace, remove). The traversal engine applies the
//! signals while it walks the tree, and the [`Pipeline`] runs groups of
//! visitors as ordered stages (`pre`, `compile`, `compileForBundle`).
//!
//! ```text
//! compile(root, &options, "input.js")
//!   -> Pipeline::new(&options)            stages selected by the options
//!   -> CompilerContext::new(file, &root)  scope tree built once
//!   -> for each stage: traverse, flush injected bindings, clear state
//! ```
//!
//! Temporaries and comments that passes synthesize are collected through
//! [`Path::inject_binding`] and [`Path::inject_comment`] and written into the
//! tree by the [`Injector`] that ends every stage.

pub mod context;
pub mod error;
pub mod inject;
pub mod path;
pub mod pipeline;
pub mod signal;
pub mod tracing_config;
pub mod transforms;
pub mod traverse;
pub mod visitor;

pub use context::{CommentRegistry, CompilerContext, VisitorStateStore};
pub use error::CompileError;
pub use inject::{InjectedBinding, Injector};
pub use path::{Ancestor, Path};
pub use pipeline::{
    BundleOptions, CompileOptions, CompileOutput, JsxOptions, ModuleResolver, Pipeline,
    ResolutionTable, Stage, StageVisitors, compile,
};
pub use signal::Signal;
pub use tracing_config::init_tracing;
pub use traverse::{DispatchTable, traverse};
pub use visitor::{Interest, Phase, Visitor};

#[cfg(test)]
pub(crate) mod test_support {
    use kiln_ast::{Node, NodeKind, SourceType};
    use kiln_emitter::Printer;

    use crate::context::CompilerContext;
    use crate::error::CompileError;
    use crate::inject::{Injector, check_flushed};
    use crate::traverse::traverse;
    use crate::visitor::Visitor;

    pub(crate) fn program(body: Vec<Node>) -> Node {
        Node::new(NodeKind::Program {
            body,
            source_type: SourceType::Module,
            directives: Vec::new(),
            comments: Vec::new(),
        })
    }

    pub(crate) fn script(body: Vec<Node>) -> Node {
        Node::new(NodeKind::Program {
            body,
            source_type: SourceType::Script,
            directives: Vec::new(),
            comments: Vec::new(),
        })
    }

    /// Run `visitors` followed by the injector over `root`, the way one
    /// pipeline stage would.
    pub(crate) fn try_run(
        root: Node,
        visitors: &[&dyn Visitor],
    ) -> Result<(Node, CompilerContext), CompileError> {
        crate::tracing_config::init_tracing();
        let mut cx = CompilerContext::new("test.js", &root);
        let mut all = visitors.to_vec();
        all.push(&Injector);
        let out = traverse(root, &all, &mut cx)?;
        check_flushed(&cx)?;
        cx.state.clear();
        Ok((out, cx))
    }

    pub(crate) fn run(root: Node, visitors: &[&dyn Visitor]) -> (Node, CompilerContext) {
        match try_run(root, visitors) {
            Ok(result) => result,
            Err(err) => panic!("traversal failed: {err}"),
        }
    }

    /// Run and print.
    pub(crate) fn run_to_string(root: Node, visitors: &[&dyn Visitor]) -> String {
        emit(&run(root, visitors).0)
    }

    /// Run `visitors` over `root`, then over their own output, and check
    /// that the second run changes nothing. Returns the first output.
    pub(crate) fn run_twice(root: Node, visitors: &[&dyn Visitor]) -> Node {
        let (once, _) = run(root, visitors);
        let (twice, _) = run(once.clone(), visitors);
        assert_eq!(emit(&twice), emit(&once));
        assert_eq!(twice, once);
        once
    }

    pub(crate) fn emit(node: &Node) -> String {
        Printer::emit_to_string(node)
    }
}

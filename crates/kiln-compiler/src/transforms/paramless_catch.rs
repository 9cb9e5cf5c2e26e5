//! `catch {}`

use kiln_ast::{Node, NodeKind, NodeType};
use kiln_binder::BindingKind;
use tracing::debug;

use crate::error::CompileError;
use crate::path::Path;
use crate::signal::Signal;
use crate::visitor::{Interest, Visitor};

/// Gives a catch clause without a parameter a generated one.
pub struct ParamlessCatch;

impl Visitor for ParamlessCatch {
    fn name(&self) -> &'static str {
        "paramless_catch"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[Interest::enter(NodeType::CatchClause)];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        let NodeKind::CatchClause { param: None, body } = &node.kind else {
            return Ok(Signal::Retain);
        };

        let name = path.generate_uid(Some("e"));
        let param = Node::binding(name.clone());
        let scope = path.scope();
        path.scopes_mut()
            .add_binding(scope, name.clone(), BindingKind::Let, param.id);
        debug!(name = %name, "named catch parameter");

        Ok(Signal::replace(node.rebuild(NodeKind::CatchClause {
            param: Some(Box::new(param)),
            body: body.clone(),
        })))
    }
}

#[cfg(test)]
#[path = "../../tests/paramless_catch.rs"]
mod tests;

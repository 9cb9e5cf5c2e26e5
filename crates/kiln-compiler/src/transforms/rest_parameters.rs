//! `function f(a, ...rest) {}`

use kiln_ast::{Function, Node, NodeKind, NodeType, VariableKind};
use kiln_binder::BindingKind;

use crate::error::CompileError;
use crate::path::Path;
use crate::signal::Signal;
use crate::transforms::util::pattern_names;
use crate::visitor::{Interest, Visitor};

/// Moves a trailing rest parameter into the body:
/// `var rest = Array.prototype.slice.call(arguments, n);`.
///
/// Arrow functions have no `arguments` of their own and are left alone.
pub struct RestParameters;

impl Visitor for RestParameters {
    fn name(&self) -> &'static str {
        "rest_parameters"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[
            Interest::enter(NodeType::FunctionDeclaration),
            Interest::enter(NodeType::FunctionExpression),
            Interest::enter(NodeType::ClassMethod),
            Interest::enter(NodeType::ObjectMethod),
        ];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        let (params, body) = match &node.kind {
            NodeKind::FunctionDeclaration(func) | NodeKind::FunctionExpression(func) => {
                (&func.params, &func.body)
            }
            NodeKind::ClassMethod { params, body, .. } | NodeKind::ObjectMethod { params, body, .. } => {
                (params, body)
            }
            _ => return Ok(Signal::Retain),
        };
        let Some((last, leading)) = params.split_last() else {
            return Ok(Signal::Retain);
        };
        let NodeKind::RestElement { argument } = &last.kind else {
            return Ok(Signal::Retain);
        };

        let slice = Node::call(
            Node::member_path("Array.prototype.slice.call"),
            vec![Node::ident("arguments"), Node::number(leading.len() as f64)],
        );
        let declarator = Node::new(NodeKind::VariableDeclarator {
            id: argument.clone(),
            init: Some(Box::new(slice)),
        });
        let scope = path.scope();
        for name in pattern_names(argument) {
            path.scopes_mut()
                .add_binding(scope, name, BindingKind::Var, declarator.id);
        }
        let declaration = Node::new(NodeKind::VariableDeclaration {
            kind: VariableKind::Var,
            declarations: vec![declarator],
        });

        let mut statements = vec![declaration];
        statements.extend(body.statements().unwrap_or_default().iter().cloned());
        let body = Box::new(body.rebuild(NodeKind::BlockStatement { body: statements }));
        let params = leading.to_vec();

        let kind = match &node.kind {
            NodeKind::FunctionDeclaration(func) => NodeKind::FunctionDeclaration(Function {
                params,
                body,
                ..func.clone()
            }),
            NodeKind::FunctionExpression(func) => NodeKind::FunctionExpression(Function {
                params,
                body,
                ..func.clone()
            }),
            NodeKind::ClassMethod {
                kind,
                key,
                computed,
                is_static,
                ..
            } => NodeKind::ClassMethod {
                kind: *kind,
                key: key.clone(),
                computed: *computed,
                is_static: *is_static,
                params,
                body,
            },
            NodeKind::ObjectMethod {
                kind, key, computed, ..
            } => NodeKind::ObjectMethod {
                kind: *kind,
                key: key.clone(),
                computed: *computed,
                params,
                body,
            },
            _ => return Ok(Signal::Retain),
        };
        Ok(Signal::replace(node.rebuild(kind)))
    }
}

#[cfg(test)]
#[path = "../../tests/rest_parameters.rs"]
mod tests;

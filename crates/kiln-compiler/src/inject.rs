//! Variable and comment injection.
//!
//! Passes that need a temporary call [`Path::inject_binding`]; the declarator
//! is parked in the injector's state for the nearest block or program, and
//! the [`Injector`] visitor, which ends every stage, prepends a single `var`
//! statement when that boundary is exited. Comments queued with
//! [`Path::inject_comment`] are merged into the program's comment list when
//! the program is exited.

use kiln_ast::{Node, NodeId, NodeKind, NodeType, VariableKind};
use tracing::debug;

use crate::context::CompilerContext;
use crate::error::CompileError;
use crate::path::Path;
use crate::signal::Signal;
use crate::visitor::{Interest, Visitor};

pub const INJECTOR: &str = "injector";

/// Declarators waiting for their boundary to be exited.
#[derive(Default, Debug)]
pub struct PendingBindings {
    pub declarators: Vec<Node>,
}

/// A binding created by [`Path::inject_binding`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectedBinding {
    name: String,
}

impl InjectedBinding {
    pub(crate) fn new(name: String) -> Self {
        InjectedBinding { name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A fresh identifier node reading the binding.
    pub fn reference(&self) -> Node {
        Node::ident(self.name.clone())
    }

    /// A fresh identifier node to assign the binding through.
    pub fn assignment_target(&self) -> Node {
        Node::ident(self.name.clone())
    }

    /// `(name = value)`
    pub fn assign(&self, value: Node) -> Node {
        Node::assign(self.assignment_target(), value)
    }
}

/// Flushes injected bindings and comments.
pub struct Injector;

impl Visitor for Injector {
    fn name(&self) -> &'static str {
        INJECTOR
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[
            Interest::exit(NodeType::BlockStatement),
            Interest::exit(NodeType::Program),
        ];
        INTERESTS
    }

    fn exit(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        let pending = path
            .cx
            .state
            .take::<PendingBindings>(INJECTOR, node.id)
            .map(|p| p.declarators)
            .unwrap_or_default();
        let is_program = node.node_type() == NodeType::Program;
        if pending.is_empty() && !(is_program && !path.cx.comments.is_empty()) {
            return Ok(Signal::Retain);
        }

        let mut kind = node.kind.clone();
        if !pending.is_empty() {
            debug!(boundary = node.id.0, count = pending.len(), "flushing injected bindings");
            let declaration = Node::new(NodeKind::VariableDeclaration {
                kind: VariableKind::Var,
                declarations: pending,
            });
            match &mut kind {
                NodeKind::Program { body, .. } | NodeKind::BlockStatement { body } => {
                    body.insert(0, declaration);
                }
                _ => {
                    return Err(CompileError::Invariant(format!(
                        "bindings injected into a {:?}",
                        node.node_type()
                    )));
                }
            }
        }
        if let NodeKind::Program { comments, .. } = &mut kind {
            for comment in path.cx.comments.drain() {
                match comments.iter_mut().find(|c| c.id == comment.id) {
                    Some(existing) => *existing = comment,
                    None => comments.push(comment),
                }
            }
        }
        Ok(Signal::replace(node.rebuild(kind)))
    }
}

/// Fail if a stage left injected bindings or comments behind.
pub(crate) fn check_flushed(cx: &CompilerContext) -> Result<(), CompileError> {
    let leftover: Vec<NodeId> = cx
        .state
        .boundaries_of(INJECTOR)
        .into_iter()
        .filter(|boundary| {
            cx.state
                .get::<PendingBindings>(INJECTOR, *boundary)
                .is_some_and(|p| !p.declarators.is_empty())
        })
        .collect();
    if !leftover.is_empty() {
        return Err(CompileError::Invariant(format!(
            "injected bindings for {} boundary node(s) were never flushed",
            leftover.len()
        )));
    }
    if !cx.comments.is_empty() {
        return Err(CompileError::Invariant(format!(
            "{} injected comment(s) were never attached",
            cx.comments.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/inject.rs"]
mod tests;

//! `a ?? b`

use kiln_ast::{BinaryOperator, LogicalOperator, Node, NodeKind, NodeType};

use crate::error::CompileError;
use crate::path::Path;
use crate::signal::Signal;
use crate::visitor::{Interest, Visitor};

/// Lowers `a ?? b` to `a == null ? b : a`, evaluating `a` once through a
/// temporary when it is not a plain reference.
pub struct NullishCoalescing;

impl Visitor for NullishCoalescing {
    fn name(&self) -> &'static str {
        "nullish_coalescing"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[Interest::enter(NodeType::LogicalExpression)];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        let NodeKind::LogicalExpression {
            operator: LogicalOperator::NullishCoalescing,
            left,
            right,
        } = &node.kind
        else {
            return Ok(Signal::Retain);
        };

        let (test_subject, value) = if left.is_pure_reference() {
            (left.as_ref().clone(), left.duplicate())
        } else {
            let temp = path.inject_binding(None, None)?;
            (temp.assign(left.as_ref().clone()), temp.reference())
        };
        let test = Node::binary(BinaryOperator::Equality, test_subject, Node::null());
        let lowered = Node::conditional(test, right.as_ref().clone(), value).with_span(node.span);
        Ok(Signal::replace(lowered))
    }
}

#[cfg(test)]
#[path = "../../tests/nullish_coalescing.rs"]
mod tests;

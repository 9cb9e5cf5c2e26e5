//! Untagged template literals.

use kiln_ast::{BinaryOperator, Field, Node, NodeKind, NodeType};

use crate::error::CompileError;
use crate::path::Path;
use crate::signal::Signal;
use crate::visitor::{Interest, Visitor};

/// Lowers `` `a${b}c` `` to `"a" + b + "c"`.
///
/// The concatenation starts from the first quasi even when it is empty, so
/// the result is always a string. Adjacent constant strings are folded.
/// Tagged templates are left alone: the tag receives the quasis as an array.
pub struct TemplateLiterals;

impl Visitor for TemplateLiterals {
    fn name(&self) -> &'static str {
        "template_literals"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[Interest::enter(NodeType::TemplateLiteral)];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let is_tagged = path.parent().is_some_and(|p| {
            p.node_type == NodeType::TaggedTemplateExpression && p.field == Some(Field::Quasi)
        });
        if is_tagged {
            return Ok(Signal::Retain);
        }
        let node = path.node();
        let NodeKind::TemplateLiteral { quasis, expressions } = &node.kind else {
            return Ok(Signal::Retain);
        };
        Ok(Signal::replace(
            concatenate(quasis, expressions).with_span(node.span),
        ))
    }
}

fn concatenate(quasis: &[String], expressions: &[Node]) -> Node {
    let head = quasis.first().cloned().unwrap_or_default();
    let mut acc = Node::string(head);
    for (expression, quasi) in expressions.iter().zip(quasis.iter().skip(1)) {
        acc = append(acc, expression.clone());
        if !quasi.is_empty() {
            acc = append(acc, Node::string(quasi.clone()));
        }
    }
    acc
}

/// `acc + part`, folding two constant strings into one.
fn append(acc: Node, part: Node) -> Node {
    if let NodeKind::StringLiteral { value: tail } = &part.kind {
        match &acc.kind {
            NodeKind::StringLiteral { value } => {
                return Node::string(format!("{value}{tail}"));
            }
            NodeKind::BinaryExpression {
                operator: BinaryOperator::Addition,
                left,
                right,
            } => {
                if let NodeKind::StringLiteral { value } = &right.kind {
                    let folded = Node::string(format!("{value}{tail}"));
                    return Node::binary(BinaryOperator::Addition, left.as_ref().clone(), folded);
                }
            }
            _ => {}
        }
    }
    Node::binary(BinaryOperator::Addition, acc, part)
}

#[cfg(test)]
#[path = "../../tests/template_literals.rs"]
mod tests;

//! `{ ...a, b: 1 }`

use kiln_ast::{Node, NodeKind, NodeType};

use crate::error::CompileError;
use crate::path::Path;
use crate::signal::Signal;
use crate::transforms::util::{Segment, has_spread, split_spreads};
use crate::visitor::{Interest, Visitor};

/// Lowers object spread to `Object.assign`.
///
/// `{ a: 1, ...b, c: 2 }` becomes `Object.assign({ a: 1 }, b, { c: 2 })`.
/// When the literal starts with a spread the target is a fresh `{}`.
pub struct ObjectSpread;

impl Visitor for ObjectSpread {
    fn name(&self) -> &'static str {
        "object_spread"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[Interest::enter(NodeType::ObjectExpression)];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        let NodeKind::ObjectExpression { properties } = &node.kind else {
            return Ok(Signal::Retain);
        };
        if !has_spread(properties) {
            return Ok(Signal::Retain);
        }

        let segments = split_spreads(properties.clone());
        let mut arguments = Vec::with_capacity(segments.len() + 1);
        if matches!(segments.first(), Some(Segment::Spread(_))) {
            arguments.push(Node::object(Vec::new()));
        }
        arguments.extend(segments.into_iter().map(|segment| match segment {
            Segment::Plain(properties) => Node::object(properties),
            Segment::Spread(argument) => argument,
        }));
        let assign = Node::call(Node::member_path("Object.assign"), arguments);
        Ok(Signal::replace(assign.with_span(node.span)))
    }
}

#[cfg(test)]
#[path = "../../tests/object_spread.rs"]
mod tests;

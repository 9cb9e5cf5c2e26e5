//! Spread in calls, `new` expressions and array literals.

use kiln_ast::{Node, NodeKind, NodeType};
use tracing::debug;

use crate::error::CompileError;
use crate::path::Path;
use crate::signal::Signal;
use crate::transforms::util::{Segment, has_spread, split_spreads};
use crate::visitor::{Interest, Visitor};

/// Lowers spread arguments and array spread.
///
/// - `f(...args)` becomes `f.apply(null, args)`
/// - `o.m(a, ...b)` becomes `o.m.apply(o, [a].concat(b))`, evaluating `o`
///   once through a temporary when it is not a plain reference
/// - `new C(...args)` becomes
///   `new (Function.prototype.bind.apply(C, [null].concat(args)))()`
/// - `[a, ...b]` becomes `[a].concat(b)`
///
/// `super(...args)` is left alone.
pub struct CallSpread;

impl Visitor for CallSpread {
    fn name(&self) -> &'static str {
        "call_spread"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[
            Interest::enter(NodeType::CallExpression),
            Interest::enter(NodeType::NewExpression),
            Interest::enter(NodeType::ArrayExpression),
        ];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        let lowered = match &node.kind {
            NodeKind::CallExpression {
                callee,
                arguments,
                optional: false,
            } if has_spread(arguments) => {
                lower_call(path, callee, arguments.clone())?
            }
            NodeKind::NewExpression { callee, arguments } if has_spread(arguments) => {
                let arguments = concat(Some(Node::null()), arguments.clone());
                let bind = Node::call(
                    Node::member_path("Function.prototype.bind.apply"),
                    vec![callee.as_ref().clone(), arguments],
                );
                Some(Node::new_expr(bind, Vec::new()))
            }
            NodeKind::ArrayExpression { elements } if has_spread(elements) => {
                Some(concat(None, elements.clone()))
            }
            _ => None,
        };
        Ok(match lowered {
            Some(lowered) => Signal::replace(lowered.with_span(node.span)),
            None => Signal::Retain,
        })
    }
}

fn lower_call(
    path: &mut Path<'_>,
    callee: &Node,
    arguments: Vec<Node>,
) -> Result<Option<Node>, CompileError> {
    if matches!(callee.kind, NodeKind::Super) {
        debug!("spread in super call left in place");
        return Ok(None);
    }

    let (function, receiver) = match &callee.kind {
        NodeKind::MemberExpression {
            object,
            property,
            optional: false,
        } => {
            let (object, receiver) = match object.kind {
                NodeKind::Super => (object.as_ref().clone(), Node::this()),
                _ if object.is_pure_reference() => (object.as_ref().clone(), object.duplicate()),
                _ => {
                    let temp = path.inject_binding(None, None)?;
                    (temp.assign(object.as_ref().clone()), temp.reference())
                }
            };
            let function = Node::new(NodeKind::MemberExpression {
                object: Box::new(object),
                property: property.clone(),
                optional: false,
            });
            (function, receiver)
        }
        _ => (callee.clone(), Node::null()),
    };

    let mut segments = split_spreads(arguments);
    let array = match segments.as_slice() {
        [Segment::Spread(_)] => match segments.pop() {
            Some(Segment::Spread(argument)) => argument,
            _ => return Ok(None),
        },
        _ => concat_segments(None, segments),
    };

    let apply = Node::member(function, "apply");
    Ok(Some(Node::call(apply, vec![receiver, array])))
}

fn concat(head: Option<Node>, items: Vec<Node>) -> Node {
    concat_segments(head, split_spreads(items))
}

/// `[head, ...first plain run].concat(rest...)`.
fn concat_segments(head: Option<Node>, segments: Vec<Segment>) -> Node {
    let mut segments = segments.into_iter().peekable();
    let mut base = Vec::new();
    base.extend(head);
    if let Some(Segment::Plain(_)) = segments.peek() {
        if let Some(Segment::Plain(plain)) = segments.next() {
            base.extend(plain);
        }
    }
    let rest: Vec<Node> = segments
        .map(|segment| match segment {
            Segment::Plain(plain) => Node::array(plain),
            Segment::Spread(argument) => argument,
        })
        .collect();
    Node::call(Node::member(Node::array(base), "concat"), rest)
}

#[cfg(test)]
#[path = "../../tests/call_spread.rs"]
mod tests;

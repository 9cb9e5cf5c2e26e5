//! `a?.b`, `a?.[b]`, `a?.()`

use kiln_ast::{BinaryOperator, Node, NodeKind, NodeType};
use tracing::trace;

use crate::error::CompileError;
use crate::path::Path;
use crate::signal::Signal;
use crate::visitor::{Interest, Visitor};

/// Lowers optional chains to conditionals.
///
/// A chain is split at its topmost optional link: `a?.b.c` becomes
/// `a == null ? void 0 : a.b.c`. Whatever sits below that link is evaluated
/// once, through a temporary unless it is a plain reference, and is wrapped
/// in a new chain when it still contains optional links, so the engine lowers
/// it when it walks the replacement. Optional calls on members keep their
/// receiver: `a.b?.()` becomes `(_ref = a.b) == null ? void 0 : _ref.call(a)`.
pub struct OptionalChaining;

impl Visitor for OptionalChaining {
    fn name(&self) -> &'static str {
        "optional_chaining"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[Interest::enter(NodeType::ChainExpression)];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        let NodeKind::ChainExpression { expression } = &node.kind else {
            return Ok(Signal::Retain);
        };
        let lowered = lower(path, expression.as_ref().clone())?;
        Ok(Signal::replace(lowered.with_span(node.span)))
    }
}

fn is_optional_link(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::MemberExpression { optional: true, .. } | NodeKind::CallExpression { optional: true, .. }
    )
}

fn spine_child(node: &Node) -> Option<&Node> {
    match &node.kind {
        NodeKind::MemberExpression { object, .. } => Some(object),
        NodeKind::CallExpression { callee, .. } => Some(callee),
        _ => None,
    }
}

/// Distance from `node` down the spine to the first optional link.
fn topmost_optional(node: &Node) -> Option<usize> {
    std::iter::successors(Some(node), |n: &&Node| spine_child(*n)).position(is_optional_link)
}

/// Wrap `node` in a chain if its spine still has optional links.
fn rechain(node: Node) -> Node {
    if topmost_optional(&node).is_some() {
        Node::new(NodeKind::ChainExpression {
            expression: Box::new(node),
        })
    } else {
        node
    }
}

fn take_spine_child(node: &mut Node) -> Option<Node> {
    let slot = match &mut node.kind {
        NodeKind::MemberExpression { object, .. } => object,
        NodeKind::CallExpression { callee, .. } => callee,
        _ => return None,
    };
    Some(std::mem::replace(&mut **slot, Node::new(NodeKind::EmptyStatement)))
}

fn put_spine_child(node: &mut Node, child: Node) {
    match &mut node.kind {
        NodeKind::MemberExpression { object, .. } => **object = child,
        NodeKind::CallExpression { callee, .. } => **callee = child,
        _ => {}
    }
}

/// `(value, reference)`: the expression that evaluates `value` and the
/// expression that reads it again afterwards.
fn capture(path: &mut Path<'_>, value: Node) -> Result<(Node, Node), CompileError> {
    if value.is_pure_reference() {
        let reference = value.duplicate();
        return Ok((value, reference));
    }
    let temp = path.inject_binding(None, None)?;
    Ok((temp.assign(rechain(value)), temp.reference()))
}

fn lower(path: &mut Path<'_>, expression: Node) -> Result<Node, CompileError> {
    let Some(depth) = topmost_optional(&expression) else {
        return Ok(expression);
    };

    let mut frames = Vec::with_capacity(depth);
    let mut link = expression;
    for _ in 0..depth {
        let child = take_spine_child(&mut link)
            .ok_or_else(|| CompileError::Invariant("optional chain spine ended early".into()))?;
        frames.push(link);
        link = child;
    }

    let span = link.span;
    let (tested, short_circuited) = match link.kind {
        NodeKind::MemberExpression {
            object, property, ..
        } => {
            let (tested, reference) = capture(path, *object)?;
            let member = Node::new(NodeKind::MemberExpression {
                object: Box::new(reference),
                property,
                optional: false,
            });
            (tested, member)
        }
        NodeKind::CallExpression {
            callee, arguments, ..
        } => lower_optional_call(path, *callee, arguments)?,
        _ => {
            return Err(CompileError::Invariant(
                "optional link is not a member or call".into(),
            ));
        }
    };

    let mut whole = short_circuited.with_span(span);
    while let Some(mut frame) = frames.pop() {
        put_spine_child(&mut frame, whole);
        whole = frame;
    }

    trace!(depth, "lowered optional link");
    let test = Node::binary(BinaryOperator::Equality, tested, Node::null());
    Ok(Node::conditional(test, Node::void_0(), whole))
}

/// `callee?.(arguments)`; a member callee keeps its receiver through
/// `Function.prototype.call`.
fn lower_optional_call(
    path: &mut Path<'_>,
    callee: Node,
    arguments: Vec<Node>,
) -> Result<(Node, Node), CompileError> {
    let NodeKind::MemberExpression {
        object,
        property,
        optional,
    } = callee.kind
    else {
        let (tested, reference) = capture(path, callee)?;
        return Ok((tested, Node::call(reference, arguments)));
    };

    let (object, receiver) = match object.kind {
        NodeKind::Super => (*object, Node::this()),
        _ => capture(path, *object)?,
    };
    let function = rechain(Node::new(NodeKind::MemberExpression {
        object: Box::new(object),
        property,
        optional,
    }));
    let temp = path.inject_binding(None, None)?;
    let mut call_arguments = Vec::with_capacity(arguments.len() + 1);
    call_arguments.push(receiver);
    call_arguments.extend(arguments);
    let call = Node::call(Node::member(temp.reference(), "call"), call_arguments);
    Ok((temp.assign(function), call))
}

#[cfg(test)]
#[path = "../../tests/optional_chaining.rs"]
mod tests;

//! Tree helpers shared by the passes.

use std::convert::Infallible;

use kiln_ast::{ChildMapper, Field, Node, NodeId, NodeKind, NodeType};
use rustc_hash::FxHashMap;

/// Rebuild `root` with every node whose id is a key of `replacements`
/// swapped for its value. Replacement nodes are not searched.
pub(crate) fn replace_nodes(root: Node, replacements: &mut FxHashMap<NodeId, Node>) -> Node {
    if let Some(node) = replacements.remove(&root.id) {
        return node;
    }
    let mut mapper = ReplaceById { replacements };
    match root.map_children(&mut mapper) {
        Ok(node) => node,
        Err(never) => match never {},
    }
}

struct ReplaceById<'r> {
    replacements: &'r mut FxHashMap<NodeId, Node>,
}

impl ChildMapper for ReplaceById<'_> {
    type Error = Infallible;

    fn one(&mut self, _field: Field, child: Node) -> Result<Node, Infallible> {
        Ok(replace_nodes(child, self.replacements))
    }

    fn opt(&mut self, _field: Field, child: Option<Node>) -> Result<Option<Node>, Infallible> {
        Ok(child.map(|c| replace_nodes(c, self.replacements)))
    }

    fn list(&mut self, _field: Field, children: Vec<Node>) -> Result<Vec<Node>, Infallible> {
        Ok(children
            .into_iter()
            .map(|c| replace_nodes(c, self.replacements))
            .collect())
    }
}

/// Nodes that give `this` a new meaning for their body.
pub(crate) fn binds_this(node_type: NodeType) -> bool {
    (node_type.is_function_like() && node_type != NodeType::ArrowFunctionExpression)
        || node_type.is_class()
}

/// Replace every `this` in `node` that refers to the enclosing `this`,
/// leaving nested functions and classes alone.
pub(crate) fn replace_this(node: Node, with: &dyn Fn() -> Node) -> Node {
    if matches!(node.kind, NodeKind::This) {
        return with();
    }
    if binds_this(node.node_type()) {
        return node;
    }
    let mut mapper = ReplaceThis { with };
    match node.map_children(&mut mapper) {
        Ok(node) => node,
        Err(never) => match never {},
    }
}

struct ReplaceThis<'w> {
    with: &'w dyn Fn() -> Node,
}

impl ChildMapper for ReplaceThis<'_> {
    type Error = Infallible;

    fn one(&mut self, _field: Field, child: Node) -> Result<Node, Infallible> {
        Ok(replace_this(child, self.with))
    }

    fn opt(&mut self, _field: Field, child: Option<Node>) -> Result<Option<Node>, Infallible> {
        Ok(child.map(|c| replace_this(c, self.with)))
    }

    fn list(&mut self, _field: Field, children: Vec<Node>) -> Result<Vec<Node>, Infallible> {
        Ok(children
            .into_iter()
            .map(|c| replace_this(c, self.with))
            .collect())
    }
}

/// Whether `node` mentions `this` outside nested functions and classes.
pub(crate) fn uses_this(node: &Node) -> bool {
    if matches!(node.kind, NodeKind::This) {
        return true;
    }
    if binds_this(node.node_type()) {
        return false;
    }
    node.children().into_iter().any(|(_, child)| uses_this(child))
}

/// Names bound by a binding pattern, in source order.
pub(crate) fn pattern_names(pattern: &Node) -> Vec<String> {
    let mut out = Vec::new();
    collect_pattern_names(pattern, &mut out);
    out
}

fn collect_pattern_names(pattern: &Node, out: &mut Vec<String>) {
    match &pattern.kind {
        NodeKind::BindingIdentifier { name } => out.push(name.clone()),
        NodeKind::AssignmentPattern { left, .. } => collect_pattern_names(left, out),
        NodeKind::RestElement { argument } => collect_pattern_names(argument, out),
        NodeKind::BindingProperty { value, .. } => collect_pattern_names(value, out),
        NodeKind::ObjectPattern { properties: items } | NodeKind::ArrayPattern { elements: items } => {
            for item in items {
                collect_pattern_names(item, out);
            }
        }
        _ => {}
    }
}

/// Names a declaration statement introduces in the scope it appears in.
pub(crate) fn declared_names(declaration: &Node) -> Vec<String> {
    match &declaration.kind {
        NodeKind::VariableDeclaration { declarations, .. } => declarations
            .iter()
            .flat_map(|d| match &d.kind {
                NodeKind::VariableDeclarator { id, .. } => pattern_names(id),
                _ => Vec::new(),
            })
            .collect(),
        NodeKind::FunctionDeclaration(func) => func.id.iter().flat_map(|id| pattern_names(id)).collect(),
        NodeKind::ClassDeclaration(class) => class.id.iter().flat_map(|id| pattern_names(id)).collect(),
        NodeKind::EnumDeclaration { id, .. } => pattern_names(id),
        _ => Vec::new(),
    }
}

pub(crate) enum Segment {
    Plain(Vec<Node>),
    Spread(Node),
}

/// Split a list into runs of plain items and the arguments of spread items:
/// `[a, b, ...c, d]` becomes `[Plain([a, b]), Spread(c), Plain([d])]`.
pub(crate) fn split_spreads(items: Vec<Node>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut run = Vec::new();
    for item in items {
        match item.kind {
            NodeKind::SpreadElement { argument } => {
                if !run.is_empty() {
                    segments.push(Segment::Plain(std::mem::take(&mut run)));
                }
                segments.push(Segment::Spread(*argument));
            }
            _ => run.push(item),
        }
    }
    if !run.is_empty() {
        segments.push(Segment::Plain(run));
    }
    segments
}

pub(crate) fn has_spread(items: &[Node]) -> bool {
    items
        .iter()
        .any(|item| matches!(item.kind, NodeKind::SpreadElement { .. }))
}

#[cfg(test)]
#[path = "../../tests/util.rs"]
mod tests;

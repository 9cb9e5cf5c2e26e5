//! JSX elements and fragments.

use kiln_ast::{Node, NodeKind, NodeType};

use crate::error::CompileError;
use crate::path::Path;
use crate::pipeline::JsxOptions;
use crate::signal::Signal;
use crate::visitor::{Interest, Visitor};

/// Lowers JSX to calls of the configured pragma.
///
/// `<a b="c" {...d}>text{e}</a>` becomes
/// `React.createElement("a", Object.assign({ b: "c" }, d), "text", e)`.
/// Nested elements are lowered when the engine walks the replacement.
pub struct Jsx {
    pragma: String,
    pragma_frag: String,
}

impl Jsx {
    pub fn new(options: &JsxOptions) -> Self {
        Jsx {
            pragma: options.pragma.clone(),
            pragma_frag: options.pragma_frag.clone(),
        }
    }
}

impl Visitor for Jsx {
    fn name(&self) -> &'static str {
        "jsx"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[
            Interest::enter(NodeType::JsxElement),
            Interest::enter(NodeType::JsxFragment),
        ];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        let (tag, props, children) = match &node.kind {
            NodeKind::JsxElement {
                name,
                attributes,
                children,
            } => (tag_expression(name), props_expression(attributes), children),
            NodeKind::JsxFragment { children } => (
                Node::member_path(&self.pragma_frag),
                Node::null(),
                children,
            ),
            _ => return Ok(Signal::Retain),
        };

        let mut arguments = vec![tag, props];
        arguments.extend(children.iter().filter_map(child_expression));
        let call = Node::call(Node::member_path(&self.pragma), arguments);
        Ok(Signal::replace(call.with_span(node.span)))
    }
}

/// Intrinsic elements (`div`, `my-element`) are strings, components are
/// references.
fn tag_expression(name: &str) -> Node {
    let intrinsic = (name.starts_with(|c: char| c.is_ascii_lowercase()) && !name.contains('.'))
        || name.contains('-');
    if intrinsic {
        Node::string(name)
    } else {
        Node::member_path(name)
    }
}

fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn attribute_property(name: &str, value: Node) -> Node {
    if is_identifier_name(name) {
        return Node::property(name, value);
    }
    Node::new(NodeKind::ObjectProperty {
        key: Box::new(Node::string(name)),
        computed: false,
        value: Box::new(value),
        shorthand: false,
    })
}

fn attribute_value(value: Option<&Node>) -> Node {
    let Some(value) = value else {
        return Node::boolean(true);
    };
    match &value.kind {
        NodeKind::JsxExpressionContainer {
            expression: Some(expression),
        } => expression.as_ref().clone(),
        NodeKind::JsxExpressionContainer { expression: None } => Node::boolean(true),
        _ => value.clone(),
    }
}

/// `null` without attributes, an object literal without spreads, otherwise
/// `Object.assign` over runs of attributes and spread arguments.
fn props_expression(attributes: &[Node]) -> Node {
    if attributes.is_empty() {
        return Node::null();
    }

    let mut arguments: Vec<Node> = Vec::new();
    let mut run: Vec<Node> = Vec::new();
    for attribute in attributes {
        match &attribute.kind {
            NodeKind::JsxAttribute { name, value } => {
                run.push(attribute_property(name, attribute_value(value.as_deref())));
            }
            NodeKind::JsxSpreadAttribute { argument } => {
                if !run.is_empty() {
                    arguments.push(Node::object(std::mem::take(&mut run)));
                } else if arguments.is_empty() {
                    arguments.push(Node::object(Vec::new()));
                }
                arguments.push(argument.as_ref().clone());
            }
            _ => {}
        }
    }

    if arguments.is_empty() {
        return Node::object(run);
    }
    if !run.is_empty() {
        arguments.push(Node::object(run));
    }
    Node::call(Node::member_path("Object.assign"), arguments)
}

fn child_expression(child: &Node) -> Option<Node> {
    match &child.kind {
        NodeKind::JsxText { value } => clean_text(value).map(Node::string),
        NodeKind::JsxExpressionContainer { expression } => expression.as_deref().cloned(),
        _ => Some(child.clone()),
    }
}

/// Collapse JSX text the way React does: lines are trimmed, lines that end
/// up empty are dropped, and the remaining lines are joined with one space.
/// Whitespace within a single line is kept.
fn clean_text(value: &str) -> Option<String> {
    let lines: Vec<&str> = value.split(['\n', '\r']).collect();
    let last_non_empty = lines.iter().rposition(|line| !line.trim().is_empty())?;

    let mut out = String::new();
    for (index, line) in lines.iter().enumerate() {
        let line = line.replace('\t', " ");
        let is_first = index == 0;
        let is_last = index == lines.len() - 1;
        let mut trimmed = line.as_str();
        if !is_first {
            trimmed = trimmed.trim_start_matches(' ');
        }
        if !is_last {
            trimmed = trimmed.trim_end_matches(' ');
        }
        if trimmed.is_empty() {
            continue;
        }
        out.push_str(trimmed);
        if index != last_non_empty {
            out.push(' ');
        }
    }
    (!out.is_empty()).then_some(out)
}

#[cfg(test)]
#[path = "../../tests/jsx.rs"]
mod tests;

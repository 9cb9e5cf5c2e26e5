//! Expression emission with precedence-driven parenthesization.

use kiln_ast::{LogicalOperator, MemberProperty, Node, NodeKind, NodeType, UnaryOperator};

use crate::helpers::{escape_template, format_number, quote_string};
use crate::printer::{Printer, is_statement};

/// Precedence levels, higher binds tighter. Binary and logical operators use
/// the levels reported by their operator enums, which sit between
/// `CONDITIONAL` and `UNARY`.
pub(crate) mod prec {
    pub const LOWEST: u8 = 0;
    pub const SEQUENCE: u8 = 1;
    pub const ASSIGNMENT: u8 = 2;
    pub const CONDITIONAL: u8 = 3;
    pub const UNARY: u8 = 15;
    pub const UPDATE: u8 = 16;
    pub const NEW: u8 = 17;
    pub const CALL: u8 = 18;
    pub const PRIMARY: u8 = 20;
}

fn precedence_of(node: &Node) -> u8 {
    match &node.kind {
        NodeKind::SequenceExpression { .. } => prec::SEQUENCE,
        NodeKind::AssignmentExpression { .. } | NodeKind::ArrowFunctionExpression { .. } => {
            prec::ASSIGNMENT
        }
        NodeKind::ConditionalExpression { .. } => prec::CONDITIONAL,
        NodeKind::LogicalExpression { operator, .. } => operator.precedence(),
        NodeKind::BinaryExpression { operator, .. } => operator.precedence(),
        NodeKind::UnaryExpression { .. } => prec::UNARY,
        NodeKind::UpdateExpression { .. } => prec::UPDATE,
        NodeKind::NewExpression { arguments, .. } if arguments.is_empty() => prec::NEW,
        NodeKind::CallExpression { .. }
        | NodeKind::NewExpression { .. }
        | NodeKind::MemberExpression { .. }
        | NodeKind::TaggedTemplateExpression { .. }
        | NodeKind::ChainExpression { .. } => prec::CALL,
        NodeKind::NumericLiteral { value } if *value < 0.0 => prec::UNARY,
        _ => prec::PRIMARY,
    }
}

impl<'a> Printer<'a> {
    pub(crate) fn emit_expression(&mut self, node: &'a Node) {
        self.emit_expression_in(node, prec::LOWEST);
    }

    /// Emit `node` in a position that requires at least `min` precedence.
    pub(crate) fn emit_expression_in(&mut self, node: &'a Node, min: u8) {
        if precedence_of(node) < min {
            self.write("(");
            self.emit_expression_inner(node);
            self.write(")");
        } else {
            self.emit_expression_inner(node);
        }
    }

    fn emit_expression_inner(&mut self, node: &'a Node) {
        match &node.kind {
            NodeKind::Identifier { name } | NodeKind::BindingIdentifier { name } => {
                self.write(name)
            }
            NodeKind::This => self.write("this"),
            NodeKind::Super => self.write("super"),
            NodeKind::NullLiteral => self.write("null"),
            NodeKind::BooleanLiteral { value } => self.write(if *value { "true" } else { "false" }),
            NodeKind::NumericLiteral { value } => self.write(&format_number(*value)),
            NodeKind::StringLiteral { value } => self.write(&quote_string(value)),
            NodeKind::TemplateLiteral {
                quasis,
                expressions,
            } => {
                self.write("`");
                for (i, quasi) in quasis.iter().enumerate() {
                    self.write(&escape_template(quasi));
                    if let Some(expr) = expressions.get(i) {
                        self.write("${");
                        self.emit_expression(expr);
                        self.write("}");
                    }
                }
                self.write("`");
            }
            NodeKind::TaggedTemplateExpression { tag, quasi } => {
                self.emit_expression_in(tag, prec::CALL);
                self.emit_expression(quasi);
            }
            NodeKind::ArrayExpression { elements } => {
                self.write("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if element.node_type() != NodeType::Elision {
                        self.emit_expression_in(element, prec::ASSIGNMENT);
                    }
                }
                if elements.last().is_some_and(|e| e.node_type() == NodeType::Elision) {
                    self.write(",");
                }
                self.write("]");
            }
            NodeKind::ObjectExpression { properties } => self.emit_object(properties),
            NodeKind::SpreadElement { argument } | NodeKind::RestElement { argument } => {
                self.write("...");
                self.emit_expression_in(argument, prec::ASSIGNMENT);
            }
            NodeKind::UnaryExpression { operator, argument } => {
                self.write(operator.as_str());
                let needs_space = operator.is_keyword()
                    || matches!(
                        (&argument.kind, operator),
                        (
                            NodeKind::UnaryExpression {
                                operator: UnaryOperator::Minus,
                                ..
                            },
                            UnaryOperator::Minus
                        ) | (
                            NodeKind::UnaryExpression {
                                operator: UnaryOperator::Plus,
                                ..
                            },
                            UnaryOperator::Plus
                        )
                    );
                if needs_space {
                    self.write(" ");
                }
                self.emit_expression_in(argument, prec::UNARY);
            }
            NodeKind::UpdateExpression {
                operator,
                prefix,
                argument,
            } => {
                if *prefix {
                    self.write(operator.as_str());
                    self.emit_expression_in(argument, prec::UNARY);
                } else {
                    self.emit_expression_in(argument, prec::CALL);
                    self.write(operator.as_str());
                }
            }
            NodeKind::BinaryExpression {
                operator,
                left,
                right,
            } => {
                let p = operator.precedence();
                let (left_min, right_min) = if operator.is_right_associative() {
                    (p + 1, p)
                } else {
                    (p, p + 1)
                };
                self.emit_expression_in(left, left_min);
                self.write(" ");
                self.write(operator.as_str());
                self.write(" ");
                self.emit_expression_in(right, right_min);
            }
            NodeKind::LogicalExpression {
                operator,
                left,
                right,
            } => {
                let p = operator.precedence();
                self.emit_logical_operand(*operator, left, p);
                self.write(" ");
                self.write(operator.as_str());
                self.write(" ");
                self.emit_logical_operand(*operator, right, p + 1);
            }
            NodeKind::AssignmentExpression {
                operator,
                left,
                right,
            } => {
                self.emit_expression_in(left, prec::CALL);
                self.write(" ");
                self.write(operator.as_str());
                self.write(" ");
                self.emit_expression_in(right, prec::ASSIGNMENT);
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                self.emit_expression_in(test, prec::CONDITIONAL + 1);
                self.write(" ? ");
                self.emit_expression_in(consequent, prec::ASSIGNMENT);
                self.write(" : ");
                self.emit_expression_in(alternate, prec::ASSIGNMENT);
            }
            NodeKind::SequenceExpression { expressions } => {
                for (i, expr) in expressions.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_expression_in(expr, prec::ASSIGNMENT);
                }
            }
            NodeKind::ChainExpression { expression } => self.emit_expression_inner(expression),
            NodeKind::CallExpression {
                callee,
                arguments,
                optional,
            } => {
                if matches!(
                    callee.kind,
                    NodeKind::FunctionExpression(_) | NodeKind::ArrowFunctionExpression { .. }
                ) {
                    self.write("(");
                    self.emit_expression(callee);
                    self.write(")");
                } else {
                    self.emit_expression_in(callee, prec::CALL);
                }
                if *optional {
                    self.write("?.");
                }
                self.emit_arguments(arguments);
            }
            NodeKind::NewExpression { callee, arguments } => {
                self.write("new ");
                let callee_has_call = callee.any_descendant(&mut |n| {
                    n.node_type() == NodeType::CallExpression
                });
                if callee_has_call {
                    self.write("(");
                    self.emit_expression(callee);
                    self.write(")");
                } else {
                    self.emit_expression_in(callee, prec::CALL);
                }
                self.emit_arguments(arguments);
            }
            NodeKind::MemberExpression {
                object,
                property,
                optional,
            } => {
                let bare_integer = matches!(
                    &object.kind,
                    NodeKind::NumericLiteral { value } if value.fract() == 0.0 && *value >= 0.0
                );
                if bare_integer {
                    self.write("(");
                    self.emit_expression(object);
                    self.write(")");
                } else {
                    self.emit_expression_in(object, prec::CALL);
                }
                match property {
                    MemberProperty::Static(name) => {
                        self.write(if *optional { "?." } else { "." });
                        self.write(name);
                    }
                    MemberProperty::Computed(prop) => {
                        if *optional {
                            self.write("?.");
                        }
                        self.write("[");
                        self.emit_expression(prop);
                        self.write("]");
                    }
                }
            }
            NodeKind::FunctionExpression(func) => self.emit_function(func, true),
            NodeKind::ArrowFunctionExpression {
                params,
                body,
                is_async,
            } => {
                if *is_async {
                    self.write("async ");
                }
                self.emit_params(params);
                self.write(" => ");
                match body.node_type() {
                    NodeType::BlockStatement => self.emit_statement(body),
                    NodeType::ObjectExpression => {
                        self.write("(");
                        self.emit_expression(body);
                        self.write(")");
                    }
                    _ => self.emit_expression_in(body, prec::ASSIGNMENT),
                }
            }
            NodeKind::ClassExpression(class) => self.emit_class(class),
            NodeKind::MetaProperty { meta, property } => {
                self.write(meta);
                self.write(".");
                self.write(property);
            }
            NodeKind::AssignmentPattern { .. }
            | NodeKind::ObjectPattern { .. }
            | NodeKind::ArrayPattern { .. }
            | NodeKind::BindingProperty { .. } => self.emit_pattern(node),
            NodeKind::JsxElement {
                name,
                attributes,
                children,
            } => self.emit_jsx_element(Some(name), attributes, children),
            NodeKind::JsxFragment { children } => self.emit_jsx_element(None, &[], children),
            NodeKind::JsxText { value } => self.write(value),
            NodeKind::JsxExpressionContainer { expression } => {
                self.write("{");
                if let Some(expr) = expression {
                    self.emit_expression(expr);
                }
                self.write("}");
            }
            NodeKind::JsxAttribute { name, value } => {
                self.write(name);
                if let Some(value) = value {
                    self.write("=");
                    self.emit_expression(value);
                }
            }
            NodeKind::JsxSpreadAttribute { argument } => {
                self.write("{...");
                self.emit_expression(argument);
                self.write("}");
            }
            NodeKind::ObjectProperty { .. } | NodeKind::ObjectMethod { .. } => {
                self.emit_object_member(node)
            }
            NodeKind::Elision => {}
            _ if is_statement(node.node_type()) => self.emit_statement(node),
            _ => self.emit_fragment(node),
        }
    }

    /// `??` cannot be mixed with `&&` or `||` without parentheses.
    fn emit_logical_operand(&mut self, operator: LogicalOperator, operand: &'a Node, min: u8) {
        let mixes_nullish = matches!(
            &operand.kind,
            NodeKind::LogicalExpression { operator: inner, .. }
                if (*inner == LogicalOperator::NullishCoalescing)
                    != (operator == LogicalOperator::NullishCoalescing)
        );
        if mixes_nullish {
            self.write("(");
            self.emit_expression(operand);
            self.write(")");
        } else {
            self.emit_expression_in(operand, min);
        }
    }

    fn emit_arguments(&mut self, arguments: &'a [Node]) {
        self.write("(");
        for (i, arg) in arguments.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_expression_in(arg, prec::ASSIGNMENT);
        }
        self.write(")");
    }

    pub(crate) fn emit_property_key(&mut self, key: &'a Node, computed: bool) {
        if computed {
            self.write("[");
            self.emit_expression_in(key, prec::ASSIGNMENT);
            self.write("]");
        } else {
            self.emit_expression(key);
        }
    }

    /// Objects holding methods print one member per line; others stay inline.
    fn emit_object(&mut self, properties: &'a [Node]) {
        if properties.is_empty() {
            self.write("{}");
            return;
        }
        let multiline = properties
            .iter()
            .any(|p| p.node_type() == NodeType::ObjectMethod);
        if !multiline {
            self.write("{ ");
            for (i, prop) in properties.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.emit_object_member(prop);
            }
            self.write(" }");
            return;
        }
        self.write("{");
        self.write_line();
        self.increase_indent();
        for (i, prop) in properties.iter().enumerate() {
            self.write_indent();
            self.emit_object_member(prop);
            if i + 1 < properties.len() {
                self.write(",");
            }
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }

    fn emit_object_member(&mut self, prop: &'a Node) {
        match &prop.kind {
            NodeKind::ObjectProperty {
                key,
                computed,
                value,
                shorthand,
            } => {
                let is_shorthand = *shorthand
                    && !computed
                    && key.ident_name().is_some()
                    && key.ident_name() == value.ident_name();
                if is_shorthand {
                    self.emit_expression(value);
                } else {
                    self.emit_property_key(key, *computed);
                    self.write(": ");
                    self.emit_expression_in(value, prec::ASSIGNMENT);
                }
            }
            NodeKind::ObjectMethod {
                kind,
                key,
                computed,
                params,
                body,
            } => self.emit_method(*kind, key, *computed, params, body),
            NodeKind::SpreadElement { .. } => self.emit_expression(prop),
            _ => self.emit_expression_in(prop, prec::ASSIGNMENT),
        }
    }

    fn emit_jsx_element(
        &mut self,
        name: Option<&'a String>,
        attributes: &'a [Node],
        children: &'a [Node],
    ) {
        self.write("<");
        if let Some(name) = name {
            self.write(name);
        }
        for attr in attributes {
            self.write(" ");
            self.emit_expression(attr);
        }
        if children.is_empty() && name.is_some() {
            self.write(" />");
            return;
        }
        self.write(">");
        for child in children {
            self.emit_expression(child);
        }
        self.write("</");
        if let Some(name) = name {
            self.write(name);
        }
        self.write(">");
    }
}


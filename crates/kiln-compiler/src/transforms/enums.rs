//! TypeScript `enum` declarations.
//!
//! ```text
//! enum E { A, B = 5, C }
//! ```
//! becomes
//! ```text
//! var E;
//! (function (E) {
//!     E[E["A"] = 0] = "A";
//!     E[E["B"] = 5] = "B";
//!     E[E["C"] = 6] = "C";
//! })(E || (E = {}));
//! ```
//! String members get no reverse mapping. Constant initializers are folded;
//! other initializers are kept (with a warning) and references to earlier
//! members inside them are qualified with the enum name.

use std::convert::Infallible;

use kiln_ast::{
    BinaryOperator, ChildMapper, Field, MemberProperty, Node, NodeKind, NodeType, UnaryOperator,
    VariableKind,
};
use kiln_binder::{BindingKind, ScopeKind};
use kiln_common::diagnostic_codes;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::error::CompileError;
use crate::path::Path;
use crate::signal::Signal;
use crate::visitor::{Interest, Visitor};

const NAME: &str = "enums";

pub struct Enums;

impl Visitor for Enums {
    fn name(&self) -> &'static str {
        NAME
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[
            Interest::enter(NodeType::EnumDeclaration),
            Interest::enter(NodeType::ExportNamedDeclaration),
        ];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        match &node.kind {
            NodeKind::EnumDeclaration {
                is_const, declare, ..
            } => {
                if *is_const {
                    report(path, node, diagnostic_codes::CONST_ENUM_NOT_SUPPORTED);
                    return Ok(Signal::Retain);
                }
                if *declare {
                    report(path, node, diagnostic_codes::AMBIENT_ENUM_ELIDED);
                    return Ok(Signal::Remove);
                }
                Ok(Signal::replace_many(lower(path, node, false)?))
            }
            NodeKind::ExportNamedDeclaration {
                declaration: Some(declaration),
                source: None,
                ..
            } => match &declaration.kind {
                // The declaration itself reports the const enum when it is walked.
                NodeKind::EnumDeclaration { is_const: true, .. } => Ok(Signal::Retain),
                NodeKind::EnumDeclaration { declare: true, .. } => {
                    report(path, declaration, diagnostic_codes::AMBIENT_ENUM_ELIDED);
                    Ok(Signal::Remove)
                }
                NodeKind::EnumDeclaration { .. } => {
                    Ok(Signal::replace_many(lower(path, declaration, true)?))
                }
                _ => Ok(Signal::Retain),
            },
            _ => Ok(Signal::Retain),
        }
    }
}

fn enum_name(node: &Node) -> &str {
    match &node.kind {
        NodeKind::EnumDeclaration { id, .. } => id.ident_name().unwrap_or_default(),
        _ => "",
    }
}

fn report(path: &mut Path<'_>, node: &Node, code: u32) {
    let name = enum_name(node).to_string();
    path.add_node_diagnostic(node, code, &[name.as_str()]);
}

#[derive(Clone, Debug, PartialEq)]
enum Value {
    Number(f64),
    String(String),
}

impl Value {
    fn into_node(self) -> Node {
        match self {
            Value::Number(n) if n < 0.0 => Node::unary(UnaryOperator::Minus, Node::number(-n)),
            Value::Number(n) => Node::number(n),
            Value::String(s) => Node::string(s),
        }
    }
}

/// What an uninitialized member would be assigned.
enum Next {
    Number(f64),
    /// The previous member is a string or was computed at runtime.
    Unknown { previous: String },
}

/// `[var E;, (function (E) { ... })(E || (E = {}));]`, with the declaration
/// exported when `exported`.
fn lower(path: &mut Path<'_>, node: &Node, exported: bool) -> Result<Vec<Node>, CompileError> {
    let NodeKind::EnumDeclaration { id, members, .. } = &node.kind else {
        return Ok(vec![node.clone()]);
    };
    let name = id.ident_name().unwrap_or_default().to_string();

    let mut known: FxHashMap<String, Value> = FxHashMap::default();
    let mut declared: FxHashSet<String> = FxHashSet::default();
    let mut next = Next::Number(0.0);
    let mut body = Vec::with_capacity(members.len());

    for member in members {
        let NodeKind::EnumMember {
            name: key,
            initializer,
        } = &member.kind
        else {
            continue;
        };

        let (value, runtime) = match initializer.as_deref() {
            Some(init) => match fold(init, &name, &known) {
                Some(value) => (Some(value), None),
                None => {
                    path.add_node_diagnostic(
                        init,
                        diagnostic_codes::NON_CONSTANT_ENUM_INITIALIZER,
                        &[name.as_str(), key.as_str()],
                    );
                    let qualified = qualify(init.clone(), &Qualify {
                        enum_name: &name,
                        members: &declared,
                    });
                    (None, Some(qualified))
                }
            },
            None => match &next {
                Next::Number(n) => (Some(Value::Number(*n)), None),
                Next::Unknown { previous } => {
                    return Err(CompileError::pass(
                        NAME,
                        format!(
                            "enum member `{name}.{key}` needs an initializer because `{name}.{previous}` is not numeric"
                        ),
                    ));
                }
            },
        };

        next = match &value {
            Some(Value::Number(n)) => Next::Number(n + 1.0),
            _ => Next::Unknown {
                previous: key.clone(),
            },
        };

        let target = Node::computed_member(Node::ident(name.clone()), Node::string(key.clone()));
        let statement = match (value.clone(), runtime) {
            (Some(Value::String(s)), _) => Node::assign(target, Node::string(s)),
            (Some(number), _) => reverse_mapped(&name, key, Node::assign(target, number.into_node())),
            (None, Some(expr)) => reverse_mapped(&name, key, Node::assign(target, expr)),
            (None, None) => continue,
        };
        body.push(Node::expr_stmt(statement));

        declared.insert(key.clone());
        if let Some(value) = value {
            known.insert(key.clone(), value);
        }
    }

    let iife = Node::iife(
        name.clone(),
        body,
        Node::logical(
            kiln_ast::LogicalOperator::Or,
            Node::ident(name.clone()),
            Node::assign(Node::ident(name.clone()), Node::object(Vec::new())),
        ),
    );
    register_iife_scope(path, &iife, &name);

    let declaration = Node::var_decl(VariableKind::Var, name.clone(), None).with_span(node.span);
    let declarator_id = match &declaration.kind {
        NodeKind::VariableDeclaration { declarations, .. } => declarations.first().map(|d| d.id),
        _ => None,
    };
    let scope = path.scope();
    let var_scope = path.scopes().nearest_function_scope(scope);
    path.scopes_mut().remove_binding(scope, &name);
    if let Some(declarator_id) = declarator_id {
        path.scopes_mut()
            .add_binding(var_scope, name.clone(), BindingKind::Var, declarator_id);
    }
    debug!(name = %name, exported, "lowered enum");

    let declaration = if exported {
        Node::new(NodeKind::ExportNamedDeclaration {
            declaration: Some(Box::new(declaration)),
            specifiers: Vec::new(),
            source: None,
        })
    } else {
        declaration
    };
    Ok(vec![declaration, Node::expr_stmt(iife)])
}

/// `E[<assignment>] = "K"`
fn reverse_mapped(enum_name: &str, key: &str, assignment: Node) -> Node {
    Node::assign(
        Node::computed_member(Node::ident(enum_name), assignment),
        Node::string(key),
    )
}

/// The IIFE's function introduces a scope the binder never saw; register it
/// with its parameter so lookups inside resolve to the parameter.
fn register_iife_scope(path: &mut Path<'_>, iife: &Node, name: &str) {
    let NodeKind::CallExpression { callee, .. } = &iife.kind else {
        return;
    };
    let NodeKind::FunctionExpression(func) = &callee.kind else {
        return;
    };
    let scope = path.create_scope(ScopeKind::Function, callee.id);
    if let Some(param) = func.params.first() {
        path.scopes_mut()
            .add_binding(scope, name, BindingKind::Parameter, param.id);
    }
}

fn to_int32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32 as i32
}

fn to_uint32(n: f64) -> u32 {
    to_int32(n) as u32
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

/// Constant value of an initializer, if it has one.
fn fold(expr: &Node, enum_name: &str, known: &FxHashMap<String, Value>) -> Option<Value> {
    match &expr.kind {
        NodeKind::NumericLiteral { value } => Some(Value::Number(*value)),
        NodeKind::StringLiteral { value } => Some(Value::String(value.clone())),
        NodeKind::TemplateLiteral { quasis, expressions } if expressions.is_empty() => {
            Some(Value::String(quasis.concat()))
        }
        NodeKind::Identifier { name } => known.get(name).cloned(),
        NodeKind::MemberExpression {
            object, property, ..
        } if object.is_identifier(enum_name) => match property {
            MemberProperty::Static(name) => known.get(name).cloned(),
            MemberProperty::Computed(key) => match &key.kind {
                NodeKind::StringLiteral { value } => known.get(value).cloned(),
                _ => None,
            },
        },
        NodeKind::UnaryExpression { operator, argument } => {
            let Value::Number(n) = fold(argument, enum_name, known)? else {
                return None;
            };
            match operator {
                UnaryOperator::Minus => Some(Value::Number(-n)),
                UnaryOperator::Plus => Some(Value::Number(n)),
                UnaryOperator::BitwiseNot => Some(Value::Number(f64::from(!to_int32(n)))),
                _ => None,
            }
        }
        NodeKind::BinaryExpression {
            operator,
            left,
            right,
        } => {
            let left = fold(left, enum_name, known)?;
            let right = fold(right, enum_name, known)?;
            fold_binary(*operator, left, right)
        }
        _ => None,
    }
}

fn fold_binary(operator: BinaryOperator, left: Value, right: Value) -> Option<Value> {
    let (l, r) = match (left, right) {
        (Value::Number(l), Value::Number(r)) => (l, r),
        (left, right) if operator == BinaryOperator::Addition => {
            let text = |v: Value| match v {
                Value::Number(n) => number_to_string(n),
                Value::String(s) => s,
            };
            return Some(Value::String(text(left) + &text(right)));
        }
        _ => return None,
    };
    let value = match operator {
        BinaryOperator::Addition => l + r,
        BinaryOperator::Subtraction => l - r,
        BinaryOperator::Multiplication => l * r,
        BinaryOperator::Division => l / r,
        BinaryOperator::Remainder => l % r,
        BinaryOperator::Exponentiation => l.powf(r),
        BinaryOperator::BitwiseOr => f64::from(to_int32(l) | to_int32(r)),
        BinaryOperator::BitwiseAnd => f64::from(to_int32(l) & to_int32(r)),
        BinaryOperator::BitwiseXor => f64::from(to_int32(l) ^ to_int32(r)),
        BinaryOperator::ShiftLeft => f64::from(to_int32(l).wrapping_shl(to_uint32(r) & 31)),
        BinaryOperator::ShiftRight => f64::from(to_int32(l).wrapping_shr(to_uint32(r) & 31)),
        BinaryOperator::ShiftRightZeroFill => {
            f64::from(to_uint32(l).wrapping_shr(to_uint32(r) & 31))
        }
        _ => return None,
    };
    Some(Value::Number(value))
}

struct Qualify<'q> {
    enum_name: &'q str,
    members: &'q FxHashSet<String>,
}

/// Rewrite references to earlier members as `E.member`.
fn qualify(node: Node, q: &Qualify<'_>) -> Node {
    if let NodeKind::Identifier { name } = &node.kind {
        if q.members.contains(name) {
            return Node::member(Node::ident(q.enum_name), name.clone()).with_span(node.span);
        }
        return node;
    }
    let mut mapper = QualifyChildren {
        q,
        static_key: node.has_static_key(),
    };
    match node.map_children(&mut mapper) {
        Ok(node) => node,
        Err(never) => match never {},
    }
}

struct QualifyChildren<'a, 'q> {
    q: &'a Qualify<'q>,
    static_key: bool,
}

impl ChildMapper for QualifyChildren<'_, '_> {
    type Error = Infallible;

    fn one(&mut self, field: Field, child: Node) -> Result<Node, Infallible> {
        if field == Field::Key && self.static_key {
            return Ok(child);
        }
        Ok(qualify(child, self.q))
    }

    fn opt(&mut self, field: Field, child: Option<Node>) -> Result<Option<Node>, Infallible> {
        child.map(|c| self.one(field, c)).transpose()
    }

    fn list(&mut self, _field: Field, children: Vec<Node>) -> Result<Vec<Node>, Infallible> {
        Ok(children.into_iter().map(|c| qualify(c, self.q)).collect())
    }
}

#[cfg(test)]
#[path = "../../tests/enums.rs"]
mod tests;

//! Builder helpers for synthesized nodes.
//!
//! Passes construct replacement trees with these instead of spelling out
//! `NodeKind` literals. Every builder returns a node with a fresh id and no
//! span.

use crate::node::{Class, Function, MemberProperty, MethodKind, Node, NodeKind, VariableKind};
use crate::ops::{AssignmentOperator, BinaryOperator, LogicalOperator, UnaryOperator};

impl Node {
    pub fn ident(name: impl Into<String>) -> Node {
        Node::new(NodeKind::Identifier { name: name.into() })
    }

    pub fn binding(name: impl Into<String>) -> Node {
        Node::new(NodeKind::BindingIdentifier { name: name.into() })
    }

    pub fn string(value: impl Into<String>) -> Node {
        Node::new(NodeKind::StringLiteral {
            value: value.into(),
        })
    }

    pub fn number(value: f64) -> Node {
        Node::new(NodeKind::NumericLiteral { value })
    }

    pub fn boolean(value: bool) -> Node {
        Node::new(NodeKind::BooleanLiteral { value })
    }

    pub fn null() -> Node {
        Node::new(NodeKind::NullLiteral)
    }

    pub fn this() -> Node {
        Node::new(NodeKind::This)
    }

    /// `void 0`
    pub fn void_0() -> Node {
        Node::unary(UnaryOperator::Void, Node::number(0.0))
    }

    /// `object.property`
    pub fn member(object: Node, property: impl Into<String>) -> Node {
        Node::new(NodeKind::MemberExpression {
            object: Box::new(object),
            property: MemberProperty::Static(property.into()),
            optional: false,
        })
    }

    /// `object[index]`
    pub fn computed_member(object: Node, index: Node) -> Node {
        Node::new(NodeKind::MemberExpression {
            object: Box::new(object),
            property: MemberProperty::Computed(Box::new(index)),
            optional: false,
        })
    }

    /// Member access along a dotted path: `member_path("React.createElement")`.
    pub fn member_path(path: &str) -> Node {
        let mut parts = path.split('.');
        let head = Node::ident(parts.next().unwrap_or_default());
        parts.fold(head, |object, property| Node::member(object, property))
    }

    pub fn call(callee: Node, arguments: Vec<Node>) -> Node {
        Node::new(NodeKind::CallExpression {
            callee: Box::new(callee),
            arguments,
            optional: false,
        })
    }

    pub fn new_expr(callee: Node, arguments: Vec<Node>) -> Node {
        Node::new(NodeKind::NewExpression {
            callee: Box::new(callee),
            arguments,
        })
    }

    pub fn binary(operator: BinaryOperator, left: Node, right: Node) -> Node {
        Node::new(NodeKind::BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn logical(operator: LogicalOperator, left: Node, right: Node) -> Node {
        Node::new(NodeKind::LogicalExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(operator: UnaryOperator, argument: Node) -> Node {
        Node::new(NodeKind::UnaryExpression {
            operator,
            argument: Box::new(argument),
        })
    }

    /// `left = right`
    pub fn assign(left: Node, right: Node) -> Node {
        Node::new(NodeKind::AssignmentExpression {
            operator: AssignmentOperator::Assign,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn conditional(test: Node, consequent: Node, alternate: Node) -> Node {
        Node::new(NodeKind::ConditionalExpression {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    pub fn sequence(expressions: Vec<Node>) -> Node {
        Node::new(NodeKind::SequenceExpression { expressions })
    }

    pub fn array(elements: Vec<Node>) -> Node {
        Node::new(NodeKind::ArrayExpression { elements })
    }

    pub fn object(properties: Vec<Node>) -> Node {
        Node::new(NodeKind::ObjectExpression { properties })
    }

    /// `key: value` with an identifier key.
    pub fn property(key: impl Into<String>, value: Node) -> Node {
        Node::new(NodeKind::ObjectProperty {
            key: Box::new(Node::ident(key)),
            computed: false,
            value: Box::new(value),
            shorthand: false,
        })
    }

    /// `get key() { body }`
    pub fn getter(key: impl Into<String>, body: Vec<Node>) -> Node {
        Node::new(NodeKind::ObjectMethod {
            kind: MethodKind::Get,
            key: Box::new(Node::ident(key)),
            computed: false,
            params: Vec::new(),
            body: Box::new(Node::block(body)),
        })
    }

    pub fn spread(argument: Node) -> Node {
        Node::new(NodeKind::SpreadElement {
            argument: Box::new(argument),
        })
    }

    pub fn expr_stmt(expression: Node) -> Node {
        Node::new(NodeKind::ExpressionStatement {
            expression: Box::new(expression),
        })
    }

    pub fn block(body: Vec<Node>) -> Node {
        Node::new(NodeKind::BlockStatement { body })
    }

    pub fn ret(argument: Option<Node>) -> Node {
        Node::new(NodeKind::ReturnStatement {
            argument: argument.map(Box::new),
        })
    }

    pub fn declarator(name: impl Into<String>, init: Option<Node>) -> Node {
        Node::new(NodeKind::VariableDeclarator {
            id: Box::new(Node::binding(name)),
            init: init.map(Box::new),
        })
    }

    /// `kind name = init;` with a single declarator.
    pub fn var_decl(kind: VariableKind, name: impl Into<String>, init: Option<Node>) -> Node {
        Node::new(NodeKind::VariableDeclaration {
            kind,
            declarations: vec![Node::declarator(name, init)],
        })
    }

    pub fn function_expr(
        id: Option<String>,
        params: Vec<Node>,
        body: Vec<Node>,
    ) -> Node {
        Node::new(NodeKind::FunctionExpression(Function {
            id: id.map(|name| Box::new(Node::binding(name))),
            params,
            body: Box::new(Node::block(body)),
            is_async: false,
            is_generator: false,
        }))
    }

    pub fn class_decl(name: impl Into<String>, super_class: Option<Node>, body: Vec<Node>) -> Node {
        Node::new(NodeKind::ClassDeclaration(Class {
            id: Some(Box::new(Node::binding(name))),
            super_class: super_class.map(Box::new),
            body,
        }))
    }

    /// Wrap an expression in `(function (param) { body })(arg)`.
    pub fn iife(param: impl Into<String>, body: Vec<Node>, arg: Node) -> Node {
        let func = Node::function_expr(None, vec![Node::binding(param)], body);
        Node::call(func, vec![arg])
    }
}

#[cfg(test)]
#[path = "../tests/builders.rs"]
mod tests;

//! Child access and the child rewriting protocol.
//!
//! Children are always listed in source (evaluation) order. [`Node::children`]
//! and [`Node::map_children`] must agree on that order: the traversal engine
//! reads with one and rewrites with the other.

use std::convert::Infallible;

use smallvec::SmallVec;

use crate::node::{Class, Function, MemberProperty, Node, NodeId, NodeKind};
use crate::node_type::Field;

/// Shape of a child slot, which decides how many nodes a rewrite may produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotKind {
    /// Exactly one node.
    Required,
    /// Zero or one node.
    Optional,
    /// Any number of nodes.
    List,
}

/// Rewrites the children of a node, one slot at a time.
///
/// [`Node::map_children`] calls the method matching each slot's shape, in
/// source order, and rebuilds the node from the results.
pub trait ChildMapper {
    type Error;

    fn one(&mut self, field: Field, child: Node) -> Result<Node, Self::Error>;

    fn opt(&mut self, field: Field, child: Option<Node>) -> Result<Option<Node>, Self::Error>;

    fn list(&mut self, field: Field, children: Vec<Node>) -> Result<Vec<Node>, Self::Error>;
}

fn one<M: ChildMapper>(m: &mut M, field: Field, child: Box<Node>) -> Result<Box<Node>, M::Error> {
    Ok(Box::new(m.one(field, *child)?))
}

fn opt<M: ChildMapper>(
    m: &mut M,
    field: Field,
    child: Option<Box<Node>>,
) -> Result<Option<Box<Node>>, M::Error> {
    Ok(m.opt(field, child.map(|c| *c))?.map(Box::new))
}

fn map_function<M: ChildMapper>(m: &mut M, func: Function) -> Result<Function, M::Error> {
    Ok(Function {
        id: opt(m, Field::Id, func.id)?,
        params: m.list(Field::Params, func.params)?,
        body: one(m, Field::Body, func.body)?,
        is_async: func.is_async,
        is_generator: func.is_generator,
    })
}

fn map_class<M: ChildMapper>(m: &mut M, class: Class) -> Result<Class, M::Error> {
    Ok(Class {
        id: opt(m, Field::Id, class.id)?,
        super_class: opt(m, Field::SuperClass, class.super_class)?,
        body: m.list(Field::Members, class.body)?,
    })
}

pub type Children<'a> = SmallVec<[(Field, &'a Node); 4]>;

fn push_function<'a>(out: &mut Children<'a>, func: &'a Function) {
    if let Some(id) = &func.id {
        out.push((Field::Id, id));
    }
    out.extend(func.params.iter().map(|p| (Field::Params, p)));
    out.push((Field::Body, &func.body));
}

fn push_class<'a>(out: &mut Children<'a>, class: &'a Class) {
    if let Some(id) = &class.id {
        out.push((Field::Id, id));
    }
    if let Some(sup) = &class.super_class {
        out.push((Field::SuperClass, sup));
    }
    out.extend(class.body.iter().map(|m| (Field::Members, m)));
}

impl Node {
    /// Direct children in source order, tagged with their slot.
    pub fn children(&self) -> Children<'_> {
        let mut out = Children::new();
        macro_rules! push {
            ($field:ident, $node:expr) => {
                out.push((Field::$field, &**$node))
            };
        }
        macro_rules! push_opt {
            ($field:ident, $node:expr) => {
                if let Some(n) = $node {
                    out.push((Field::$field, &**n));
                }
            };
        }
        macro_rules! push_list {
            ($field:ident, $nodes:expr) => {
                out.extend($nodes.iter().map(|n| (Field::$field, n)))
            };
        }

        match &self.kind {
            NodeKind::Program { body, .. } | NodeKind::BlockStatement { body } => {
                push_list!(Body, body)
            }
            NodeKind::ExpressionStatement { expression } => push!(Expression, expression),
            NodeKind::VariableDeclaration { declarations, .. } => {
                push_list!(Declarations, declarations)
            }
            NodeKind::VariableDeclarator { id, init } => {
                push!(Id, id);
                push_opt!(Init, init);
            }
            NodeKind::FunctionDeclaration(func) | NodeKind::FunctionExpression(func) => {
                push_function(&mut out, func)
            }
            NodeKind::ClassDeclaration(class) | NodeKind::ClassExpression(class) => {
                push_class(&mut out, class)
            }
            NodeKind::ReturnStatement { argument } => push_opt!(Argument, argument),
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                push!(Test, test);
                push!(Consequent, consequent);
                push_opt!(Alternate, alternate);
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                push_opt!(Init, init);
                push_opt!(Test, test);
                push_opt!(Update, update);
                push!(Body, body);
            }
            NodeKind::WhileStatement { test, body } => {
                push!(Test, test);
                push!(Body, body);
            }
            NodeKind::ThrowStatement { argument } => push!(Argument, argument),
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                push!(Block, block);
                push_opt!(Handler, handler);
                push_opt!(Finalizer, finalizer);
            }
            NodeKind::CatchClause { param, body } => {
                push_opt!(Param, param);
                push!(Body, body);
            }
            NodeKind::ImportDeclaration { specifiers, .. } => push_list!(Specifiers, specifiers),
            NodeKind::ImportSpecifier { local, .. }
            | NodeKind::ImportDefaultSpecifier { local }
            | NodeKind::ImportNamespaceSpecifier { local } => push!(Local, local),
            NodeKind::ExportNamedDeclaration {
                declaration,
                specifiers,
                ..
            } => {
                push_opt!(Declaration, declaration);
                push_list!(Specifiers, specifiers);
            }
            NodeKind::ExportDefaultDeclaration { declaration } => push!(Declaration, declaration),
            NodeKind::EnumDeclaration { id, members, .. } => {
                push!(Id, id);
                push_list!(Members, members);
            }
            NodeKind::EnumMember { initializer, .. } => push_opt!(Initializer, initializer),
            NodeKind::TypeAliasDeclaration { id, .. } => push!(Id, id),
            NodeKind::AssignmentPattern { left, right }
            | NodeKind::BinaryExpression { left, right, .. }
            | NodeKind::LogicalExpression { left, right, .. }
            | NodeKind::AssignmentExpression { left, right, .. } => {
                push!(Left, left);
                push!(Right, right);
            }
            NodeKind::RestElement { argument }
            | NodeKind::SpreadElement { argument }
            | NodeKind::UnaryExpression { argument, .. }
            | NodeKind::UpdateExpression { argument, .. }
            | NodeKind::JsxSpreadAttribute { argument } => push!(Argument, argument),
            NodeKind::ObjectPattern { properties } | NodeKind::ObjectExpression { properties } => {
                push_list!(Properties, properties)
            }
            NodeKind::BindingProperty { key, value, .. }
            | NodeKind::ObjectProperty { key, value, .. } => {
                push!(Key, key);
                push!(Value, value);
            }
            NodeKind::ArrayPattern { elements } | NodeKind::ArrayExpression { elements } => {
                push_list!(Elements, elements)
            }
            NodeKind::TemplateLiteral { expressions, .. }
            | NodeKind::SequenceExpression { expressions } => push_list!(Expressions, expressions),
            NodeKind::TaggedTemplateExpression { tag, quasi } => {
                push!(Tag, tag);
                push!(Quasi, quasi);
            }
            NodeKind::ObjectMethod {
                key, params, body, ..
            }
            | NodeKind::ClassMethod {
                key, params, body, ..
            } => {
                push!(Key, key);
                push_list!(Params, params);
                push!(Body, body);
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                push!(Test, test);
                push!(Consequent, consequent);
                push!(Alternate, alternate);
            }
            NodeKind::ChainExpression { expression } => push!(Expression, expression),
            NodeKind::CallExpression {
                callee, arguments, ..
            }
            | NodeKind::NewExpression { callee, arguments } => {
                push!(Callee, callee);
                push_list!(Arguments, arguments);
            }
            NodeKind::MemberExpression {
                object, property, ..
            } => {
                push!(Object, object);
                if let MemberProperty::Computed(prop) = property {
                    push!(Property, prop);
                }
            }
            NodeKind::ArrowFunctionExpression { params, body, .. } => {
                push_list!(Params, params);
                push!(Body, body);
            }
            NodeKind::ClassProperty { key, value, .. } => {
                push!(Key, key);
                push_opt!(Value, value);
            }
            NodeKind::JsxElement {
                attributes,
                children,
                ..
            } => {
                push_list!(Attributes, attributes);
                push_list!(Children, children);
            }
            NodeKind::JsxFragment { children } => push_list!(Children, children),
            NodeKind::JsxAttribute { value, .. } => push_opt!(Value, value),
            NodeKind::JsxExpressionContainer { expression } => push_opt!(Expression, expression),
            NodeKind::EmptyStatement
            | NodeKind::ExportSpecifier { .. }
            | NodeKind::ExportAllDeclaration { .. }
            | NodeKind::BindingIdentifier { .. }
            | NodeKind::Elision
            | NodeKind::Identifier { .. }
            | NodeKind::This
            | NodeKind::Super
            | NodeKind::NullLiteral
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::NumericLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::MetaProperty { .. }
            | NodeKind::JsxText { .. } => {}
        }
        out
    }

    /// Rebuild this node from children rewritten by `m`.
    ///
    /// The rebuilt node keeps the id, span and comments of `self`.
    pub fn map_children<M: ChildMapper>(self, m: &mut M) -> Result<Node, M::Error> {
        let Node {
            id,
            span,
            leading_comments,
            kind,
        } = self;

        let kind = match kind {
            NodeKind::Program {
                body,
                source_type,
                directives,
                comments,
            } => NodeKind::Program {
                body: m.list(Field::Body, body)?,
                source_type,
                directives,
                comments,
            },
            NodeKind::BlockStatement { body } => NodeKind::BlockStatement {
                body: m.list(Field::Body, body)?,
            },
            NodeKind::ExpressionStatement { expression } => NodeKind::ExpressionStatement {
                expression: one(m, Field::Expression, expression)?,
            },
            NodeKind::VariableDeclaration { kind, declarations } => {
                NodeKind::VariableDeclaration {
                    kind,
                    declarations: m.list(Field::Declarations, declarations)?,
                }
            }
            NodeKind::VariableDeclarator { id, init } => NodeKind::VariableDeclarator {
                id: one(m, Field::Id, id)?,
                init: opt(m, Field::Init, init)?,
            },
            NodeKind::FunctionDeclaration(func) => {
                NodeKind::FunctionDeclaration(map_function(m, func)?)
            }
            NodeKind::FunctionExpression(func) => {
                NodeKind::FunctionExpression(map_function(m, func)?)
            }
            NodeKind::ClassDeclaration(class) => NodeKind::ClassDeclaration(map_class(m, class)?),
            NodeKind::ClassExpression(class) => NodeKind::ClassExpression(map_class(m, class)?),
            NodeKind::ReturnStatement { argument } => NodeKind::ReturnStatement {
                argument: opt(m, Field::Argument, argument)?,
            },
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => NodeKind::IfStatement {
                test: one(m, Field::Test, test)?,
                consequent: one(m, Field::Consequent, consequent)?,
                alternate: opt(m, Field::Alternate, alternate)?,
            },
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => NodeKind::ForStatement {
                init: opt(m, Field::Init, init)?,
                test: opt(m, Field::Test, test)?,
                update: opt(m, Field::Update, update)?,
                body: one(m, Field::Body, body)?,
            },
            NodeKind::WhileStatement { test, body } => NodeKind::WhileStatement {
                test: one(m, Field::Test, test)?,
                body: one(m, Field::Body, body)?,
            },
            NodeKind::ThrowStatement { argument } => NodeKind::ThrowStatement {
                argument: one(m, Field::Argument, argument)?,
            },
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => NodeKind::TryStatement {
                block: one(m, Field::Block, block)?,
                handler: opt(m, Field::Handler, handler)?,
                finalizer: opt(m, Field::Finalizer, finalizer)?,
            },
            NodeKind::CatchClause { param, body } => NodeKind::CatchClause {
                param: opt(m, Field::Param, param)?,
                body: one(m, Field::Body, body)?,
            },
            NodeKind::ImportDeclaration { specifiers, source } => NodeKind::ImportDeclaration {
                specifiers: m.list(Field::Specifiers, specifiers)?,
                source,
            },
            NodeKind::ImportSpecifier { imported, local } => NodeKind::ImportSpecifier {
                imported,
                local: one(m, Field::Local, local)?,
            },
            NodeKind::ImportDefaultSpecifier { local } => NodeKind::ImportDefaultSpecifier {
                local: one(m, Field::Local, local)?,
            },
            NodeKind::ImportNamespaceSpecifier { local } => NodeKind::ImportNamespaceSpecifier {
                local: one(m, Field::Local, local)?,
            },
            NodeKind::ExportNamedDeclaration {
                declaration,
                specifiers,
                source,
            } => NodeKind::ExportNamedDeclaration {
                declaration: opt(m, Field::Declaration, declaration)?,
                specifiers: m.list(Field::Specifiers, specifiers)?,
                source,
            },
            NodeKind::ExportDefaultDeclaration { declaration } => {
                NodeKind::ExportDefaultDeclaration {
                    declaration: one(m, Field::Declaration, declaration)?,
                }
            }
            NodeKind::EnumDeclaration {
                id,
                members,
                is_const,
                declare,
            } => NodeKind::EnumDeclaration {
                id: one(m, Field::Id, id)?,
                members: m.list(Field::Members, members)?,
                is_const,
                declare,
            },
            NodeKind::EnumMember { name, initializer } => NodeKind::EnumMember {
                name,
                initializer: opt(m, Field::Initializer, initializer)?,
            },
            NodeKind::TypeAliasDeclaration { id, annotation } => NodeKind::TypeAliasDeclaration {
                id: one(m, Field::Id, id)?,
                annotation,
            },
            NodeKind::AssignmentPattern { left, right } => NodeKind::AssignmentPattern {
                left: one(m, Field::Left, left)?,
                right: one(m, Field::Right, right)?,
            },
            NodeKind::RestElement { argument } => NodeKind::RestElement {
                argument: one(m, Field::Argument, argument)?,
            },
            NodeKind::ObjectPattern { properties } => NodeKind::ObjectPattern {
                properties: m.list(Field::Properties, properties)?,
            },
            NodeKind::BindingProperty {
                key,
                computed,
                value,
            } => NodeKind::BindingProperty {
                key: one(m, Field::Key, key)?,
                computed,
                value: one(m, Field::Value, value)?,
            },
            NodeKind::ArrayPattern { elements } => NodeKind::ArrayPattern {
                elements: m.list(Field::Elements, elements)?,
            },
            NodeKind::TemplateLiteral {
                quasis,
                expressions,
            } => NodeKind::TemplateLiteral {
                quasis,
                expressions: m.list(Field::Expressions, expressions)?,
            },
            NodeKind::TaggedTemplateExpression { tag, quasi } => {
                NodeKind::TaggedTemplateExpression {
                    tag: one(m, Field::Tag, tag)?,
                    quasi: one(m, Field::Quasi, quasi)?,
                }
            }
            NodeKind::ArrayExpression { elements } => NodeKind::ArrayExpression {
                elements: m.list(Field::Elements, elements)?,
            },
            NodeKind::ObjectExpression { properties } => NodeKind::ObjectExpression {
                properties: m.list(Field::Properties, properties)?,
            },
            NodeKind::ObjectProperty {
                key,
                computed,
                value,
                shorthand,
            } => NodeKind::ObjectProperty {
                key: one(m, Field::Key, key)?,
                computed,
                value: one(m, Field::Value, value)?,
                shorthand,
            },
            NodeKind::ObjectMethod {
                kind,
                key,
                computed,
                params,
                body,
            } => NodeKind::ObjectMethod {
                kind,
                key: one(m, Field::Key, key)?,
                computed,
                params: m.list(Field::Params, params)?,
                body: one(m, Field::Body, body)?,
            },
            NodeKind::SpreadElement { argument } => NodeKind::SpreadElement {
                argument: one(m, Field::Argument, argument)?,
            },
            NodeKind::UnaryExpression { operator, argument } => NodeKind::UnaryExpression {
                operator,
                argument: one(m, Field::Argument, argument)?,
            },
            NodeKind::UpdateExpression {
                operator,
                prefix,
                argument,
            } => NodeKind::UpdateExpression {
                operator,
                prefix,
                argument: one(m, Field::Argument, argument)?,
            },
            NodeKind::BinaryExpression {
                operator,
                left,
                right,
            } => NodeKind::BinaryExpression {
                operator,
                left: one(m, Field::Left, left)?,
                right: one(m, Field::Right, right)?,
            },
            NodeKind::LogicalExpression {
                operator,
                left,
                right,
            } => NodeKind::LogicalExpression {
                operator,
                left: one(m, Field::Left, left)?,
                right: one(m, Field::Right, right)?,
            },
            NodeKind::AssignmentExpression {
                operator,
                left,
                right,
            } => NodeKind::AssignmentExpression {
                operator,
                left: one(m, Field::Left, left)?,
                right: one(m, Field::Right, right)?,
            },
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => NodeKind::ConditionalExpression {
                test: one(m, Field::Test, test)?,
                consequent: one(m, Field::Consequent, consequent)?,
                alternate: one(m, Field::Alternate, alternate)?,
            },
            NodeKind::SequenceExpression { expressions } => NodeKind::SequenceExpression {
                expressions: m.list(Field::Expressions, expressions)?,
            },
            NodeKind::ChainExpression { expression } => NodeKind::ChainExpression {
                expression: one(m, Field::Expression, expression)?,
            },
            NodeKind::CallExpression {
                callee,
                arguments,
                optional,
            } => NodeKind::CallExpression {
                callee: one(m, Field::Callee, callee)?,
                arguments: m.list(Field::Arguments, arguments)?,
                optional,
            },
            NodeKind::NewExpression { callee, arguments } => NodeKind::NewExpression {
                callee: one(m, Field::Callee, callee)?,
                arguments: m.list(Field::Arguments, arguments)?,
            },
            NodeKind::MemberExpression {
                object,
                property,
                optional,
            } => NodeKind::MemberExpression {
                object: one(m, Field::Object, object)?,
                property: match property {
                    MemberProperty::Computed(prop) => {
                        MemberProperty::Computed(one(m, Field::Property, prop)?)
                    }
                    stat @ MemberProperty::Static(_) => stat,
                },
                optional,
            },
            NodeKind::ArrowFunctionExpression {
                params,
                body,
                is_async,
            } => NodeKind::ArrowFunctionExpression {
                params: m.list(Field::Params, params)?,
                body: one(m, Field::Body, body)?,
                is_async,
            },
            NodeKind::ClassProperty {
                key,
                computed,
                value,
                is_static,
            } => NodeKind::ClassProperty {
                key: one(m, Field::Key, key)?,
                computed,
                value: opt(m, Field::Value, value)?,
                is_static,
            },
            NodeKind::ClassMethod {
                kind,
                key,
                computed,
                is_static,
                params,
                body,
            } => NodeKind::ClassMethod {
                kind,
                key: one(m, Field::Key, key)?,
                computed,
                is_static,
                params: m.list(Field::Params, params)?,
                body: one(m, Field::Body, body)?,
            },
            NodeKind::JsxElement {
                name,
                attributes,
                children,
            } => NodeKind::JsxElement {
                name,
                attributes: m.list(Field::Attributes, attributes)?,
                children: m.list(Field::Children, children)?,
            },
            NodeKind::JsxFragment { children } => NodeKind::JsxFragment {
                children: m.list(Field::Children, children)?,
            },
            NodeKind::JsxAttribute { name, value } => NodeKind::JsxAttribute {
                name,
                value: opt(m, Field::Value, value)?,
            },
            NodeKind::JsxSpreadAttribute { argument } => NodeKind::JsxSpreadAttribute {
                argument: one(m, Field::Argument, argument)?,
            },
            NodeKind::JsxExpressionContainer { expression } => {
                NodeKind::JsxExpressionContainer {
                    expression: opt(m, Field::Expression, expression)?,
                }
            }
            leaf @ (NodeKind::EmptyStatement
            | NodeKind::ExportSpecifier { .. }
            | NodeKind::ExportAllDeclaration { .. }
            | NodeKind::BindingIdentifier { .. }
            | NodeKind::Elision
            | NodeKind::Identifier { .. }
            | NodeKind::This
            | NodeKind::Super
            | NodeKind::NullLiteral
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::NumericLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::MetaProperty { .. }
            | NodeKind::JsxText { .. }) => leaf,
        };

        Ok(Node {
            id,
            span,
            leading_comments,
            kind,
        })
    }

    /// Deep copy with fresh ids throughout.
    ///
    /// A subtree that is placed into the tree a second time must be
    /// duplicated: the engine relies on ids being unique within one tree.
    pub fn duplicate(&self) -> Node {
        let mut copy = self.clone();
        copy.id = NodeId::fresh();
        match copy.map_children(&mut Renumber) {
            Ok(node) => node,
            Err(never) => match never {},
        }
    }

    /// Pre-order walk over `self` and all its descendants.
    pub fn for_each_descendant<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for (_, child) in self.children() {
            child.for_each_descendant(f);
        }
    }

    /// Whether any node in this subtree satisfies `pred`.
    pub fn any_descendant(&self, pred: &mut impl FnMut(&Node) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        self.children()
            .into_iter()
            .any(|(_, child)| child.any_descendant(pred))
    }
}

struct Renumber;

impl ChildMapper for Renumber {
    type Error = Infallible;

    fn one(&mut self, _field: Field, mut child: Node) -> Result<Node, Infallible> {
        child.id = NodeId::fresh();
        child.map_children(self)
    }

    fn opt(&mut self, field: Field, child: Option<Node>) -> Result<Option<Node>, Infallible> {
        child.map(|c| self.one(field, c)).transpose()
    }

    fn list(&mut self, field: Field, children: Vec<Node>) -> Result<Vec<Node>, Infallible> {
        children.into_iter().map(|c| self.one(field, c)).collect()
    }
}

#[cfg(test)]
#[path = "../tests/children.rs"]
mod tests;

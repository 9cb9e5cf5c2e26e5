//! Fieldless discriminants for nodes and child slots.

use crate::node::{Node, NodeKind};

/// The kind of a node without its payload.
///
/// Visitors declare interest in node types; the traversal engine builds its
/// dispatch table from these declarations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Program,
    BlockStatement,
    EmptyStatement,
    ExpressionStatement,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    ClassDeclaration,
    ReturnStatement,
    IfStatement,
    ForStatement,
    WhileStatement,
    ThrowStatement,
    TryStatement,
    CatchClause,
    ImportDeclaration,
    ImportSpecifier,
    ImportDefaultSpecifier,
    ImportNamespaceSpecifier,
    ExportNamedDeclaration,
    ExportSpecifier,
    ExportDefaultDeclaration,
    ExportAllDeclaration,
    EnumDeclaration,
    EnumMember,
    TypeAliasDeclaration,
    BindingIdentifier,
    AssignmentPattern,
    RestElement,
    ObjectPattern,
    BindingProperty,
    ArrayPattern,
    Elision,
    Identifier,
    This,
    Super,
    NullLiteral,
    BooleanLiteral,
    NumericLiteral,
    StringLiteral,
    TemplateLiteral,
    TaggedTemplateExpression,
    ArrayExpression,
    ObjectExpression,
    ObjectProperty,
    ObjectMethod,
    SpreadElement,
    UnaryExpression,
    UpdateExpression,
    BinaryExpression,
    LogicalExpression,
    AssignmentExpression,
    ConditionalExpression,
    SequenceExpression,
    ChainExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    FunctionExpression,
    ArrowFunctionExpression,
    ClassExpression,
    MetaProperty,
    ClassProperty,
    ClassMethod,
    JsxElement,
    JsxFragment,
    JsxAttribute,
    JsxSpreadAttribute,
    JsxText,
    JsxExpressionContainer,
}

impl NodeType {
    /// Nodes at which per-visitor accumulated state is reset and flushed.
    pub fn is_boundary(self) -> bool {
        matches!(self, NodeType::Program | NodeType::BlockStatement)
    }

    /// Nodes that own a parameter list and a body.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            NodeType::FunctionDeclaration
                | NodeType::FunctionExpression
                | NodeType::ArrowFunctionExpression
                | NodeType::ClassMethod
                | NodeType::ObjectMethod
        )
    }

    pub fn is_class(self) -> bool {
        matches!(self, NodeType::ClassDeclaration | NodeType::ClassExpression)
    }
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Program { .. } => NodeType::Program,
            NodeKind::BlockStatement { .. } => NodeType::BlockStatement,
            NodeKind::EmptyStatement => NodeType::EmptyStatement,
            NodeKind::ExpressionStatement { .. } => NodeType::ExpressionStatement,
            NodeKind::VariableDeclaration { .. } => NodeType::VariableDeclaration,
            NodeKind::VariableDeclarator { .. } => NodeType::VariableDeclarator,
            NodeKind::FunctionDeclaration(_) => NodeType::FunctionDeclaration,
            NodeKind::ClassDeclaration(_) => NodeType::ClassDeclaration,
            NodeKind::ReturnStatement { .. } => NodeType::ReturnStatement,
            NodeKind::IfStatement { .. } => NodeType::IfStatement,
            NodeKind::ForStatement { .. } => NodeType::ForStatement,
            NodeKind::WhileStatement { .. } => NodeType::WhileStatement,
            NodeKind::ThrowStatement { .. } => NodeType::ThrowStatement,
            NodeKind::TryStatement { .. } => NodeType::TryStatement,
            NodeKind::CatchClause { .. } => NodeType::CatchClause,
            NodeKind::ImportDeclaration { .. } => NodeType::ImportDeclaration,
            NodeKind::ImportSpecifier { .. } => NodeType::ImportSpecifier,
            NodeKind::ImportDefaultSpecifier { .. } => NodeType::ImportDefaultSpecifier,
            NodeKind::ImportNamespaceSpecifier { .. } => NodeType::ImportNamespaceSpecifier,
            NodeKind::ExportNamedDeclaration { .. } => NodeType::ExportNamedDeclaration,
            NodeKind::ExportSpecifier { .. } => NodeType::ExportSpecifier,
            NodeKind::ExportDefaultDeclaration { .. } => NodeType::ExportDefaultDeclaration,
            NodeKind::ExportAllDeclaration { .. } => NodeType::ExportAllDeclaration,
            NodeKind::EnumDeclaration { .. } => NodeType::EnumDeclaration,
            NodeKind::EnumMember { .. } => NodeType::EnumMember,
            NodeKind::TypeAliasDeclaration { .. } => NodeType::TypeAliasDeclaration,
            NodeKind::BindingIdentifier { .. } => NodeType::BindingIdentifier,
            NodeKind::AssignmentPattern { .. } => NodeType::AssignmentPattern,
            NodeKind::RestElement { .. } => NodeType::RestElement,
            NodeKind::ObjectPattern { .. } => NodeType::ObjectPattern,
            NodeKind::BindingProperty { .. } => NodeType::BindingProperty,
            NodeKind::ArrayPattern { .. } => NodeType::ArrayPattern,
            NodeKind::Elision => NodeType::Elision,
            NodeKind::Identifier { .. } => NodeType::Identifier,
            NodeKind::This => NodeType::This,
            NodeKind::Super => NodeType::Super,
            NodeKind::NullLiteral => NodeType::NullLiteral,
            NodeKind::BooleanLiteral { .. } => NodeType::BooleanLiteral,
            NodeKind::NumericLiteral { .. } => NodeType::NumericLiteral,
            NodeKind::StringLiteral { .. } => NodeType::StringLiteral,
            NodeKind::TemplateLiteral { .. } => NodeType::TemplateLiteral,
            NodeKind::TaggedTemplateExpression { .. } => NodeType::TaggedTemplateExpression,
            NodeKind::ArrayExpression { .. } => NodeType::ArrayExpression,
            NodeKind::ObjectExpression { .. } => NodeType::ObjectExpression,
            NodeKind::ObjectProperty { .. } => NodeType::ObjectProperty,
            NodeKind::ObjectMethod { .. } => NodeType::ObjectMethod,
            NodeKind::SpreadElement { .. } => NodeType::SpreadElement,
            NodeKind::UnaryExpression { .. } => NodeType::UnaryExpression,
            NodeKind::UpdateExpression { .. } => NodeType::UpdateExpression,
            NodeKind::BinaryExpression { .. } => NodeType::BinaryExpression,
            NodeKind::LogicalExpression { .. } => NodeType::LogicalExpression,
            NodeKind::AssignmentExpression { .. } => NodeType::AssignmentExpression,
            NodeKind::ConditionalExpression { .. } => NodeType::ConditionalExpression,
            NodeKind::SequenceExpression { .. } => NodeType::SequenceExpression,
            NodeKind::ChainExpression { .. } => NodeType::ChainExpression,
            NodeKind::CallExpression { .. } => NodeType::CallExpression,
            NodeKind::NewExpression { .. } => NodeType::NewExpression,
            NodeKind::MemberExpression { .. } => NodeType::MemberExpression,
            NodeKind::FunctionExpression(_) => NodeType::FunctionExpression,
            NodeKind::ArrowFunctionExpression { .. } => NodeType::ArrowFunctionExpression,
            NodeKind::ClassExpression(_) => NodeType::ClassExpression,
            NodeKind::MetaProperty { .. } => NodeType::MetaProperty,
            NodeKind::ClassProperty { .. } => NodeType::ClassProperty,
            NodeKind::ClassMethod { .. } => NodeType::ClassMethod,
            NodeKind::JsxElement { .. } => NodeType::JsxElement,
            NodeKind::JsxFragment { .. } => NodeType::JsxFragment,
            NodeKind::JsxAttribute { .. } => NodeType::JsxAttribute,
            NodeKind::JsxSpreadAttribute { .. } => NodeType::JsxSpreadAttribute,
            NodeKind::JsxText { .. } => NodeType::JsxText,
            NodeKind::JsxExpressionContainer { .. } => NodeType::JsxExpressionContainer,
        }
    }
}

/// Name of the slot a child occupies in its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Alternate,
    Argument,
    Arguments,
    Attributes,
    Block,
    Body,
    Callee,
    Children,
    Consequent,
    Declaration,
    Declarations,
    Elements,
    Expression,
    Expressions,
    Finalizer,
    Handler,
    Id,
    Init,
    Initializer,
    Key,
    Left,
    Local,
    Members,
    Object,
    Param,
    Params,
    Properties,
    Property,
    Quasi,
    Right,
    Specifiers,
    SuperClass,
    Tag,
    Test,
    Update,
    Value,
}

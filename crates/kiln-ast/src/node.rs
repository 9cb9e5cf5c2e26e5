//! Tree nodes.

use std::sync::atomic::{AtomicU32, Ordering};

use kiln_common::{Comment, CommentId, Span};

use crate::ops::{AssignmentOperator, BinaryOperator, LogicalOperator, UnaryOperator, UpdateOperator};

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a node.
///
/// Every constructed node receives a fresh id. A node rebuilt from rewritten
/// children keeps the id of the node it was rebuilt from, which is how the
/// traversal engine recognizes a node it has already entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(0);

    /// Allocate an id that has never been handed out in this process.
    pub fn fresh() -> NodeId {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// A tree node: identity, source location and the syntax it represents.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub span: Option<Span>,
    pub leading_comments: Vec<CommentId>,
    pub kind: NodeKind,
}

/// Structural equality. Ids and spans are ignored so that two trees which
/// print identically compare equal.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.leading_comments == other.leading_comments
    }
}

impl Node {
    /// Create a synthesized node with a fresh id and no span.
    pub fn new(kind: NodeKind) -> Node {
        Node {
            id: NodeId::fresh(),
            span: None,
            leading_comments: Vec::new(),
            kind,
        }
    }

    pub fn with_span(mut self, span: Option<Span>) -> Node {
        self.span = span;
        self
    }

    /// Replace the syntax of this node while keeping its identity, span and
    /// comments. Used when a node is rebuilt from rewritten children.
    pub fn rebuild(&self, kind: NodeKind) -> Node {
        Node {
            id: self.id,
            span: self.span,
            leading_comments: self.leading_comments.clone(),
            kind,
        }
    }

    /// A new node standing in for `self`: same span, fresh id.
    pub fn derive(&self, kind: NodeKind) -> Node {
        Node::new(kind).with_span(self.span)
    }

    /// Name of an `Identifier` or `BindingIdentifier`.
    pub fn ident_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { name } | NodeKind::BindingIdentifier { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_identifier(&self, expected: &str) -> bool {
        matches!(&self.kind, NodeKind::Identifier { name } if name == expected)
    }

    /// Expressions that can be evaluated twice without observable effects.
    pub fn is_pure_reference(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Identifier { .. }
                | NodeKind::This
                | NodeKind::NullLiteral
                | NodeKind::BooleanLiteral { .. }
                | NodeKind::NumericLiteral { .. }
                | NodeKind::StringLiteral { .. }
        )
    }

    /// Whether this node has a `Key` child that names a property instead of
    /// referencing a binding. Shorthand `{ x }` stores `x` as both key and
    /// value; only the value is a reference.
    pub fn has_static_key(&self) -> bool {
        match &self.kind {
            NodeKind::ObjectProperty { computed, .. }
            | NodeKind::ObjectMethod { computed, .. }
            | NodeKind::ClassProperty { computed, .. }
            | NodeKind::ClassMethod { computed, .. }
            | NodeKind::BindingProperty { computed, .. } => !computed,
            _ => false,
        }
    }

    /// Statement-level and function-level nodes that contain statements.
    pub fn statements(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Program { body, .. } | NodeKind::BlockStatement { body } => Some(body),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceType {
    Module,
    Script,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

/// Shared shape of function declarations and function expressions.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub id: Option<Box<Node>>,
    pub params: Vec<Node>,
    /// Always a `BlockStatement`.
    pub body: Box<Node>,
    pub is_async: bool,
    pub is_generator: bool,
}

/// Shared shape of class declarations and class expressions.
#[derive(Clone, Debug, PartialEq)]
pub struct Class {
    pub id: Option<Box<Node>>,
    pub super_class: Option<Box<Node>>,
    /// `ClassProperty` and `ClassMethod` nodes.
    pub body: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MemberProperty {
    /// `a.b`
    Static(String),
    /// `a[b]`
    Computed(Box<Node>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    // =========================================================================
    // Root and statements
    // =========================================================================
    Program {
        body: Vec<Node>,
        source_type: SourceType,
        /// Prologue directives such as `"use strict"`.
        directives: Vec<String>,
        comments: Vec<Comment>,
    },
    BlockStatement {
        body: Vec<Node>,
    },
    EmptyStatement,
    ExpressionStatement {
        expression: Box<Node>,
    },
    VariableDeclaration {
        kind: VariableKind,
        declarations: Vec<Node>,
    },
    VariableDeclarator {
        id: Box<Node>,
        init: Option<Box<Node>>,
    },
    FunctionDeclaration(Function),
    ClassDeclaration(Class),
    ReturnStatement {
        argument: Option<Box<Node>>,
    },
    IfStatement {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Option<Box<Node>>,
    },
    ForStatement {
        init: Option<Box<Node>>,
        test: Option<Box<Node>>,
        update: Option<Box<Node>>,
        body: Box<Node>,
    },
    WhileStatement {
        test: Box<Node>,
        body: Box<Node>,
    },
    ThrowStatement {
        argument: Box<Node>,
    },
    TryStatement {
        block: Box<Node>,
        handler: Option<Box<Node>>,
        finalizer: Option<Box<Node>>,
    },
    CatchClause {
        param: Option<Box<Node>>,
        body: Box<Node>,
    },

    // =========================================================================
    // Modules
    // =========================================================================
    ImportDeclaration {
        specifiers: Vec<Node>,
        source: String,
    },
    /// `import { imported as local }`
    ImportSpecifier {
        imported: String,
        local: Box<Node>,
    },
    /// `import local from`
    ImportDefaultSpecifier {
        local: Box<Node>,
    },
    /// `import * as local from`
    ImportNamespaceSpecifier {
        local: Box<Node>,
    },
    ExportNamedDeclaration {
        declaration: Option<Box<Node>>,
        specifiers: Vec<Node>,
        source: Option<String>,
    },
    /// `export { local as exported }`
    ExportSpecifier {
        local: String,
        exported: String,
    },
    ExportDefaultDeclaration {
        declaration: Box<Node>,
    },
    /// `export * from source` / `export * as exported from source`
    ExportAllDeclaration {
        exported: Option<String>,
        source: String,
    },

    // =========================================================================
    // TypeScript
    // =========================================================================
    EnumDeclaration {
        id: Box<Node>,
        members: Vec<Node>,
        is_const: bool,
        declare: bool,
    },
    EnumMember {
        name: String,
        initializer: Option<Box<Node>>,
    },
    /// The annotation is kept as source text; the engine never inspects types.
    TypeAliasDeclaration {
        id: Box<Node>,
        annotation: String,
    },

    // =========================================================================
    // Patterns
    // =========================================================================
    BindingIdentifier {
        name: String,
    },
    AssignmentPattern {
        left: Box<Node>,
        right: Box<Node>,
    },
    RestElement {
        argument: Box<Node>,
    },
    ObjectPattern {
        properties: Vec<Node>,
    },
    /// `{ key: value }` inside an object pattern.
    BindingProperty {
        key: Box<Node>,
        computed: bool,
        value: Box<Node>,
    },
    ArrayPattern {
        elements: Vec<Node>,
    },
    /// Hole in an array literal or array pattern.
    Elision,

    // =========================================================================
    // Expressions
    // =========================================================================
    Identifier {
        name: String,
    },
    This,
    Super,
    NullLiteral,
    BooleanLiteral {
        value: bool,
    },
    NumericLiteral {
        value: f64,
    },
    StringLiteral {
        value: String,
    },
    /// `quasis.len() == expressions.len() + 1`
    TemplateLiteral {
        quasis: Vec<String>,
        expressions: Vec<Node>,
    },
    TaggedTemplateExpression {
        tag: Box<Node>,
        quasi: Box<Node>,
    },
    ArrayExpression {
        elements: Vec<Node>,
    },
    ObjectExpression {
        properties: Vec<Node>,
    },
    ObjectProperty {
        key: Box<Node>,
        computed: bool,
        value: Box<Node>,
        shorthand: bool,
    },
    ObjectMethod {
        kind: MethodKind,
        key: Box<Node>,
        computed: bool,
        params: Vec<Node>,
        body: Box<Node>,
    },
    SpreadElement {
        argument: Box<Node>,
    },
    UnaryExpression {
        operator: UnaryOperator,
        argument: Box<Node>,
    },
    UpdateExpression {
        operator: UpdateOperator,
        prefix: bool,
        argument: Box<Node>,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    LogicalExpression {
        operator: LogicalOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    AssignmentExpression {
        operator: AssignmentOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    ConditionalExpression {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
    SequenceExpression {
        expressions: Vec<Node>,
    },
    /// Outermost node of an optional chain (`a?.b.c`). The links inside it
    /// carry `optional: true` where the chain may short-circuit.
    ChainExpression {
        expression: Box<Node>,
    },
    CallExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
        optional: bool,
    },
    NewExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    MemberExpression {
        object: Box<Node>,
        property: MemberProperty,
        optional: bool,
    },
    FunctionExpression(Function),
    ArrowFunctionExpression {
        params: Vec<Node>,
        /// A `BlockStatement` or an expression.
        body: Box<Node>,
        is_async: bool,
    },
    ClassExpression(Class),
    /// `import.meta`, `new.target`
    MetaProperty {
        meta: String,
        property: String,
    },

    // =========================================================================
    // Class members
    // =========================================================================
    ClassProperty {
        key: Box<Node>,
        computed: bool,
        value: Option<Box<Node>>,
        is_static: bool,
    },
    ClassMethod {
        kind: MethodKind,
        key: Box<Node>,
        computed: bool,
        is_static: bool,
        params: Vec<Node>,
        body: Box<Node>,
    },

    // =========================================================================
    // JSX
    // =========================================================================
    /// `name` is the tag as written: `div`, `Foo`, `Foo.Bar`, `data-x`.
    JsxElement {
        name: String,
        attributes: Vec<Node>,
        children: Vec<Node>,
    },
    JsxFragment {
        children: Vec<Node>,
    },
    /// `value` is a string literal, an expression container or an element.
    JsxAttribute {
        name: String,
        value: Option<Box<Node>>,
    },
    JsxSpreadAttribute {
        argument: Box<Node>,
    },
    JsxText {
        value: String,
    },
    /// `{}` has no expression.
    JsxExpressionContainer {
        expression: Option<Box<Node>>,
    },
}

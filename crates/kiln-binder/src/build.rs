//! Scope construction.
//!
//! One pre-order walk over the tree. Declarations are registered when their
//! declaring node is reached, so hoisting is purely a matter of choosing the
//! target scope: `var` and function declarations go to the nearest function
//! or module scope, everything else to the scope in effect.

use kiln_ast::{Field, Node, NodeKind, NodeType, VariableKind};
use kiln_common::diagnostics::{DiagnosticDescription, get_message};
use kiln_common::{DiagnosticSink, diagnostic_codes};
use smallvec::SmallVec;
use tracing::debug;

use crate::scope::{BindingKind, Declared, ImportMeta, ImportedName, ScopeId, ScopeKind, ScopeTree};

/// Kind of scope `node` introduces, given the slot it occupies in its parent.
///
/// A block that is the body of a function or catch clause shares the scope of
/// its owner instead of introducing its own.
pub fn scope_kind_of(node: &Node, parent: Option<(NodeType, Field)>) -> Option<ScopeKind> {
    match node.node_type() {
        NodeType::Program => Some(ScopeKind::Module),
        NodeType::FunctionDeclaration
        | NodeType::FunctionExpression
        | NodeType::ArrowFunctionExpression
        | NodeType::ClassMethod
        | NodeType::ObjectMethod => Some(ScopeKind::Function),
        NodeType::ClassDeclaration | NodeType::ClassExpression => Some(ScopeKind::Class),
        NodeType::ForStatement | NodeType::CatchClause => Some(ScopeKind::Block),
        NodeType::BlockStatement => match parent {
            Some((owner, Field::Body))
                if owner.is_function_like() || owner == NodeType::CatchClause =>
            {
                None
            }
            _ => Some(ScopeKind::Block),
        },
        _ => None,
    }
}

/// Whether the child in `field` of a `parent` node is evaluated in the scope
/// surrounding the parent rather than in the scope the parent introduces.
pub fn uses_outer_scope(parent: NodeType, field: Field) -> bool {
    matches!(
        (parent, field),
        (NodeType::FunctionDeclaration | NodeType::ClassDeclaration, Field::Id)
            | (
                NodeType::ClassDeclaration | NodeType::ClassExpression,
                Field::SuperClass
            )
    )
}

/// Names declared by a binding pattern, in source order.
pub(crate) fn pattern_names(pattern: &Node) -> SmallVec<[(&str, &Node); 2]> {
    let mut out = SmallVec::new();
    collect_pattern_names(pattern, &mut out);
    out
}

fn collect_pattern_names<'a>(pattern: &'a Node, out: &mut SmallVec<[(&'a str, &'a Node); 2]>) {
    match &pattern.kind {
        NodeKind::BindingIdentifier { name } => out.push((name.as_str(), pattern)),
        NodeKind::AssignmentPattern { left, .. } => collect_pattern_names(left, out),
        NodeKind::RestElement { argument } => collect_pattern_names(argument, out),
        NodeKind::BindingProperty { value, .. } => collect_pattern_names(value, out),
        NodeKind::ObjectPattern { properties } => {
            for prop in properties {
                collect_pattern_names(prop, out);
            }
        }
        NodeKind::ArrayPattern { elements } => {
            for element in elements {
                collect_pattern_names(element, out);
            }
        }
        _ => {}
    }
}

/// Build the scope tree for `root`.
///
/// Redeclarations that the language forbids are reported to `sink`; the
/// first declaration is kept.
#[tracing::instrument(level = "debug", skip_all)]
pub fn build_scope(root: &Node, sink: &mut dyn DiagnosticSink) -> ScopeTree {
    let mut builder = ScopeBuilder {
        tree: ScopeTree::new(root.id),
        sink,
    };
    let module = builder.tree.root();
    for (field, child) in root.children() {
        builder.visit(child, module, module, Some((NodeType::Program, field)));
    }
    debug!(scopes = builder.tree.len(), "built scope tree");
    builder.tree
}

struct ScopeBuilder<'s> {
    tree: ScopeTree,
    sink: &'s mut dyn DiagnosticSink,
}

impl ScopeBuilder<'_> {
    fn declare(&mut self, scope: ScopeId, name: &str, kind: BindingKind, node: &Node) {
        if self.tree.declare(scope, name, kind, node.id) == Declared::Duplicate {
            debug!(name, scope = scope.0, "duplicate declaration");
            if let Some(message) = get_message(diagnostic_codes::DUPLICATE_DECLARATION) {
                self.sink
                    .add(node.span, DiagnosticDescription::from_message(message, &[name]));
            }
        }
    }

    fn declare_pattern(&mut self, scope: ScopeId, pattern: &Node, kind: &BindingKind) {
        for (name, node) in pattern_names(pattern) {
            self.declare(scope, name, kind.clone(), node);
        }
    }

    /// `current` is the scope in effect at `node`'s position; `outer` is the
    /// scope in effect at its parent's position.
    fn visit(
        &mut self,
        node: &Node,
        current: ScopeId,
        outer: ScopeId,
        parent: Option<(NodeType, Field)>,
    ) {
        let scope = match parent {
            Some((parent_type, field)) if uses_outer_scope(parent_type, field) => outer,
            _ => current,
        };

        let inner = match scope_kind_of(node, parent) {
            Some(kind) => self.tree.create_scope(kind, Some(scope), node.id),
            None => scope,
        };

        self.bind_declarations(node, scope, inner);
        if inner != scope {
            self.bind_scope_owner(node, inner);
        }

        for (field, child) in node.children() {
            self.visit(child, inner, scope, Some((node.node_type(), field)));
        }
    }

    /// Declarations a node makes in the scope surrounding it.
    fn bind_declarations(&mut self, node: &Node, scope: ScopeId, inner: ScopeId) {
        match &node.kind {
            NodeKind::Identifier { name } => {
                self.tree.referenced_names.insert(name.clone());
            }
            NodeKind::VariableDeclaration { kind, declarations } => {
                let (target, binding_kind) = match kind {
                    VariableKind::Var => (self.tree.nearest_function_scope(scope), BindingKind::Var),
                    VariableKind::Let => (scope, BindingKind::Let),
                    VariableKind::Const => (scope, BindingKind::Const),
                };
                for declarator in declarations {
                    if let NodeKind::VariableDeclarator { id, .. } = &declarator.kind {
                        self.declare_pattern(target, id, &binding_kind);
                    }
                }
            }
            NodeKind::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    let target = self.tree.nearest_function_scope(scope);
                    self.declare_pattern(target, id, &BindingKind::Function);
                }
            }
            NodeKind::ClassDeclaration(class) => {
                if let Some(id) = &class.id {
                    self.declare_pattern(scope, id, &BindingKind::Class);
                }
            }
            NodeKind::ImportDeclaration { specifiers, source } => {
                let module = self.tree.root();
                for spec in specifiers {
                    let (imported, local) = match &spec.kind {
                        NodeKind::ImportSpecifier { imported, local } => {
                            (ImportedName::Named(imported.clone()), local)
                        }
                        NodeKind::ImportDefaultSpecifier { local } => (ImportedName::Default, local),
                        NodeKind::ImportNamespaceSpecifier { local } => {
                            (ImportedName::Namespace, local)
                        }
                        _ => continue,
                    };
                    let kind = BindingKind::Import(ImportMeta {
                        source: source.clone(),
                        imported,
                    });
                    self.declare_pattern(module, local, &kind);
                }
            }
            NodeKind::EnumDeclaration { id, .. } => {
                self.declare_pattern(scope, id, &BindingKind::Let);
            }
            NodeKind::TypeAliasDeclaration { id, .. } => {
                self.declare_pattern(scope, id, &BindingKind::Type);
            }
            NodeKind::CatchClause {
                param: Some(param), ..
            } => {
                self.declare_pattern(inner, param, &BindingKind::Let);
            }
            _ => {}
        }
    }

    /// Declarations a scope-introducing node makes in its own scope.
    fn bind_scope_owner(&mut self, node: &Node, inner: ScopeId) {
        match &node.kind {
            NodeKind::FunctionDeclaration(func) | NodeKind::FunctionExpression(func) => {
                if node.node_type() == NodeType::FunctionExpression {
                    if let Some(id) = &func.id {
                        self.declare_pattern(inner, id, &BindingKind::Function);
                    }
                }
                for param in &func.params {
                    self.declare_pattern(inner, param, &BindingKind::Parameter);
                }
            }
            NodeKind::ArrowFunctionExpression { params, .. }
            | NodeKind::ClassMethod { params, .. }
            | NodeKind::ObjectMethod { params, .. } => {
                for param in params {
                    self.declare_pattern(inner, param, &BindingKind::Parameter);
                }
            }
            NodeKind::ClassExpression(class) => {
                if let Some(id) = &class.id {
                    self.declare_pattern(inner, id, &BindingKind::Class);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "../tests/build.rs"]
mod tests;

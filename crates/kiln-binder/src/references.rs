//! Identifier reference collection.
//!
//! Used by passes that need every use of a binding before deciding whether a
//! rewrite is safe, such as namespace import specialization.

use kiln_ast::{Field, MemberProperty, Node, NodeId, NodeKind};

use crate::build::uses_outer_scope;
use crate::scope::{ScopeId, ScopeTree};

/// How a reference is used by its parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceUsage {
    /// Object of a non-computed member access: `ref.property`.
    StaticMember { property: String },
    /// Object of a computed member access: `ref[expr]`.
    ComputedMember,
    /// Target of an assignment or update: `ref = v`, `ref++`.
    AssignmentTarget,
    /// Any other use, including passing the value around.
    Value,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    /// The `Identifier` node.
    pub node: NodeId,
    /// The member expression wrapping the identifier, for member usages.
    pub parent: Option<NodeId>,
    pub name: String,
    /// Scope in effect at the reference.
    pub scope: ScopeId,
    /// Scope that declares the referenced binding; `None` for globals.
    pub declared_in: Option<ScopeId>,
    pub usage: ReferenceUsage,
}

/// Every identifier reference under `root`, in source order.
///
/// `root` must be the node `scopes` was built from (or a tree whose new
/// scope-introducing nodes were registered with it).
pub fn collect_references(root: &Node, scopes: &ScopeTree) -> Vec<Reference> {
    let mut out = Vec::new();
    let start = scopes.scope_for_node(root.id).unwrap_or(scopes.root());
    walk(root, None, start, start, scopes, &mut out);
    out
}

fn usage_of(parent: Option<(&Node, Field)>) -> ReferenceUsage {
    let Some((parent, field)) = parent else {
        return ReferenceUsage::Value;
    };
    match (&parent.kind, field) {
        (NodeKind::MemberExpression { property, .. }, Field::Object) => match property {
            MemberProperty::Static(name) => ReferenceUsage::StaticMember {
                property: name.clone(),
            },
            MemberProperty::Computed(_) => ReferenceUsage::ComputedMember,
        },
        (NodeKind::AssignmentExpression { .. }, Field::Left)
        | (NodeKind::UpdateExpression { .. }, Field::Argument) => ReferenceUsage::AssignmentTarget,
        _ => ReferenceUsage::Value,
    }
}

fn walk(
    node: &Node,
    parent: Option<(&Node, Field)>,
    current: ScopeId,
    outer: ScopeId,
    scopes: &ScopeTree,
    out: &mut Vec<Reference>,
) {
    let scope = match parent {
        Some((p, field)) if uses_outer_scope(p.node_type(), field) => outer,
        _ => current,
    };
    let inner = scopes.scope_for_node(node.id).unwrap_or(scope);

    if let NodeKind::Identifier { name } = &node.kind {
        let is_name = parent.is_some_and(|(p, field)| field == Field::Key && p.has_static_key());
        if !is_name {
            let usage = usage_of(parent);
            let member_parent = match usage {
                ReferenceUsage::StaticMember { .. } | ReferenceUsage::ComputedMember => {
                    parent.map(|(p, _)| p.id)
                }
                _ => None,
            };
            out.push(Reference {
                node: node.id,
                parent: member_parent,
                name: name.clone(),
                scope,
                declared_in: scopes.get_binding(scope, name).map(|b| b.scope),
                usage,
            });
        }
        return;
    }

    for (field, child) in node.children() {
        walk(child, Some((node, field)), inner, scope, scopes, out);
    }
}

impl Reference {
    pub fn is_member_access(&self) -> bool {
        matches!(
            self.usage,
            ReferenceUsage::StaticMember { .. } | ReferenceUsage::ComputedMember
        )
    }
}

#[cfg(test)]
#[path = "../tests/references.rs"]
mod tests;


//! Import and export cleanup run before any lowering.
//!
//! Both passes analyze the whole program when it is entered and keep the
//! result in their state for the program, then rewrite the declarations and
//! references they planned for as the walk reaches them.

use indexmap::IndexMap;
use kiln_ast::{MemberProperty, Node, NodeId, NodeKind, NodeType, UnaryOperator};
use kiln_binder::{
    BindingKind, ImportMeta, ImportedName, ReferenceUsage, collect_references,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::error::CompileError;
use crate::path::Path;
use crate::signal::Signal;
use crate::visitor::{Interest, Visitor};

const OPTIMIZE_IMPORTS: &str = "optimize_imports";
const OPTIMIZE_EXPORTS: &str = "optimize_exports";

/// A fresh node standing in for `node`, keeping its comments.
fn derive_with_comments(node: &Node, kind: NodeKind) -> Node {
    let mut derived = node.derive(kind);
    derived.leading_comments = node.leading_comments.clone();
    derived
}

/// Local names listed in `export { ... }` without a source.
fn locally_exported(program: &Node) -> FxHashMap<&str, Vec<&Node>> {
    let mut out: FxHashMap<&str, Vec<&Node>> = FxHashMap::default();
    for statement in program.statements().unwrap_or_default() {
        if let NodeKind::ExportNamedDeclaration {
            declaration: None,
            specifiers,
            source: None,
        } = &statement.kind
        {
            for specifier in specifiers {
                if let NodeKind::ExportSpecifier { local, .. } = &specifier.kind {
                    out.entry(local.as_str()).or_default().push(specifier);
                }
            }
        }
    }
    out
}

#[derive(Default, Debug)]
struct ImportPlan {
    /// Namespace local name to `property -> new local`, in first-use order.
    namespaces: FxHashMap<String, IndexMap<String, String>>,
    /// Member expressions to replace with the new local.
    members: FxHashMap<NodeId, String>,
}

/// Specializes `import * as ns from "m"` into named imports when every use
/// of `ns` is a static member read:
///
/// ```text
/// import * as R from "m"; R.foo(); R.bar;
/// ```
/// becomes
/// ```text
/// import { foo as _foo, bar as _bar } from "m"; _foo(); _bar;
/// ```
///
/// Any other use (computed access, passing `ns` around, writing through it,
/// re-exporting it) leaves the namespace import untouched.
pub struct OptimizeImports;

impl OptimizeImports {
    fn plan(path: &mut Path<'_>) -> ImportPlan {
        let program = path.node();
        let root_scope = path.scopes().root();
        let namespaces: Vec<String> = path
            .scopes()
            .top_level_bindings()
            .filter(|b| {
                matches!(
                    b.kind.import_meta(),
                    Some(ImportMeta {
                        imported: ImportedName::Namespace,
                        ..
                    })
                )
            })
            .map(|b| b.name.clone())
            .collect();
        if namespaces.is_empty() {
            return ImportPlan::default();
        }

        let references = collect_references(program, path.scopes());
        let written = written_members(program);
        let exported = locally_exported(program);

        let mut plan = ImportPlan::default();
        for namespace in namespaces {
            if exported.contains_key(namespace.as_str()) {
                debug!(namespace = %namespace, "namespace import is re-exported, not specializing");
                continue;
            }
            let uses: Vec<_> = references
                .iter()
                .filter(|r| r.name == namespace && r.declared_in == Some(root_scope))
                .collect();
            if uses.is_empty() {
                continue;
            }
            let mut members = Vec::with_capacity(uses.len());
            let mut deopt = None;
            for reference in &uses {
                match (&reference.usage, reference.parent) {
                    (ReferenceUsage::StaticMember { property }, Some(member))
                        if !written.contains(&member) =>
                    {
                        members.push((member, property.clone()));
                    }
                    (usage, _) => {
                        deopt = Some(usage.clone());
                        break;
                    }
                }
            }
            if let Some(usage) = deopt {
                debug!(namespace = %namespace, ?usage, "namespace import deoptimized");
                continue;
            }

            let mut locals: IndexMap<String, String> = IndexMap::new();
            for (member, property) in members {
                let local = match locals.get(&property) {
                    Some(local) => local.clone(),
                    None => {
                        let local = path.generate_uid(Some(&property));
                        locals.insert(property, local.clone());
                        local
                    }
                };
                plan.members.insert(member, local);
            }
            debug!(namespace = %namespace, imports = locals.len(), "specializing namespace import");
            plan.namespaces.insert(namespace, locals);
        }
        plan
    }
}

/// Member expressions that are written through: assignment and update
/// targets and `delete` operands.
fn written_members(root: &Node) -> FxHashSet<NodeId> {
    let mut out = FxHashSet::default();
    root.for_each_descendant(&mut |node| {
        let target = match &node.kind {
            NodeKind::AssignmentExpression { left, .. } => left,
            NodeKind::UpdateExpression { argument, .. } => argument,
            NodeKind::UnaryExpression {
                operator: UnaryOperator::Delete,
                argument,
            } => argument,
            _ => return,
        };
        if matches!(target.kind, NodeKind::MemberExpression { .. }) {
            out.insert(target.id);
        }
    });
    out
}

impl Visitor for OptimizeImports {
    fn name(&self) -> &'static str {
        OPTIMIZE_IMPORTS
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[
            Interest::enter(NodeType::Program),
            Interest::enter(NodeType::ImportDeclaration),
            Interest::enter(NodeType::MemberExpression),
        ];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        match &node.kind {
            NodeKind::Program { .. } => {
                let plan = Self::plan(path);
                *path.state_mut::<ImportPlan>(OPTIMIZE_IMPORTS, node.id)? = plan;
                Ok(Signal::Retain)
            }
            NodeKind::MemberExpression {
                property: MemberProperty::Static(_),
                ..
            } => {
                let root = path.root_id();
                let local = path
                    .context()
                    .state
                    .get::<ImportPlan>(OPTIMIZE_IMPORTS, root)
                    .and_then(|plan| plan.members.get(&node.id));
                Ok(match local {
                    Some(local) => Signal::replace(Node::ident(local.clone()).with_span(node.span)),
                    None => Signal::Retain,
                })
            }
            NodeKind::ImportDeclaration { specifiers, source } => {
                let root = path.root_id();
                let Some(plan) = path.context().state.get::<ImportPlan>(OPTIMIZE_IMPORTS, root) else {
                    return Ok(Signal::Retain);
                };
                let mut rewritten = Vec::with_capacity(specifiers.len());
                let mut specialized = Vec::new();
                for specifier in specifiers {
                    let namespace = match &specifier.kind {
                        NodeKind::ImportNamespaceSpecifier { local } => local.ident_name(),
                        _ => None,
                    };
                    match namespace.and_then(|ns| plan.namespaces.get(ns).map(|locals| (ns, locals))) {
                        Some((ns, locals)) => {
                            specialized.push(ns.to_string());
                            for (property, local) in locals {
                                rewritten.push(specifier.derive(NodeKind::ImportSpecifier {
                                    imported: property.clone(),
                                    local: Box::new(Node::binding(local.clone())),
                                }));
                            }
                        }
                        None => rewritten.push(specifier.clone()),
                    }
                }
                if specialized.is_empty() {
                    return Ok(Signal::Retain);
                }

                let module = path.scopes().root();
                for ns in &specialized {
                    path.scopes_mut().remove_binding(module, ns);
                }
                for specifier in &rewritten {
                    if let NodeKind::ImportSpecifier { imported, local } = &specifier.kind {
                        if let Some(name) = local.ident_name() {
                            let kind = BindingKind::Import(ImportMeta {
                                source: source.clone(),
                                imported: ImportedName::Named(imported.clone()),
                            });
                            path.scopes_mut().add_binding(module, name, kind, local.id);
                        }
                    }
                }
                // A fresh node, so the other pre-stage passes see the result.
                Ok(Signal::replace(derive_with_comments(
                    node,
                    NodeKind::ImportDeclaration {
                        specifiers: rewritten,
                        source: source.clone(),
                    },
                )))
            }
            _ => Ok(Signal::Retain),
        }
    }
}

#[derive(Default, Debug)]
struct ExportPlan {
    /// Imported locals used only by `export { ... }`, and what they import.
    collapsed: FxHashMap<String, ImportMeta>,
}

/// Collapses an import whose only use is a local re-export into a
/// re-export from the source module:
///
/// ```text
/// import { x } from "m"; export { x as y };
/// ```
/// becomes
/// ```text
/// export { x as y } from "m";
/// ```
pub struct OptimizeExports;

impl OptimizeExports {
    fn plan(path: &Path<'_>) -> ExportPlan {
        let program = path.node();
        let exported = locally_exported(program);
        if exported.is_empty() {
            return ExportPlan::default();
        }
        let root_scope = path.scopes().root();
        let referenced: FxHashSet<String> = collect_references(program, path.scopes())
            .into_iter()
            .filter(|r| r.declared_in == Some(root_scope))
            .map(|r| r.name)
            .collect();

        let collapsed = path
            .scopes()
            .top_level_bindings()
            .filter(|b| exported.contains_key(b.name.as_str()) && !referenced.contains(&b.name))
            .filter_map(|b| Some((b.name.clone(), b.kind.import_meta()?.clone())))
            .collect::<FxHashMap<_, _>>();
        if !collapsed.is_empty() {
            debug!(count = collapsed.len(), "collapsing re-exported imports");
        }
        ExportPlan { collapsed }
    }
}

impl Visitor for OptimizeExports {
    fn name(&self) -> &'static str {
        OPTIMIZE_EXPORTS
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[
            Interest::enter(NodeType::Program),
            Interest::enter(NodeType::ImportDeclaration),
            Interest::enter(NodeType::ExportNamedDeclaration),
        ];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        match &node.kind {
            NodeKind::Program { .. } => {
                let plan = Self::plan(path);
                *path.state_mut::<ExportPlan>(OPTIMIZE_EXPORTS, node.id)? = plan;
                Ok(Signal::Retain)
            }
            NodeKind::ImportDeclaration { specifiers, source } => {
                let root = path.root_id();
                let Some(plan) = path.context().state.get::<ExportPlan>(OPTIMIZE_EXPORTS, root) else {
                    return Ok(Signal::Retain);
                };
                let (dropped, kept): (Vec<&Node>, Vec<&Node>) = specifiers.iter().partition(|s| {
                    import_local(s).is_some_and(|name| plan.collapsed.contains_key(name))
                });
                if dropped.is_empty() {
                    return Ok(Signal::Retain);
                }
                let dropped: Vec<String> = dropped
                    .into_iter()
                    .filter_map(import_local)
                    .map(str::to_string)
                    .collect();
                let kept: Vec<Node> = kept.into_iter().cloned().collect();
                let module = path.scopes().root();
                for name in &dropped {
                    path.scopes_mut().remove_binding(module, name);
                }
                if kept.is_empty() {
                    return Ok(Signal::Remove);
                }
                Ok(Signal::replace(node.rebuild(NodeKind::ImportDeclaration {
                    specifiers: kept,
                    source: source.clone(),
                })))
            }
            NodeKind::ExportNamedDeclaration {
                declaration: None,
                specifiers,
                source: None,
            } => {
                let root = path.root_id();
                let Some(plan) = path.context().state.get::<ExportPlan>(OPTIMIZE_EXPORTS, root) else {
                    return Ok(Signal::Retain);
                };
                Ok(split_reexports(node, specifiers, plan))
            }
            _ => Ok(Signal::Retain),
        }
    }
}

fn import_local(specifier: &Node) -> Option<&str> {
    match &specifier.kind {
        NodeKind::ImportSpecifier { local, .. }
        | NodeKind::ImportDefaultSpecifier { local }
        | NodeKind::ImportNamespaceSpecifier { local } => local.ident_name(),
        _ => None,
    }
}

/// Move the specifiers of collapsed imports out of `export { ... }` into
/// re-exports from their source modules, one declaration per module.
fn split_reexports(node: &Node, specifiers: &[Node], plan: &ExportPlan) -> Signal {
    let mut kept = Vec::new();
    let mut by_source: IndexMap<&str, Vec<Node>> = IndexMap::new();
    let mut star_exports = Vec::new();
    for specifier in specifiers {
        let NodeKind::ExportSpecifier { local, exported } = &specifier.kind else {
            kept.push(specifier.clone());
            continue;
        };
        let Some(meta) = plan.collapsed.get(local) else {
            kept.push(specifier.clone());
            continue;
        };
        let imported = match &meta.imported {
            ImportedName::Named(name) => name.clone(),
            ImportedName::Default => "default".to_string(),
            ImportedName::Namespace => {
                star_exports.push(specifier.derive(NodeKind::ExportAllDeclaration {
                    exported: Some(exported.clone()),
                    source: meta.source.clone(),
                }));
                continue;
            }
        };
        by_source
            .entry(meta.source.as_str())
            .or_default()
            .push(specifier.derive(NodeKind::ExportSpecifier {
                local: imported,
                exported: exported.clone(),
            }));
    }
    if by_source.is_empty() && star_exports.is_empty() {
        return Signal::Retain;
    }

    let mut out = Vec::new();
    if !kept.is_empty() {
        out.push(node.rebuild(NodeKind::ExportNamedDeclaration {
            declaration: None,
            specifiers: kept,
            source: None,
        }));
    }
    for (source, specifiers) in by_source {
        out.push(Node::new(NodeKind::ExportNamedDeclaration {
            declaration: None,
            specifiers,
            source: Some(source.to_string()),
        }));
    }
    out.extend(star_exports);
    Signal::replace_many(out)
}

#[cfg(test)]
#[path = "../../tests/modules.rs"]
mod tests;

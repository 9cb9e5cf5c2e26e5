//! Rewrites one module so that it can be concatenated with the other modules
//! of a bundle.
//!
//! Every module-level binding gets a bundle-wide name derived from the
//! module id (see [`module_name`]). Imports resolved through the resolution
//! table become references to the exporting module's names, and the import
//! and export declarations disappear. An export is reachable from other
//! modules as `__m$<id>$<exported name>`: a local exported once is simply
//! renamed to it, anything else gets an alias variable.
//!
//! [`BundleRoot`] plans the renames when the program is entered and rewrites
//! the module's top level; [`BundleRename`] applies the plan to identifiers;
//! [`CjsInterop`] rewrites `require(...)` and `module.exports`.

use kiln_ast::{MemberProperty, Node, NodeKind, NodeType, SourceType, VariableKind};
use kiln_binder::{Binding, BindingKind, ImportedName};
use kiln_common::{Comment, ModuleId, diagnostic_codes};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::error::CompileError;
use crate::path::Path;
use crate::pipeline::{BundleOptions, ModuleResolver, ResolutionTable};
use crate::signal::Signal;
use crate::transforms::util::declared_names;
use crate::visitor::{Interest, Visitor};

const BUNDLE_ROOT: &str = "bundle_root";
const PREFIX: &str = "__m$";

/// Bundle-wide name of `name` in `module`: `__m$<module>$<name>`.
///
/// `ns` names the module's namespace object and `default` its default
/// export.
pub fn module_name(module: ModuleId, name: &str) -> String {
    format!("{PREFIX}{module}${name}")
}

fn is_bundle_name(name: &str) -> bool {
    name.starts_with(PREFIX)
}

/// Module-level names and what they become.
#[derive(Default, Debug)]
struct BundlePlan {
    renames: FxHashMap<String, String>,
}

/// Export names of one module and the alias declarations they need.
#[derive(Default)]
struct ExportPlan {
    /// Export name and the bundle-wide binding it reads, in export order.
    targets: Vec<(String, String)>,
    aliases: Vec<Node>,
}

/// What an export name refers to.
enum ExportTarget {
    /// A module-level binding of this module.
    Local(String),
    /// A bundle-wide name owned by another module.
    Foreign(String),
    /// The bundle-wide name is declared by the rewritten module itself.
    Declared,
}

/// Rewrites the module's top level and plans the renames.
pub struct BundleRoot {
    module: ModuleId,
    synthesize_namespace: bool,
    asset_path: Option<String>,
    resolutions: ResolutionTable,
}

impl BundleRoot {
    pub fn new(options: &BundleOptions) -> Self {
        BundleRoot {
            module: options.module_id,
            synthesize_namespace: options.synthesize_namespace,
            asset_path: options.asset_path.clone(),
            resolutions: options.resolutions.clone(),
        }
    }

    fn global(&self, name: &str) -> String {
        module_name(self.module, name)
    }

    /// `var name = init;`, registered in the module scope.
    fn declare(&self, path: &mut Path<'_>, name: String, init: Node) -> Node {
        let declaration = Node::var_decl(VariableKind::Var, name.clone(), Some(init));
        if let NodeKind::VariableDeclaration { declarations, .. } = &declaration.kind {
            let module = path.scopes().root();
            for declarator in declarations {
                path.scopes_mut()
                    .add_binding(module, name.clone(), BindingKind::Var, declarator.id);
            }
        }
        declaration
    }

    fn report_unresolved(path: &mut Path<'_>, statement: &Node, source: &str) {
        path.add_node_diagnostic(statement, diagnostic_codes::UNRESOLVED_BUNDLE_IMPORT, &[source]);
    }

    /// Strip import and export syntax from an ES module body, collecting
    /// what the module exports.
    fn unwrap_module(
        &self,
        path: &mut Path<'_>,
        body: &[Node],
        exports: &mut Vec<(String, ExportTarget)>,
    ) -> Vec<Node> {
        let mut out = Vec::with_capacity(body.len());
        for statement in body {
            match &statement.kind {
                NodeKind::ImportDeclaration { source, .. } => {
                    if self.resolutions.resolve(source).is_none() {
                        Self::report_unresolved(path, statement, source);
                        out.push(statement.clone());
                    }
                }
                NodeKind::ExportNamedDeclaration {
                    declaration: Some(declaration),
                    ..
                } => {
                    for name in declared_names(declaration) {
                        exports.push((name.clone(), ExportTarget::Local(name)));
                    }
                    out.push((**declaration).clone());
                }
                NodeKind::ExportNamedDeclaration {
                    declaration: None,
                    specifiers,
                    source,
                } => {
                    let foreign = match source {
                        Some(source) => match self.resolutions.resolve(source) {
                            Some(module) => Some(module),
                            None => {
                                Self::report_unresolved(path, statement, source);
                                out.push(statement.clone());
                                continue;
                            }
                        },
                        None => None,
                    };
                    for specifier in specifiers {
                        let NodeKind::ExportSpecifier { local, exported } = &specifier.kind else {
                            continue;
                        };
                        let target = match foreign {
                            Some(module) => ExportTarget::Foreign(module_name(module, local)),
                            None => ExportTarget::Local(local.clone()),
                        };
                        exports.push((exported.clone(), target));
                    }
                }
                NodeKind::ExportDefaultDeclaration { declaration } => {
                    let named = match &declaration.kind {
                        NodeKind::FunctionDeclaration(func) => func.id.as_deref(),
                        NodeKind::ClassDeclaration(class) => class.id.as_deref(),
                        _ => None,
                    }
                    .and_then(Node::ident_name);
                    match named {
                        Some(name) => {
                            exports.push(("default".to_string(), ExportTarget::Local(name.to_string())));
                            out.push((**declaration).clone());
                        }
                        None => {
                            let value = match &declaration.kind {
                                NodeKind::FunctionDeclaration(func) => {
                                    declaration.rebuild(NodeKind::FunctionExpression(func.clone()))
                                }
                                NodeKind::ClassDeclaration(class) => {
                                    declaration.rebuild(NodeKind::ClassExpression(class.clone()))
                                }
                                _ => (**declaration).clone(),
                            };
                            let name = self.global("default");
                            out.push(self.declare(path, name, value).with_span(statement.span));
                            exports.push(("default".to_string(), ExportTarget::Declared));
                        }
                    }
                }
                NodeKind::ExportAllDeclaration { exported, source } => {
                    let Some(exported) = exported else {
                        path.add_node_diagnostic(
                            statement,
                            diagnostic_codes::EXPORT_STAR_NOT_BUNDLED,
                            &[source.as_str()],
                        );
                        continue;
                    };
                    match self.resolutions.resolve(source) {
                        Some(module) => exports.push((
                            exported.clone(),
                            ExportTarget::Foreign(module_name(module, "ns")),
                        )),
                        None => {
                            Self::report_unresolved(path, statement, source);
                            out.push(statement.clone());
                        }
                    }
                }
                _ => out.push(statement.clone()),
            }
        }
        out
    }

    /// Decide the bundle-wide name of every module-level binding and what
    /// each export name resolves to.
    fn plan(
        &self,
        path: &mut Path<'_>,
        exports: &[(String, ExportTarget)],
    ) -> Result<(BundlePlan, ExportPlan), CompileError> {
        let bindings: Vec<Binding> = path.scopes().top_level_bindings().cloned().collect();
        let namespace = self.global("ns");
        let mut taken: FxHashSet<String> = FxHashSet::default();
        taken.insert(namespace.clone());
        let mut renames: FxHashMap<String, String> = FxHashMap::default();
        let mut exported: Vec<(&str, &ExportTarget)> = Vec::new();

        for (name, target) in exports {
            let global = self.global(name);
            if global == namespace {
                return Err(CompileError::pass(
                    BUNDLE_ROOT,
                    format!("export name `{name}` collides with the module namespace `{namespace}`"),
                ));
            }
            if !taken.insert(global.clone()) {
                debug!(exported = %name, "duplicate export name");
                continue;
            }
            if let ExportTarget::Local(local) = target {
                let renameable = bindings
                    .iter()
                    .any(|b| &b.name == local && b.kind.import_meta().is_none());
                if renameable && !renames.contains_key(local) {
                    renames.insert(local.clone(), global);
                }
            }
            exported.push((name.as_str(), target));
        }

        for binding in &bindings {
            let Some(meta) = binding.kind.import_meta() else {
                continue;
            };
            let Some(module) = self.resolutions.resolve(&meta.source) else {
                continue;
            };
            let foreign = match &meta.imported {
                ImportedName::Named(name) => module_name(module, name),
                ImportedName::Default => module_name(module, "default"),
                ImportedName::Namespace => module_name(module, "ns"),
            };
            renames.insert(binding.name.clone(), foreign);
        }

        // Locals keep their own name under the prefix unless an export took
        // it; those get a numeric suffix.
        let locals: Vec<&Binding> = bindings
            .iter()
            .filter(|b| {
                b.kind.import_meta().is_none()
                    && !renames.contains_key(&b.name)
                    && !is_bundle_name(&b.name)
            })
            .collect();
        let mut conflicts = Vec::new();
        for binding in &locals {
            let candidate = self.global(&binding.name);
            if taken.insert(candidate.clone()) {
                renames.insert(binding.name.clone(), candidate);
            } else {
                conflicts.push(binding.name.clone());
            }
        }
        for name in conflicts {
            let base = self.global(&name);
            let mut suffix = 1u32;
            let mut candidate = format!("{base}${suffix}");
            while !taken.insert(candidate.clone()) {
                suffix += 1;
                candidate = format!("{base}${suffix}");
            }
            renames.insert(name, candidate);
        }

        let module = path.scopes().root();
        for binding in &bindings {
            let Some(new_name) = renames.get(&binding.name) else {
                continue;
            };
            path.scopes_mut().remove_binding(module, &binding.name);
            if binding.kind.import_meta().is_none() {
                path.scopes_mut()
                    .add_binding(module, new_name.clone(), binding.kind.clone(), binding.node);
            }
        }

        // Every export name resolves to the binding that holds its value.
        // Names that are not that binding get an alias for importers.
        let mut targets = Vec::with_capacity(exported.len());
        let mut aliases = Vec::new();
        for (name, target) in exported {
            let global = self.global(name);
            let resolved = match target {
                ExportTarget::Local(local) => renames.get(local).cloned().unwrap_or_else(|| local.clone()),
                ExportTarget::Foreign(foreign) => foreign.clone(),
                ExportTarget::Declared => global.clone(),
            };
            if resolved != global {
                aliases.push(self.declare(path, global, Node::ident(resolved.clone())));
            }
            targets.push((name.to_string(), resolved));
        }
        debug!(
            module = %self.module,
            renames = renames.len(),
            aliases = aliases.len(),
            "planned bundle names"
        );
        Ok((BundlePlan { renames }, ExportPlan { targets, aliases }))
    }

    /// `var __m$<id>$ns = { get name() { return <binding>; }, ... };`
    ///
    /// Each getter reads the binding its export resolves to, so the
    /// namespace stays live while the module runs.
    fn namespace_object(&self, path: &mut Path<'_>, targets: &[(String, String)]) -> Node {
        let getters = targets
            .iter()
            .map(|(exported, resolved)| {
                Node::getter(exported.clone(), vec![Node::ret(Some(Node::ident(resolved.clone())))])
            })
            .collect();
        self.declare(path, self.global("ns"), Node::object(getters))
    }
}

impl Visitor for BundleRoot {
    fn name(&self) -> &'static str {
        BUNDLE_ROOT
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[Interest::enter(NodeType::Program)];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        let NodeKind::Program {
            body,
            source_type,
            directives,
            comments,
        } = &node.kind
        else {
            return Ok(Signal::Retain);
        };
        path.inject_comment(Comment::block(
            format!("bundle:module:{}", self.module),
            format!(" module {} ", self.module),
        ));

        let mut exports = Vec::new();
        let statements = match (&self.asset_path, source_type) {
            (Some(asset), _) => {
                exports.push(("default".to_string(), ExportTarget::Declared));
                vec![self.declare(path, self.global("default"), Node::string(asset.clone()))]
            }
            (None, SourceType::Script) => body.clone(),
            (None, SourceType::Module) => self.unwrap_module(path, body, &mut exports),
        };
        let (plan, export_plan) = if self.asset_path.is_some() {
            let targets = vec![("default".to_string(), self.global("default"))];
            (BundlePlan::default(), ExportPlan { targets, aliases: Vec::new() })
        } else {
            self.plan(path, &exports)?
        };

        let mut out = Vec::with_capacity(statements.len() + export_plan.aliases.len() + 1);
        // A module that was already rewritten declares its namespace.
        let module = path.scopes().root();
        let has_namespace = path.scopes().get_binding(module, &self.global("ns")).is_some();
        match source_type {
            _ if has_namespace => {}
            SourceType::Script => {
                out.push(self.declare(path, self.global("ns"), Node::object(Vec::new())));
            }
            SourceType::Module if self.synthesize_namespace => {
                out.push(self.namespace_object(path, &export_plan.targets));
            }
            SourceType::Module => {}
        }
        out.extend(statements);
        out.extend(export_plan.aliases);

        *path.state_mut::<BundlePlan>(BUNDLE_ROOT, node.id)? = plan;
        Ok(Signal::replace(node.rebuild(NodeKind::Program {
            body: out,
            source_type: *source_type,
            directives: directives.clone(),
            comments: comments.clone(),
        })))
    }
}

/// Applies the names planned by [`BundleRoot`] to identifiers that resolve
/// to module-level bindings, and points free `exports` at the module's
/// namespace object.
pub struct BundleRename {
    module: ModuleId,
}

impl BundleRename {
    pub fn new(options: &BundleOptions) -> Self {
        BundleRename {
            module: options.module_id,
        }
    }
}

impl Visitor for BundleRename {
    fn name(&self) -> &'static str {
        "bundle_rename"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[
            Interest::enter(NodeType::Identifier),
            Interest::enter(NodeType::BindingIdentifier),
        ];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        let Some(name) = node.ident_name() else {
            return Ok(Signal::Retain);
        };
        if is_bundle_name(name) || path.is_property_name() {
            return Ok(Signal::Retain);
        }
        // Module-level bindings were moved to their new names, so a name
        // that still resolves is shadowed by an inner declaration.
        if path.get_binding(name).is_some() {
            return Ok(Signal::Retain);
        }
        let root = path.root_id();
        let planned = path
            .context()
            .state
            .get::<BundlePlan>(BUNDLE_ROOT, root)
            .and_then(|plan| plan.renames.get(name))
            .cloned();
        let renamed = match (planned, &node.kind) {
            (Some(new_name), NodeKind::Identifier { .. }) => NodeKind::Identifier { name: new_name },
            (Some(new_name), _) => NodeKind::BindingIdentifier { name: new_name },
            (None, NodeKind::Identifier { .. }) if name == "exports" => NodeKind::Identifier {
                name: module_name(self.module, "ns"),
            },
            (None, _) => return Ok(Signal::Retain),
        };
        Ok(Signal::replace(node.rebuild(renamed)))
    }
}

/// Rewrites CommonJS module plumbing: `require("m")` becomes the namespace
/// of the resolved module and `module.exports` this module's namespace.
pub struct CjsInterop {
    module: ModuleId,
    resolutions: ResolutionTable,
}

impl CjsInterop {
    pub fn new(options: &BundleOptions) -> Self {
        CjsInterop {
            module: options.module_id,
            resolutions: options.resolutions.clone(),
        }
    }
}

impl Visitor for CjsInterop {
    fn name(&self) -> &'static str {
        "cjs_interop"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[
            Interest::enter(NodeType::CallExpression),
            Interest::enter(NodeType::MemberExpression),
        ];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        match &node.kind {
            NodeKind::CallExpression {
                callee, arguments, ..
            } => {
                if !callee.is_identifier("require") || path.get_binding("require").is_some() {
                    return Ok(Signal::Retain);
                }
                let [argument] = arguments.as_slice() else {
                    return Ok(Signal::Retain);
                };
                let NodeKind::StringLiteral { value: specifier } = &argument.kind else {
                    return Ok(Signal::Retain);
                };
                match self.resolutions.resolve(specifier) {
                    Some(module) => Ok(Signal::replace(
                        Node::ident(module_name(module, "ns")).with_span(node.span),
                    )),
                    None => {
                        path.add_node_diagnostic(
                            node,
                            diagnostic_codes::UNRESOLVED_BUNDLE_IMPORT,
                            &[specifier.as_str()],
                        );
                        Ok(Signal::Retain)
                    }
                }
            }
            NodeKind::MemberExpression {
                object,
                property: MemberProperty::Static(property),
                ..
            } => {
                if property != "exports"
                    || !object.is_identifier("module")
                    || path.get_binding("module").is_some()
                {
                    return Ok(Signal::Retain);
                }
                Ok(Signal::replace(
                    Node::ident(module_name(self.module, "ns")).with_span(node.span),
                ))
            }
            _ => Ok(Signal::Retain),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/bundle.rs"]
mod tests;

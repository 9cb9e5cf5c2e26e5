//! Scope arena and binding records.

use indexmap::IndexMap;
use kiln_ast::NodeId;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::trace;

/// Index of a scope in its [`ScopeTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const NONE: ScopeId = ScopeId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == ScopeId::NONE
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Module,
    Function,
    Class,
    Block,
}

impl ScopeKind {
    /// Scopes that `var` and function declarations hoist to.
    pub fn is_hoist_target(self) -> bool {
        matches!(self, ScopeKind::Module | ScopeKind::Function)
    }
}

/// Which export of the source module an import binding refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImportedName {
    Named(String),
    Default,
    Namespace,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImportMeta {
    /// Module specifier as written in the import declaration.
    pub source: String,
    pub imported: ImportedName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Import(ImportMeta),
    Type,
    Parameter,
}

impl BindingKind {
    /// Kinds that may be declared repeatedly in one scope.
    pub fn is_redeclarable(&self) -> bool {
        matches!(
            self,
            BindingKind::Var | BindingKind::Function | BindingKind::Parameter
        )
    }

    pub fn import_meta(&self) -> Option<&ImportMeta> {
        match self {
            BindingKind::Import(meta) => Some(meta),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// The declaring node.
    pub node: NodeId,
    /// The scope that owns the binding.
    pub scope: ScopeId,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// The node that introduced the scope.
    pub node: NodeId,
    pub(crate) bindings: IndexMap<String, Binding>,
    /// Names handed out by uid generation in this scope.
    pub(crate) generated: FxHashSet<String>,
}

impl Scope {
    pub fn get_own(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Bindings in declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    pub fn is_generated(&self, name: &str) -> bool {
        self.generated.contains(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("binding `{name}` is not visible from scope {}", .scope.0)]
pub struct MissingBindingError {
    pub name: String,
    pub scope: ScopeId,
}

/// Outcome of [`ScopeTree::declare`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Declared {
    Added,
    /// A redeclarable name was declared again; the first declaration is kept.
    Merged,
    /// The name was already declared in a way that forbids redeclaration.
    Duplicate,
}

/// All scopes of one compilation unit.
#[derive(Clone, Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    node_scopes: FxHashMap<NodeId, ScopeId>,
    /// Every identifier name that appears in the unit, declared or not.
    pub(crate) referenced_names: FxHashSet<String>,
    /// Every name handed out by uid generation, across all scopes.
    pub(crate) generated_names: FxHashSet<String>,
}

impl ScopeTree {
    /// A tree holding only the module scope introduced by `root`.
    pub fn new(root: NodeId) -> ScopeTree {
        let mut tree = ScopeTree {
            scopes: Vec::new(),
            node_scopes: FxHashMap::default(),
            referenced_names: FxHashSet::default(),
            generated_names: FxHashSet::default(),
        };
        tree.create_scope(ScopeKind::Module, None, root);
        tree
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.scopes.get_mut(id.0 as usize)
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// Scope introduced by `node`, if `node` introduces one.
    pub fn scope_for_node(&self, node: NodeId) -> Option<ScopeId> {
        self.node_scopes.get(&node).copied()
    }

    /// Register a new scope introduced by `node`.
    pub fn create_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>, node: NodeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            id,
            kind,
            parent,
            node,
            bindings: IndexMap::new(),
            generated: FxHashSet::default(),
        });
        self.node_scopes.insert(node, id);
        trace!(scope = id.0, ?kind, node = node.0, "created scope");
        id
    }

    /// `scope` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = &Scope> {
        std::iter::successors(self.get(scope), move |s| s.parent.and_then(|p| self.get(p)))
    }

    /// Resolve `name` from `scope` outwards; the innermost declaration wins.
    pub fn get_binding(&self, scope: ScopeId, name: &str) -> Option<&Binding> {
        self.ancestors(scope).find_map(|s| s.get_own(name))
    }

    /// Like [`get_binding`](Self::get_binding), for callers that know the
    /// binding must exist.
    pub fn get_binding_assert(
        &self,
        scope: ScopeId,
        name: &str,
    ) -> Result<&Binding, MissingBindingError> {
        self.get_binding(scope, name)
            .ok_or_else(|| MissingBindingError {
                name: name.to_string(),
                scope,
            })
    }

    /// Nearest enclosing scope that `var` declarations hoist to.
    pub fn nearest_function_scope(&self, scope: ScopeId) -> ScopeId {
        self.ancestors(scope)
            .find(|s| s.kind.is_hoist_target())
            .map_or(self.root(), |s| s.id)
    }

    /// Bindings declared in the module scope, in declaration order.
    pub fn top_level_bindings(&self) -> impl Iterator<Item = &Binding> {
        self.get(self.root()).into_iter().flat_map(Scope::bindings)
    }

    /// Register or overwrite a binding. Returns the binding it replaced.
    ///
    /// Passes that introduce declarations call this to keep the tree in sync
    /// with their output; the tree is never rebuilt.
    pub fn add_binding(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        kind: BindingKind,
        node: NodeId,
    ) -> Option<Binding> {
        let name = name.into();
        self.referenced_names.insert(name.clone());
        let scope_ref = self.scopes.get_mut(scope.0 as usize)?;
        let binding = Binding {
            name: name.clone(),
            kind,
            node,
            scope,
        };
        trace!(scope = scope.0, name = %name, "add binding");
        scope_ref.bindings.insert(name, binding)
    }

    pub fn remove_binding(&mut self, scope: ScopeId, name: &str) -> Option<Binding> {
        let removed = self
            .scopes
            .get_mut(scope.0 as usize)?
            .bindings
            .shift_remove(name);
        if removed.is_some() {
            trace!(scope = scope.0, name, "removed binding");
        }
        removed
    }

    /// Declaration-time registration used while building the tree.
    pub(crate) fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        kind: BindingKind,
        node: NodeId,
    ) -> Declared {
        let Some(existing) = self.get(scope).and_then(|s| s.get_own(name)) else {
            self.add_binding(scope, name, kind, node);
            return Declared::Added;
        };
        if existing.kind.is_redeclarable() && kind.is_redeclarable() {
            Declared::Merged
        } else {
            Declared::Duplicate
        }
    }
}

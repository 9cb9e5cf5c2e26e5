//! Lexical scope and binding resolver.
//!
//! [`build_scope`] walks a tree once and produces a [`ScopeTree`]: an arena
//! of [`Scope`]s indexed by [`ScopeId`], plus a map from scope-introducing
//! nodes to their scope. Scopes refer to their parent and to the node that
//! introduced them by id, so there are no reference cycles between the tree
//! and its scopes.
//!
//! Passes query the tree through [`ScopeTree::get_binding`] and friends, and
//! are responsible for registering the bindings they introduce: the tree is
//! never rebuilt after a rewrite.

mod build;
mod references;
mod scope;
mod uid;

pub use build::{build_scope, scope_kind_of, uses_outer_scope};
pub use references::{Reference, ReferenceUsage, collect_references};
pub use scope::{
    Binding, BindingKind, ImportMeta, ImportedName, MissingBindingError, Scope, ScopeId, ScopeKind,
    ScopeTree,
};
pub use uid::RESERVED_NAMES;

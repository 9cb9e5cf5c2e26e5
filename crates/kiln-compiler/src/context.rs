//! Per-unit compilation state shared by every pass.

use std::any::Any;
use std::fmt;

use indexmap::IndexMap;
use kiln_ast::{Node, NodeId};
use kiln_binder::{ScopeTree, build_scope};
use kiln_common::{Comment, CommentId, Diagnostics};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::CompileError;

/// State for one compilation unit: its diagnostics, scope tree, synthesized
/// comments and the private state of every visitor.
pub struct CompilerContext {
    file_name: String,
    pub diagnostics: Diagnostics,
    pub scopes: ScopeTree,
    pub comments: CommentRegistry,
    pub state: VisitorStateStore,
}

impl CompilerContext {
    /// Build the context for `root`, including its scope tree. Declaration
    /// errors found while building scopes are reported to the diagnostics.
    pub fn new(file_name: impl Into<String>, root: &Node) -> CompilerContext {
        let file_name = file_name.into();
        let mut diagnostics = Diagnostics::new(file_name.clone());
        let scopes = build_scope(root, &mut diagnostics);
        CompilerContext {
            file_name,
            diagnostics,
            scopes,
            comments: CommentRegistry::default(),
            state: VisitorStateStore::default(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Debug for CompilerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerContext")
            .field("file_name", &self.file_name)
            .field("diagnostics", &self.diagnostics.len())
            .field("pending_comments", &self.comments.len())
            .field("visitor_states", &self.state.len())
            .finish_non_exhaustive()
    }
}

/// Comments synthesized by passes and not yet attached to the tree.
///
/// Insertion ordered; injecting a comment whose id is already registered
/// replaces the registered one in place.
#[derive(Default, Debug)]
pub struct CommentRegistry {
    pending: IndexMap<CommentId, Comment>,
}

impl CommentRegistry {
    pub fn upsert(&mut self, comment: Comment) {
        self.pending.insert(comment.id.clone(), comment);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Comment> + '_ {
        self.pending.drain(..).map(|(_, comment)| comment)
    }
}

/// Key of one visitor's state: the visitor's name and the boundary node
/// (program or block) the state belongs to.
pub type StateKey = (&'static str, NodeId);

/// Private per-visitor state, scoped to boundary nodes.
///
/// The engine resets every entry keyed on a boundary node when it enters
/// that node, so state never leaks between two walks of the same block.
#[derive(Default)]
pub struct VisitorStateStore {
    entries: FxHashMap<StateKey, Box<dyn Any>>,
}

impl VisitorStateStore {
    /// The state of `visitor` for `boundary`, created on first use.
    pub fn get_or_init<T: Any + Default>(
        &mut self,
        visitor: &'static str,
        boundary: NodeId,
    ) -> Result<&mut T, CompileError> {
        let slot = self
            .entries
            .entry((visitor, boundary))
            .or_insert_with(|| Box::new(T::default()));
        slot.downcast_mut::<T>().ok_or_else(|| {
            CompileError::Invariant(format!(
                "state of `{visitor}` for node {} has an unexpected type",
                boundary.0
            ))
        })
    }

    pub fn get<T: Any>(&self, visitor: &'static str, boundary: NodeId) -> Option<&T> {
        self.entries
            .get(&(visitor, boundary))
            .and_then(|state| state.downcast_ref::<T>())
    }

    /// Remove and return the state of `visitor` for `boundary`.
    pub fn take<T: Any>(&mut self, visitor: &'static str, boundary: NodeId) -> Option<T> {
        let state = self.entries.remove(&(visitor, boundary))?;
        state.downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Drop every state keyed on `boundary`.
    pub fn reset_boundary(&mut self, boundary: NodeId) {
        let before = self.entries.len();
        self.entries.retain(|(_, node), _| *node != boundary);
        if self.entries.len() != before {
            debug!(boundary = boundary.0, dropped = before - self.entries.len(), "reset visitor state");
        }
    }

    /// Boundaries that still hold state for `visitor`.
    pub fn boundaries_of(&self, visitor: &'static str) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self
            .entries
            .keys()
            .filter(|(name, _)| *name == visitor)
            .map(|(_, node)| *node)
            .collect();
        out.sort();
        out
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/context.rs"]
mod tests;

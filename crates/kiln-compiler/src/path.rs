//! A visitor's view of the node it is visiting.

use kiln_ast::{Field, Node, NodeId, NodeType, SlotKind};
use kiln_binder::{Binding, BindingKind, ScopeId, ScopeKind, ScopeTree};
use kiln_common::diagnostics::{DiagnosticDescription, get_message};
use kiln_common::limits::MAX_NESTED_TRAVERSALS;
use kiln_common::{Comment, DiagnosticCategory, DiagnosticSink};
use rustc_hash::FxHashSet;
use std::any::Any;
use tracing::debug;

use crate::context::CompilerContext;
use crate::error::CompileError;
use crate::inject::{INJECTOR, InjectedBinding, PendingBindings};
use crate::signal::Signal;
use crate::traverse::{DispatchTable, Traversal};
use crate::visitor::Visitor;

/// A node on the way from the root to the node being visited.
///
/// The engine owns the tree while it walks it, so ancestors are described
/// rather than borrowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ancestor {
    pub id: NodeId,
    pub node_type: NodeType,
    /// Slot of the child currently being walked.
    pub field: Option<Field>,
    /// Scope in effect inside this node.
    pub scope: ScopeId,
    /// Scope in effect at this node's own position.
    pub outer_scope: ScopeId,
    /// See [`Node::has_static_key`].
    pub static_key: bool,
}

pub struct Path<'p> {
    pub(crate) node: &'p Node,
    pub(crate) field: Option<Field>,
    pub(crate) slot: SlotKind,
    pub(crate) ancestors: &'p [Ancestor],
    pub(crate) scope: ScopeId,
    pub(crate) outer_scope: ScopeId,
    pub(crate) cx: &'p mut CompilerContext,
    pub(crate) adopted: &'p mut Vec<NodeId>,
    pub(crate) nesting: u32,
}

impl<'p> Path<'p> {
    pub fn node(&self) -> &'p Node {
        self.node
    }

    pub fn node_type(&self) -> NodeType {
        self.node.node_type()
    }

    /// Slot the node occupies in its parent; `None` at the root.
    pub fn field(&self) -> Option<Field> {
        self.field
    }

    /// Shape of that slot, which bounds what the visitor may return.
    pub fn slot(&self) -> SlotKind {
        self.slot
    }

    pub fn parent(&self) -> Option<&Ancestor> {
        self.ancestors.last()
    }

    /// Ancestors from the root down to the parent.
    pub fn ancestors(&self) -> &[Ancestor] {
        self.ancestors
    }

    /// Whether the node is the non-computed key of a property or method,
    /// where an identifier names a property rather than a binding.
    pub fn is_property_name(&self) -> bool {
        self.field == Some(Field::Key) && self.parent().is_some_and(|p| p.static_key)
    }

    /// Scope in effect at the node. For a scope-introducing node this is the
    /// scope it introduces.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Scope in effect at the node's position in its parent.
    pub fn outer_scope(&self) -> ScopeId {
        self.outer_scope
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.cx.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut ScopeTree {
        &mut self.cx.scopes
    }

    pub fn context(&self) -> &CompilerContext {
        self.cx
    }

    pub fn root_id(&self) -> NodeId {
        self.ancestors.first().map_or(self.node.id, |a| a.id)
    }

    /// The nearest program or block containing the node, or the node itself
    /// if it is one, with the scope in effect inside it.
    pub fn nearest_boundary(&self) -> (NodeId, ScopeId) {
        if self.node_type().is_boundary() {
            return (self.node.id, self.scope);
        }
        self.ancestors
            .iter()
            .rev()
            .find(|a| a.node_type.is_boundary())
            .map_or((self.node.id, self.scope), |a| (a.id, a.scope))
    }

    pub fn get_binding(&self, name: &str) -> Option<&Binding> {
        self.cx.scopes.get_binding(self.scope, name)
    }

    pub fn get_binding_assert(&self, name: &str) -> Result<&Binding, CompileError> {
        Ok(self.cx.scopes.get_binding_assert(self.scope, name)?)
    }

    /// A fresh identifier that collides with nothing visible here.
    pub fn generate_uid(&mut self, hint: Option<&str>) -> String {
        self.cx.scopes.generate_uid(self.scope, hint)
    }

    /// Register the scope a synthesized node introduces, parented to the
    /// scope in effect here.
    pub fn create_scope(&mut self, kind: ScopeKind, node: NodeId) -> ScopeId {
        self.cx.scopes.create_scope(kind, Some(self.scope), node)
    }

    /// Report a diagnostic at `node` using the message registered for `code`.
    pub fn add_node_diagnostic(&mut self, node: &Node, code: u32, args: &[&str]) {
        let description = match get_message(code) {
            Some(message) => DiagnosticDescription::from_message(message, args),
            None => DiagnosticDescription {
                category: DiagnosticCategory::Error,
                code,
                message_text: args.join(" "),
            },
        };
        debug!(code, node = node.id.0, "diagnostic");
        self.cx.diagnostics.add(node.span, description);
    }

    /// Private state of `visitor` for `boundary`, created on first use.
    pub fn state_mut<T: Any + Default>(
        &mut self,
        visitor: &'static str,
        boundary: NodeId,
    ) -> Result<&mut T, CompileError> {
        self.cx.state.get_or_init(visitor, boundary)
    }

    /// Remove the state of `visitor` for `key`, if any.
    pub fn take_state<T: Any>(&mut self, visitor: &'static str, key: NodeId) -> Option<T> {
        self.cx.state.take(visitor, key)
    }

    /// Declare a fresh `var` that the injector will hoist to the top of the
    /// nearest block or program.
    ///
    /// The binding is registered in the nearest function or module scope of
    /// that boundary. Use [`InjectedBinding::assignment_target`] and
    /// [`InjectedBinding::reference`] to place it.
    pub fn inject_binding(
        &mut self,
        hint: Option<&str>,
        init: Option<Node>,
    ) -> Result<InjectedBinding, CompileError> {
        let (boundary, boundary_scope) = self.nearest_boundary();
        let name = self.cx.scopes.generate_uid(self.scope, hint);
        let declarator = Node::declarator(name.clone(), init);
        let target = self.cx.scopes.nearest_function_scope(boundary_scope);
        self.cx
            .scopes
            .add_binding(target, name.clone(), BindingKind::Var, declarator.id);
        self.cx
            .state
            .get_or_init::<PendingBindings>(INJECTOR, boundary)?
            .declarators
            .push(declarator);
        debug!(name = %name, boundary = boundary.0, "injected binding");
        Ok(InjectedBinding::new(name))
    }

    /// Queue a comment for the root. A comment with the same id replaces the
    /// queued or attached one.
    pub fn inject_comment(&mut self, comment: Comment) {
        self.cx.comments.upsert(comment);
    }

    /// Run `visitor` alone over `node` in a nested traversal and return the
    /// result as a signal.
    ///
    /// `node` is expected to live under the current node in `field`. The
    /// nested traversal has its own visited set; the ids of nodes it produced
    /// are adopted by the enclosing traversal so that it does not enter them
    /// again.
    pub fn reduce_signal(
        &mut self,
        node: Node,
        field: Field,
        visitor: &dyn Visitor,
    ) -> Result<Signal, CompileError> {
        if self.nesting >= MAX_NESTED_TRAVERSALS {
            return Err(CompileError::DepthExceeded(MAX_NESTED_TRAVERSALS));
        }

        let mut input = FxHashSet::default();
        node.for_each_descendant(&mut |n| {
            input.insert(n.id);
        });

        let mut ancestors = self.ancestors.to_vec();
        ancestors.push(Ancestor {
            id: self.node.id,
            node_type: self.node.node_type(),
            field: Some(field),
            scope: self.scope,
            outer_scope: self.outer_scope,
            static_key: self.node.has_static_key(),
        });

        let visitors = [visitor];
        let table = DispatchTable::unchecked(&visitors);
        let out = Traversal::new(&table, &mut *self.cx, ancestors, self.nesting + 1)
            .walk(node, SlotKind::List)?;

        for produced in &out {
            produced.for_each_descendant(&mut |n| {
                if !input.contains(&n.id) {
                    self.adopted.push(n.id);
                }
            });
        }
        Ok(Signal::replace_many(out))
    }
}

//! The traversal engine.
//!
//! A depth-first walk that owns the tree while it walks it. Each node is
//! taken out of its slot, offered to the interested visitors on enter, its
//! children are rewritten through [`ChildMapper`], it is offered again on
//! exit, and whatever comes back is put into the slot.
//!
//! Replacement rules:
//! - Enter: a replacement node that was never entered in this traversal is
//!   walked from scratch. One that reuses an id already entered skips enter
//!   and continues with its children. Each node of a multi-node replacement
//!   is walked the same way.
//! - Exit: replacements are final and are not walked again.
//! - The slot decides how many nodes may come back: exactly one for a
//!   required slot, at most one for an optional slot, any number in a list.

use kiln_ast::{ChildMapper, Field, Node, NodeId, NodeType, SlotKind};
use kiln_binder::{ScopeId, scope_kind_of, uses_outer_scope};
use kiln_common::limits::{MAX_REPLACEMENT_CHAIN, MAX_TRAVERSAL_DEPTH};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::context::CompilerContext;
use crate::error::CompileError;
use crate::path::{Ancestor, Path};
use crate::pipeline::Stage;
use crate::signal::Signal;
use crate::visitor::{Phase, Visitor};

type Nodes = SmallVec<[Node; 1]>;

/// Visitors of one traversal, indexed by the `(node type, phase)` pairs they
/// declared. For each pair the visitors are kept in list order; the first
/// one that does not retain the node wins.
pub struct DispatchTable<'v> {
    visitors: Vec<&'v dyn Visitor>,
    table: FxHashMap<(NodeType, Phase), SmallVec<[usize; 2]>>,
}

impl<'v> DispatchTable<'v> {
    /// Build a table without checking for overlapping interests.
    pub fn unchecked(visitors: &[&'v dyn Visitor]) -> DispatchTable<'v> {
        let mut table: FxHashMap<(NodeType, Phase), SmallVec<[usize; 2]>> = FxHashMap::default();
        for (index, visitor) in visitors.iter().enumerate() {
            for interest in visitor.interests() {
                table
                    .entry((interest.node_type, interest.phase))
                    .or_default()
                    .push(index);
            }
        }
        DispatchTable {
            visitors: visitors.to_vec(),
            table,
        }
    }

    /// Build a table for `stage`, rejecting any pair claimed by two visitors
    /// unless it is listed in `allowed`.
    pub fn checked(
        stage: Stage,
        visitors: &[&'v dyn Visitor],
        allowed: &[(NodeType, Phase)],
    ) -> Result<DispatchTable<'v>, CompileError> {
        let table = DispatchTable::unchecked(visitors);
        let mut keys: Vec<_> = table.table.iter().collect();
        keys.sort_by_key(|((node_type, phase), _)| (*node_type as u32, *phase == Phase::Exit));
        for (&(node_type, phase), indices) in keys {
            if indices.len() > 1 && !allowed.contains(&(node_type, phase)) {
                return Err(CompileError::OverlappingVisitors {
                    stage,
                    node_type,
                    phase,
                    first: table.visitors[indices[0]].name(),
                    second: table.visitors[indices[1]].name(),
                });
            }
        }
        Ok(table)
    }

    fn lookup(&self, node_type: NodeType, phase: Phase) -> &[usize] {
        self.table
            .get(&(node_type, phase))
            .map_or(&[], |indices| indices.as_slice())
    }

    pub fn visitor_names(&self) -> Vec<&'static str> {
        self.visitors.iter().map(|v| v.name()).collect()
    }
}

/// Walk `root` with `visitors` and return the rewritten tree.
///
/// Visitors are dispatched in list order and overlaps are permitted; use a
/// [`Pipeline`](crate::pipeline::Pipeline) for validated stages.
pub fn traverse(
    root: Node,
    visitors: &[&dyn Visitor],
    cx: &mut CompilerContext,
) -> Result<Node, CompileError> {
    let table = DispatchTable::unchecked(visitors);
    traverse_with(root, &table, cx)
}

pub(crate) fn traverse_with(
    root: Node,
    table: &DispatchTable<'_>,
    cx: &mut CompilerContext,
) -> Result<Node, CompileError> {
    let out = Traversal::new(table, cx, Vec::new(), 0).walk(root, SlotKind::Required)?;
    let produced = out.len();
    let mut out = out.into_iter();
    match (out.next(), out.next()) {
        (Some(node), None) => Ok(node),
        _ => Err(CompileError::InvalidReplacement {
            parent: None,
            field: None,
            slot: SlotKind::Required,
            produced,
        }),
    }
}

pub(crate) struct Traversal<'t, 'v> {
    table: &'t DispatchTable<'v>,
    cx: &'t mut CompilerContext,
    visited: FxHashSet<NodeId>,
    ancestors: Vec<Ancestor>,
    depth: u32,
    nesting: u32,
}

impl<'t, 'v> Traversal<'t, 'v> {
    pub(crate) fn new(
        table: &'t DispatchTable<'v>,
        cx: &'t mut CompilerContext,
        ancestors: Vec<Ancestor>,
        nesting: u32,
    ) -> Self {
        Traversal {
            table,
            cx,
            visited: FxHashSet::default(),
            ancestors,
            depth: 0,
            nesting,
        }
    }

    /// Walk `node` as the content of a `slot` and return what ends up in it.
    pub(crate) fn walk(&mut self, node: Node, slot: SlotKind) -> Result<Vec<Node>, CompileError> {
        Ok(self.visit(node, slot)?.into_vec())
    }

    fn visit(&mut self, node: Node, slot: SlotKind) -> Result<Nodes, CompileError> {
        self.depth += 1;
        if self.depth > MAX_TRAVERSAL_DEPTH {
            return Err(CompileError::DepthExceeded(MAX_TRAVERSAL_DEPTH));
        }
        let result = self.visit_node(node, slot);
        self.depth -= 1;
        result
    }

    fn visit_node(&mut self, mut node: Node, slot: SlotKind) -> Result<Nodes, CompileError> {
        let mut chain = 0;
        while self.visited.insert(node.id) {
            if node.node_type().is_boundary() {
                self.cx.state.reset_boundary(node.id);
            }
            let (scope, outer) = self.scope_of(&node);
            match self.dispatch(Phase::Enter, &node, slot, scope, outer)? {
                Signal::Retain => break,
                Signal::Remove => {
                    self.check_shape(slot, 0)?;
                    return Ok(Nodes::new());
                }
                Signal::Replace(mut nodes) => {
                    self.check_shape(slot, nodes.len())?;
                    if nodes.len() == 1 {
                        chain += 1;
                        if chain > MAX_REPLACEMENT_CHAIN {
                            return Err(CompileError::ReplacementChain {
                                node_type: node.node_type(),
                                limit: MAX_REPLACEMENT_CHAIN,
                            });
                        }
                        if let Some(next) = nodes.pop() {
                            node = next;
                        }
                        continue;
                    }
                    let mut out = Nodes::new();
                    for produced in nodes {
                        out.extend(self.visit(produced, slot)?);
                    }
                    return Ok(out);
                }
            }
        }

        let (scope, outer) = self.scope_of(&node);
        self.ancestors.push(Ancestor {
            id: node.id,
            node_type: node.node_type(),
            field: None,
            scope,
            outer_scope: outer,
            static_key: node.has_static_key(),
        });
        let rebuilt = node.map_children(self);
        self.ancestors.pop();
        let node = rebuilt?;

        let signal = self.dispatch(Phase::Exit, &node, slot, scope, outer)?;
        let out = signal.into_nodes(node);
        self.check_shape(slot, out.len())?;
        Ok(out)
    }

    /// Offer `node` to the visitors interested in it; the first signal other
    /// than `Retain` wins.
    fn dispatch(
        &mut self,
        phase: Phase,
        node: &Node,
        slot: SlotKind,
        scope: ScopeId,
        outer_scope: ScopeId,
    ) -> Result<Signal, CompileError> {
        let node_type = node.node_type();
        let field = self.ancestors.last().and_then(|a| a.field);
        let table = self.table;
        for &index in table.lookup(node_type, phase) {
            let visitor = table.visitors[index];
            let mut adopted = Vec::new();
            let signal = {
                let mut path = Path {
                    node,
                    field,
                    slot,
                    ancestors: &self.ancestors,
                    scope,
                    outer_scope,
                    cx: &mut *self.cx,
                    adopted: &mut adopted,
                    nesting: self.nesting,
                };
                match phase {
                    Phase::Enter => visitor.enter(&mut path),
                    Phase::Exit => visitor.exit(&mut path),
                }
            };
            self.visited.extend(adopted);
            let signal = signal.inspect_err(|err| {
                debug!(visitor = visitor.name(), ?node_type, %err, "visitor failed");
            })?;
            if !signal.is_retain() {
                trace!(visitor = visitor.name(), ?node_type, ?phase, "rewrite");
                return Ok(signal.normalize());
            }
        }
        Ok(Signal::Retain)
    }

    /// The scope inside `node` and the scope at its position, creating an
    /// empty scope for scope-introducing nodes the binder has never seen.
    fn scope_of(&mut self, node: &Node) -> (ScopeId, ScopeId) {
        let parent = self.ancestors.last().copied();
        let current = parent.map_or(self.cx.scopes.root(), |a| a.scope);
        let outer = match parent {
            Some(a) if a.field.is_some_and(|f| uses_outer_scope(a.node_type, f)) => a.outer_scope,
            _ => current,
        };
        let owner = parent.and_then(|a| a.field.map(|f| (a.node_type, f)));
        let inner = match scope_kind_of(node, owner) {
            Some(kind) => match self.cx.scopes.scope_for_node(node.id) {
                Some(scope) => scope,
                None => {
                    debug!(?kind, node = node.id.0, "created scope for synthesized node");
                    self.cx.scopes.create_scope(kind, Some(outer), node.id)
                }
            },
            None => outer,
        };
        (inner, outer)
    }

    fn check_shape(&self, slot: SlotKind, produced: usize) -> Result<(), CompileError> {
        let ok = match slot {
            SlotKind::Required => produced == 1,
            SlotKind::Optional => produced <= 1,
            SlotKind::List => true,
        };
        if ok {
            return Ok(());
        }
        let parent = self.ancestors.last();
        Err(CompileError::InvalidReplacement {
            parent: parent.map(|a| a.node_type),
            field: parent.and_then(|a| a.field),
            slot,
            produced,
        })
    }

    fn enter_slot(&mut self, field: Field) {
        if let Some(frame) = self.ancestors.last_mut() {
            frame.field = Some(field);
        }
    }
}

impl ChildMapper for Traversal<'_, '_> {
    type Error = CompileError;

    fn one(&mut self, field: Field, child: Node) -> Result<Node, CompileError> {
        self.enter_slot(field);
        let mut out = self.visit(child, SlotKind::Required)?;
        match (out.pop(), out.is_empty()) {
            (Some(node), true) => Ok(node),
            (node, _) => Err(CompileError::InvalidReplacement {
                parent: self.ancestors.last().map(|a| a.node_type),
                field: Some(field),
                slot: SlotKind::Required,
                produced: out.len() + usize::from(node.is_some()),
            }),
        }
    }

    fn opt(&mut self, field: Field, child: Option<Node>) -> Result<Option<Node>, CompileError> {
        let Some(child) = child else {
            return Ok(None);
        };
        self.enter_slot(field);
        let mut out = self.visit(child, SlotKind::Optional)?;
        match out.len() {
            0 | 1 => Ok(out.pop()),
            produced => Err(CompileError::InvalidReplacement {
                parent: self.ancestors.last().map(|a| a.node_type),
                field: Some(field),
                slot: SlotKind::Optional,
                produced,
            }),
        }
    }

    fn list(&mut self, field: Field, children: Vec<Node>) -> Result<Vec<Node>, CompileError> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            self.enter_slot(field);
            out.extend(self.visit(child, SlotKind::List)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../tests/traverse.rs"]
mod tests;

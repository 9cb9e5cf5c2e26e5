//! Visitor results.

use kiln_ast::Node;
use smallvec::SmallVec;

/// What a visitor asks the engine to do with the node it was handed.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    /// Keep the node.
    Retain,
    /// Put these nodes in its place. More than one node is only legal in a
    /// list slot; an empty replacement is the same as [`Signal::Remove`].
    Replace(SmallVec<[Node; 1]>),
    /// Drop the node. Only legal in an optional or list slot.
    Remove,
}

impl Signal {
    pub fn replace(node: Node) -> Signal {
        Signal::Replace(smallvec::smallvec![node])
    }

    pub fn replace_many(nodes: impl IntoIterator<Item = Node>) -> Signal {
        Signal::Replace(nodes.into_iter().collect()).normalize()
    }

    pub fn is_retain(&self) -> bool {
        matches!(self, Signal::Retain)
    }

    /// Fold an empty replacement into `Remove`.
    pub fn normalize(self) -> Signal {
        match self {
            Signal::Replace(nodes) if nodes.is_empty() => Signal::Remove,
            other => other,
        }
    }

    /// The nodes that end up in the slot, given the node the signal was
    /// returned for.
    pub fn into_nodes(self, original: Node) -> SmallVec<[Node; 1]> {
        match self {
            Signal::Retain => smallvec::smallvec![original],
            Signal::Replace(nodes) => nodes,
            Signal::Remove => SmallVec::new(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/signal.rs"]
mod tests;

//! The visitor protocol.

use kiln_ast::NodeType;

use crate::error::CompileError;
use crate::path::Path;
use crate::signal::Signal;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the node's children are walked.
    Enter,
    /// After the node's children were walked and the node rebuilt.
    Exit,
}

/// One `(node type, phase)` pair a visitor wants to be called for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interest {
    pub node_type: NodeType,
    pub phase: Phase,
}

impl Interest {
    pub const fn enter(node_type: NodeType) -> Interest {
        Interest {
            node_type,
            phase: Phase::Enter,
        }
    }

    pub const fn exit(node_type: NodeType) -> Interest {
        Interest {
            node_type,
            phase: Phase::Exit,
        }
    }
}

/// A pass.
///
/// Visitors are stateless: anything a visitor needs to remember between
/// callbacks lives in the context's visitor state store, keyed by the
/// visitor's name and a boundary node. The engine only calls `enter` and
/// `exit` for node types listed in [`interests`](Visitor::interests).
pub trait Visitor {
    /// Stable name, used for state keys, logging and error attribution.
    fn name(&self) -> &'static str;

    fn interests(&self) -> &'static [Interest];

    fn enter(&self, _path: &mut Path<'_>) -> Result<Signal, CompileError> {
        Ok(Signal::Retain)
    }

    fn exit(&self, _path: &mut Path<'_>) -> Result<Signal, CompileError> {
        Ok(Signal::Retain)
    }
}

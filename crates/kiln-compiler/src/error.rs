//! Fatal engine errors.
//!
//! A `CompileError` aborts the run for one compilation unit. Problems in the
//! source being compiled are never reported this way; they go to the
//! diagnostics sink and the run continues.

use kiln_ast::{Field, NodeType, SlotKind};
use kiln_binder::MissingBindingError;
use thiserror::Error;

use crate::pipeline::Stage;
use crate::visitor::Phase;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    MissingBinding(#[from] MissingBindingError),

    /// A visitor returned a replacement the slot cannot hold.
    #[error("{produced} node(s) cannot replace a {slot:?} child in `{field:?}` of a {parent:?}")]
    InvalidReplacement {
        parent: Option<NodeType>,
        field: Option<Field>,
        slot: SlotKind,
        produced: usize,
    },

    /// A visitor rejected its input. Fatal to the run, attributed to the
    /// visitor.
    #[error("{visitor}: {message}")]
    Pass {
        visitor: &'static str,
        message: String,
    },

    #[error("internal invariant violated: {0}")]
    Invariant(String),

    #[error(
        "visitors `{first}` and `{second}` both handle {node_type:?} on {phase:?} in the {stage} stage"
    )]
    OverlappingVisitors {
        stage: Stage,
        node_type: NodeType,
        phase: Phase,
        first: &'static str,
        second: &'static str,
    },

    #[error("the {0} stage requires bundle options")]
    MissingBundleOptions(Stage),

    #[error("traversal exceeded the maximum depth of {0}")]
    DepthExceeded(u32),

    #[error("more than {limit} consecutive replacements of one {node_type:?}")]
    ReplacementChain { node_type: NodeType, limit: u32 },
}

impl CompileError {
    pub fn pass(visitor: &'static str, message: impl Into<String>) -> Self {
        CompileError::Pass {
            visitor,
            message: message.into(),
        }
    }
}

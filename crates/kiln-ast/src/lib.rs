//! Syntax tree data model for the kiln transform engine.
//!
//! Trees are produced by an external parser and are treated as values: a pass
//! never edits a node in place, it builds a new node and hands it to the
//! traversal engine, which splices it into the tree.
//!
//! - [`Node`] / [`NodeKind`]: the tagged tree
//! - [`NodeId`]: node identity, used for visited tracking and scope lookup
//! - [`NodeType`] / [`Field`]: fieldless discriminants used by dispatch tables
//!   and child slots
//! - [`ChildMapper`]: the protocol the engine uses to rewrite children

pub mod builders;
pub mod children;
pub mod node;
pub mod node_type;
pub mod ops;

pub use children::{ChildMapper, SlotKind};
pub use node::{
    Class, Function, MemberProperty, MethodKind, Node, NodeId, NodeKind, SourceType, VariableKind,
};
pub use node_type::{Field, NodeType};
pub use ops::{AssignmentOperator, BinaryOperator, LogicalOperator, UnaryOperator, UpdateOperator};

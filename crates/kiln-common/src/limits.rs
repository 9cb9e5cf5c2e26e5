//! Centralized limits and thresholds for the transform engine.
//!
//! Passes are allowed to hand the traversal engine replacement nodes which it
//! then walks again. A buggy pass can therefore make the engine recurse or
//! loop forever. These limits turn such bugs into fatal errors instead of a
//! stack overflow or a hang.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth the traversal engine will descend into.
///
/// Each nested node adds a frame to the call stack. Real-world sources rarely
/// exceed a depth of a few hundred; generated code with pathological nesting
/// is rejected rather than overflowing the stack.
pub const MAX_TRAVERSAL_DEPTH: u32 = 1_000;

/// Maximum depth of nested `reduce_signal` traversals.
///
/// A visitor that calls `reduce_signal` from a visitor that was itself started
/// by `reduce_signal` is legal, but nesting is expected to stay shallow.
pub const MAX_NESTED_TRAVERSALS: u32 = 16;

// =============================================================================
// Operation Count Limits
// =============================================================================

/// Maximum number of consecutive single-node replacements at one position.
///
/// An enter-phase `Replace` with one node is walked again, so two visitors
/// that keep rewriting each other's output never terminate. The engine gives
/// up after this many rewrites of the same slot.
pub const MAX_REPLACEMENT_CHAIN: u32 = 64;

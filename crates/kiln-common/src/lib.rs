//! Common types and utilities for the kiln transform engine.
//!
//! This crate provides foundational types used across all kiln crates:
//! - Source spans (`Span`)
//! - Opaque module identifiers (`ModuleId`)
//! - Structured diagnostics and the sink they are reported to
//! - Comment records and their identities
//! - Engine limits and thresholds

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Module identifiers handed out by the external resolver
pub mod module_id;
pub use module_id::ModuleId;

// Centralized limits and thresholds
pub mod limits;

// Comment records attached to trees
pub mod comments;
pub use comments::{Comment, CommentId, CommentKind};

// Diagnostics - structured error/warning records
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticDescription, DiagnosticMessage, DiagnosticSink,
    Diagnostics, diagnostic_codes, format_message,
};

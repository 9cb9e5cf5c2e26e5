//! Comment records.
//!
//! Comments are not tree nodes. The parser collects them into records that the
//! program root owns, and nodes refer to their leading comments by id. Passes
//! synthesize comments through the comment registry, which deduplicates by id
//! so that injecting the same comment twice updates the first record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::span::Span;

/// Stable identity of a comment.
///
/// Parsed comments get ids derived from their position; synthesized comments
/// pick a descriptive id (e.g. `bundle:header`) so that re-injection replaces.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id used for comments that came from the source text.
    pub fn from_span(span: Span) -> Self {
        Self(format!("src:{}:{}", span.start, span.end))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
}

/// A comment attached to a tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub kind: CommentKind,
    /// Comment text without the delimiters.
    pub value: String,
    /// `None` for synthesized comments.
    pub span: Option<Span>,
}

impl Comment {
    /// Create a synthesized block comment.
    pub fn block(id: impl Into<String>, value: impl Into<String>) -> Self {
        Comment {
            id: CommentId::new(id),
            kind: CommentKind::Block,
            value: value.into(),
            span: None,
        }
    }

    /// Create a synthesized line comment.
    pub fn line(id: impl Into<String>, value: impl Into<String>) -> Self {
        Comment {
            id: CommentId::new(id),
            kind: CommentKind::Line,
            value: value.into(),
            span: None,
        }
    }

    /// Render the comment with its delimiters.
    pub fn to_source(&self) -> String {
        match self.kind {
            CommentKind::Line => format!("//{}", self.value),
            CommentKind::Block => format!("/*{}*/", self.value),
        }
    }
}

#[cfg(test)]
#[path = "../tests/comments.rs"]
mod tests;

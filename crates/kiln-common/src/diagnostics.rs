//! Structured diagnostics.
//!
//! Source-level problems found by passes (a `const enum`, an import the
//! bundler cannot resolve, ...) are reported here instead of aborting the
//! run. Every diagnostic carries a code from the message table in
//! [`data`], a category and an optional span into the source file.

use serde::{Deserialize, Serialize};

use crate::span::Span;

pub mod data;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_messages {
    pub use super::data::diagnostic_messages::*;
}

pub mod diagnostic_codes {
    pub use super::data::diagnostic_codes::*;
}

/// Description handed to a [`DiagnosticSink`].
///
/// The sink decides the file the diagnostic belongs to; the reporter only
/// knows what went wrong and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticDescription {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub message_text: String,
}

impl DiagnosticDescription {
    /// Build a description from a message table entry and its arguments.
    pub fn from_message(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            category: message.category,
            code: message.code,
            message_text: format_message(message.message, args),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    /// `None` for whole-unit diagnostics.
    pub span: Option<Span>,
    pub message_text: String,
}

impl Diagnostic {
    pub fn error(
        file: impl Into<String>,
        span: Option<Span>,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            file: file.into(),
            span,
            message_text: message.into(),
        }
    }

    pub fn warning(
        file: impl Into<String>,
        span: Option<Span>,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            ..Self::error(file, span, message, code)
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

/// Destination of diagnostics raised while transforming one unit.
pub trait DiagnosticSink {
    fn add(&mut self, span: Option<Span>, description: DiagnosticDescription);
}

/// In-memory diagnostic collector for one compilation unit.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    file: String,
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            items: Vec::new(),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    /// Codes of all collected diagnostics, in report order.
    pub fn codes(&self) -> Vec<u32> {
        self.items.iter().map(|d| d.code).collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl DiagnosticSink for Diagnostics {
    fn add(&mut self, span: Option<Span>, description: DiagnosticDescription) {
        self.items.push(Diagnostic {
            category: description.category,
            code: description.code,
            file: self.file.clone(),
            span,
            message_text: description.message_text,
        });
    }
}

pub fn get_message(code: u32) -> Option<&'static DiagnosticMessage> {
    use self::data::DIAGNOSTIC_MESSAGES;
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_message(code).map(|m| m.message)
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
#[path = "../tests/diagnostics.rs"]
mod tests;

//! Tree printer.
//!
//! Serializes a tree to JavaScript text with a fixed layout: four-space
//! indentation, double-quoted strings, one statement per line and only the
//! parentheses that operator precedence requires. Production code generation
//! (source maps, original formatting) is not its job; it exists so that
//! transform output can be asserted on as text and inspected while debugging.

mod expressions;
mod helpers;
mod printer;
mod statements;

pub use helpers::{format_number, quote_string};
pub use printer::Printer;

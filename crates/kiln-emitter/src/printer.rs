//! Printer state and entry points.

use kiln_ast::{Node, NodeKind, NodeType};
use kiln_common::{Comment, CommentId};
use rustc_hash::{FxHashMap, FxHashSet};

/// Serializes trees to JavaScript text.
pub struct Printer<'a> {
    output: String,
    indent_level: u32,
    /// Comments of the program being printed, by id.
    comments: FxHashMap<&'a CommentId, &'a Comment>,
}

impl Default for Printer<'_> {
    fn default() -> Self {
        Printer::new()
    }
}

impl<'a> Printer<'a> {
    pub fn new() -> Self {
        Printer {
            output: String::new(),
            indent_level: 0,
            comments: FxHashMap::default(),
        }
    }

    /// Print any node: a program, a statement or an expression.
    pub fn emit_to_string(node: &Node) -> String {
        let mut printer = Printer::new();
        printer.emit(node);
        printer.finish()
    }

    pub fn emit(&mut self, node: &'a Node) {
        if let NodeKind::Program { comments, .. } = &node.kind {
            self.comments = comments.iter().map(|c| (&c.id, c)).collect();
        }
        if is_statement(node.node_type()) {
            self.emit_statement(node);
        } else {
            self.emit_expression(node);
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    // =========================================================================
    // Output primitives
    // =========================================================================

    pub(crate) fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub(crate) fn write_line(&mut self) {
        self.output.push('\n');
    }

    pub(crate) fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str("    ");
        }
    }

    pub(crate) fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    pub(crate) fn decrease_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Comments owned by the program that no node claims as leading comment.
    pub(crate) fn detached_comments(program: &'a Node) -> Vec<&'a Comment> {
        let NodeKind::Program { comments, .. } = &program.kind else {
            return Vec::new();
        };
        let mut claimed: FxHashSet<&CommentId> = FxHashSet::default();
        program.for_each_descendant(&mut |n| claimed.extend(n.leading_comments.iter()));
        comments.iter().filter(|c| !claimed.contains(&c.id)).collect()
    }

    pub(crate) fn emit_comment(&mut self, comment: &Comment) {
        self.write(&comment.to_source());
    }

    /// Leading comments of `node`, each on its own line at the current indent.
    pub(crate) fn emit_leading_comments(&mut self, node: &Node) {
        for id in &node.leading_comments {
            if let Some(comment) = self.comments.get(id).copied() {
                self.emit_comment(comment);
                self.write_line();
                self.write_indent();
            }
        }
    }
}

/// Node types printed in statement position.
pub(crate) fn is_statement(node_type: NodeType) -> bool {
    matches!(
        node_type,
        NodeType::Program
            | NodeType::BlockStatement
            | NodeType::EmptyStatement
            | NodeType::ExpressionStatement
            | NodeType::VariableDeclaration
            | NodeType::FunctionDeclaration
            | NodeType::ClassDeclaration
            | NodeType::ReturnStatement
            | NodeType::IfStatement
            | NodeType::ForStatement
            | NodeType::WhileStatement
            | NodeType::ThrowStatement
            | NodeType::TryStatement
            | NodeType::ImportDeclaration
            | NodeType::ExportNamedDeclaration
            | NodeType::ExportDefaultDeclaration
            | NodeType::ExportAllDeclaration
            | NodeType::EnumDeclaration
            | NodeType::TypeAliasDeclaration
    )
}

#[cfg(test)]
#[path = "../tests/printer.rs"]
mod tests;

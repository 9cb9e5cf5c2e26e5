//! Statement, declaration and module-item emission.

use kiln_ast::{Class, Function, MethodKind, Node, NodeKind, NodeType};

use crate::helpers::quote_string;
use crate::printer::Printer;

impl<'a> Printer<'a> {
    pub(crate) fn emit_statement(&mut self, node: &'a Node) {
        match &node.kind {
            NodeKind::Program {
                body, directives, ..
            } => self.emit_program(node, body, directives),
            NodeKind::BlockStatement { body } => self.emit_block(body),
            NodeKind::EmptyStatement => self.write(";"),
            NodeKind::ExpressionStatement { expression } => {
                if starts_ambiguously(expression) {
                    self.write("(");
                    self.emit_expression(expression);
                    self.write(")");
                } else {
                    self.emit_expression(expression);
                }
                self.write(";");
            }
            NodeKind::VariableDeclaration { .. } => {
                self.emit_variable_declaration(node);
                self.write(";");
            }
            NodeKind::FunctionDeclaration(func) => self.emit_function(func, true),
            NodeKind::ClassDeclaration(class) => self.emit_class(class),
            NodeKind::ReturnStatement { argument } => {
                self.write("return");
                if let Some(arg) = argument {
                    self.write(" ");
                    self.emit_expression(arg);
                }
                self.write(";");
            }
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                self.write("if (");
                self.emit_expression(test);
                self.write(") ");
                self.emit_statement(consequent);
                if let Some(alt) = alternate {
                    self.write(" else ");
                    self.emit_statement(alt);
                }
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                self.write("for (");
                if let Some(init) = init {
                    if init.node_type() == NodeType::VariableDeclaration {
                        self.emit_variable_declaration(init);
                    } else {
                        self.emit_expression(init);
                    }
                }
                self.write(";");
                if let Some(test) = test {
                    self.write(" ");
                    self.emit_expression(test);
                }
                self.write(";");
                if let Some(update) = update {
                    self.write(" ");
                    self.emit_expression(update);
                }
                self.write(") ");
                self.emit_statement(body);
            }
            NodeKind::WhileStatement { test, body } => {
                self.write("while (");
                self.emit_expression(test);
                self.write(") ");
                self.emit_statement(body);
            }
            NodeKind::ThrowStatement { argument } => {
                self.write("throw ");
                self.emit_expression(argument);
                self.write(";");
            }
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                self.write("try ");
                self.emit_statement(block);
                if let Some(handler) = handler {
                    if let NodeKind::CatchClause { param, body } = &handler.kind {
                        self.write(" catch ");
                        if let Some(param) = param {
                            self.write("(");
                            self.emit_pattern(param);
                            self.write(") ");
                        }
                        self.emit_statement(body);
                    }
                }
                if let Some(finalizer) = finalizer {
                    self.write(" finally ");
                    self.emit_statement(finalizer);
                }
            }
            NodeKind::ImportDeclaration { specifiers, source } => {
                self.emit_import(specifiers, source)
            }
            NodeKind::ExportNamedDeclaration {
                declaration,
                specifiers,
                source,
            } => {
                self.write("export ");
                if let Some(decl) = declaration {
                    self.emit_statement(decl);
                } else {
                    self.emit_export_specifiers(specifiers);
                    if let Some(source) = source {
                        self.write(" from ");
                        self.write(&quote_string(source));
                    }
                    self.write(";");
                }
            }
            NodeKind::ExportDefaultDeclaration { declaration } => {
                self.write("export default ");
                match declaration.node_type() {
                    NodeType::FunctionDeclaration | NodeType::ClassDeclaration => {
                        self.emit_statement(declaration)
                    }
                    _ => {
                        self.emit_expression(declaration);
                        self.write(";");
                    }
                }
            }
            NodeKind::ExportAllDeclaration { exported, source } => {
                self.write("export * ");
                if let Some(exported) = exported {
                    self.write("as ");
                    self.write(exported);
                    self.write(" ");
                }
                self.write("from ");
                self.write(&quote_string(source));
                self.write(";");
            }
            NodeKind::EnumDeclaration {
                id,
                members,
                is_const,
                declare,
            } => {
                if *declare {
                    self.write("declare ");
                }
                if *is_const {
                    self.write("const ");
                }
                self.write("enum ");
                self.emit_pattern(id);
                if members.is_empty() {
                    self.write(" {}");
                    return;
                }
                self.write(" { ");
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if let NodeKind::EnumMember { name, initializer } = &member.kind {
                        self.write(name);
                        if let Some(init) = initializer {
                            self.write(" = ");
                            self.emit_expression(init);
                        }
                    }
                }
                self.write(" }");
            }
            NodeKind::TypeAliasDeclaration { id, annotation } => {
                self.write("type ");
                self.emit_pattern(id);
                self.write(" = ");
                self.write(annotation);
                self.write(";");
            }
            _ => self.emit_expression(node),
        }
    }

    fn emit_program(&mut self, program: &'a Node, body: &'a [Node], directives: &[String]) {
        let mut first = true;
        let mut separate = |printer: &mut Self| {
            if !first {
                printer.write_line();
            }
            first = false;
        };
        for comment in Self::detached_comments(program) {
            separate(self);
            self.emit_comment(comment);
        }
        for directive in directives {
            separate(self);
            self.write(&quote_string(directive));
            self.write(";");
        }
        for stmt in body {
            separate(self);
            self.emit_leading_comments(stmt);
            self.emit_statement(stmt);
        }
    }

    pub(crate) fn emit_block(&mut self, body: &'a [Node]) {
        if body.is_empty() {
            self.write("{ }");
            return;
        }
        self.write("{");
        self.write_line();
        self.increase_indent();
        for stmt in body {
            self.write_indent();
            self.emit_leading_comments(stmt);
            self.emit_statement(stmt);
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }

    /// `kind a = 1, b` without the trailing semicolon.
    fn emit_variable_declaration(&mut self, node: &'a Node) {
        let NodeKind::VariableDeclaration { kind, declarations } = &node.kind else {
            return;
        };
        self.write(kind.as_str());
        self.write(" ");
        for (i, declarator) in declarations.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if let NodeKind::VariableDeclarator { id, init } = &declarator.kind {
                self.emit_pattern(id);
                if let Some(init) = init {
                    self.write(" = ");
                    self.emit_expression_in(init, crate::expressions::prec::ASSIGNMENT);
                }
            }
        }
    }

    pub(crate) fn emit_function(&mut self, func: &'a Function, with_keyword: bool) {
        if func.is_async {
            self.write("async ");
        }
        if with_keyword {
            self.write("function");
            if func.is_generator {
                self.write("*");
            }
            self.write(" ");
        }
        if let Some(id) = &func.id {
            self.emit_pattern(id);
        }
        self.emit_params(&func.params);
        self.write(" ");
        self.emit_statement(&func.body);
    }

    pub(crate) fn emit_params(&mut self, params: &'a [Node]) {
        self.write("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_pattern(param);
        }
        self.write(")");
    }

    pub(crate) fn emit_class(&mut self, class: &'a Class) {
        self.write("class");
        if let Some(id) = &class.id {
            self.write(" ");
            self.emit_pattern(id);
        }
        if let Some(sup) = &class.super_class {
            self.write(" extends ");
            self.emit_expression_in(sup, crate::expressions::prec::CALL);
        }
        if class.body.is_empty() {
            self.write(" { }");
            return;
        }
        self.write(" {");
        self.write_line();
        self.increase_indent();
        for member in &class.body {
            self.write_indent();
            self.emit_class_member(member);
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }

    pub(crate) fn emit_class_member(&mut self, member: &'a Node) {
        match &member.kind {
            NodeKind::ClassProperty {
                key,
                computed,
                value,
                is_static,
            } => {
                if *is_static {
                    self.write("static ");
                }
                self.emit_property_key(key, *computed);
                if let Some(value) = value {
                    self.write(" = ");
                    self.emit_expression_in(value, crate::expressions::prec::ASSIGNMENT);
                }
                self.write(";");
            }
            NodeKind::ClassMethod {
                kind,
                key,
                computed,
                is_static,
                params,
                body,
            } => {
                if *is_static {
                    self.write("static ");
                }
                self.emit_method(*kind, key, *computed, params, body);
            }
            _ => self.emit_statement(member),
        }
    }

    pub(crate) fn emit_method(
        &mut self,
        kind: MethodKind,
        key: &'a Node,
        computed: bool,
        params: &'a [Node],
        body: &'a Node,
    ) {
        match kind {
            MethodKind::Get => self.write("get "),
            MethodKind::Set => self.write("set "),
            MethodKind::Constructor | MethodKind::Method => {}
        }
        self.emit_property_key(key, computed);
        self.emit_params(params);
        self.write(" ");
        self.emit_statement(body);
    }

    fn emit_import(&mut self, specifiers: &'a [Node], source: &str) {
        self.write("import ");
        if specifiers.is_empty() {
            self.write(&quote_string(source));
            self.write(";");
            return;
        }
        let mut named = Vec::new();
        let mut wrote_clause = false;
        for spec in specifiers {
            match &spec.kind {
                NodeKind::ImportDefaultSpecifier { local } => {
                    self.emit_pattern(local);
                    wrote_clause = true;
                }
                NodeKind::ImportNamespaceSpecifier { local } => {
                    if wrote_clause {
                        self.write(", ");
                    }
                    self.write("* as ");
                    self.emit_pattern(local);
                    wrote_clause = true;
                }
                NodeKind::ImportSpecifier { imported, local } => named.push((imported, local)),
                _ => {}
            }
        }
        if !named.is_empty() {
            if wrote_clause {
                self.write(", ");
            }
            self.write("{ ");
            for (i, (imported, local)) in named.into_iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                if local.ident_name() != Some(imported.as_str()) {
                    self.write(imported);
                    self.write(" as ");
                }
                self.emit_pattern(local);
            }
            self.write(" }");
        }
        self.write(" from ");
        self.write(&quote_string(source));
        self.write(";");
    }

    fn emit_export_specifiers(&mut self, specifiers: &[Node]) {
        if specifiers.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{ ");
        for (i, spec) in specifiers.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if let NodeKind::ExportSpecifier { local, exported } = &spec.kind {
                self.write(local);
                if local != exported {
                    self.write(" as ");
                    self.write(exported);
                }
            }
        }
        self.write(" }");
    }

    /// Binding patterns in declaration position.
    pub(crate) fn emit_pattern(&mut self, pattern: &'a Node) {
        match &pattern.kind {
            NodeKind::BindingIdentifier { name } | NodeKind::Identifier { name } => {
                self.write(name)
            }
            NodeKind::AssignmentPattern { left, right } => {
                self.emit_pattern(left);
                self.write(" = ");
                self.emit_expression_in(right, crate::expressions::prec::ASSIGNMENT);
            }
            NodeKind::RestElement { argument } => {
                self.write("...");
                self.emit_pattern(argument);
            }
            NodeKind::ObjectPattern { properties } => {
                if properties.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{ ");
                for (i, prop) in properties.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_pattern(prop);
                }
                self.write(" }");
            }
            NodeKind::BindingProperty {
                key,
                computed,
                value,
            } => {
                let shorthand = !computed
                    && key.ident_name().is_some()
                    && key.ident_name() == value.ident_name();
                if shorthand {
                    self.emit_pattern(value);
                } else {
                    self.emit_property_key(key, *computed);
                    self.write(": ");
                    self.emit_pattern(value);
                }
            }
            NodeKind::ArrayPattern { elements } => {
                self.write("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_pattern(element);
                }
                self.write("]");
            }
            NodeKind::Elision => {}
            _ => self.emit_expression(pattern),
        }
    }
}

impl<'a> Printer<'a> {
    /// Nodes that only appear inside a parent construct, printed on their own.
    pub(crate) fn emit_fragment(&mut self, node: &'a Node) {
        match &node.kind {
            NodeKind::VariableDeclarator { id, init } => {
                self.emit_pattern(id);
                if let Some(init) = init {
                    self.write(" = ");
                    self.emit_expression_in(init, crate::expressions::prec::ASSIGNMENT);
                }
            }
            NodeKind::ClassProperty { .. } | NodeKind::ClassMethod { .. } => {
                self.emit_class_member(node)
            }
            NodeKind::CatchClause { param, body } => {
                self.write("catch ");
                if let Some(param) = param {
                    self.write("(");
                    self.emit_pattern(param);
                    self.write(") ");
                }
                self.emit_statement(body);
            }
            NodeKind::EnumMember { name, initializer } => {
                self.write(name);
                if let Some(init) = initializer {
                    self.write(" = ");
                    self.emit_expression(init);
                }
            }
            NodeKind::ImportSpecifier { imported, local } => {
                self.write(imported);
                self.write(" as ");
                self.emit_pattern(local);
            }
            NodeKind::ImportDefaultSpecifier { local } => self.emit_pattern(local),
            NodeKind::ImportNamespaceSpecifier { local } => {
                self.write("* as ");
                self.emit_pattern(local);
            }
            NodeKind::ExportSpecifier { local, exported } => {
                self.write(local);
                self.write(" as ");
                self.write(exported);
            }
            _ => {}
        }
    }
}

/// Expression statements that would parse as something else without
/// parentheses: object literals, function and class expressions.
fn starts_ambiguously(expr: &Node) -> bool {
    match &expr.kind {
        NodeKind::ObjectExpression { .. }
        | NodeKind::FunctionExpression(_)
        | NodeKind::ClassExpression(_) => true,
        NodeKind::CallExpression { callee, .. } => {
            // Function expression callees are always parenthesized.
            callee.node_type() != NodeType::FunctionExpression && starts_ambiguously(callee)
        }
        NodeKind::MemberExpression { object, .. } => starts_ambiguously(object),
        NodeKind::BinaryExpression { left, .. }
        | NodeKind::LogicalExpression { left, .. }
        | NodeKind::AssignmentExpression { left, .. } => starts_ambiguously(left),
        NodeKind::ConditionalExpression { test, .. } => starts_ambiguously(test),
        NodeKind::SequenceExpression { expressions } => {
            expressions.first().is_some_and(starts_ambiguously)
        }
        NodeKind::UpdateExpression {
            prefix: false,
            argument,
            ..
        } => starts_ambiguously(argument),
        NodeKind::TaggedTemplateExpression { tag, .. } => starts_ambiguously(tag),
        _ => false,
    }
}

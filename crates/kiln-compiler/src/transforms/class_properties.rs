//! Class fields.
//!
//! Instance fields become assignments to `this` in the constructor, after
//! every `super(...)` call when the class has a superclass. Static fields
//! become assignments to the class after its definition:
//!
//! ```text
//! class C extends D { x = 1; static y = 2; constructor() { super(); } }
//! ```
//! becomes
//! ```text
//! class C extends D { constructor() { super(); this.x = 1; } }
//! C.y = 2;
//! ```
//!
//! A computed instance key is evaluated once, into a temporary, before the
//! class. Constructor bindings that would capture a name used by a moved
//! initializer are renamed.
//!
//! An anonymous `export default class` has nothing to assign its statics
//! through and keeps them.

use std::convert::Infallible;

use kiln_ast::{ChildMapper, Class, Field, MethodKind, Node, NodeId, NodeKind, NodeType, SlotKind};
use kiln_binder::{BindingKind, ScopeId, ScopeKind, ScopeTree, collect_references, uses_outer_scope};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::CompileError;
use crate::path::Path;
use crate::signal::Signal;
use crate::transforms::util::{binds_this, replace_this};
use crate::visitor::{Interest, Visitor};

const NAME: &str = "class_properties";

pub struct ClassProperties;

/// `_key = <expr>` evaluations of an exported class, left for the export
/// to place in front of itself.
#[derive(Default)]
struct HoistedKeys(Vec<Node>);

impl Visitor for ClassProperties {
    fn name(&self) -> &'static str {
        NAME
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[
            Interest::exit(NodeType::ClassDeclaration),
            Interest::exit(NodeType::ClassExpression),
            Interest::exit(NodeType::ExportNamedDeclaration),
            Interest::exit(NodeType::ExportDefaultDeclaration),
        ];
        INTERESTS
    }

    fn exit(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        match &node.kind {
            NodeKind::ClassDeclaration(class) => {
                let lowered = lower_instance_fields(path, class)?;
                if path.slot() != SlotKind::List {
                    // Under an export, which moves the keys and statics out.
                    let Some(InstanceFields { class, keys }) = lowered else {
                        return Ok(Signal::Retain);
                    };
                    if !keys.is_empty() {
                        let export = path.parent().map_or(node.id, |p| p.id);
                        path.state_mut::<HoistedKeys>(NAME, export)?.0.extend(keys);
                    }
                    return Ok(Signal::replace(node.rebuild(NodeKind::ClassDeclaration(class))));
                }
                let (current, keys, changed) = match lowered {
                    Some(InstanceFields { class, keys }) => (class, keys, true),
                    None => (class.clone(), Vec::new(), false),
                };
                let mut out: Vec<Node> = keys.into_iter().map(Node::expr_stmt).collect();
                match class_name(&current) {
                    Some(name) if has_statics(&current) => {
                        let (class, statics) = take_statics(current, &|| Node::ident(name.clone()));
                        out.push(node.rebuild(NodeKind::ClassDeclaration(class)));
                        out.extend(statics.into_iter().map(Node::expr_stmt));
                    }
                    _ if !changed => return Ok(Signal::Retain),
                    _ => out.push(node.rebuild(NodeKind::ClassDeclaration(current))),
                }
                Ok(replacement(out))
            }
            NodeKind::ClassExpression(class) => {
                let (current, mut expressions) = match lower_instance_fields(path, class)? {
                    Some(InstanceFields { class, keys }) => (class, keys),
                    None if !has_statics(class) => return Ok(Signal::Retain),
                    None => (class.clone(), Vec::new()),
                };
                if !has_statics(&current) {
                    let class = node.rebuild(NodeKind::ClassExpression(current));
                    if expressions.is_empty() {
                        return Ok(Signal::replace(class));
                    }
                    expressions.push(class);
                } else {
                    let hint = class.id.as_deref().and_then(Node::ident_name).unwrap_or("class");
                    let temp = path.inject_binding(Some(hint), None)?;
                    let (class, statics) = take_statics(current, &|| temp.reference());
                    expressions.push(temp.assign(node.rebuild(NodeKind::ClassExpression(class))));
                    expressions.extend(statics);
                    expressions.push(temp.reference());
                }
                Ok(Signal::replace(node.derive(NodeKind::SequenceExpression { expressions })))
            }
            NodeKind::ExportNamedDeclaration {
                declaration: Some(declaration),
                specifiers,
                source,
            } => {
                let keys = path.take_state::<HoistedKeys>(NAME, node.id).unwrap_or_default();
                Ok(hoist_out_of_export(declaration, keys.0, |declaration| {
                    node.rebuild(NodeKind::ExportNamedDeclaration {
                        declaration: Some(Box::new(declaration)),
                        specifiers: specifiers.clone(),
                        source: source.clone(),
                    })
                }))
            }
            NodeKind::ExportDefaultDeclaration { declaration } => {
                let keys = path.take_state::<HoistedKeys>(NAME, node.id).unwrap_or_default();
                Ok(hoist_out_of_export(declaration, keys.0, |declaration| {
                    node.rebuild(NodeKind::ExportDefaultDeclaration {
                        declaration: Box::new(declaration),
                    })
                }))
            }
            _ => Ok(Signal::Retain),
        }
    }
}

fn replacement(mut out: Vec<Node>) -> Signal {
    match (out.pop(), out.is_empty()) {
        (Some(only), true) => Signal::replace(only),
        (Some(last), false) => {
            out.push(last);
            Signal::replace_many(out)
        }
        (None, _) => Signal::Retain,
    }
}

fn class_name(class: &Class) -> Option<String> {
    class.id.as_deref().and_then(Node::ident_name).map(str::to_string)
}

fn is_field(member: &Node, statics: bool) -> bool {
    matches!(member.kind, NodeKind::ClassProperty { is_static, .. } if is_static == statics)
}

fn has_statics(class: &Class) -> bool {
    class.body.iter().any(|m| is_field(m, true))
}

fn is_constructor(member: &Node) -> bool {
    matches!(
        member.kind,
        NodeKind::ClassMethod {
            kind: MethodKind::Constructor,
            ..
        }
    )
}

fn is_super_call(node: &Node) -> bool {
    matches!(&node.kind, NodeKind::CallExpression { callee, .. } if matches!(callee.kind, NodeKind::Super))
}

/// Keys whose evaluation has no effect and gives the same value every time.
fn is_constant_key(key: &Node) -> bool {
    matches!(
        key.kind,
        NodeKind::StringLiteral { .. }
            | NodeKind::NumericLiteral { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::NullLiteral
    )
}

/// `object.key = value` for a field, `void 0` when it has no initializer.
fn field_assignment(field: &Node, object: Node) -> Option<Node> {
    let NodeKind::ClassProperty {
        key,
        computed,
        value,
        ..
    } = &field.kind
    else {
        return None;
    };
    let target = match &key.kind {
        NodeKind::Identifier { name } if !computed => Node::member(object, name.clone()),
        _ => Node::computed_member(object, (**key).clone()),
    };
    let value = value.as_deref().cloned().unwrap_or_else(Node::void_0);
    Some(Node::assign(target, value).with_span(field.span))
}

/// Replace the computed key of an instance field with a temporary holding
/// its value, pushing the evaluation of the key onto `keys`.
fn hoist_key(path: &mut Path<'_>, field: &Node, keys: &mut Vec<Node>) -> Result<Node, CompileError> {
    let NodeKind::ClassProperty {
        key,
        computed: true,
        value,
        is_static,
    } = &field.kind
    else {
        return Ok(field.clone());
    };
    if is_constant_key(key) {
        return Ok(field.clone());
    }
    let temp = path.inject_binding(Some("key"), None)?;
    keys.push(temp.assign((**key).clone()));
    Ok(field.rebuild(NodeKind::ClassProperty {
        key: Box::new(temp.reference()),
        computed: true,
        value: value.clone(),
        is_static: *is_static,
    }))
}

/// Remove the static fields of `class`, returning the assignments that
/// replace them. `this` in their initializers refers to the class.
fn take_statics(class: Class, class_ref: &dyn Fn() -> Node) -> (Class, Vec<Node>) {
    let mut body = Vec::with_capacity(class.body.len());
    let mut assignments = Vec::new();
    for member in class.body {
        if !is_field(&member, true) {
            body.push(member);
            continue;
        }
        if let Some(assignment) = field_assignment(&member, class_ref()) {
            assignments.push(replace_this(assignment, class_ref));
        }
    }
    (Class { body, ..class }, assignments)
}

/// `export class C { [k] = 1; static x = 1 }` becomes `_key = k;`, then
/// `export class C {}` and `C.x = 1;`.
fn hoist_out_of_export(declaration: &Node, keys: Vec<Node>, wrap: impl FnOnce(Node) -> Node) -> Signal {
    let mut out: Vec<Node> = keys.into_iter().map(Node::expr_stmt).collect();
    let lowered = match &declaration.kind {
        NodeKind::ClassDeclaration(class) if has_statics(class) => class_name(class)
            .map(|name| take_statics(class.clone(), &|| Node::ident(name.clone()))),
        _ => None,
    };
    match lowered {
        Some((class, statics)) => {
            out.push(wrap(declaration.rebuild(NodeKind::ClassDeclaration(class))));
            out.extend(statics.into_iter().map(Node::expr_stmt));
        }
        None if out.is_empty() => return Signal::Retain,
        None => out.push(wrap(declaration.clone())),
    }
    Signal::replace_many(out)
}

/// A class whose instance fields moved into its constructor.
struct InstanceFields {
    class: Class,
    /// Evaluations of hoisted computed keys, in member order.
    keys: Vec<Node>,
}

/// Move instance fields into the constructor. `None` if the class has none.
fn lower_instance_fields(path: &mut Path<'_>, class: &Class) -> Result<Option<InstanceFields>, CompileError> {
    if !class.body.iter().any(|m| is_field(m, false)) {
        return Ok(None);
    }
    let mut keys = Vec::new();
    let mut assignments = Vec::new();
    let mut initializers = Vec::new();
    let mut body = Vec::with_capacity(class.body.len());
    for member in &class.body {
        if is_field(member, false) {
            if let NodeKind::ClassProperty { value: Some(value), .. } = &member.kind {
                initializers.push(&**value);
            }
            let member = hoist_key(path, member, &mut keys)?;
            assignments.extend(field_assignment(&member, Node::this()));
        } else {
            body.push(member.clone());
        }
    }

    let derived = class.super_class.is_some();
    let constructor = body.iter().position(is_constructor);
    if let Some(index) = constructor {
        body[index] = rename_shadowing_bindings(path, body[index].clone(), &initializers);
    }
    match constructor {
        Some(index) if derived => {
            let ctor = body[index].clone();
            let splicer = SuperCallSplicer {
                constructor: ctor.id,
                assignments,
            };
            let mut spliced = path
                .reduce_signal(ctor.clone(), Field::Members, &splicer)?
                .into_nodes(ctor);
            match (spliced.pop(), spliced.is_empty()) {
                (Some(ctor), true) => body[index] = ctor,
                _ => {
                    return Err(CompileError::pass(
                        NAME,
                        "splicing field assignments did not produce a single constructor",
                    ));
                }
            }
        }
        Some(index) => {
            let ctor = &body[index];
            let NodeKind::ClassMethod {
                kind,
                key,
                computed,
                is_static,
                params,
                body: ctor_body,
            } = &ctor.kind
            else {
                return Ok(None);
            };
            let mut statements: Vec<Node> = assignments.into_iter().map(Node::expr_stmt).collect();
            statements.extend(ctor_body.statements().unwrap_or_default().iter().cloned());
            let rebuilt = ctor.rebuild(NodeKind::ClassMethod {
                kind: *kind,
                key: key.clone(),
                computed: *computed,
                is_static: *is_static,
                params: params.clone(),
                body: Box::new(ctor_body.rebuild(NodeKind::BlockStatement { body: statements })),
            });
            body[index] = rebuilt;
        }
        None => {
            let ctor = synthesize_constructor(path, derived, assignments);
            body.insert(0, ctor);
        }
    }
    Ok(Some(InstanceFields {
        class: Class {
            body,
            ..class.clone()
        },
        keys,
    }))
}

/// Names an initializer reads from outside itself.
fn free_names(scopes: &ScopeTree, initializers: &[&Node]) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    for initializer in initializers {
        let mut own = FxHashSet::default();
        initializer.for_each_descendant(&mut |n| {
            own.extend(scopes.scope_for_node(n.id));
        });
        for reference in collect_references(initializer, scopes) {
            if !reference.declared_in.is_some_and(|scope| own.contains(&scope)) {
                names.insert(reference.name);
            }
        }
    }
    names
}

/// Whether `scope` is the constructor's scope or a block inside it.
fn in_constructor_scope(scopes: &ScopeTree, scope: ScopeId, constructor: ScopeId) -> bool {
    scopes
        .ancestors(scope)
        .take_while(|s| s.id == constructor || s.kind == ScopeKind::Block)
        .any(|s| s.id == constructor)
}

/// Rename the bindings of `ctor` that would capture a free name of one of
/// `initializers` once the initializers run inside it.
fn rename_shadowing_bindings(path: &mut Path<'_>, ctor: Node, initializers: &[&Node]) -> Node {
    let Some(ctor_scope) = path.scopes().scope_for_node(ctor.id) else {
        return ctor;
    };
    let scopes = path.scopes();
    let free = free_names(scopes, initializers);
    if free.is_empty() {
        return ctor;
    }
    let free = &free;
    let shadowing: Vec<(ScopeId, String)> = scopes
        .scopes()
        .filter(|scope| in_constructor_scope(scopes, scope.id, ctor_scope))
        .flat_map(|scope| {
            scope
                .bindings()
                .filter(move |b| free.contains(&b.name))
                .map(move |b| (scope.id, b.name.clone()))
        })
        .collect();

    let mut ctor = ctor;
    for (scope, name) in shadowing {
        let renamed = path.generate_uid(Some(&name));
        let outer = path.scopes().get(ctor_scope).and_then(|s| s.parent).unwrap_or(ctor_scope);
        let mut rename = RenameBinding {
            scopes: path.scopes(),
            target: scope,
            from: &name,
            to: &renamed,
            parent: NodeType::ClassDeclaration,
            static_key: false,
            current: outer,
            outer,
        };
        ctor = rename.visit(Field::Members, ctor);
        if let Some(binding) = path.scopes_mut().remove_binding(scope, &name) {
            path.scopes_mut()
                .add_binding(scope, renamed.clone(), binding.kind, binding.node);
        }
        debug!(from = %name, to = %renamed, "renamed constructor binding");
    }
    ctor
}

/// Renames every identifier that resolves to `from` declared in `target`.
#[derive(Clone, Copy)]
struct RenameBinding<'r> {
    scopes: &'r ScopeTree,
    target: ScopeId,
    from: &'r str,
    to: &'r str,
    parent: NodeType,
    static_key: bool,
    current: ScopeId,
    outer: ScopeId,
}

impl RenameBinding<'_> {
    fn visit(&self, field: Field, node: Node) -> Node {
        let scope = if uses_outer_scope(self.parent, field) {
            self.outer
        } else {
            self.current
        };
        let is_name = field == Field::Key && self.static_key;
        match &node.kind {
            NodeKind::Identifier { name } | NodeKind::BindingIdentifier { name }
                if name == self.from && !is_name =>
            {
                let resolved = self.scopes.get_binding(scope, name).map(|b| b.scope);
                if resolved != Some(self.target) {
                    return node;
                }
                let kind = match node.kind {
                    NodeKind::Identifier { .. } => NodeKind::Identifier {
                        name: self.to.to_string(),
                    },
                    _ => NodeKind::BindingIdentifier {
                        name: self.to.to_string(),
                    },
                };
                node.rebuild(kind)
            }
            _ => {
                let mut inner = RenameBinding {
                    parent: node.node_type(),
                    static_key: node.has_static_key(),
                    current: self.scopes.scope_for_node(node.id).unwrap_or(scope),
                    outer: scope,
                    ..*self
                };
                match node.map_children(&mut inner) {
                    Ok(node) => node,
                    Err(never) => match never {},
                }
            }
        }
    }
}

impl ChildMapper for RenameBinding<'_> {
    type Error = Infallible;

    fn one(&mut self, field: Field, child: Node) -> Result<Node, Infallible> {
        Ok(self.visit(field, child))
    }

    fn opt(&mut self, field: Field, child: Option<Node>) -> Result<Option<Node>, Infallible> {
        Ok(child.map(|c| self.visit(field, c)))
    }

    fn list(&mut self, field: Field, children: Vec<Node>) -> Result<Vec<Node>, Infallible> {
        Ok(children.into_iter().map(|c| self.visit(field, c)).collect())
    }
}

/// `constructor() { <assignments> }`, or for a derived class
/// `constructor(...args) { super(...args); <assignments> }`.
fn synthesize_constructor(path: &mut Path<'_>, derived: bool, assignments: Vec<Node>) -> Node {
    let mut params = Vec::new();
    let mut statements = Vec::new();
    let mut rest = None;
    if derived {
        let args = path.generate_uid(Some("args"));
        let binding = Node::binding(args.clone());
        rest = Some((args.clone(), binding.id));
        params.push(Node::new(NodeKind::RestElement {
            argument: Box::new(binding),
        }));
        statements.push(Node::expr_stmt(Node::call(
            Node::new(NodeKind::Super),
            vec![Node::spread(Node::ident(args))],
        )));
    }
    statements.extend(assignments.into_iter().map(Node::expr_stmt));

    let ctor = Node::new(NodeKind::ClassMethod {
        kind: MethodKind::Constructor,
        key: Box::new(Node::ident("constructor")),
        computed: false,
        is_static: false,
        params,
        body: Box::new(Node::block(statements)),
    });
    let scope = path.create_scope(ScopeKind::Function, ctor.id);
    if let Some((name, binding)) = rest {
        path.scopes_mut()
            .add_binding(scope, name, BindingKind::Parameter, binding);
    }
    debug!(derived, "synthesized constructor");
    ctor
}

/// Inserts field assignments after each `super(...)` call of one
/// constructor. Calls inside nested functions and classes belong to other
/// constructors and are left alone.
struct SuperCallSplicer {
    constructor: NodeId,
    assignments: Vec<Node>,
}

impl SuperCallSplicer {
    fn in_constructor(&self, path: &Path<'_>) -> bool {
        let frames = path.ancestors();
        let Some(start) = frames.iter().position(|a| a.id == self.constructor) else {
            return false;
        };
        !frames[start + 1..].iter().any(|a| binds_this(a.node_type))
    }

    fn copies(&self) -> impl Iterator<Item = Node> + '_ {
        self.assignments.iter().map(Node::duplicate)
    }
}

impl Visitor for SuperCallSplicer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[
            Interest::enter(NodeType::ExpressionStatement),
            Interest::enter(NodeType::CallExpression),
        ];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        let node = path.node();
        match &node.kind {
            NodeKind::ExpressionStatement { expression } => {
                if !is_super_call(expression) || !self.in_constructor(path) {
                    return Ok(Signal::Retain);
                }
                let mut out = vec![node.clone()];
                out.extend(self.copies().map(Node::expr_stmt));
                if path.slot() == SlotKind::List {
                    Ok(Signal::replace_many(out))
                } else {
                    Ok(Signal::replace(node.derive(NodeKind::BlockStatement { body: out })))
                }
            }
            NodeKind::CallExpression { .. } => {
                let statement = path
                    .parent()
                    .is_some_and(|p| p.node_type == NodeType::ExpressionStatement);
                if statement || !is_super_call(node) || !self.in_constructor(path) {
                    return Ok(Signal::Retain);
                }
                // `(super(), this.x = 1, this)` keeps the value of the call.
                let mut expressions = vec![node.clone()];
                expressions.extend(self.copies());
                expressions.push(Node::this());
                Ok(Signal::replace(node.derive(NodeKind::SequenceExpression { expressions })))
            }
            _ => Ok(Signal::Retain),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/class_properties.rs"]
mod tests;

use super::*;
use crate::ops::BinaryOperator;

/// Replaces every identifier named `from` with an identifier named `to`.
struct RenameIdents<'s> {
    from: &'s str,
    to: &'s str,
    seen: Vec<Field>,
}

impl ChildMapper for RenameIdents<'_> {
    type Error = Infallible;

    fn one(&mut self, field: Field, child: Node) -> Result<Node, Infallible> {
        self.seen.push(field);
        if child.is_identifier(self.from) {
            return Ok(child.rebuild(NodeKind::Identifier {
                name: self.to.to_string(),
            }));
        }
        child.map_children(self)
    }

    fn opt(&mut self, field: Field, child: Option<Node>) -> Result<Option<Node>, Infallible> {
        child.map(|c| self.one(field, c)).transpose()
    }

    fn list(&mut self, field: Field, children: Vec<Node>) -> Result<Vec<Node>, Infallible> {
        children.into_iter().map(|c| self.one(field, c)).collect()
    }
}

fn sample() -> Node {
    // if (a + b) { f(a, c.d); }
    Node::new(NodeKind::IfStatement {
        test: Box::new(Node::binary(
            BinaryOperator::Addition,
            Node::ident("a"),
            Node::ident("b"),
        )),
        consequent: Box::new(Node::block(vec![Node::expr_stmt(Node::call(
            Node::ident("f"),
            vec![Node::ident("a"), Node::member(Node::ident("c"), "d")],
        ))])),
        alternate: None,
    })
}

#[test]
fn test_children_are_in_source_order() {
    let node = sample();
    let fields: Vec<Field> = node.children().iter().map(|(f, _)| *f).collect();
    assert_eq!(fields, vec![Field::Test, Field::Consequent]);

    let call = Node::call(Node::ident("f"), vec![Node::ident("x"), Node::ident("y")]);
    let names: Vec<&str> = call
        .children()
        .iter()
        .filter_map(|(_, n)| n.ident_name())
        .collect();
    assert_eq!(names, vec!["f", "x", "y"]);
}

#[test]
fn test_map_children_keeps_parent_identity() {
    let node = sample();
    let id = node.id;
    let mut mapper = RenameIdents {
        from: "a",
        to: "z",
        seen: Vec::new(),
    };
    let rebuilt = node.map_children(&mut mapper).unwrap();
    assert_eq!(rebuilt.id, id);

    let mut names = Vec::new();
    rebuilt.for_each_descendant(&mut |n| {
        if let Some(name) = n.ident_name() {
            names.push(name.to_string());
        }
    });
    assert_eq!(names, vec!["z", "b", "f", "z", "c"]);
    assert_eq!(mapper.seen.first(), Some(&Field::Test));
}

#[test]
fn test_duplicate_assigns_fresh_ids_everywhere() {
    let node = sample();
    let copy = node.duplicate();
    assert_eq!(node, copy);

    let mut original_ids = Vec::new();
    node.for_each_descendant(&mut |n| original_ids.push(n.id));
    let mut copy_ids = Vec::new();
    copy.for_each_descendant(&mut |n| copy_ids.push(n.id));

    assert_eq!(original_ids.len(), copy_ids.len());
    for id in &copy_ids {
        assert!(!original_ids.contains(id));
    }
}

#[test]
fn test_computed_member_property_is_a_child() {
    let node = Node::computed_member(Node::ident("o"), Node::ident("k"));
    let fields: Vec<Field> = node.children().iter().map(|(f, _)| *f).collect();
    assert_eq!(fields, vec![Field::Object, Field::Property]);

    let stat = Node::member(Node::ident("o"), "k");
    assert_eq!(stat.children().len(), 1);
}

#[test]
fn test_any_descendant() {
    let node = sample();
    assert!(node.any_descendant(&mut |n| n.is_identifier("d") || n.is_identifier("c")));
    assert!(!node.any_descendant(&mut |n| matches!(n.kind, NodeKind::This)));
}

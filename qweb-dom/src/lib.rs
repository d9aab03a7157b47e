pub mod bdom;
pub mod block;
pub mod document;
pub mod host;

pub use bdom::{BDom, ContractViolation};
pub use block::{Block, ChoiceBlock, MultiBlock, Shape, ShapeNode, StaticBlock};
pub use document::{Document, Mutation, NodeId, NodeKind};
pub use host::Host;

pub fn el(tag: impl Into<String>, attrs: &[(&str, &str)], children: Vec<ShapeNode>) -> ShapeNode {
    ShapeNode::Element {
        tag: tag.into(),
        attrs: attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        children,
    }
}

pub fn text(t: impl Into<String>) -> ShapeNode {
    ShapeNode::Text { data: t.into() }
}

pub fn comment(t: impl Into<String>) -> ShapeNode {
    ShapeNode::Comment { data: t.into() }
}

pub fn text_slot(index: usize) -> ShapeNode {
    ShapeNode::TextSlot { index }
}

pub fn child_slot(index: usize) -> ShapeNode {
    ShapeNode::ChildSlot { index }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_counts_slots() {
        let shape = Shape::new(el(
            "div",
            &[("class", "app")],
            vec![text("hello"), text_slot(0), el("span", &[], vec![text_slot(1)]), child_slot(0)],
        ));
        assert_eq!(shape.text_slots(), 2);
        assert_eq!(shape.child_slots(), 1);
        if let ShapeNode::Element { tag, attrs, children } = shape.root() {
            assert_eq!(tag, "div");
            assert_eq!(attrs[0], ("class".to_string(), "app".to_string()));
            assert_eq!(children.len(), 4);
        } else {
            panic!("expected element");
        }
    }
}

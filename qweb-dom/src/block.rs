use std::rc::Rc;

use log::trace;
use serde::Serialize;

use crate::bdom::ContractViolation;
use crate::host::Host;

/// A node of a static shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<ShapeNode>,
    },
    Text {
        data: String,
    },
    Comment {
        data: String,
    },
    /// Dynamic text, filled from the block's `texts[index]`.
    TextSlot {
        index: usize,
    },
    /// Position of a nested block (a conditional group). Only meaningful
    /// inside an element.
    ChildSlot {
        index: usize,
    },
}

/// The build-once part of a block: fixed tags, attributes and text, with
/// numbered holes for the values that change between renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shape {
    root: ShapeNode,
    text_slots: usize,
    child_slots: usize,
}

impl Shape {
    pub fn new(root: ShapeNode) -> Self {
        let (mut text_slots, mut child_slots) = (0, 0);
        count_slots(&root, &mut text_slots, &mut child_slots);
        Self {
            root,
            text_slots,
            child_slots,
        }
    }

    pub fn root(&self) -> &ShapeNode {
        &self.root
    }

    pub fn text_slots(&self) -> usize {
        self.text_slots
    }

    pub fn child_slots(&self) -> usize {
        self.child_slots
    }
}

fn count_slots(node: &ShapeNode, texts: &mut usize, children: &mut usize) {
    match node {
        ShapeNode::Element { children: kids, .. } => {
            for kid in kids {
                count_slots(kid, texts, children);
            }
        }
        ShapeNode::TextSlot { .. } => *texts += 1,
        ShapeNode::ChildSlot { .. } => *children += 1,
        ShapeNode::Text { .. } | ShapeNode::Comment { .. } => {}
    }
}

/// Runtime node of a block tree.
#[derive(Debug)]
pub enum Block<H: Host> {
    Static(StaticBlock<H>),
    Multi(MultiBlock<H>),
    Choice(ChoiceBlock<H>),
}

impl<H: Host> Block<H> {
    /// Create host nodes and insert them into `parent` before `reference`.
    pub(crate) fn mount(&mut self, host: &H, parent: &H::Node, reference: Option<&H::Node>) {
        match self {
            Block::Static(b) => b.mount(host, parent, reference),
            Block::Multi(b) => b.mount(host, parent, reference),
            Block::Choice(b) => b.mount(host, parent, reference),
        }
    }

    pub(crate) fn patch(&mut self, host: &H, next: Block<H>) -> Result<(), ContractViolation> {
        match (self, next) {
            (Block::Static(a), Block::Static(b)) => a.patch(host, b),
            (Block::Multi(a), Block::Multi(b)) => a.patch(host, b),
            (Block::Choice(a), Block::Choice(b)) => a.patch(host, b),
            _ => Err(ContractViolation::IncompatibleTree),
        }
    }

    pub(crate) fn remove(&mut self, host: &H) {
        match self {
            Block::Static(b) => b.remove(host),
            Block::Multi(b) => b.remove(host),
            Block::Choice(b) => b.remove(host),
        }
    }
}

#[derive(Debug)]
struct ShellNodes<H: Host> {
    root: H::Node,
    texts: Vec<H::Node>,
}

/// A shape instance: shared shell plus this render's slot values.
#[derive(Debug)]
pub struct StaticBlock<H: Host> {
    shape: Rc<Shape>,
    texts: Vec<String>,
    children: Vec<Block<H>>,
    nodes: Option<ShellNodes<H>>,
}

impl<H: Host> StaticBlock<H> {
    pub fn new(shape: Rc<Shape>, texts: Vec<String>, children: Vec<Block<H>>) -> Self {
        debug_assert_eq!(shape.text_slots(), texts.len());
        debug_assert_eq!(shape.child_slots(), children.len());
        Self {
            shape,
            texts,
            children,
            nodes: None,
        }
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    fn mount(&mut self, host: &H, parent: &H::Node, reference: Option<&H::Node>) {
        let shape = Rc::clone(&self.shape);
        let mut text_nodes = vec![None; self.texts.len()];
        let root = self.build(host, shape.root(), &mut text_nodes);
        host.insert_before(parent, &root, reference);
        self.nodes = Some(ShellNodes {
            root,
            texts: text_nodes.into_iter().flatten().collect(),
        });
    }

    fn build(
        &mut self,
        host: &H,
        node: &ShapeNode,
        text_nodes: &mut [Option<H::Node>],
    ) -> H::Node {
        match node {
            ShapeNode::Element {
                tag,
                attrs,
                children,
            } => {
                let el = host.create_element(tag);
                for (name, value) in attrs {
                    host.set_attribute(&el, name, value);
                }
                for child in children {
                    if let ShapeNode::ChildSlot { index } = child {
                        if let Some(block) = self.children.get_mut(*index) {
                            block.mount(host, &el, None);
                        }
                    } else {
                        let n = self.build(host, child, text_nodes);
                        host.insert_before(&el, &n, None);
                    }
                }
                el
            }
            ShapeNode::Text { data } => host.create_text(data),
            ShapeNode::Comment { data } => host.create_comment(data),
            ShapeNode::TextSlot { index } => {
                let value = self.texts.get(*index).map(String::as_str).unwrap_or("");
                let n = host.create_text(value);
                if let Some(slot) = text_nodes.get_mut(*index) {
                    *slot = Some(n.clone());
                }
                n
            }
            // a child slot outside an element has nowhere to mount
            ShapeNode::ChildSlot { .. } => host.create_text(""),
        }
    }

    fn patch(&mut self, host: &H, next: StaticBlock<H>) -> Result<(), ContractViolation> {
        let Some(nodes) = &self.nodes else {
            return Err(ContractViolation::NotMounted);
        };
        if !Rc::ptr_eq(&self.shape, &next.shape) && self.shape != next.shape {
            return self.replace(host, next);
        }
        for (i, value) in next.texts.into_iter().enumerate() {
            if self.texts[i] != value {
                trace!("text slot {i}: {:?} -> {:?}", self.texts[i], value);
                host.set_text(&nodes.texts[i], &value);
                self.texts[i] = value;
            }
        }
        for (child, next_child) in self.children.iter_mut().zip(next.children) {
            child.patch(host, next_child)?;
        }
        Ok(())
    }

    fn replace(&mut self, host: &H, mut next: StaticBlock<H>) -> Result<(), ContractViolation> {
        let root = match &self.nodes {
            Some(nodes) => nodes.root.clone(),
            None => return Err(ContractViolation::NotMounted),
        };
        let parent = host.parent(&root).ok_or(ContractViolation::NotMounted)?;
        next.mount(host, &parent, Some(&root));
        self.remove(host);
        *self = next;
        Ok(())
    }

    fn remove(&mut self, host: &H) {
        // child blocks live inside the root element and leave with it
        if let Some(nodes) = self.nodes.take() {
            host.remove(&nodes.root);
        }
    }
}

/// An ordered run of sibling blocks (multiple roots, multi-node bodies).
#[derive(Debug)]
pub struct MultiBlock<H: Host> {
    children: Vec<Block<H>>,
}

impl<H: Host> MultiBlock<H> {
    pub fn new(children: Vec<Block<H>>) -> Self {
        Self { children }
    }

    fn mount(&mut self, host: &H, parent: &H::Node, reference: Option<&H::Node>) {
        for child in &mut self.children {
            child.mount(host, parent, reference);
        }
    }

    fn patch(&mut self, host: &H, next: MultiBlock<H>) -> Result<(), ContractViolation> {
        if self.children.len() != next.children.len() {
            return Err(ContractViolation::IncompatibleTree);
        }
        for (child, next_child) in self.children.iter_mut().zip(next.children) {
            child.patch(host, next_child)?;
        }
        Ok(())
    }

    fn remove(&mut self, host: &H) {
        for child in &mut self.children {
            child.remove(host);
        }
    }
}

/// A conditional group: at most one selected branch, followed by an empty
/// anchor text node that pins the group's position in its parent.
#[derive(Debug)]
pub struct ChoiceBlock<H: Host> {
    selected: Option<(usize, Box<Block<H>>)>,
    anchor: Option<H::Node>,
}

impl<H: Host> ChoiceBlock<H> {
    /// `selected` is the index of the chosen branch and its rendered body.
    pub fn new(selected: Option<(usize, Block<H>)>) -> Self {
        Self {
            selected: selected.map(|(i, body)| (i, Box::new(body))),
            anchor: None,
        }
    }

    pub fn selected_branch(&self) -> Option<usize> {
        self.selected.as_ref().map(|(i, _)| *i)
    }

    fn mount(&mut self, host: &H, parent: &H::Node, reference: Option<&H::Node>) {
        if let Some((_, body)) = &mut self.selected {
            body.mount(host, parent, reference);
        }
        let anchor = host.create_text("");
        host.insert_before(parent, &anchor, reference);
        self.anchor = Some(anchor);
    }

    fn patch(&mut self, host: &H, next: ChoiceBlock<H>) -> Result<(), ContractViolation> {
        let Some(anchor) = self.anchor.clone() else {
            return Err(ContractViolation::NotMounted);
        };
        match (&mut self.selected, next.selected) {
            (Some((current, body)), Some((incoming, next_body))) if *current == incoming => {
                body.patch(host, *next_body)
            }
            (selected, incoming) => {
                trace!(
                    "branch {:?} -> {:?}",
                    selected.as_ref().map(|(i, _)| *i),
                    incoming.as_ref().map(|(i, _)| *i)
                );
                if let Some((_, mut old)) = selected.take() {
                    old.remove(host);
                }
                if let Some((i, mut body)) = incoming {
                    let parent = host.parent(&anchor).ok_or(ContractViolation::NotMounted)?;
                    body.mount(host, &parent, Some(&anchor));
                    *selected = Some((i, body));
                }
                Ok(())
            }
        }
    }

    fn remove(&mut self, host: &H) {
        if let Some((_, body)) = &mut self.selected {
            body.remove(host);
        }
        if let Some(anchor) = self.anchor.take() {
            host.remove(&anchor);
        }
    }
}

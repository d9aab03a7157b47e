use std::cell::RefCell;

use crate::host::Host;

/// Handle to a node of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A detached root that serialises only its children (a test fixture).
    Root,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

/// One recorded change to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Insert { parent: NodeId, node: NodeId },
    Remove { parent: NodeId, node: NodeId },
    SetText { node: NodeId },
    SetAttribute { node: NodeId, name: String },
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory tree implementing [`Host`].
///
/// Nodes live in an arena and are never freed; removal only detaches.
/// Every structural or data change is appended to a mutation journal.
#[derive(Debug, Default)]
pub struct Document {
    nodes: RefCell<Vec<NodeData>>,
    journal: RefCell<Vec<Mutation>>,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh detached root to mount into.
    pub fn create_container(&self) -> NodeId {
        self.alloc(NodeKind::Root)
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.borrow().get(node.0).map(|n| n.kind.clone())
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .borrow()
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Character data of a text or comment node.
    pub fn text(&self, node: NodeId) -> Option<String> {
        match self.kind(node)? {
            NodeKind::Text(s) | NodeKind::Comment(s) => Some(s),
            _ => None,
        }
    }

    /// Drain the mutation journal.
    pub fn take_mutations(&self) -> Vec<Mutation> {
        std::mem::take(&mut *self.journal.borrow_mut())
    }

    /// HTML serialisation of the children of `node`.
    pub fn inner_html(&self, node: NodeId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        if let Some(data) = nodes.get(node.0) {
            for child in &data.children {
                serialize(&nodes, *child, &mut out);
            }
        }
        out
    }

    /// HTML serialisation of `node` itself.
    pub fn outer_html(&self, node: NodeId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        serialize(&nodes, node, &mut out);
        out
    }

    fn alloc(&self, kind: NodeKind) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(nodes.len() - 1)
    }

    fn record(&self, mutation: Mutation) {
        self.journal.borrow_mut().push(mutation);
    }

    fn detach(nodes: &mut [NodeData], node: NodeId) -> Option<NodeId> {
        let parent = nodes.get_mut(node.0)?.parent.take()?;
        if let Some(p) = nodes.get_mut(parent.0) {
            p.children.retain(|c| *c != node);
        }
        Some(parent)
    }
}

impl Host for Document {
    type Node = NodeId;

    fn create_element(&self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element {
            tag: tag.to_string(),
            attrs: Vec::new(),
        })
    }

    fn create_text(&self, data: &str) -> NodeId {
        self.alloc(NodeKind::Text(data.to_string()))
    }

    fn create_comment(&self, data: &str) -> NodeId {
        self.alloc(NodeKind::Comment(data.to_string()))
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
        {
            let mut nodes = self.nodes.borrow_mut();
            let Some(NodeData {
                kind: NodeKind::Element { attrs, .. },
                ..
            }) = nodes.get_mut(element.0)
            else {
                return;
            };
            match attrs.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
        self.record(Mutation::SetAttribute {
            node: *element,
            name: name.to_string(),
        });
    }

    fn set_text(&self, node: &NodeId, data: &str) {
        {
            let mut nodes = self.nodes.borrow_mut();
            match nodes.get_mut(node.0).map(|n| &mut n.kind) {
                Some(NodeKind::Text(s)) | Some(NodeKind::Comment(s)) => *s = data.to_string(),
                _ => return,
            }
        }
        self.record(Mutation::SetText { node: *node });
    }

    fn insert_before(&self, parent: &NodeId, node: &NodeId, reference: Option<&NodeId>) {
        {
            let mut nodes = self.nodes.borrow_mut();
            if nodes.get(parent.0).is_none() || nodes.get(node.0).is_none() {
                return;
            }
            Self::detach(&mut nodes, *node);
            let siblings = &mut nodes[parent.0].children;
            let at = reference
                .and_then(|r| siblings.iter().position(|c| c == r))
                .unwrap_or(siblings.len());
            siblings.insert(at, *node);
            nodes[node.0].parent = Some(*parent);
        }
        self.record(Mutation::Insert {
            parent: *parent,
            node: *node,
        });
    }

    fn remove(&self, node: &NodeId) {
        let parent = Self::detach(&mut self.nodes.borrow_mut(), *node);
        if let Some(parent) = parent {
            self.record(Mutation::Remove {
                parent,
                node: *node,
            });
        }
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.borrow().get(node.0).and_then(|n| n.parent)
    }

    fn is_container(&self, node: &NodeId) -> bool {
        matches!(
            self.nodes.borrow().get(node.0).map(|n| &n.kind),
            Some(NodeKind::Root) | Some(NodeKind::Element { .. })
        )
    }
}

fn serialize(nodes: &[NodeData], id: NodeId, out: &mut String) {
    let Some(node) = nodes.get(id.0) else {
        return;
    };
    match &node.kind {
        NodeKind::Root => {
            for child in &node.children {
                serialize(nodes, *child, out);
            }
        }
        NodeKind::Element { tag, attrs } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return;
            }
            for child in &node.children {
                serialize(nodes, *child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeKind::Text(s) => escape_into(s, false, out),
        NodeKind::Comment(s) => {
            out.push_str("<!--");
            out.push_str(s);
            out.push_str("-->");
        }
    }
}

// HTML fragment serialisation rules: `&` and NBSP always, `"` in attribute
// mode, `<` and `>` in text mode.
fn escape_into(s: &str, attribute: bool, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

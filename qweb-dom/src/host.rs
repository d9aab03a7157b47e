use std::fmt;

/// The mutable-tree capability the block runtime writes into.
///
/// Implementations hand out cheap node handles and mutate through `&self`
/// (a browser document, or the in-memory [`Document`](crate::Document)).
/// The runtime only ever touches nodes it created itself, plus the
/// container passed to `mount`.
pub trait Host {
    type Node: Clone + PartialEq + fmt::Debug;

    fn create_element(&self, tag: &str) -> Self::Node;
    fn create_text(&self, data: &str) -> Self::Node;
    fn create_comment(&self, data: &str) -> Self::Node;

    fn set_attribute(&self, element: &Self::Node, name: &str, value: &str);
    /// Replace the character data of a text node.
    fn set_text(&self, node: &Self::Node, data: &str);

    /// Insert `node` into `parent` before `reference`, or append it when
    /// `reference` is `None`.
    fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>);
    /// Detach `node` (and its subtree) from its parent.
    fn remove(&self, node: &Self::Node);

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    /// Whether `node` may receive children (elements and document roots).
    fn is_container(&self, node: &Self::Node) -> bool;
}

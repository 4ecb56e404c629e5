//! A minimal document tree: element nodes stored in an arena, addressed by [`NodeId`].
//!
//! The document always has a `body` element. Nodes are created detached and become part
//! of the page once appended somewhere under the body. Slots of removed nodes are reused,
//! so a [`NodeId`] must not be used after its node has been removed.

use crate::error::HierarchyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Document {
    pub fn new() -> Document {
        let mut document = Document {
            nodes: Vec::new(),
            free: Vec::new(),
            body: NodeId(0),
        };
        document.body = document.create_element("body");
        document
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let node = Node {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            parent: None,
        };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Number of node slots held by the arena, live or free.
    pub fn allocated(&self) -> usize {
        self.nodes.len()
    }

    /// Appends `child` as the last child of `parent`, detaching it from any previous parent.
    ///
    /// The body cannot be moved, and a node cannot be appended under itself or one of its
    /// descendants.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HierarchyError> {
        if child == self.body || self.is_inclusive_ancestor(child, parent) {
            return Err(HierarchyError {
                parent: self.tag(parent).to_owned(),
                child: self.tag(child).to_owned(),
            });
        }
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|id| *id != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Removes every descendant of `node` and frees their slots.
    pub fn remove_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.release(child);
        }
    }

    fn release(&mut self, node: NodeId) {
        self.remove_children(node);
        let slot = &mut self.nodes[node.0];
        slot.tag.clear();
        slot.attributes.clear();
        slot.text = None;
        slot.parent = None;
        self.free.push(node);
    }

    /// Replaces the content of `node` with plain text.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.remove_children(node);
        self.nodes[node.0].text = Some(text.into());
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let attributes = &mut self.nodes[node.0].attributes;
        match attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => attributes.push((name.to_owned(), value)),
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0]
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self, node: NodeId) -> impl Iterator<Item = (&str, &str)> {
        self.nodes[node.0]
            .attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.0].text.as_deref()
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Concatenated text of `node` and all its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let Some(text) = self.text(node) {
            out.push_str(text);
        }
        for child in self.children(node) {
            self.collect_text(*child, out);
        }
    }

    /// True when `node` is the body or a descendant of it.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.is_inclusive_ancestor(self.body, node)
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// First attached element with the given tag, in document order.
    pub fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find(self.body, &|document, id| document.tag(id).eq_ignore_ascii_case(tag))
    }

    /// Attached element whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find(self.body, &|document, node| document.attribute(node, "id") == Some(id))
    }

    fn find(&self, from: NodeId, predicate: &dyn Fn(&Document, NodeId) -> bool) -> Option<NodeId> {
        if predicate(self, from) {
            return Some(from);
        }
        self.children(from)
            .iter()
            .find_map(|child| self.find(*child, predicate))
    }
}

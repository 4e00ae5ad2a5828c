//! DOM tree data structures.
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by [`NodeId`].
//! Detaching a node unlinks it from its parent but keeps the slot, so ids handed
//! out earlier never dangle.

mod serialize;
mod style;

pub use serialize::is_void_element;
pub use style::InlineStyle;

/// ID used to address nodes in the DOM arena.
pub type NodeId = usize;

/// Payload stored in each arena slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Doctype(String),
    Element(ElementData),
    Text(String),
    Comment(String),
}

/// Tag name plus attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(slot) = self
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            slot.1 = value.to_owned();
            return;
        }
        self.attrs
            .push((name.to_ascii_lowercase(), value.to_owned()));
    }

    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.attrs.len() != before
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|candidate| candidate == class)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable document tree rooted at a `Document` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Number of arena slots, detached nodes included.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(ElementData::new(tag)))
    }

    pub fn create_element_with_attrs(
        &mut self,
        tag: &str,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        let mut element = ElementData::new(tag);
        element.attrs = attrs;
        self.push(NodeData::Element(element))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_owned()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_owned()))
    }

    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Doctype(name.to_owned()))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child);
    }

    /// Inserts `child` at `index` among `parent`'s children, detaching it first.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if parent >= self.nodes.len() || child >= self.nodes.len() || child == parent {
            return;
        }
        if self.contains(child, parent) {
            return;
        }

        self.detach(child);
        let children = &mut self.nodes[parent].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child].parent = Some(parent);
    }

    /// Unlinks a node from its parent. The node keeps its own subtree.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        self.nodes[parent].children.retain(|child| *child != node);
        self.nodes[node].parent = None;
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|entry| entry.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|entry| entry.children.as_slice())
            .unwrap_or_default()
    }

    pub fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node).map(|entry| &entry.data)
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match self.data(node) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(node).map(|entry| &mut entry.data) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|element| element.tag.as_str())
    }

    pub fn is_tag(&self, node: NodeId, tag: &str) -> bool {
        self.tag_name(node) == Some(tag)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|element| element.attr(name))
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(element) = self.element_mut(node) else {
            return false;
        };
        element.set_attr(name, value);
        true
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> bool {
        self.element_mut(node)
            .is_some_and(|element| element.remove_attr(name))
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|element| element.has_class(class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> bool {
        let Some(element) = self.element_mut(node) else {
            return false;
        };
        if element.has_class(class) {
            return false;
        }

        let joined = match element.attr("class").map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };
        element.set_attr("class", &joined);
        true
    }

    /// Removes one class token, dropping the attribute once it is empty.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> bool {
        let Some(element) = self.element_mut(node) else {
            return false;
        };
        if !element.has_class(class) {
            return false;
        }

        let remaining = element
            .classes()
            .filter(|candidate| *candidate != class)
            .collect::<Vec<_>>()
            .join(" ");
        if remaining.is_empty() {
            element.remove_attr("class");
        } else {
            element.set_attr("class", &remaining);
        }
        true
    }

    pub fn inline_style(&self, node: NodeId) -> InlineStyle {
        self.attribute(node, "style")
            .map(InlineStyle::parse)
            .unwrap_or_default()
    }

    /// Writes the declarations back; an empty map removes the attribute.
    pub fn set_inline_style(&mut self, node: NodeId, style: &InlineStyle) -> bool {
        if style.is_empty() {
            self.remove_attribute(node, "style");
            return self.element(node).is_some();
        }
        self.set_attribute(node, "style", &style.to_css_text())
    }

    /// Pre-order walk below `node`, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        let mut stack = self.children(node).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(node),
        }
    }

    /// Attached elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(Self::ROOT)
            .filter(move |node| self.element(*node).is_some())
    }

    /// Inclusive containment check.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|candidate| candidate == ancestor)
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        node < self.nodes.len() && self.contains(Self::ROOT, node)
    }

    pub fn doctype(&self) -> Option<NodeId> {
        self.children(Self::ROOT)
            .iter()
            .copied()
            .find(|node| matches!(self.data(*node), Some(NodeData::Doctype(_))))
    }

    pub fn document_element(&self) -> Option<NodeId> {
        self.children(Self::ROOT)
            .iter()
            .copied()
            .find(|node| self.element(*node).is_some())
    }

    pub fn head(&self) -> Option<NodeId> {
        self.child_element(self.document_element()?, "head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.child_element(self.document_element()?, "body")
    }

    pub fn child_element(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|node| self.is_tag(*node, tag))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .find(|node| self.attribute(*node, "id") == Some(id))
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.elements().filter(|node| self.is_tag(*node, tag)).collect()
    }

    /// Concatenated text of the node's own text children.
    pub fn direct_text(&self, node: NodeId) -> String {
        self.children(node)
            .iter()
            .filter_map(|child| match self.data(*child) {
                Some(NodeData::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replaces every direct text child with a single text node, keeping element children.
    pub fn replace_direct_text(&mut self, node: NodeId, text: &str) -> bool {
        if self.element(node).is_none() {
            return false;
        }

        let text_children = self
            .children(node)
            .iter()
            .copied()
            .filter(|child| matches!(self.data(*child), Some(NodeData::Text(_))))
            .collect::<Vec<_>>();
        let position = text_children
            .first()
            .and_then(|first| self.children(node).iter().position(|child| child == first))
            .unwrap_or(0);

        for child in text_children {
            self.detach(child);
        }
        if !text.is_empty() {
            let replacement = self.create_text(text);
            self.insert_child(node, position, replacement);
        }
        true
    }

    /// Text of every descendant text node in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        self.descendants(node)
            .filter_map(|child| match self.data(child) {
                Some(NodeData::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn title(&self) -> Option<String> {
        let title = self.elements().find(|node| self.is_tag(*node, "title"))?;
        let collapsed = self
            .text_content(title)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        (!collapsed.is_empty()).then_some(collapsed)
    }
}

/// Pre-order iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(node).iter().rev().copied());
        Some(node)
    }
}

/// Parent chain iterator returned by [`Document::ancestors`].
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = self.doc.parent(node);
        Some(node)
    }
}

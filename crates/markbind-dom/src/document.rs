#![forbid(unsafe_code)]

//! Node arena, tree mutation, attributes, and descendant queries.

use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;

use crate::event::{Event, Listener, RegisteredListener, same_listener};
use crate::markup;
use crate::observer::ObserverSlot;
use crate::{DomError, NodeId, Result};

/// What a node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with a lowercase tag name and attributes in source order.
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    /// A text run.
    Text(String),
}

struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
    listeners: Vec<RegisteredListener>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            kind,
            listeners: Vec::new(),
        }
    }
}

/// Owner of every node, listener, and observer registration.
///
/// A fresh document holds a single connected `body` element. Nodes created
/// with [`Document::create_element`] start detached and become connected
/// once inserted under `body`.
pub struct Document {
    nodes: Vec<NodeData>,
    body: NodeId,
    values: AHashMap<NodeId, String>,
    next_listener_id: u64,
    pub(crate) observers: Vec<ObserverSlot>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("body", &self.body)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only `body`.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            body: NodeId(0),
            values: AHashMap::new(),
            next_listener_id: 0,
            observers: Vec::new(),
        };
        doc.body = doc.create_element("body");
        doc
    }

    /// The connected root element.
    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Whether `node` belongs to this document.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    fn node(&self, node: NodeId) -> Result<&NodeData> {
        self.nodes.get(node.0).ok_or(DomError::UnknownNode(node))
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut NodeData> {
        self.nodes.get_mut(node.0).ok_or(DomError::UnknownNode(node))
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    /// Create a detached element. The tag name is lowercased.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_owned()))
    }

    /// Node payload.
    pub fn kind(&self, node: NodeId) -> Result<&NodeKind> {
        Ok(&self.node(node)?.kind)
    }

    #[must_use]
    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Ok(NodeKind::Element { .. }))
    }

    #[must_use]
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match self.kind(node).ok()? {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).ok()?.parent
    }

    /// Children in order. Unknown nodes have none.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    #[must_use]
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Whether `node` is inside the tree rooted at `body`.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.is_inclusive_ancestor(self.body, node)
    }

    // --- attributes -------------------------------------------------------

    fn attributes_mut(&mut self, node: NodeId) -> Result<&mut Vec<(String, String)>> {
        match &mut self.node_mut(node)?.kind {
            NodeKind::Element { attributes, .. } => Ok(attributes),
            NodeKind::Text(_) => Err(DomError::NotAnElement(node)),
        }
    }

    /// Attributes in source order. Text and unknown nodes have none.
    #[must_use]
    pub fn attributes(&self, node: NodeId) -> &[(String, String)] {
        match self.kind(node) {
            Ok(NodeKind::Element { attributes, .. }) => attributes.as_slice(),
            _ => &[],
        }
    }

    /// Look up an attribute. Names match ASCII case-insensitively.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attributes(node)
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// Set or replace an attribute. Never produces a mutation record.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let attributes = self.attributes_mut(node)?;
        match attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => value.clone_into(existing),
            None => attributes.push((name, value.to_owned())),
        }
        Ok(())
    }

    /// Remove an attribute, returning whether it was present.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<bool> {
        let attributes = self.attributes_mut(node)?;
        let before = attributes.len();
        attributes.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        Ok(attributes.len() != before)
    }

    // --- form values ------------------------------------------------------

    /// Current value of a form control: the last [`Document::set_value`],
    /// falling back to the `value` attribute, then the empty string.
    #[must_use]
    pub fn value(&self, node: NodeId) -> &str {
        self.values
            .get(&node)
            .map(String::as_str)
            .or_else(|| self.attribute(node, "value"))
            .unwrap_or("")
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) -> Result<()> {
        if !self.is_element(node) {
            self.node(node)?;
            return Err(DomError::NotAnElement(node));
        }
        self.values.insert(node, value.to_owned());
        Ok(())
    }

    // --- tree mutation ----------------------------------------------------

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(child)?;
        if !matches!(self.node(parent)?.kind, NodeKind::Element { .. }) {
            return Err(DomError::NotAnElement(parent));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Unlink `child` from its parent, if any, recording the removal.
    fn detach(&mut self, child: NodeId) {
        let Some(old_parent) = self.nodes[child.0].parent.take() else {
            return;
        };
        self.nodes[old_parent.0].children.retain(|c| *c != child);
        self.record(old_parent, Vec::new(), vec![child]);
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(node)?);
        let index = siblings.iter().position(|c| *c == node)?;
        siblings.get(index + 1).copied()
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or last when `None`).
    ///
    /// Moving an attached node produces two records: its removal from the
    /// old parent, then its insertion.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        self.check_insert(parent, child)?;
        if let Some(reference) = reference {
            if self.node(reference)?.parent != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }
        let reference = if reference == Some(child) {
            self.next_sibling(child)
        } else {
            reference
        };

        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = reference
            .and_then(|r| children.iter().position(|c| *c == r))
            .unwrap_or(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.record(parent, vec![child], Vec::new());
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(())
    }

    /// Detach `node` from its parent. Already-detached nodes are left alone.
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        self.node(node)?;
        self.detach(node);
        Ok(())
    }

    /// Replace every child of `parent` with `new_children`.
    ///
    /// Records one removal record holding all former children, then one
    /// addition record holding the new ones (new children that were attached
    /// elsewhere also produce their own removal records first).
    pub fn replace_children(&mut self, parent: NodeId, new_children: &[NodeId]) -> Result<()> {
        if !matches!(self.node(parent)?.kind, NodeKind::Element { .. }) {
            return Err(DomError::NotAnElement(parent));
        }
        let mut incoming: Vec<NodeId> = Vec::with_capacity(new_children.len());
        for &child in new_children {
            if self.is_inclusive_ancestor(child, parent) {
                return Err(DomError::HierarchyRequest { parent, child });
            }
            self.node(child)?;
            if !incoming.contains(&child) {
                incoming.push(child);
            }
        }

        let old = std::mem::take(&mut self.nodes[parent.0].children);
        for &child in &old {
            self.nodes[child.0].parent = None;
        }
        if !old.is_empty() {
            self.record(parent, Vec::new(), old);
        }

        for &child in &incoming {
            self.detach(child);
            self.nodes[child.0].parent = Some(parent);
        }
        if !incoming.is_empty() {
            self.nodes[parent.0].children.clone_from(&incoming);
            self.record(parent, incoming, Vec::new());
        }
        Ok(())
    }

    /// Replace the children of `parent` with the parsed `markup` fragment,
    /// returning the new top-level nodes.
    pub fn set_inner_markup(&mut self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>> {
        if !self.is_element(parent) {
            self.node(parent)?;
            return Err(DomError::NotAnElement(parent));
        }
        let nodes = markup::parse_fragment(self, markup)?;
        self.replace_children(parent, &nodes)?;
        Ok(nodes)
    }

    /// Parse `markup` and append the fragment's top-level nodes to `parent`
    /// as a single insertion record.
    pub fn append_markup(&mut self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>> {
        if !self.is_element(parent) {
            self.node(parent)?;
            return Err(DomError::NotAnElement(parent));
        }
        let nodes = markup::parse_fragment(self, markup)?;
        if nodes.is_empty() {
            return Ok(nodes);
        }
        for &child in &nodes {
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0].children.extend_from_slice(&nodes);
        self.record(parent, nodes.clone(), Vec::new());
        Ok(nodes)
    }

    /// Concatenated text of `node` and its descendants.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        for id in self.inclusive_descendants(node) {
            if let NodeKind::Text(text) = &self.nodes[id.0].kind {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace the content of `node` with `text`.
    ///
    /// On a text node this rewrites its data (no record, character data is
    /// not observed). On an element it replaces the children with one text
    /// node, or with nothing when `text` is empty.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()> {
        if let NodeKind::Text(data) = &mut self.node_mut(node)?.kind {
            text.clone_into(data);
            return Ok(());
        }
        if text.is_empty() {
            return self.replace_children(node, &[]);
        }
        let text_node = self.create_text(text);
        self.replace_children(node, &[text_node])
    }

    // --- queries ----------------------------------------------------------

    /// `node` followed by all its descendants in document order.
    #[must_use]
    pub fn inclusive_descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(node) {
            return out;
        }
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    /// Descendants of `node` in document order, excluding `node`.
    #[must_use]
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut all = self.inclusive_descendants(node);
        if !all.is_empty() {
            all.remove(0);
        }
        all
    }

    /// `node` and its descendant elements carrying attribute `name`.
    #[must_use]
    pub fn query_attribute(&self, node: NodeId, name: &str) -> Vec<NodeId> {
        self.inclusive_descendants(node)
            .into_iter()
            .filter(|id| self.has_attribute(*id, name))
            .collect()
    }

    /// `node` and its descendant elements whose attribute `name` equals `value`.
    #[must_use]
    pub fn query_attribute_value(&self, node: NodeId, name: &str, value: &str) -> Vec<NodeId> {
        self.inclusive_descendants(node)
            .into_iter()
            .filter(|id| self.attribute(*id, name) == Some(value))
            .collect()
    }

    /// First connected element whose `id` attribute equals `id`.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_attribute_value(self.body, "id", id)
            .into_iter()
            .next()
    }

    /// First element with tag `tag` at or below `node`, in document order.
    #[must_use]
    pub fn first_by_tag(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        self.inclusive_descendants(node)
            .into_iter()
            .find(|id| self.tag_name(*id) == Some(tag))
    }

    // --- events -----------------------------------------------------------

    /// Register `listener` for `event_type` on `node`.
    ///
    /// Returns `false` when the same listener is already registered for the
    /// same type; nothing is added in that case.
    pub fn add_event_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        listener: Listener,
    ) -> Result<bool> {
        let id = self.next_listener_id;
        let data = self.node_mut(node)?;
        let duplicate = data
            .listeners
            .iter()
            .any(|l| l.event_type == event_type && same_listener(&l.listener, &listener));
        if duplicate {
            return Ok(false);
        }
        data.listeners.push(RegisteredListener {
            id,
            event_type: event_type.to_owned(),
            listener,
        });
        self.next_listener_id += 1;
        Ok(true)
    }

    /// Remove the registration whose listener is identical to `listener`.
    ///
    /// Returns whether anything was removed. A listener that was never added
    /// (or is a different callable wrapping the same code) is not found.
    pub fn remove_event_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        listener: &Listener,
    ) -> Result<bool> {
        let data = self.node_mut(node)?;
        let before = data.listeners.len();
        data.listeners
            .retain(|l| !(l.event_type == event_type && same_listener(&l.listener, listener)));
        Ok(data.listeners.len() != before)
    }

    /// Number of listeners registered on `node`, all event types.
    #[must_use]
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.node(node).map_or(0, |n| n.listeners.len())
    }

    /// Dispatch `event` at `target`, returning how many listeners ran.
    ///
    /// Listeners on `target` run in registration order; when the event
    /// bubbles, the ancestors' listeners follow, innermost first. Each node's
    /// listener list is snapshotted before its listeners run, and a listener
    /// removed by an earlier one in the same dispatch is skipped.
    pub fn dispatch_event(&mut self, target: NodeId, mut event: Event) -> Result<usize> {
        self.node(target)?;
        event.set_target(target);

        let mut path = vec![target];
        if event.bubbles() {
            let mut cursor = self.parent(target);
            while let Some(ancestor) = cursor {
                path.push(ancestor);
                cursor = self.parent(ancestor);
            }
        }

        let mut invoked = 0;
        for current in path {
            let snapshot: Vec<(u64, Listener)> = self.nodes[current.0]
                .listeners
                .iter()
                .filter(|l| l.event_type == event.event_type())
                .map(|l| (l.id, Rc::clone(&l.listener)))
                .collect();
            event.set_current_target(current);
            for (id, callback) in snapshot {
                let still_registered = self.nodes[current.0].listeners.iter().any(|l| l.id == id);
                if !still_registered {
                    continue;
                }
                callback(self, &event);
                invoked += 1;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            event_type = event.event_type(),
            target = target.index(),
            invoked,
            "event dispatched"
        );
        Ok(invoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener;
    use std::cell::Cell;

    fn tree() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.create_element("div");
        let a = doc.create_element("span");
        let b = doc.create_element("p");
        doc.append_child(doc.body(), root).unwrap();
        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();
        (doc, root, a, b)
    }

    #[test]
    fn append_moves_attached_node() {
        let (mut doc, root, a, b) = tree();
        doc.append_child(b, a).unwrap();
        assert_eq!(doc.children(root), &[b]);
        assert_eq!(doc.children(b), &[a]);
        assert_eq!(doc.parent(a), Some(b));
    }

    #[test]
    fn insert_before_reference() {
        let (mut doc, root, a, b) = tree();
        let c = doc.create_element("em");
        doc.insert_before(root, c, Some(b)).unwrap();
        assert_eq!(doc.children(root), &[a, c, b]);
        doc.insert_before(root, b, Some(a)).unwrap();
        assert_eq!(doc.children(root), &[b, a, c]);
    }

    #[test]
    fn insert_before_foreign_reference_fails() {
        let (mut doc, root, a, _) = tree();
        let stray = doc.create_element("i");
        let c = doc.create_element("em");
        assert_eq!(
            doc.insert_before(root, c, Some(stray)),
            Err(DomError::NotAChild {
                parent: root,
                child: stray
            })
        );
        assert_eq!(doc.parent(c), None);
        assert_eq!(doc.children(root)[0], a);
    }

    #[test]
    fn cycles_are_rejected() {
        let (mut doc, root, a, _) = tree();
        assert_eq!(
            doc.append_child(a, root),
            Err(DomError::HierarchyRequest {
                parent: a,
                child: root
            })
        );
        assert_eq!(
            doc.append_child(root, root),
            Err(DomError::HierarchyRequest {
                parent: root,
                child: root
            })
        );
    }

    #[test]
    fn text_nodes_cannot_have_children() {
        let mut doc = Document::new();
        let text = doc.create_text("hi");
        let el = doc.create_element("b");
        assert_eq!(doc.append_child(text, el), Err(DomError::NotAnElement(text)));
        assert_eq!(
            doc.set_attribute(text, "x", "y"),
            Err(DomError::NotAnElement(text))
        );
    }

    #[test]
    fn remove_child_requires_parentage() {
        let (mut doc, root, a, b) = tree();
        assert_eq!(
            doc.remove_child(a, b),
            Err(DomError::NotAChild { parent: a, child: b })
        );
        doc.remove_child(root, a).unwrap();
        assert_eq!(doc.children(root), &[b]);
        // removed nodes stay addressable
        assert_eq!(doc.tag_name(a), Some("span"));
        assert!(!doc.is_connected(a));
        doc.remove(a).unwrap();
    }

    #[test]
    fn attributes_replace_in_place() {
        let mut doc = Document::new();
        let el = doc.create_element("DIV");
        assert_eq!(doc.tag_name(el), Some("div"));
        doc.set_attribute(el, "data-x", "1").unwrap();
        doc.set_attribute(el, "id", "main").unwrap();
        doc.set_attribute(el, "data-x", "2").unwrap();
        assert_eq!(
            doc.attributes(el),
            &[
                ("data-x".to_owned(), "2".to_owned()),
                ("id".to_owned(), "main".to_owned())
            ]
        );
        assert!(doc.remove_attribute(el, "data-x").unwrap());
        assert!(!doc.remove_attribute(el, "data-x").unwrap());
        assert!(!doc.has_attribute(el, "data-x"));
    }

    #[test]
    fn attribute_names_ignore_ascii_case() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        doc.set_attribute(el, "Data-Item-Target", "name").unwrap();
        assert_eq!(doc.attributes(el)[0].0, "data-item-target");
        assert_eq!(doc.attribute(el, "data-item-target"), Some("name"));
        assert_eq!(doc.attribute(el, "DATA-ITEM-TARGET"), Some("name"));

        let root = doc.body();
        doc.append_child(root, el).unwrap();
        assert_eq!(
            doc.query_attribute_value(root, "data-Item-target", "name"),
            vec![el]
        );

        assert!(doc.remove_attribute(el, "Data-Item-Target").unwrap());
        assert!(!doc.has_attribute(el, "data-item-target"));
        assert!(!doc.remove_attribute(el, "data-item-target").unwrap());
    }

    #[test]
    fn queries_include_root_in_document_order() {
        let (mut doc, root, a, b) = tree();
        let deep = doc.create_element("b");
        doc.append_child(a, deep).unwrap();
        doc.set_attribute(root, "data-k", "x").unwrap();
        doc.set_attribute(deep, "data-k", "y").unwrap();
        doc.set_attribute(b, "data-k", "x").unwrap();

        assert_eq!(doc.inclusive_descendants(root), vec![root, a, deep, b]);
        assert_eq!(doc.descendants(root), vec![a, deep, b]);
        assert_eq!(doc.query_attribute(root, "data-k"), vec![root, deep, b]);
        assert_eq!(doc.query_attribute_value(root, "data-k", "x"), vec![root, b]);
        assert_eq!(doc.first_by_tag(root, "b"), Some(deep));
    }

    #[test]
    fn text_content_round_trip() {
        let (mut doc, root, a, b) = tree();
        doc.set_text_content(a, "hello ").unwrap();
        doc.set_text_content(b, "world").unwrap();
        assert_eq!(doc.text_content(root), "hello world");
        doc.set_text_content(b, "").unwrap();
        assert!(doc.children(b).is_empty());
        assert_eq!(doc.text_content(root), "hello ");
    }

    #[test]
    fn value_falls_back_to_attribute() {
        let mut doc = Document::new();
        let input = doc.create_element("input");
        assert_eq!(doc.value(input), "");
        doc.set_attribute(input, "value", "seed").unwrap();
        assert_eq!(doc.value(input), "seed");
        doc.set_value(input, "typed").unwrap();
        assert_eq!(doc.value(input), "typed");
    }

    #[test]
    fn listener_identity_controls_removal() {
        let (mut doc, _, a, _) = tree();
        let hits = Rc::new(Cell::new(0));
        let counter = {
            let hits = Rc::clone(&hits);
            listener(move |_, _| hits.set(hits.get() + 1))
        };
        assert!(doc.add_event_listener(a, "click", Rc::clone(&counter)).unwrap());
        assert!(!doc.add_event_listener(a, "click", Rc::clone(&counter)).unwrap());
        assert_eq!(doc.listener_count(a), 1);

        // a different wrapper around the same behaviour is a different listener
        let lookalike = {
            let hits = Rc::clone(&hits);
            listener(move |_, _| hits.set(hits.get() + 1))
        };
        assert!(!doc.remove_event_listener(a, "click", &lookalike).unwrap());
        assert!(!doc.remove_event_listener(a, "input", &counter).unwrap());

        doc.dispatch_event(a, Event::new("click")).unwrap();
        assert_eq!(hits.get(), 1);

        assert!(doc.remove_event_listener(a, "click", &counter).unwrap());
        assert_eq!(doc.dispatch_event(a, Event::new("click")).unwrap(), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn bubbling_reaches_ancestors_only_when_requested() {
        let (mut doc, root, a, _) = tree();
        let seen = Rc::new(Cell::new(0));
        let on_root = {
            let seen = Rc::clone(&seen);
            listener(move |_, event: &Event| {
                assert_eq!(event.current_target(), Some(root));
                seen.set(seen.get() + 1);
            })
        };
        doc.add_event_listener(root, "click", on_root).unwrap();

        doc.dispatch_event(a, Event::new("click")).unwrap();
        assert_eq!(seen.get(), 0);
        doc.dispatch_event(a, Event::new("click").with_bubbles(true))
            .unwrap();
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn listener_removed_mid_dispatch_is_skipped() {
        let (mut doc, _, a, _) = tree();
        let second_ran = Rc::new(Cell::new(false));
        let second = {
            let second_ran = Rc::clone(&second_ran);
            listener(move |_, _| second_ran.set(true))
        };
        let first = {
            let second = Rc::clone(&second);
            listener(move |doc: &mut Document, event: &Event| {
                let target = event.target().unwrap();
                doc.remove_event_listener(target, "click", &second).unwrap();
            })
        };
        doc.add_event_listener(a, "click", first).unwrap();
        doc.add_event_listener(a, "click", second).unwrap();
        assert_eq!(doc.dispatch_event(a, Event::new("click")).unwrap(), 1);
        assert!(!second_ran.get());
    }

    #[test]
    fn unknown_nodes_are_reported() {
        let mut doc = Document::new();
        let ghost = NodeId(99);
        assert_eq!(doc.kind(ghost), Err(DomError::UnknownNode(ghost)));
        assert_eq!(
            doc.dispatch_event(ghost, Event::new("click")),
            Err(DomError::UnknownNode(ghost))
        );
        assert!(doc.children(ghost).is_empty());
        assert!(doc.inclusive_descendants(ghost).is_empty());
    }
}

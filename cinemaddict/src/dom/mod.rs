//! In-memory document: the attach/detach primitives views are built on.
//!
//! Node and listener ids are never reused, so operations on a node that has
//! already been removed are harmless no-ops. Removing a node frees its whole
//! subtree together with every listener registered on it.

mod capture;
mod markup;

pub use capture::KeyCapture;
pub use markup::{parse, Fragment};

use itertools::Itertools;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use crate::input::KeyEvent;
use markup::VOID_ELEMENTS;

const TEXT_TAG: &str = "#text";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Where `insert` places a node relative to the reference node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPosition {
    AfterBegin,
    BeforeEnd,
    AfterEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: EventKind,
    pub target: Option<NodeId>,
    pub key: Option<KeyEvent>,
}

pub type Listener = Rc<dyn Fn(&DomEvent)>;

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    text: String,
    value: String,
    checked: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenerTarget {
    Node(NodeId),
    Document,
}

struct ListenerEntry {
    target: ListenerTarget,
    kind: EventKind,
    handler: Listener,
}

/// Simple selector: optional tag name followed by any number of `.class`
/// parts, e.g. `.film-card__title` or `input.film-details__emoji-item`.
struct Selector<'a> {
    tag: Option<&'a str>,
    classes: Vec<&'a str>,
}

impl<'a> Selector<'a> {
    fn parse(selector: &'a str) -> Self {
        let mut parts = selector.split('.');
        let tag = parts.next().filter(|tag| !tag.is_empty());
        Self {
            tag,
            classes: parts.filter(|class| !class.is_empty()).collect(),
        }
    }

    fn matches(&self, node: &Node) -> bool {
        !node.is_text()
            && self.tag.map_or(true, |tag| node.tag == tag)
            && self
                .classes
                .iter()
                .all(|class| node.classes.iter().any(|c| c == class))
    }
}

#[derive(Default)]
struct Inner {
    nodes: HashMap<NodeId, Node>,
    listeners: BTreeMap<ListenerId, ListenerEntry>,
    next_node: u64,
    next_listener: u64,
}

impl Inner {
    fn alloc(&mut self, node: Node) -> NodeId {
        self.next_node += 1;
        let id = NodeId(self.next_node);
        self.nodes.insert(id, node);
        id
    }

    fn build(&mut self, fragment: &Fragment, parent: Option<NodeId>) -> NodeId {
        match fragment {
            Fragment::Text(text) => self.alloc(Node {
                tag: TEXT_TAG.to_string(),
                text: text.clone(),
                parent,
                ..Default::default()
            }),
            Fragment::Element {
                tag,
                attributes,
                children,
            } => {
                let mut node = Node {
                    tag: tag.clone(),
                    parent,
                    ..Default::default()
                };
                for (name, value) in attributes {
                    match name.as_str() {
                        "class" => {
                            node.classes = value.split_whitespace().map(str::to_string).collect();
                            continue;
                        }
                        "checked" => node.checked = true,
                        "value" => node.value = value.clone(),
                        _ => {}
                    }
                    node.attributes.push((name.clone(), value.clone()));
                }
                let id = self.alloc(node);
                let child_ids: Vec<NodeId> = children
                    .iter()
                    .map(|child| self.build(child, Some(id)))
                    .collect();
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.children = child_ids;
                }
                if tag == "textarea" {
                    let text = self.text_content(id);
                    if let Some(node) = self.nodes.get_mut(&id) {
                        node.value = text;
                    }
                }
                id
            }
        }
    }

    /// Preorder descendants, excluding `root` itself
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(&root)
            .map(|node| node.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                result.push(id);
                stack.extend(node.children.iter().rev());
            }
        }
        result
    }

    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.nodes.get(&node).and_then(|n| n.parent);
        while let Some(id) = current {
            result.push(id);
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        result
    }

    fn text_content(&self, root: NodeId) -> String {
        std::iter::once(root)
            .chain(self.descendants(root))
            .filter_map(|id| self.nodes.get(&id))
            .filter(|node| node.is_text())
            .map(|node| node.text.as_str())
            .join(" ")
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(&node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|child| *child != node);
        }
    }

    fn free_subtree(&mut self, root: NodeId) {
        let freed: HashSet<NodeId> = std::iter::once(root)
            .chain(self.descendants(root))
            .collect();
        for id in &freed {
            self.nodes.remove(id);
        }
        self.listeners.retain(|_, entry| match entry.target {
            ListenerTarget::Node(id) => !freed.contains(&id),
            ListenerTarget::Document => true,
        });
    }

    fn serialize(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if node.is_text() {
            out.push_str(&node.text);
            return;
        }
        out.push('<');
        out.push_str(&node.tag);
        if !node.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", node.classes.join(" ")));
        }
        for (name, value) in &node.attributes {
            if value.is_empty() {
                out.push_str(&format!(" {}", name));
            } else {
                out.push_str(&format!(" {}=\"{}\"", name, value));
            }
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&node.tag.as_str()) {
            return;
        }
        for child in &node.children {
            self.serialize(*child, out);
        }
        out.push_str(&format!("</{}>", node.tag));
    }
}

pub struct Document {
    inner: RefCell<Inner>,
    body: NodeId,
}

impl Document {
    pub fn new() -> Self {
        let mut inner = Inner::default();
        let body = inner.alloc(Node {
            tag: "body".to_string(),
            ..Default::default()
        });
        Self {
            inner: RefCell::new(inner),
            body,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Build a detached element from markup. Only the first top-level element
    /// is kept; markup without any element yields an empty `div`.
    pub fn create_element(&self, markup: &str) -> NodeId {
        let fragment = parse(markup)
            .into_iter()
            .find(|fragment| matches!(fragment, Fragment::Element { .. }))
            .unwrap_or_else(|| Fragment::Element {
                tag: "div".to_string(),
                attributes: Vec::new(),
                children: Vec::new(),
            });
        self.inner.borrow_mut().build(&fragment, None)
    }

    /// Attach `node` relative to `reference`. Returns false when either node
    /// is gone, when `AfterEnd` is used on a detached reference, or when the
    /// move would put a node inside itself.
    pub fn insert(&self, reference: NodeId, node: NodeId, position: RenderPosition) -> bool {
        let mut inner = self.inner.borrow_mut();
        if node == self.body || !inner.nodes.contains_key(&node) {
            return false;
        }
        let Some(reference_node) = inner.nodes.get(&reference) else {
            return false;
        };
        let parent = match position {
            RenderPosition::AfterBegin | RenderPosition::BeforeEnd => reference,
            RenderPosition::AfterEnd => match reference_node.parent {
                Some(parent) => parent,
                None => return false,
            },
        };
        if parent == node || inner.ancestors(parent).contains(&node) {
            return false;
        }

        inner.detach(node);
        let Some(siblings) = inner.nodes.get(&parent).map(|p| p.children.clone()) else {
            return false;
        };
        let index = match position {
            RenderPosition::AfterBegin => 0,
            RenderPosition::BeforeEnd => siblings.len(),
            RenderPosition::AfterEnd => siblings
                .iter()
                .position(|child| *child == reference)
                .map_or(siblings.len(), |i| i + 1),
        };
        if let Some(parent_node) = inner.nodes.get_mut(&parent) {
            parent_node.children.insert(index, node);
        }
        if let Some(node) = inner.nodes.get_mut(&node) {
            node.parent = Some(parent);
        }
        true
    }

    /// Put `new` where `old` sits and free `old`. Both must exist and `old`
    /// must be attached.
    pub fn replace(&self, new: NodeId, old: NodeId) -> bool {
        if new == old {
            return true;
        }
        let mut inner = self.inner.borrow_mut();
        if !inner.nodes.contains_key(&new) {
            return false;
        }
        let Some(parent) = inner.nodes.get(&old).and_then(|n| n.parent) else {
            return false;
        };
        if new == self.body || inner.ancestors(parent).contains(&new) || parent == new {
            return false;
        }
        inner.detach(new);
        if let Some(parent_node) = inner.nodes.get_mut(&parent) {
            if let Some(slot) = parent_node.children.iter_mut().find(|c| **c == old) {
                *slot = new;
            }
        }
        if let Some(node) = inner.nodes.get_mut(&new) {
            node.parent = Some(parent);
        }
        if let Some(node) = inner.nodes.get_mut(&old) {
            node.parent = None;
        }
        inner.free_subtree(old);
        true
    }

    /// Detach and free `node` with its subtree and listeners.
    pub fn remove(&self, node: NodeId) -> bool {
        if node == self.body {
            return false;
        }
        let mut inner = self.inner.borrow_mut();
        if !inner.nodes.contains_key(&node) {
            return false;
        }
        inner.detach(node);
        inner.free_subtree(node);
        true
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.borrow().nodes.contains_key(&node)
    }

    /// Whether `node` is reachable from the body
    pub fn is_connected(&self, node: NodeId) -> bool {
        node == self.body || self.inner.borrow().ancestors(node).contains(&self.body)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().nodes.get(&node).and_then(|n| n.parent)
    }

    /// Element children (text nodes skipped)
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        let inner = self.inner.borrow();
        inner
            .nodes
            .get(&node)
            .map(|n| {
                n.children
                    .iter()
                    .filter(|child| inner.nodes.get(child).is_some_and(|c| !c.is_text()))
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of live nodes, including the body and text nodes
    pub fn node_count(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.inner.borrow().nodes.get(&node).map(|n| n.tag.clone())
    }

    pub fn query_selector(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector);
        let inner = self.inner.borrow();
        inner
            .descendants(root)
            .into_iter()
            .find(|id| inner.nodes.get(id).is_some_and(|n| selector.matches(n)))
    }

    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let selector = Selector::parse(selector);
        let inner = self.inner.borrow();
        inner
            .descendants(root)
            .into_iter()
            .filter(|id| inner.nodes.get(id).is_some_and(|n| selector.matches(n)))
            .collect()
    }

    /// `node` itself or its nearest ancestor matching `selector`
    pub fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector);
        let inner = self.inner.borrow();
        std::iter::once(node)
            .chain(inner.ancestors(node))
            .find(|id| inner.nodes.get(id).is_some_and(|n| selector.matches(n)))
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .nodes
            .get(&node)
            .and_then(|n| n.attribute(name).map(str::to_string))
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.inner
            .borrow()
            .nodes
            .get(&node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    pub fn add_class(&self, node: NodeId, class: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(node) = inner.nodes.get_mut(&node) else {
            return false;
        };
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
        true
    }

    pub fn remove_class(&self, node: NodeId, class: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(node) = inner.nodes.get_mut(&node) else {
            return false;
        };
        let before = node.classes.len();
        node.classes.retain(|c| c != class);
        node.classes.len() != before
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.inner.borrow().text_content(node)
    }

    /// Replace all children of `node` with a single text node.
    pub fn set_text_content(&self, node: NodeId, text: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(children) = inner.nodes.get(&node).map(|n| n.children.clone()) else {
            return false;
        };
        for child in children {
            inner.detach(child);
            inner.free_subtree(child);
        }
        if !text.is_empty() {
            let text_node = inner.alloc(Node {
                tag: TEXT_TAG.to_string(),
                text: text.to_string(),
                parent: Some(node),
                ..Default::default()
            });
            if let Some(node) = inner.nodes.get_mut(&node) {
                node.children.push(text_node);
            }
        }
        true
    }

    /// Current form value of an input or textarea
    pub fn value(&self, node: NodeId) -> String {
        self.inner
            .borrow()
            .nodes
            .get(&node)
            .map(|n| n.value.clone())
            .unwrap_or_default()
    }

    pub fn set_value(&self, node: NodeId, value: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(node) = inner.nodes.get_mut(&node) else {
            return false;
        };
        node.value = value.to_string();
        true
    }

    pub fn is_checked(&self, node: NodeId) -> bool {
        self.inner
            .borrow()
            .nodes
            .get(&node)
            .is_some_and(|n| n.checked)
    }

    /// Set the checked state. Checking a radio button unchecks the other
    /// radios sharing its `name` within the same tree.
    pub fn set_checked(&self, node: NodeId, checked: bool) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(target) = inner.nodes.get(&node) else {
            return false;
        };
        let radio_group = (checked && target.attribute("type") == Some("radio"))
            .then(|| target.attribute("name").map(str::to_string))
            .flatten();

        if let Some(group) = radio_group {
            let root = inner.ancestors(node).last().copied().unwrap_or(node);
            for id in inner.descendants(root) {
                if let Some(other) = inner.nodes.get_mut(&id) {
                    if other.attribute("type") == Some("radio")
                        && other.attribute("name") == Some(group.as_str())
                    {
                        other.checked = false;
                    }
                }
            }
        }
        if let Some(target) = inner.nodes.get_mut(&node) {
            target.checked = checked;
        }
        true
    }

    /// Register a listener on `node`. Listeners on a node that no longer
    /// exists are dropped immediately.
    pub fn add_event_listener<F>(&self, node: NodeId, kind: EventKind, handler: F) -> ListenerId
    where
        F: Fn(&DomEvent) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        inner.next_listener += 1;
        let id = ListenerId(inner.next_listener);
        if inner.nodes.contains_key(&node) {
            inner.listeners.insert(
                id,
                ListenerEntry {
                    target: ListenerTarget::Node(node),
                    kind,
                    handler: Rc::new(handler),
                },
            );
        } else {
            tracing::trace!("Ignoring listener for removed node {:?}", node);
        }
        id
    }

    pub fn add_document_listener<F>(&self, kind: EventKind, handler: F) -> ListenerId
    where
        F: Fn(&DomEvent) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        inner.next_listener += 1;
        let id = ListenerId(inner.next_listener);
        inner.listeners.insert(
            id,
            ListenerEntry {
                target: ListenerTarget::Document,
                kind,
                handler: Rc::new(handler),
            },
        );
        id
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().listeners.remove(&id).is_some()
    }

    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow().listeners.contains_key(&id)
    }

    /// All registered listeners, node and document level
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn document_listener_count(&self) -> usize {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter(|entry| entry.target == ListenerTarget::Document)
            .count()
    }

    /// Dispatch a click on `target`, bubbling through its ancestors and, when
    /// the target is connected, the document.
    pub fn click(&self, target: NodeId) {
        self.dispatch(DomEvent {
            kind: EventKind::Click,
            target: Some(target),
            key: None,
        });
    }

    /// Dispatch a keydown to document-level listeners.
    pub fn key_down(&self, key: KeyEvent) {
        self.dispatch(DomEvent {
            kind: EventKind::KeyDown,
            target: None,
            key: Some(key),
        });
    }

    fn dispatch(&self, event: DomEvent) {
        let queue: Vec<(ListenerId, Listener)> = {
            let inner = self.inner.borrow();
            let mut path = Vec::new();
            let mut connected = event.target.is_none();
            if let Some(target) = event.target {
                if inner.nodes.contains_key(&target) {
                    path.push(ListenerTarget::Node(target));
                    for ancestor in inner.ancestors(target) {
                        connected |= ancestor == self.body;
                        path.push(ListenerTarget::Node(ancestor));
                    }
                    connected |= target == self.body;
                }
            }
            if connected {
                path.push(ListenerTarget::Document);
            }

            let mut queue = Vec::new();
            for target in path {
                for (id, entry) in &inner.listeners {
                    if entry.target == target && entry.kind == event.kind {
                        queue.push((*id, entry.handler.clone()));
                    }
                }
            }
            queue
        };

        for (id, handler) in queue {
            // Listeners removed by an earlier handler in this dispatch are skipped
            let registered = self.has_listener(id);
            if registered {
                handler(&event);
            }
        }
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.inner.borrow().serialize(node, &mut out);
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Document")
            .field("nodes", &inner.nodes.len())
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use std::cell::Cell;

    const CARD: &str = r#"<article class="film-card">
        <h3 class="film-card__title">Sagebrush Trail</h3>
        <form class="film-card__controls">
          <button class="film-card__controls-item film-card__controls-item--favorite">Favorite</button>
        </form>
      </article>"#;

    fn counter() -> (Rc<Cell<usize>>, impl Fn(&DomEvent) + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, move |_: &DomEvent| inner.set(inner.get() + 1))
    }

    #[test]
    fn test_create_and_query() {
        let doc = Document::new();
        let card = doc.create_element(CARD);

        let title = doc.query_selector(card, ".film-card__title").unwrap();
        assert_eq!(doc.text_content(title), "Sagebrush Trail");
        assert_eq!(doc.tag_name(title).as_deref(), Some("h3"));
        assert!(doc
            .query_selector(card, "button.film-card__controls-item--favorite")
            .is_some());
        assert!(doc.query_selector(card, ".film-card").is_none());
        assert!(!doc.is_connected(card));
    }

    #[test]
    fn test_insert_positions() {
        let doc = Document::new();
        let body = doc.body();
        let main = doc.create_element(r#"<main class="main"></main>"#);
        let footer = doc.create_element(r#"<footer class="footer"></footer>"#);
        doc.insert(body, main, RenderPosition::BeforeEnd);
        doc.insert(body, footer, RenderPosition::BeforeEnd);

        let nav = doc.create_element(r#"<nav class="main-navigation"></nav>"#);
        doc.insert(main, nav, RenderPosition::AfterBegin);
        let popup = doc.create_element(r#"<section class="film-details"></section>"#);
        doc.insert(footer, popup, RenderPosition::AfterEnd);

        assert_eq!(doc.children(body), vec![main, footer, popup]);
        assert_eq!(doc.children(main), vec![nav]);
        assert!(doc.is_connected(popup));

        let detached = doc.create_element("<div></div>");
        assert!(!doc.insert(detached, popup, RenderPosition::AfterEnd));
    }

    #[test]
    fn test_remove_frees_subtree_listeners() {
        let doc = Document::new();
        let card = doc.create_element(CARD);
        doc.insert(doc.body(), card, RenderPosition::BeforeEnd);
        let title = doc.query_selector(card, ".film-card__title").unwrap();
        let (_, handler) = counter();
        doc.add_event_listener(title, EventKind::Click, handler);
        assert_eq!(doc.listener_count(), 1);

        assert!(doc.remove(card));

        assert_eq!(doc.listener_count(), 0);
        assert!(!doc.contains(title));
        assert!(doc.children(doc.body()).is_empty());
        // Stale ids are no-ops
        assert!(!doc.remove(card));
        assert!(!doc.add_class(card, "shake"));
        assert!(!doc.remove_class(card, "shake"));
    }

    #[test]
    fn test_replace_keeps_position() {
        let doc = Document::new();
        let body = doc.body();
        let first = doc.create_element("<p>first</p>");
        let old = doc.create_element("<p>old</p>");
        doc.insert(body, first, RenderPosition::BeforeEnd);
        doc.insert(body, old, RenderPosition::BeforeEnd);
        let (_, handler) = counter();
        doc.add_event_listener(old, EventKind::Click, handler);

        let new = doc.create_element("<p>new</p>");
        assert!(doc.replace(new, old));

        assert_eq!(doc.children(body), vec![first, new]);
        assert!(!doc.contains(old));
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_click_bubbles_to_ancestors_and_document() {
        let doc = Document::new();
        let card = doc.create_element(CARD);
        doc.insert(doc.body(), card, RenderPosition::BeforeEnd);
        let button = doc
            .query_selector(card, ".film-card__controls-item--favorite")
            .unwrap();

        let (on_button, handler) = counter();
        doc.add_event_listener(button, EventKind::Click, handler);
        let (on_card, handler) = counter();
        doc.add_event_listener(card, EventKind::Click, handler);
        let (on_document, handler) = counter();
        doc.add_document_listener(EventKind::Click, handler);

        doc.click(button);

        assert_eq!(on_button.get(), 1);
        assert_eq!(on_card.get(), 1);
        assert_eq!(on_document.get(), 1);
    }

    #[test]
    fn test_listener_removed_during_dispatch_is_skipped() {
        let doc = Rc::new(Document::new());
        let second_calls = Rc::new(Cell::new(0));
        let second_id = Rc::new(Cell::new(None));

        let doc_ref = Rc::downgrade(&doc);
        let id_ref = second_id.clone();
        doc.add_document_listener(EventKind::KeyDown, move |_| {
            if let (Some(doc), Some(id)) = (doc_ref.upgrade(), id_ref.get()) {
                doc.remove_event_listener(id);
            }
        });
        let calls = second_calls.clone();
        let id = doc.add_document_listener(EventKind::KeyDown, move |_| {
            calls.set(calls.get() + 1);
        });
        second_id.set(Some(id));

        doc.key_down(KeyEvent::new(Key::Escape));

        assert_eq!(second_calls.get(), 0);
        assert_eq!(doc.document_listener_count(), 1);
    }

    #[test]
    fn test_key_capture_released_on_drop() {
        let doc = Rc::new(Document::new());
        let escapes = Rc::new(Cell::new(0));
        let counter = escapes.clone();

        let capture = doc.capture_keys(move |key| {
            if key.is_escape() {
                counter.set(counter.get() + 1);
            }
        });
        assert!(capture.is_active());
        doc.key_down(KeyEvent::new(Key::Escape));
        drop(capture);
        doc.key_down(KeyEvent::new(Key::Escape));

        assert_eq!(escapes.get(), 1);
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_radio_group_and_values() {
        let doc = Document::new();
        let form = doc.create_element(
            r#"<form>
                <textarea class="film-details__comment-input">draft</textarea>
                <input class="film-details__emoji-item" type="radio" name="comment-emoji" value="smile">
                <input class="film-details__emoji-item" type="radio" name="comment-emoji" value="puke" checked>
              </form>"#,
        );
        let input = doc
            .query_selector(form, ".film-details__comment-input")
            .unwrap();
        assert_eq!(doc.value(input), "draft");
        doc.set_value(input, "Great!");
        assert_eq!(doc.value(input), "Great!");

        let emojis = doc.query_selector_all(form, ".film-details__emoji-item");
        assert!(doc.is_checked(emojis[1]));
        doc.set_checked(emojis[0], true);
        assert!(doc.is_checked(emojis[0]));
        assert!(!doc.is_checked(emojis[1]));
        assert_eq!(doc.value(emojis[0]), "smile");
    }

    #[test]
    fn test_set_text_content_and_serialize() {
        let doc = Document::new();
        let count = doc.create_element(
            r#"<h3 class="film-details__comments-title">Comments <span class="film-details__comments-count">4</span></h3>"#,
        );
        let span = doc
            .query_selector(count, ".film-details__comments-count")
            .unwrap();

        doc.set_text_content(span, "5");

        assert_eq!(doc.text_content(count), "Comments 5");
        assert_eq!(
            doc.outer_html(count),
            r#"<h3 class="film-details__comments-title">Comments<span class="film-details__comments-count">5</span></h3>"#
        );
    }
}

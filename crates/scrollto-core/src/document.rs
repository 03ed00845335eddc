//! In-memory document implementing [`ScrollEnvironment`]
//!
//! A small element tree with absolute layout, computed styles, clamped
//! scroll offsets and event listeners. The CLI simulator builds one from a
//! page description and the tests drive scroll animations against it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::env::{
    ComputedStyle, EventHandler, ListenerId, ListenerTarget, NodeId, ScrollEnvironment,
};

/// Description of an element to append to a [`Document`]
#[derive(Debug, Clone)]
pub struct ElementSpec {
    pub id: Option<String>,
    pub tag: String,
    /// Offset from the top of the document, ignoring any scrolling
    pub top: f64,
    /// Height of the element's box
    pub height: f64,
    /// Height of the scrollable content (defaults to `height`)
    pub content_height: Option<f64>,
    pub style: ComputedStyle,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: None,
            tag: tag.into(),
            top: 0.0,
            height: 0.0,
            content_height: None,
            style: ComputedStyle::default(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn top(mut self, top: f64) -> Self {
        self.top = top;
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub fn content_height(mut self, content_height: f64) -> Self {
        self.content_height = Some(content_height);
        self
    }

    pub fn position(mut self, position: impl Into<String>) -> Self {
        self.style.position = position.into();
        self
    }

    /// Set the `overflow` shorthand (both axes follow it)
    pub fn overflow(mut self, overflow: impl Into<String>) -> Self {
        let overflow = overflow.into();
        self.style.overflow_x = overflow.clone();
        self.style.overflow_y = overflow.clone();
        self.style.overflow = overflow;
        self
    }

    pub fn overflow_y(mut self, overflow_y: impl Into<String>) -> Self {
        self.style.overflow_y = overflow_y.into();
        self
    }

    pub fn overflow_x(mut self, overflow_x: impl Into<String>) -> Self {
        self.style.overflow_x = overflow_x.into();
        self
    }
}

#[derive(Debug)]
struct NodeData {
    id: Option<String>,
    tag: String,
    parent: Option<NodeId>,
    top: f64,
    height: f64,
    content_height: f64,
    scroll_top: f64,
    style: ComputedStyle,
    attached: bool,
}

impl NodeData {
    fn max_scroll(&self) -> f64 {
        (self.content_height - self.height).max(0.0)
    }
}

struct Listener {
    id: ListenerId,
    target: ListenerTarget,
    event: String,
    handler: EventHandler,
}

struct DocumentInner {
    nodes: Vec<NodeData>,
    browser: bool,
    viewport_width: f64,
    viewport_height: f64,
    window_scroll_x: f64,
    window_scroll_y: f64,
    listeners: Vec<Listener>,
    next_listener: u64,
}

impl DocumentInner {
    fn node(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.0).filter(|n| n.attached)
    }

    fn body(&self) -> &NodeData {
        &self.nodes[Document::BODY.0]
    }

    fn max_window_scroll(&self) -> f64 {
        (self.body().content_height - self.viewport_height).max(0.0)
    }
}

/// In-memory document with a body, a viewport and absolutely laid out elements
pub struct Document {
    inner: Mutex<DocumentInner>,
}

impl Document {
    const BODY: NodeId = NodeId(0);

    /// Create a document whose body exactly fills the viewport
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        let body = NodeData {
            id: None,
            tag: "BODY".to_string(),
            parent: None,
            top: 0.0,
            height: viewport_height,
            content_height: viewport_height,
            scroll_top: 0.0,
            style: ComputedStyle::default(),
            attached: true,
        };

        Self {
            inner: Mutex::new(DocumentInner {
                nodes: vec![body],
                browser: true,
                viewport_width,
                viewport_height,
                window_scroll_x: 0.0,
                window_scroll_y: 0.0,
                listeners: Vec::new(),
                next_listener: 1,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DocumentInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The body element
    pub fn body_node(&self) -> NodeId {
        Self::BODY
    }

    /// Append an element under `parent` and return its handle
    pub fn append(&self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let mut inner = self.lock();
        let node = NodeId(inner.nodes.len());
        let tag = spec.tag.to_ascii_uppercase();
        inner.nodes.push(NodeData {
            id: spec.id,
            tag,
            parent: Some(parent),
            top: spec.top,
            height: spec.height,
            content_height: spec.content_height.unwrap_or(spec.height),
            scroll_top: 0.0,
            style: spec.style,
            attached: true,
        });
        node
    }

    /// Remove an element and its subtree from the document
    pub fn detach(&self, node: NodeId) {
        let mut inner = self.lock();
        if node == Self::BODY {
            return;
        }
        let mut detached = vec![node];
        for index in 0..inner.nodes.len() {
            if let Some(parent) = inner.nodes[index].parent {
                if detached.contains(&parent) {
                    detached.push(NodeId(index));
                }
            }
        }
        for NodeId(index) in detached {
            if let Some(data) = inner.nodes.get_mut(index) {
                data.attached = false;
            }
        }
    }

    /// Set the total scrollable height of the page
    pub fn set_document_height(&self, height: f64) {
        let mut inner = self.lock();
        inner.nodes[Self::BODY.0].content_height = height;
        let max = inner.max_window_scroll();
        inner.window_scroll_y = inner.window_scroll_y.min(max);
    }

    pub fn set_viewport_width(&self, width: f64) {
        self.lock().viewport_width = width;
    }

    /// Mark the document as rendered in a real viewport or not
    pub fn set_browser(&self, browser: bool) {
        self.lock().browser = browser;
    }

    /// Dispatch an event to every listener registered for it on `target`
    ///
    /// Handlers run after the document lock is released, so they may call
    /// back into the document. Returns the number of handlers invoked.
    pub fn dispatch_event(&self, target: ListenerTarget, event: &str) -> usize {
        let handlers: Vec<EventHandler> = {
            let inner = self.lock();
            inner
                .listeners
                .iter()
                .filter(|l| l.target == target && l.event == event)
                .map(|l| l.handler.clone())
                .collect()
        };

        trace!("Dispatching '{}' to {} listener(s)", event, handlers.len());
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Number of listeners registered on `target`
    pub fn listener_count(&self, target: ListenerTarget) -> usize {
        self.lock()
            .listeners
            .iter()
            .filter(|l| l.target == target)
            .count()
    }
}

impl ScrollEnvironment for Document {
    fn is_browser(&self) -> bool {
        self.lock().browser
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let inner = self.lock();
        inner
            .nodes
            .iter()
            .position(|n| n.attached && n.id.as_deref() == Some(id))
            .map(NodeId)
    }

    fn body(&self) -> Option<NodeId> {
        Some(Self::BODY)
    }

    fn contains(&self, node: NodeId) -> bool {
        self.lock().node(node).is_some()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.lock().node(node).and_then(|n| n.parent)
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.lock()
            .node(node)
            .map(|n| n.tag.clone())
            .unwrap_or_default()
    }

    fn computed_style(&self, node: NodeId) -> ComputedStyle {
        self.lock()
            .node(node)
            .map(|n| n.style.clone())
            .unwrap_or_default()
    }

    fn offset_top(&self, node: NodeId) -> f64 {
        self.lock().node(node).map(|n| n.top).unwrap_or(0.0)
    }

    fn bounding_client_top(&self, node: NodeId) -> f64 {
        let inner = self.lock();
        let Some(data) = inner.node(node) else {
            return 0.0;
        };

        // Every scrolled ancestor below the body shifts the box up
        let mut top = data.top - inner.window_scroll_y;
        let mut ancestor = data.parent;
        while let Some(id) = ancestor {
            if id == Self::BODY {
                break;
            }
            match inner.node(id) {
                Some(parent) => {
                    top -= parent.scroll_top;
                    ancestor = parent.parent;
                }
                None => break,
            }
        }
        top
    }

    fn scroll_top(&self, node: NodeId) -> f64 {
        let inner = self.lock();
        if node == Self::BODY {
            return inner.window_scroll_y;
        }
        inner.node(node).map(|n| n.scroll_top).unwrap_or(0.0)
    }

    fn set_scroll_top(&self, node: NodeId, value: f64) {
        let mut inner = self.lock();
        if node == Self::BODY {
            let max = inner.max_window_scroll();
            inner.window_scroll_y = value.clamp(0.0, max);
            return;
        }
        if let Some(data) = inner.nodes.get_mut(node.0).filter(|n| n.attached) {
            data.scroll_top = value.clamp(0.0, data.max_scroll());
        }
    }

    fn window_scroll_x(&self) -> f64 {
        self.lock().window_scroll_x
    }

    fn window_scroll_y(&self) -> f64 {
        self.lock().window_scroll_y
    }

    fn window_scroll_to(&self, x: f64, y: f64) {
        let mut inner = self.lock();
        let max = inner.max_window_scroll();
        inner.window_scroll_x = x.max(0.0);
        inner.window_scroll_y = y.clamp(0.0, max);
    }

    fn inner_width(&self) -> f64 {
        self.lock().viewport_width
    }

    fn add_event_listener(
        &self,
        target: ListenerTarget,
        event: &str,
        handler: EventHandler,
    ) -> ListenerId {
        let mut inner = self.lock();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push(Listener {
            id,
            target,
            event: event.to_string(),
            handler,
        });
        id
    }

    fn remove_event_listener(&self, target: ListenerTarget, id: ListenerId) {
        self.lock()
            .listeners
            .retain(|l| !(l.id == id && l.target == target));
    }
}

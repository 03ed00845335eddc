//! Environment capability: the DOM surface the resolver and animation use
//!
//! Everything that would touch a real page (element lookup, computed styles,
//! scroll offsets, viewport size, event listeners) goes through
//! [`ScrollEnvironment`], so the scroll logic runs unchanged against the
//! in-memory [`Document`](crate::document::Document).

use std::fmt;
use std::sync::Arc;

/// Opaque handle to an element in the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Where interrupting input events are observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    /// The global viewport
    Window,
    /// A scrollable element
    Element(NodeId),
}

impl ListenerTarget {
    #[inline]
    pub fn is_window(&self) -> bool {
        matches!(self, ListenerTarget::Window)
    }
}

/// Handle returned when registering an event listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked with the name of the dispatched event
pub type EventHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// The subset of computed style the container search looks at
///
/// Values are CSS keywords as a browser reports them (`"static"`,
/// `"absolute"`, `"auto"`, `"hidden"`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedStyle {
    pub position: String,
    pub overflow: String,
    pub overflow_x: String,
    pub overflow_y: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            position: "static".to_string(),
            overflow: "visible".to_string(),
            overflow_x: "visible".to_string(),
            overflow_y: "visible".to_string(),
        }
    }
}

/// DOM access needed to resolve targets and drive a scroll animation
pub trait ScrollEnvironment: Send + Sync {
    /// Whether a real viewport is available (offset maps only apply there)
    fn is_browser(&self) -> bool;

    /// Look up an element by its id attribute
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// The document body
    fn body(&self) -> Option<NodeId>;

    /// Whether the node is attached to this document
    fn contains(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Upper-case tag name (`"BODY"`, `"DIV"`, ...)
    fn tag_name(&self, node: NodeId) -> String;

    fn computed_style(&self, node: NodeId) -> ComputedStyle;

    /// Offset of the node from the top of the document
    fn offset_top(&self, node: NodeId) -> f64;

    /// Top of the node's bounding box relative to the viewport
    fn bounding_client_top(&self, node: NodeId) -> f64;

    fn scroll_top(&self, node: NodeId) -> f64;

    fn set_scroll_top(&self, node: NodeId, value: f64);

    fn window_scroll_x(&self) -> f64;

    fn window_scroll_y(&self) -> f64;

    fn window_scroll_to(&self, x: f64, y: f64);

    /// Viewport width in CSS pixels
    fn inner_width(&self) -> f64;

    fn add_event_listener(
        &self,
        target: ListenerTarget,
        event: &str,
        handler: EventHandler,
    ) -> ListenerId;

    fn remove_event_listener(&self, target: ListenerTarget, id: ListenerId);
}

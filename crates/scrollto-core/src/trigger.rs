//! Declarative scroll triggers
//!
//! Binds a scroll request to a DOM event on an element, so that e.g. a click
//! on a navigation link scrolls to its section.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ScrollToOptions;
use crate::env::{EventHandler, ListenerId, ListenerTarget, NodeId};
use crate::error::{Error, Result};
use crate::service::ScrollToService;
use crate::stream::PositionStream;

/// Events a trigger can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TriggerEvent {
    #[default]
    Click,
    MouseEnter,
    MouseOver,
    MouseDown,
    MouseUp,
    DblClick,
    ContextMenu,
    Wheel,
    MouseLeave,
    MouseOut,
}

impl TriggerEvent {
    pub const ALL: [TriggerEvent; 10] = [
        TriggerEvent::Click,
        TriggerEvent::MouseEnter,
        TriggerEvent::MouseOver,
        TriggerEvent::MouseDown,
        TriggerEvent::MouseUp,
        TriggerEvent::DblClick,
        TriggerEvent::ContextMenu,
        TriggerEvent::Wheel,
        TriggerEvent::MouseLeave,
        TriggerEvent::MouseOut,
    ];

    /// DOM event name
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerEvent::Click => "click",
            TriggerEvent::MouseEnter => "mouseenter",
            TriggerEvent::MouseOver => "mouseover",
            TriggerEvent::MouseDown => "mousedown",
            TriggerEvent::MouseUp => "mouseup",
            TriggerEvent::DblClick => "dblclick",
            TriggerEvent::ContextMenu => "contextmenu",
            TriggerEvent::Wheel => "wheel",
            TriggerEvent::MouseLeave => "mouseleave",
            TriggerEvent::MouseOut => "mouseout",
        }
    }
}

impl FromStr for TriggerEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TriggerEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| Error::UnsupportedTriggerEvent(s.to_string()))
    }
}

impl TryFrom<String> for TriggerEvent {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TriggerEvent> for String {
    fn from(event: TriggerEvent) -> Self {
        event.as_str().to_string()
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scroll request bound to an event on an element
///
/// The listener is removed when the trigger is unbound or dropped.
pub struct ScrollTrigger {
    service: Weak<ScrollToService>,
    target: ListenerTarget,
    event: TriggerEvent,
    listener: Option<ListenerId>,
    last: Arc<Mutex<Option<PositionStream>>>,
}

impl ScrollTrigger {
    /// Bind `options` to `event_name` on `element`
    ///
    /// Fails with [`Error::UnsupportedTriggerEvent`] for events outside
    /// [`TriggerEvent::ALL`].
    pub fn bind(
        service: &Arc<ScrollToService>,
        element: NodeId,
        event_name: &str,
        options: ScrollToOptions,
    ) -> Result<Self> {
        let event: TriggerEvent = event_name.parse().inspect_err(|e| warn!("{}", e))?;
        let target = ListenerTarget::Element(element);

        let weak = Arc::downgrade(service);
        let last = Arc::new(Mutex::new(None));
        let slot = last.clone();
        let handler: EventHandler = Arc::new(move |_: &str| {
            if let Some(service) = weak.upgrade() {
                let stream = service.scroll_to(options.clone());
                *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(stream);
            }
        });
        let listener = service.env().add_event_listener(target, event.as_str(), handler);
        debug!("Bound scroll trigger on {} for '{}'", element, event);

        Ok(Self {
            service: Arc::downgrade(service),
            target,
            event,
            listener: Some(listener),
            last,
        })
    }

    pub fn event(&self) -> TriggerEvent {
        self.event
    }

    /// Stream of the scroll started by the most recent event, if any
    pub fn last_stream(&self) -> Option<PositionStream> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_bound(&self) -> bool {
        self.listener.is_some()
    }

    /// Remove the event listener; later calls do nothing
    pub fn unbind(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        if let Some(service) = self.service.upgrade() {
            service.env().remove_event_listener(self.target, listener);
            debug!("Unbound scroll trigger for '{}'", self.event);
        }
    }
}

impl Drop for ScrollTrigger {
    fn drop(&mut self) {
        self.unbind();
    }
}

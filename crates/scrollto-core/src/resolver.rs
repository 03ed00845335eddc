//! Target, container and listener resolution
//!
//! Turns loosely-typed identifiers into element handles and finds the
//! element that actually scrolls for a given target.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::ScrollToOptions;
use crate::env::{ListenerTarget, NodeId, ScrollEnvironment};
use crate::error::{Error, Result};
use crate::target::ScrollTarget;

static OVERFLOW_SCROLLABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(auto|scroll)").expect("valid overflow regex"));

/// Resolves identifiers against a [`ScrollEnvironment`]
pub struct Resolver<'a> {
    env: &'a dyn ScrollEnvironment,
}

impl<'a> Resolver<'a> {
    pub fn new(env: &'a dyn ScrollEnvironment) -> Self {
        Self { env }
    }

    /// Resolve an identifier to an attached element
    ///
    /// String ids lose one leading `#`; with `allow_body`, `"body"` and
    /// `"BODY"` name the document body.
    pub fn get_node(&self, id: &ScrollTarget, allow_body: bool) -> Option<NodeId> {
        match id {
            ScrollTarget::Id(value) => {
                if allow_body && (value == "body" || value == "BODY") {
                    self.env.body()
                } else {
                    self.env.element_by_id(ScrollTarget::strip_hash(value))
                }
            }
            ScrollTarget::Number(n) => self.env.element_by_id(&n.to_string()),
            ScrollTarget::Element(element_ref) => Some(element_ref.native_element)
                .filter(|node| self.env.contains(*node)),
            ScrollTarget::Node(node) => Some(*node).filter(|node| self.env.contains(*node)),
        }
    }

    /// Resolve the scroll target of a request
    pub fn target(&self, options: &ScrollToOptions) -> Result<NodeId> {
        self.get_node(&options.target, false)
            .ok_or_else(|| Error::TargetNotFound(options.target.to_string()))
    }

    /// Resolve the container that should scroll to reveal `target`
    ///
    /// An explicit container wins; otherwise the nearest scrollable ancestor.
    pub fn get_container(&self, options: &ScrollToOptions, target: NodeId) -> Result<NodeId> {
        match &options.container {
            Some(container) => self
                .get_node(container, true)
                .ok_or_else(|| Error::ContainerNotFound(container.to_string())),
            None => self
                .first_scrollable_parent(target)
                .ok_or_else(|| Error::ContainerNotFound(format!("no scrollable parent of {}", target))),
        }
    }

    /// Walk up from `node` to the first ancestor that scrolls
    ///
    /// Absolutely positioned ancestors and ancestors hiding their overflow are
    /// skipped. A fixed element (or fixed ancestor on the way) never scrolls
    /// with any container.
    pub fn first_scrollable_parent(&self, node: NodeId) -> Option<NodeId> {
        if self.env.computed_style(node).position == "fixed" {
            return None;
        }

        let mut parent = self.env.parent(node);
        while let Some(candidate) = parent {
            let style = self.env.computed_style(candidate);
            parent = self.env.parent(candidate);

            if style.position == "fixed" {
                return None;
            }
            if style.position == "absolute" || style.overflow == "hidden" || style.overflow_y == "hidden" {
                continue;
            }

            let overflow = format!("{}{}{}", style.overflow, style.overflow_y, style.overflow_x);
            if OVERFLOW_SCROLLABLE.is_match(&overflow) || self.is_document_body(candidate) {
                debug!("Scrollable container of {} is {}", node, candidate);
                return Some(candidate);
            }
        }

        None
    }

    /// Where interrupting events must be observed for `container`
    pub fn listener_target(&self, container: NodeId) -> ListenerTarget {
        if self.is_document_body(container) {
            ListenerTarget::Window
        } else {
            ListenerTarget::Element(container)
        }
    }

    fn is_document_body(&self, node: NodeId) -> bool {
        self.env.tag_name(node).eq_ignore_ascii_case("body")
    }
}

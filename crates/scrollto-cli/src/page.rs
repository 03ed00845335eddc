//! Page descriptions for the simulator
//!
//! A page is a TOML file describing the viewport and a flat list of elements:
//!
//! ```toml
//! viewport_width = 1280
//! viewport_height = 800
//! document_height = 6000
//!
//! [[elements]]
//! id = "panel"
//! top = 4000
//! height = 500
//! content_height = 2500
//! overflow_y = "auto"
//!
//! [[elements]]
//! id = "faq-7"
//! parent = "panel"
//! top = 5200
//! height = 40
//! ```
//!
//! Elements are appended in file order, so a parent must appear before its
//! children. Elements without a parent hang off the body.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use scrollto_core::{Document, ElementSpec, NodeId};

#[derive(Debug, Clone, Deserialize)]
pub struct PageSpec {
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    /// Total scrollable height; defaults to the lowest element bottom
    #[serde(default)]
    pub document_height: Option<f64>,
    #[serde(default)]
    pub elements: Vec<ElementEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Id of the parent element
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub content_height: Option<f64>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub overflow: Option<String>,
    #[serde(default)]
    pub overflow_x: Option<String>,
    #[serde(default)]
    pub overflow_y: Option<String>,
}

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_viewport_height() -> f64 {
    800.0
}

fn default_tag() -> String {
    "div".to_string()
}

impl PageSpec {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid page {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build an in-memory document from this description
    pub fn build(&self) -> Result<Document> {
        let doc = Document::new(self.viewport_width, self.viewport_height);
        let mut by_id: HashMap<&str, NodeId> = HashMap::new();
        let mut bottom = self.viewport_height;

        for entry in &self.elements {
            let parent = match &entry.parent {
                Some(parent) => match by_id.get(parent.as_str()) {
                    Some(node) => *node,
                    None => bail!(
                        "Parent '{}' of element {} must be declared before it",
                        parent,
                        entry.id.as_deref().unwrap_or("(anonymous)")
                    ),
                },
                None => doc.body_node(),
            };

            let node = doc.append(parent, entry.to_spec());
            if let Some(id) = &entry.id {
                by_id.insert(id.as_str(), node);
            }
            bottom = bottom.max(entry.top + entry.height);
        }

        doc.set_document_height(self.document_height.unwrap_or(bottom));
        Ok(doc)
    }
}

impl ElementEntry {
    fn to_spec(&self) -> ElementSpec {
        let mut spec = ElementSpec::new(&self.tag).top(self.top).height(self.height);
        if let Some(id) = &self.id {
            spec = spec.id(id);
        }
        if let Some(content_height) = self.content_height {
            spec = spec.content_height(content_height);
        }
        if let Some(position) = &self.position {
            spec = spec.position(position);
        }
        if let Some(overflow) = &self.overflow {
            spec = spec.overflow(overflow);
        }
        if let Some(overflow_x) = &self.overflow_x {
            spec = spec.overflow_x(overflow_x);
        }
        if let Some(overflow_y) = &self.overflow_y {
            spec = spec.overflow_y(overflow_y);
        }
        spec
    }
}

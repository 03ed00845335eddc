use std::fmt;

use serde::{Deserialize, Serialize};

use crate::env::NodeId;

/// Wrapper around a native element, the handle a component holds for its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub native_element: NodeId,
}

impl ElementRef {
    pub fn new(native_element: NodeId) -> Self {
        Self { native_element }
    }
}

/// Loosely-typed identifier for a scroll target or container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScrollTarget {
    /// Element id, optionally prefixed with `#`
    Id(String),
    /// Numeric element id
    Number(i64),
    /// Element handle
    Element(ElementRef),
    /// Native element
    Node(NodeId),
}

impl ScrollTarget {
    /// Strip one leading `#` from an id string
    pub fn strip_hash(value: &str) -> &str {
        value.strip_prefix('#').unwrap_or(value)
    }
}

impl fmt::Display for ScrollTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollTarget::Id(id) => write!(f, "'{}'", id),
            ScrollTarget::Number(n) => write!(f, "{}", n),
            ScrollTarget::Element(r) => write!(f, "element ref to {}", r.native_element),
            ScrollTarget::Node(node) => write!(f, "{}", node),
        }
    }
}

impl From<&str> for ScrollTarget {
    fn from(value: &str) -> Self {
        ScrollTarget::Id(value.to_string())
    }
}

impl From<String> for ScrollTarget {
    fn from(value: String) -> Self {
        ScrollTarget::Id(value)
    }
}

impl From<i64> for ScrollTarget {
    fn from(value: i64) -> Self {
        ScrollTarget::Number(value)
    }
}

impl From<ElementRef> for ScrollTarget {
    fn from(value: ElementRef) -> Self {
        ScrollTarget::Element(value)
    }
}

impl From<NodeId> for ScrollTarget {
    fn from(value: NodeId) -> Self {
        ScrollTarget::Node(value)
    }
}

impl Serialize for ScrollTarget {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ScrollTarget::Id(id) => serializer.serialize_str(id),
            ScrollTarget::Number(n) => serializer.serialize_i64(*n),
            ScrollTarget::Element(_) | ScrollTarget::Node(_) => Err(serde::ser::Error::custom(
                "element handles cannot be serialized",
            )),
        }
    }
}

// Accept either a string id or an integer id
impl<'de> Deserialize<'de> for ScrollTarget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ScrollTargetVisitor;

        impl<'de> Visitor<'de> for ScrollTargetVisitor {
            type Value = ScrollTarget;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an element id (string) or a numeric id")
            }

            fn visit_str<E>(self, value: &str) -> Result<ScrollTarget, E>
            where
                E: de::Error,
            {
                Ok(ScrollTarget::Id(value.to_string()))
            }

            fn visit_i64<E>(self, value: i64) -> Result<ScrollTarget, E>
            where
                E: de::Error,
            {
                Ok(ScrollTarget::Number(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<ScrollTarget, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(ScrollTarget::Number)
                    .map_err(|_| E::custom("numeric id out of range"))
            }
        }

        deserializer.deserialize_any(ScrollTargetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        target: ScrollTarget,
    }

    #[test]
    fn test_strip_hash() {
        assert_eq!(ScrollTarget::strip_hash("#section2"), "section2");
        assert_eq!(ScrollTarget::strip_hash("section2"), "section2");
        assert_eq!(ScrollTarget::strip_hash("##twice"), "#twice");
    }

    #[test]
    fn test_deserialize_string_and_number() {
        let h: Holder = toml::from_str(r##"target = "#intro""##).unwrap();
        assert_eq!(h.target, ScrollTarget::Id("#intro".to_string()));

        let h: Holder = toml::from_str("target = 42").unwrap();
        assert_eq!(h.target, ScrollTarget::Number(42));

        assert!(toml::from_str::<Holder>("target = true").is_err());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(ScrollTarget::from("a"), ScrollTarget::Id("a".to_string()));
        assert_eq!(ScrollTarget::from(7i64), ScrollTarget::Number(7));
        assert_eq!(
            ScrollTarget::from(ElementRef::new(NodeId(3))),
            ScrollTarget::Element(ElementRef { native_element: NodeId(3) })
        );
    }
}

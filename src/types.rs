//! Core value model for parsed feed XML.
//!
//! Feed XML arrives in wildly inconsistent shapes, so the model is
//! deliberately loose: every field of a parsed element is a *sequence* of
//! values, and every value is either plain text or a structured node. The
//! [`crate::fields`] module flattens this shape into destination records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A parsed XML element's fields: tag name mapped to the sequence of values
/// that appeared under that tag.
pub type FieldBag = BTreeMap<String, Vec<XmlValue>>;

/// An open destination mapping built by [`crate::fields::copy_fields`].
///
/// Values are scalars or sequences depending on the source shape; snippet
/// entries are added under `<name>Snippet` keys.
pub type Record = BTreeMap<String, XmlValue>;

/// One parsed XML field value.
///
/// Serializes untagged, so a `Record` renders as the natural JSON shape:
/// strings for text, arrays for sequences, objects for structured nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XmlValue {
    /// Plain character data.
    Text(String),

    /// A sequence of values (a tag that appeared more than once, or a field
    /// kept as a sequence verbatim).
    List(Vec<XmlValue>),

    /// A structured element with attributes and/or child elements.
    Node(XmlNode),
}

impl XmlValue {
    /// Borrow the plain text payload, if this value is plain text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Borrow the structured node, if this value is one.
    #[must_use]
    pub fn as_node(&self) -> Option<&XmlNode> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl From<&str> for XmlValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for XmlValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<XmlNode> for XmlValue {
    fn from(node: XmlNode) -> Self {
        Self::Node(node)
    }
}

/// A structured XML element: attributes, optional direct character data, and
/// child elements grouped by tag name.
///
/// Invariant: when `text` is present it takes precedence over re-serializing
/// `children` (see [`crate::fields::get_content`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XmlNode {
    /// Attribute name to attribute value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Direct character data of the element, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Child elements grouped by tag name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: FieldBag,
}

impl XmlNode {
    /// Create an empty node.
    ///
    /// # Examples
    /// ```
    /// use feed_normalize::XmlNode;
    ///
    /// let node = XmlNode::new().with_attr("href", "http://example.com");
    /// assert_eq!(node.attr("href"), Some("http://example.com"));
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Set the direct character data.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Append a child value under the given tag name.
    #[must_use]
    pub fn with_child(mut self, tag: &str, value: XmlValue) -> Self {
        self.children.entry(tag.to_string()).or_default().push(value);
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_as_text() {
        assert_eq!(XmlValue::from("hello").as_text(), Some("hello"));
        assert_eq!(XmlValue::List(vec![]).as_text(), None);
        assert_eq!(XmlValue::from(XmlNode::new()).as_text(), None);
    }

    #[test]
    fn test_node_builders() {
        let node = XmlNode::new()
            .with_attr("rel", "alternate")
            .with_text("body")
            .with_child("item", XmlValue::from("a"))
            .with_child("item", XmlValue::from("b"));

        assert_eq!(node.attr("rel"), Some("alternate"));
        assert_eq!(node.attr("missing"), None);
        assert_eq!(node.text.as_deref(), Some("body"));
        assert_eq!(node.children["item"].len(), 2);
    }

    #[test]
    fn test_serialize_untagged() {
        let value = XmlValue::List(vec![
            XmlValue::from("plain"),
            XmlValue::from(XmlNode::new().with_attr("href", "http://a").with_text("t")),
        ]);

        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                "plain",
                {"attributes": {"href": "http://a"}, "text": "t"}
            ])
        );
    }

    #[test]
    fn test_deserialize_untagged() {
        let json = r#"["plain", {"text": "t"}]"#;
        let value: XmlValue = serde_json::from_str(json).unwrap();
        assert_eq!(
            value,
            XmlValue::List(vec![
                XmlValue::from("plain"),
                XmlValue::from(XmlNode::new().with_text("t")),
            ])
        );
    }
}

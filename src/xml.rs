//! Adapter from already-parsed XML DOM trees to the [`FieldBag`] model.
//!
//! Parsing stays with the caller; this module only lifts `roxmltree` element
//! nodes into the loose value shape the field copier operates on. An element
//! without attributes or child elements lifts to plain text, anything richer
//! to a structured node.

use std::collections::BTreeMap;

use roxmltree::Node;

use crate::types::{FieldBag, XmlNode, XmlValue};

/// Get the tag name without namespace prefix.
fn tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Group an element's child elements by tag name into a [`FieldBag`].
///
/// # Examples
/// ```
/// use feed_normalize::xml::field_bag;
/// use roxmltree::Document;
///
/// let xml = r#"<item><title>Hello</title><category>a</category><category>b</category></item>"#;
/// let doc = Document::parse(xml).unwrap();
/// let bag = field_bag(doc.root_element());
///
/// assert_eq!(bag["title"].len(), 1);
/// assert_eq!(bag["category"].len(), 2);
/// ```
#[must_use]
pub fn field_bag(element: Node<'_, '_>) -> FieldBag {
    let mut bag = FieldBag::new();
    for child in element.children().filter(Node::is_element) {
        bag.entry(tag_name(child).to_string())
            .or_default()
            .push(node_value(child));
    }
    bag
}

/// Lift one element into an [`XmlValue`].
///
/// An element with neither attributes nor child elements becomes plain text
/// (empty text for an empty element); otherwise a structured node with its
/// direct character data, attributes, and grouped children.
#[must_use]
pub fn node_value(element: Node<'_, '_>) -> XmlValue {
    let attributes: BTreeMap<String, String> = element
        .attributes()
        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
        .collect();
    let children = field_bag(element);
    let text = direct_text(element);

    if attributes.is_empty() && children.is_empty() {
        XmlValue::Text(text.unwrap_or_default())
    } else {
        XmlValue::Node(XmlNode {
            attributes,
            text,
            children,
        })
    }
}

/// Concatenated direct character data of an element, trimmed; `None` when
/// only whitespace.
fn direct_text(element: Node<'_, '_>) -> Option<String> {
    let text: String = element
        .children()
        .filter(Node::is_text)
        .filter_map(|child| child.text())
        .collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roxmltree::Document;

    #[test]
    fn test_plain_child_lifts_to_text() {
        let doc = Document::parse("<item><title>Hello</title></item>").unwrap();
        let bag = field_bag(doc.root_element());

        assert_eq!(bag["title"], vec![XmlValue::from("Hello")]);
    }

    #[test]
    fn test_repeated_tags_group_into_sequence() {
        let doc =
            Document::parse("<item><category>a</category><category>b</category></item>").unwrap();
        let bag = field_bag(doc.root_element());

        assert_eq!(
            bag["category"],
            vec![XmlValue::from("a"), XmlValue::from("b")]
        );
    }

    #[test]
    fn test_attributed_child_lifts_to_node() {
        let doc = Document::parse(r#"<feed><link rel="self" href="http://a"/></feed>"#).unwrap();
        let bag = field_bag(doc.root_element());

        assert_eq!(
            bag["link"],
            vec![XmlValue::from(
                XmlNode::new().with_attr("rel", "self").with_attr("href", "http://a")
            )]
        );
    }

    #[test]
    fn test_node_with_text_and_children() {
        let doc = Document::parse(r#"<item><content type="html">body<p>x</p></content></item>"#)
            .unwrap();
        let bag = field_bag(doc.root_element());

        let expected = XmlNode::new()
            .with_attr("type", "html")
            .with_text("body")
            .with_child("p", XmlValue::from("x"));
        assert_eq!(bag["content"], vec![XmlValue::from(expected)]);
    }

    #[test]
    fn test_namespace_prefix_stripped() {
        let doc = Document::parse(
            r#"<item xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:creator>Ann</dc:creator></item>"#,
        )
        .unwrap();
        let bag = field_bag(doc.root_element());

        assert_eq!(bag["creator"], vec![XmlValue::from("Ann")]);
    }

    #[test]
    fn test_cdata_is_character_data() {
        let doc =
            Document::parse("<item><description><![CDATA[<p>hi</p>]]></description></item>")
                .unwrap();
        let bag = field_bag(doc.root_element());

        assert_eq!(bag["description"], vec![XmlValue::from("<p>hi</p>")]);
    }

    #[test]
    fn test_empty_element_lifts_to_empty_text() {
        let doc = Document::parse("<item><comments/></item>").unwrap();
        let bag = field_bag(doc.root_element());

        assert_eq!(bag["comments"], vec![XmlValue::from("")]);
    }
}

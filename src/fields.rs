//! Copying and normalizing fields from a parsed-XML bag into flat records.
//!
//! Feed data is inconsistently shaped, so the policy throughout is
//! permissive: missing fields are skipped, never an error.

use crate::text::get_snippet;
use crate::types::{FieldBag, Record, XmlNode, XmlValue};

/// Declares how one field migrates from the parsed-XML bag to the
/// destination record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name in the source bag.
    pub source: String,

    /// Field name in the destination record.
    pub dest: String,

    /// Copy the source sequence verbatim instead of unwrapping a
    /// single-element sequence.
    pub keep_array: bool,

    /// Additionally derive a `<dest>Snippet` entry when the copied value is
    /// plain text.
    pub include_snippet: bool,
}

impl FieldSpec {
    /// Spec for a field copied under its own name.
    ///
    /// # Examples
    /// ```
    /// use feed_normalize::FieldSpec;
    ///
    /// let spec = FieldSpec::new("title");
    /// assert_eq!(spec.dest, "title");
    /// ```
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::renamed(name, name)
    }

    /// Spec for a field copied under a different name.
    #[must_use]
    pub fn renamed(source: &str, dest: &str) -> Self {
        Self {
            source: source.to_string(),
            dest: dest.to_string(),
            keep_array: false,
            include_snippet: false,
        }
    }

    /// Keep the source sequence verbatim.
    #[must_use]
    pub fn keep_array(mut self) -> Self {
        self.keep_array = true;
        self
    }

    /// Also derive a snippet entry.
    #[must_use]
    pub fn with_snippet(mut self) -> Self {
        self.include_snippet = true;
        self
    }
}

/// Copy fields from a parsed-XML bag into a destination record.
///
/// For each spec, in order:
/// 1. A field absent from `source` is skipped; `dest` is untouched for it.
/// 2. Without `keep_array`, a single-element sequence unwraps to its one
///    element; a multi-element sequence stays a sequence. The asymmetry is
///    deliberate: consumers must treat a copied field as scalar-or-sequence.
/// 3. A structured node carrying direct character data collapses to that
///    text.
/// 4. With `include_snippet`, a copied text value additionally yields a
///    `<dest>Snippet` entry via [`get_snippet`].
///
/// Mutates `dest` only; `source` is never modified and no failure is
/// possible.
///
/// # Examples
/// ```
/// use feed_normalize::{copy_fields, FieldSpec, Record, XmlValue};
/// use std::collections::BTreeMap;
///
/// let mut source = BTreeMap::new();
/// source.insert("title".to_string(), vec![XmlValue::from("Hello")]);
///
/// let mut dest = Record::new();
/// copy_fields(&source, &mut dest, &[FieldSpec::new("title").with_snippet()]);
///
/// assert_eq!(dest["title"], XmlValue::from("Hello"));
/// assert_eq!(dest["titleSnippet"], XmlValue::from("Hello"));
/// ```
pub fn copy_fields(source: &FieldBag, dest: &mut Record, specs: &[FieldSpec]) {
    for spec in specs {
        let Some(values) = source.get(&spec.source) else {
            continue;
        };

        let mut value = if spec.keep_array || values.len() != 1 {
            XmlValue::List(values.clone())
        } else {
            values[0].clone()
        };

        // Text-node collapsing: a structured node with direct character data
        // becomes that text.
        if let XmlValue::Node(node) = &value {
            if let Some(text) = &node.text {
                value = XmlValue::Text(text.clone());
            }
        }

        if spec.include_snippet {
            if let XmlValue::Text(text) = &value {
                dest.insert(
                    format!("{}Snippet", spec.dest),
                    XmlValue::Text(get_snippet(text)),
                );
            }
        }

        dest.insert(spec.dest.clone(), value);
    }
}

/// Extract a content field as markup-preserving text.
///
/// A structured node with direct character data yields that text; any other
/// structured value is re-serialized into a headless XML fragment wrapped in
/// a single `<div>` root; plain text passes through unchanged.
#[must_use]
pub fn get_content(value: &XmlValue) -> String {
    match value {
        XmlValue::Node(XmlNode {
            text: Some(text), ..
        }) => text.clone(),
        XmlValue::Text(text) => text.clone(),
        structured => build_fragment(structured),
    }
}

/// Re-serialize a structured value into a compact headless XML fragment with
/// a single synthetic `<div>` root.
///
/// # Examples
/// ```
/// use feed_normalize::{build_fragment, XmlNode, XmlValue};
///
/// let value = XmlValue::from(XmlNode::new().with_child("b", XmlValue::from("bold")));
/// assert_eq!(build_fragment(&value), "<div><b>bold</b></div>");
/// ```
#[must_use]
pub fn build_fragment(value: &XmlValue) -> String {
    let mut out = String::new();
    write_element(&mut out, "div", value);
    out
}

fn write_element(out: &mut String, tag: &str, value: &XmlValue) {
    match value {
        XmlValue::Text(text) => {
            out.push('<');
            out.push_str(tag);
            out.push('>');
            out.push_str(&html_escape::encode_text(text));
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        // A sequence repeats the enclosing tag per element.
        XmlValue::List(items) => {
            for item in items {
                write_element(out, tag, item);
            }
        }
        XmlValue::Node(node) => {
            out.push('<');
            out.push_str(tag);
            for (name, attr_value) in &node.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(attr_value));
                out.push('"');
            }
            out.push('>');
            if let Some(text) = &node.text {
                out.push_str(&html_escape::encode_text(text));
            }
            for (child_tag, values) in &node.children {
                for child in values {
                    write_element(out, child_tag, child);
                }
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

/// Pick a link href from a sequence of `<link>` values.
///
/// Scans `links` in order and returns the href of the first entry that either
/// matches `rel` or carries any href at all; a bare string entry is returned
/// as-is. If nothing matched and the entry at `fallback_index` carries an
/// href, that href is the last resort.
///
/// The first href-bearing entry wins regardless of its relation, so callers
/// must supply `links` pre-ordered by preference. An entry whose relation
/// matches but that has no href still terminates the scan, yielding `None`.
///
/// # Examples
/// ```
/// use feed_normalize::{get_link, XmlNode, XmlValue};
///
/// let links = vec![
///     XmlValue::from(XmlNode::new().with_attr("rel", "alternate").with_attr("href", "http://a")),
///     XmlValue::from(XmlNode::new().with_attr("rel", "self").with_attr("href", "http://b")),
/// ];
/// assert_eq!(get_link(&links, "self", 0), Some("http://a".to_string()));
/// ```
#[must_use]
pub fn get_link(links: &[XmlValue], rel: &str, fallback_index: usize) -> Option<String> {
    for value in links {
        match value {
            XmlValue::Node(node) => {
                let rel_matches = node.attr("rel").is_some_and(|r| r == rel);
                if rel_matches || node.attr("href").is_some() {
                    return node.attr("href").map(ToOwned::to_owned);
                }
            }
            XmlValue::Text(text) => return Some(text.clone()),
            XmlValue::List(_) => {}
        }
    }

    links.get(fallback_index).and_then(|value| {
        value
            .as_node()
            .and_then(|node| node.attr("href"))
            .map(ToOwned::to_owned)
    })
}

//! feed-normalize - turn loosely-typed feed content into well-formed text.
//!
//! This crate normalizes heterogeneous feed content (parsed RSS/Atom XML
//! values and raw byte payloads) into plain, decoded text under explicit
//! fallback rules. It owns no I/O and never parses XML from text; it operates
//! on already-parsed node trees and on byte buffers it is handed.
//!
//! # Example
//!
//! ```
//! use feed_normalize::{copy_fields, decode, encoding_from_content_type, FieldSpec, Record};
//! use feed_normalize::xml::field_bag;
//!
//! // Decode the raw payload under its declared charset.
//! let encoding = encoding_from_content_type("application/rss+xml; charset=UTF-8");
//! let text = decode(b"<item><title>Hello &amp; welcome</title></item>", encoding);
//!
//! // Parse (caller-owned) and lift the fields into a flat record.
//! let doc = roxmltree::Document::parse(&text).unwrap();
//! let bag = field_bag(doc.root_element());
//!
//! let mut record = Record::new();
//! copy_fields(&bag, &mut record, &[FieldSpec::new("title").with_snippet()]);
//! assert_eq!(record["titleSnippet"].as_text(), Some("Hello & welcome"));
//! ```
//!
//! # Architecture
//!
//! - [`types`]: the loose value model for parsed feed XML
//! - [`text`]: HTML-to-plain-text reduction and snippet extraction
//! - [`fields`]: field copying/normalization into destination records
//! - [`encoding`]: charset resolution and byte-buffer decoding
//! - [`xml`]: adapter from parsed `roxmltree` elements to the value model
//!
//! # Error policy
//!
//! No function in this crate fails. Missing fields are skipped, unknown
//! charsets substitute the default, and undecodable buffers degrade to lossy
//! output. Availability of a usable string wins over strict correctness.

pub mod encoding;
pub mod fields;
pub mod text;
pub mod types;
pub mod xml;

// Re-export the main operations
pub use encoding::{
    decode, encoding_from_content_type, needs_external_decode, supported_encoding,
    DEFAULT_ENCODING,
};
pub use fields::{build_fragment, copy_fields, get_content, get_link, FieldSpec};
pub use text::{get_snippet, strip_html};
pub use types::{FieldBag, Record, XmlNode, XmlValue};

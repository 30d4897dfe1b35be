//! Charset resolution and byte-buffer decoding.
//!
//! Encodings fall into three tiers: directly decodable, alias-only (a
//! normalized name for a direct encoding), and legacy encodings that need a
//! dedicated decoding routine. Legacy decoders are registered into the
//! process-wide table by a one-time background thread, so the decode path
//! itself stays a plain table lookup. Resolution is a pure total function
//! over the canonical name sets and never depends on registration timing.
//!
//! Nothing here fails: unknown charsets resolve to the default, and buffers
//! without a registered decoder fall back to lossy UTF-8. Worst case is
//! mojibake, never an error.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread;

use regex::Regex;

/// Fallback encoding used whenever a charset is missing or unsupported.
pub const DEFAULT_ENCODING: &str = "utf8";

/// Canonical names decodable without a legacy decoder.
const SUPPORTED_ENCODINGS: &[&str] = &[
    "ascii", "utf8", "utf16le", "ucs2", "base64", "latin1", "binary", "hex",
];

/// Legacy canonical names that require a dedicated decoding routine.
const LEGACY_ENCODINGS: &[&str] = &["latin2", "gb2312", "gbk"];

/// `encoding=` / `charset=` parameter of a content-type header.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CHARSET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:encoding|charset)\s*=\s*(\S+)").expect("valid regex"));

/// A decoding routine: byte buffer in, string out, total.
type DecodeFn = fn(&[u8]) -> String;

/// Process-wide decoder table.
///
/// Directly decodable encodings are installed synchronously on first touch;
/// the legacy entries land once via the background registration thread. The
/// table is append-only, and readers tolerate the window before registration
/// completes by falling back to lossy UTF-8.
struct DecoderRegistry {
    table: RwLock<HashMap<&'static str, DecodeFn>>,
    legacy_ready: AtomicBool,
}

static DECODERS: LazyLock<DecoderRegistry> = LazyLock::new(|| {
    let mut table: HashMap<&'static str, DecodeFn> = HashMap::new();
    table.insert("ascii", decode_ascii as DecodeFn);
    table.insert("utf8", decode_utf8);
    table.insert("utf16le", decode_utf16le);
    table.insert("ucs2", decode_utf16le);
    table.insert("base64", decode_base64);
    table.insert("latin1", decode_latin1);
    table.insert("binary", decode_latin1);
    table.insert("hex", decode_hex);

    // Fire-and-forget; synchronous callers never wait on it.
    thread::spawn(register_legacy_decoders);

    DecoderRegistry {
        table: RwLock::new(table),
        legacy_ready: AtomicBool::new(false),
    }
});

fn register_legacy_decoders() {
    let registry = &*DECODERS;
    {
        let mut table = write_lock(&registry.table);
        table.insert("latin2", decode_latin2 as DecodeFn);
        table.insert("gb2312", decode_gbk);
        table.insert("gbk", decode_gbk);
    }
    registry.legacy_ready.store(true, Ordering::Release);
    tracing::debug!("legacy charset decoders registered");
}

/// The contract is total, so a poisoned lock is absorbed rather than
/// propagated.
fn read_lock<'a>(
    lock: &'a RwLock<HashMap<&'static str, DecodeFn>>,
) -> RwLockReadGuard<'a, HashMap<&'static str, DecodeFn>> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_lock<'a>(
    lock: &'a RwLock<HashMap<&'static str, DecodeFn>>,
) -> RwLockWriteGuard<'a, HashMap<&'static str, DecodeFn>> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Map well-known non-canonical charset names to canonical ones.
fn apply_alias(name: &str) -> &str {
    match name {
        "utf-8" => "utf8",
        "iso-8859-1" => "latin1",
        "iso-8859-2" => "latin2",
        other => other,
    }
}

/// Find the canonical `&'static` form of a resolvable encoding name.
fn canonical(name: &str) -> Option<&'static str> {
    SUPPORTED_ENCODINGS
        .iter()
        .chain(LEGACY_ENCODINGS)
        .find(|&&encoding| encoding == name)
        .copied()
}

/// Resolve the encoding declared by a content-type header.
///
/// Extracts the `encoding=` or `charset=` parameter, lowercases it, applies
/// the alias table, and falls back to [`DEFAULT_ENCODING`] when the result is
/// empty or not a resolvable encoding.
///
/// # Examples
/// ```
/// use feed_normalize::encoding_from_content_type;
///
/// assert_eq!(encoding_from_content_type("text/html; charset=UTF-8"), "utf8");
/// assert_eq!(encoding_from_content_type("text/xml; encoding=ISO-8859-2"), "latin2");
/// assert_eq!(encoding_from_content_type(""), "utf8");
/// ```
#[must_use]
pub fn encoding_from_content_type(content_type: &str) -> &'static str {
    let declared = CHARSET_PATTERN
        .captures(content_type)
        .and_then(|captures| captures.get(1))
        .map(|parameter| parameter.as_str().to_lowercase())
        .unwrap_or_default();

    match canonical(apply_alias(&declared)) {
        Some(encoding) => encoding,
        None => {
            if !declared.is_empty() {
                tracing::warn!(charset = %declared, "unsupported declared charset, using default");
            }
            DEFAULT_ENCODING
        }
    }
}

/// Validate a directly-supplied encoding name against the supported
/// allowlist, substituting [`DEFAULT_ENCODING`] for anything else.
///
/// # Examples
/// ```
/// use feed_normalize::supported_encoding;
///
/// assert_eq!(supported_encoding("latin1"), "latin1");
/// assert_eq!(supported_encoding("bogus-charset"), "utf8");
/// ```
#[must_use]
pub fn supported_encoding(encoding: &str) -> &'static str {
    SUPPORTED_ENCODINGS
        .iter()
        .find(|&&supported| supported == encoding)
        .copied()
        .unwrap_or(DEFAULT_ENCODING)
}

/// Whether an encoding needs a dedicated legacy decoding routine rather than
/// direct decoding.
#[must_use]
pub fn needs_external_decode(encoding: &str) -> bool {
    LEGACY_ENCODINGS.contains(&encoding) && !SUPPORTED_ENCODINGS.contains(&encoding)
}

/// Decode a byte buffer under the named encoding.
///
/// Unknown encoding names, and legacy encodings whose background registration
/// has not landed yet, fall back to lossy UTF-8 instead of failing.
///
/// # Examples
/// ```
/// use feed_normalize::decode;
///
/// assert_eq!(decode(b"hello", "utf8"), "hello");
/// assert_eq!(decode(&[0xE9], "latin1"), "\u{e9}");
/// ```
#[must_use]
pub fn decode(buffer: &[u8], encoding: &str) -> String {
    let table = read_lock(&DECODERS.table);
    match table.get(encoding) {
        Some(decode_fn) => decode_fn(buffer),
        None => {
            tracing::warn!(encoding, "no decoder registered, falling back to lossy UTF-8");
            String::from_utf8_lossy(buffer).into_owned()
        }
    }
}

fn decode_ascii(buffer: &[u8]) -> String {
    // 7-bit data only; the high bit is stripped on decode.
    buffer.iter().map(|&byte| char::from(byte & 0x7F)).collect()
}

fn decode_utf8(buffer: &[u8]) -> String {
    String::from_utf8_lossy(buffer).into_owned()
}

fn decode_utf16le(buffer: &[u8]) -> String {
    encoding_rs::UTF_16LE.decode(buffer).0.into_owned()
}

fn decode_latin1(buffer: &[u8]) -> String {
    buffer.iter().map(|&byte| char::from(byte)).collect()
}

fn decode_base64(buffer: &[u8]) -> String {
    data_encoding::BASE64.encode(buffer)
}

fn decode_hex(buffer: &[u8]) -> String {
    data_encoding::HEXLOWER.encode(buffer)
}

fn decode_latin2(buffer: &[u8]) -> String {
    encoding_rs::ISO_8859_2.decode(buffer).0.into_owned()
}

fn decode_gbk(buffer: &[u8]) -> String {
    encoding_rs::GBK.decode(buffer).0.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    /// Block until the background registration thread has landed the legacy
    /// decoders, so legacy decode assertions are deterministic.
    fn wait_for_legacy_decoders() {
        for _ in 0..200 {
            if DECODERS.legacy_ready.load(Ordering::Acquire) {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("legacy decoders not registered within one second");
    }

    #[test]
    fn test_encoding_from_content_type_charset() {
        assert_eq!(encoding_from_content_type("text/html; charset=UTF-8"), "utf8");
        assert_eq!(
            encoding_from_content_type("text/html; charset=iso-8859-1"),
            "latin1"
        );
    }

    #[test]
    fn test_encoding_from_content_type_encoding_parameter() {
        assert_eq!(
            encoding_from_content_type("text/xml; encoding=ISO-8859-2"),
            "latin2"
        );
    }

    #[test]
    fn test_encoding_from_content_type_missing_or_unknown() {
        assert_eq!(encoding_from_content_type(""), DEFAULT_ENCODING);
        assert_eq!(encoding_from_content_type("text/html"), DEFAULT_ENCODING);
        assert_eq!(
            encoding_from_content_type("text/html; charset=klingon"),
            DEFAULT_ENCODING
        );
    }

    #[test]
    fn test_encoding_from_content_type_whitespace_around_equals() {
        assert_eq!(
            encoding_from_content_type("text/html; charset = utf-8"),
            "utf8"
        );
    }

    #[test]
    fn test_supported_encoding() {
        assert_eq!(supported_encoding("utf16le"), "utf16le");
        assert_eq!(supported_encoding("hex"), "hex");
        assert_eq!(supported_encoding("bogus-charset"), DEFAULT_ENCODING);
        assert_eq!(supported_encoding(""), DEFAULT_ENCODING);
        // The direct path applies no aliasing.
        assert_eq!(supported_encoding("utf-8"), DEFAULT_ENCODING);
        // Legacy names are not in the supported allowlist.
        assert_eq!(supported_encoding("latin2"), DEFAULT_ENCODING);
    }

    #[test]
    fn test_needs_external_decode() {
        assert!(needs_external_decode("latin2"));
        assert!(needs_external_decode("gb2312"));
        assert!(needs_external_decode("gbk"));
        assert!(!needs_external_decode("utf8"));
        assert!(!needs_external_decode("unknown"));
    }

    #[test]
    fn test_decode_utf8_roundtrip() {
        let text = "café ≈ caffè";
        assert_eq!(decode(text.as_bytes(), "utf8"), text);
    }

    #[test]
    fn test_decode_ascii_strips_high_bit() {
        assert_eq!(decode(b"hi", "ascii"), "hi");
        assert_eq!(decode(&[0xE9], "ascii"), "i"); // 0xE9 & 0x7F == 0x69
    }

    #[test]
    fn test_decode_latin1_and_binary() {
        assert_eq!(decode(&[0x63, 0x61, 0x66, 0xE9], "latin1"), "café");
        assert_eq!(decode(&[0xFF], "binary"), "\u{ff}");
    }

    #[test]
    fn test_decode_utf16le_and_ucs2() {
        let bytes = [0x68, 0x00, 0x69, 0x00];
        assert_eq!(decode(&bytes, "utf16le"), "hi");
        assert_eq!(decode(&bytes, "ucs2"), "hi");
    }

    #[test]
    fn test_decode_base64_and_hex_render_buffer_as_text() {
        assert_eq!(decode(b"feed", "base64"), "ZmVlZA==");
        assert_eq!(decode(&[0xDE, 0xAD], "hex"), "dead");
    }

    #[test]
    fn test_decode_unknown_encoding_falls_back() {
        assert_eq!(decode(b"fallback", "no-such-encoding"), "fallback");
        // Invalid UTF-8 degrades to replacement characters, never an error.
        assert_eq!(decode(&[0xFF, 0xFE, 0xFD], "no-such-encoding"), "\u{fffd}\u{fffd}\u{fffd}");
    }

    #[test]
    fn test_decode_latin2_after_registration() {
        wait_for_legacy_decoders();
        // 0xB1 is U+0105 (a-ogonek) in ISO-8859-2.
        assert_eq!(decode(&[0xB1], "latin2"), "ą");
    }

    #[test]
    fn test_decode_gbk_after_registration() {
        wait_for_legacy_decoders();
        // GBK for U+4E2D (zhong).
        assert_eq!(decode(&[0xD6, 0xD0], "gbk"), "中");
        assert_eq!(decode(&[0xD6, 0xD0], "gb2312"), "中");
    }

    #[test]
    fn test_decode_empty_buffer() {
        for encoding in ["utf8", "ascii", "latin1", "utf16le", "base64", "hex"] {
            assert_eq!(decode(&[], encoding), "");
        }
    }
}

//! XML Entity Encoding
//!
//! Escapes text and attribute values for output and wraps marked literals
//! in CDATA sections.
//!
//! Uses Cow for zero-copy when nothing needs escaping.

use memchr::{memchr, memchr3};
use std::borrow::Cow;

/// Encode text content for XML output (escape `<`, `>` and `&`)
pub fn encode_text(input: &str) -> Cow<'_, str> {
    // Fast path: check if any escaping needed using SIMD
    if memchr3(b'<', b'>', b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }

    // Slow path: escape
    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Encode text for use in a double-quoted XML attribute
pub fn encode_attribute(input: &str) -> Cow<'_, str> {
    if !input
        .bytes()
        .any(|b| matches!(b, b'<' | b'>' | b'&' | b'"' | b'\n' | b'\r' | b'\t'))
    {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\n' => result.push_str("&#10;"),
            '\r' => result.push_str("&#13;"),
            '\t' => result.push_str("&#9;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Write a CDATA section, splitting any `]]>` in the content across sections
pub fn write_cdata(input: &str, buf: &mut String) {
    buf.push_str("<![CDATA[");
    let bytes = input.as_bytes();
    let mut pos = 0;
    while let Some(offset) = memchr(b']', &bytes[pos..]) {
        let at = pos + offset;
        if bytes[at..].starts_with(b"]]>") {
            buf.push_str(&input[pos..at + 2]);
            buf.push_str("]]><![CDATA[");
            pos = at + 2;
        } else {
            buf.push_str(&input[pos..=at]);
            pos = at + 1;
        }
    }
    buf.push_str(&input[pos..]);
    buf.push_str("]]>");
}

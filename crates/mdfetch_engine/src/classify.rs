use encoding_rs::{Encoding, UTF_8};

use crate::ContentKind;

/// How far into the content the HTML markers are searched for.
pub const SNIFF_LEN: usize = 8 * 1024;

const HTML_MARKERS: &[&[u8]] = &[b"<html", b"<!doctype html"];

/// Classifies content by its leading characters only. A UTF-16 body is
/// recognised by its byte-order mark and sniffed after decoding.
pub fn classify(bytes: &[u8]) -> ContentKind {
    match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) if encoding != UTF_8 => {
            let end = bytes.len().min(bom_len + 2 * SNIFF_LEN);
            let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..end]);
            classify_utf8(text.as_bytes())
        }
        Some((_, bom_len)) => classify_utf8(&bytes[bom_len..]),
        None => classify_utf8(bytes),
    }
}

fn classify_utf8(bytes: &[u8]) -> ContentKind {
    let trimmed = trim_leading(bytes);

    if matches!(trimmed.first().copied(), Some(b'{' | b'[')) {
        return ContentKind::Json;
    }

    let window = &trimmed[..trimmed.len().min(SNIFF_LEN)];
    if HTML_MARKERS
        .iter()
        .any(|marker| contains_ignore_ascii_case(window, marker))
    {
        return ContentKind::Html;
    }

    ContentKind::PlainText
}

fn trim_leading(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn contains_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

//! Byte-to-text decoding for backend output.
//!
//! Browsers and curl emit whatever the server sent (or UTF-8 for a dumped
//! DOM), so the encoding is picked from, in order: a byte-order mark, the
//! `charset` parameter of the content type, valid UTF-8, statistical
//! detection.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use mdfetch_logging::mdfetch_warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("{encoding} input contains malformed sequences")]
    Malformed { encoding: String },
}

pub fn decode_text(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedText, DecodeError> {
    if let Some((bom_encoding, _)) = Encoding::for_bom(bytes) {
        return strict_decode(bytes, bom_encoding);
    }

    let declared = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()));
    if let Some(encoding) = declared {
        return strict_decode(bytes, encoding);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(DecodedText {
            text: text.to_owned(),
            encoding_label: UTF_8.name().to_owned(),
        }),
        Err(_) => {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            strict_decode(bytes, detector.guess(None, true))
        }
    }
}

/// [`decode_text`], degrading to lossy UTF-8 when the chosen encoding
/// reports malformed input.
pub fn decode_lossy(bytes: &[u8], content_type: Option<&str>) -> DecodedText {
    decode_text(bytes, content_type).unwrap_or_else(|err| {
        mdfetch_warn!("{}; falling back to lossy UTF-8", err);
        DecodedText {
            text: String::from_utf8_lossy(bytes).into_owned(),
            encoding_label: UTF_8.name().to_owned(),
        }
    })
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Some(value.trim().trim_matches(|c| c == '"' || c == '\'').to_owned())
    })
}

fn strict_decode(bytes: &[u8], encoding: &'static Encoding) -> Result<DecodedText, DecodeError> {
    let (text, _, malformed) = encoding.decode(bytes);
    if malformed {
        return Err(DecodeError::Malformed {
            encoding: encoding.name().to_owned(),
        });
    }
    Ok(DecodedText {
        text: text.into_owned(),
        encoding_label: encoding.name().to_owned(),
    })
}

use crate::convert::Converter;
use crate::sanitize::{clean_str, CleaningOptions};
use crate::{ContentKind, FetchError};

/// Routes decoded content to the renderer for its kind.
pub fn render(
    text: &str,
    kind: ContentKind,
    opts: &CleaningOptions,
    converter: &dyn Converter,
) -> Result<String, FetchError> {
    match kind {
        ContentKind::Html => Ok(converter.to_markdown(&clean_str(text, opts))),
        ContentKind::Json => pretty_json(text),
        ContentKind::PlainText => Ok(text.to_string()),
    }
}

/// Re-indents JSON with two spaces, keeping key order and number text,
/// inside a `json` fence.
pub fn pretty_json(text: &str) -> Result<String, FetchError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|err| FetchError::MalformedJson(err.to_string()))?;
    let pretty = serde_json::to_string_pretty(&value)
        .map_err(|err| FetchError::MalformedJson(err.to_string()))?;
    Ok(format!("```json\n{pretty}\n```"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Html2MdConverter;

    #[test]
    fn json_keeps_key_order_and_uses_two_spaces() {
        let out = pretty_json(r#"{"b":1,"a":[true,null]}"#).unwrap();
        assert_eq!(
            out,
            "```json\n{\n  \"b\": 1,\n  \"a\": [\n    true,\n    null\n  ]\n}\n```"
        );
    }

    #[test]
    fn numbers_keep_their_source_text() {
        let out = pretty_json(r#"{"id":12345678901234567890123,"price":1.10,"n":1e2}"#).unwrap();
        assert_eq!(
            out,
            "```json\n{\n  \"id\": 12345678901234567890123,\n  \"price\": 1.10,\n  \"n\": 1e2\n}\n```"
        );
    }

    #[test]
    fn truncated_json_is_malformed() {
        assert!(matches!(
            pretty_json(r#"{"a": "#),
            Err(FetchError::MalformedJson(_))
        ));
    }

    #[test]
    fn plain_text_passes_through() {
        let text = "  line one\nline two  ";
        let out = render(
            text,
            ContentKind::PlainText,
            &CleaningOptions::default(),
            &Html2MdConverter,
        )
        .unwrap();
        assert_eq!(out, text);
    }
}

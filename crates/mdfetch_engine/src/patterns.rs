//! Lexical patterns for script and style residue found in live pages.
//!
//! The set is a fixed heuristic tuned on real-world markup (search result
//! pages, wiki skins, JSON-LD blocks). It is not a JavaScript or CSS parser
//! and leaves fragments it does not recognise untouched.

use std::sync::LazyLock;

use regex::Regex;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).expect("static script pattern compiles"))
        .collect()
}

pub(crate) static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script.*?>.*?</script>").expect("script pattern"));

pub(crate) static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style.*?>.*?</style>").expect("style pattern"));

pub(crate) static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern"));

pub(crate) static EVENT_HANDLER_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bon\w+\s*=\s*(?:"[^"]*"|'[^']*')"#).expect("event handler pattern")
});

/// Applied to the whole document before parsing, in order.
pub(crate) static DOCUMENT_IDIOMS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        // search page bootstrap objects
        r"(?s)var\s+_g\s*=\s*\{\s*kEI\s*:[^}]*\}\s*;",
        r"(?s)var\s+google\s*=\s*\{\s*[^}]*\}\s*;",
        r"(?s)google\.[a-zA-Z_$][0-9a-zA-Z_$]*\s*=\s*[^;]*;",
        r"(?s)\(\s*function\s*\(\)\s*\{\s*var\s+a\s*=\s*window\.innerWidth[^}]*\}\s*\)\s*\(\)\s*;",
        r"(?s)window\._cshid\s*&&[^;]*;",
        // anonymous closure declaring an object
        r"(?s)\(\s*function\s*\(\)\s*\{\s*var\s+[a-zA-Z_$][0-9a-zA-Z_$]*\s*=\s*\{[^}]*\}\s*;[^}]*\}\s*\)\s*\(\s*\)\s*;",
        // resource loader queue
        r"(?s)\(\s*RLQ\s*=\s*window\.RLQ\s*\|\|\s*\[\]\s*\)\.push\s*\(\s*function\s*\([^)]*\)\s*\{[^}]*\}\s*\)\s*;",
        // immediately invoked through .call
        r"(?s)\(\s*function\s*\([^)]*\)\s*\{[^}]*\}\s*\)\s*\.\s*call\s*\([^)]*\)\s*;",
        // immediately invoked function expression
        r"(?s)\(\s*function\s*\([^)]*\)\s*\{[^}]*\}\s*\)\s*\([^)]*\)\s*;?",
        r"(?m)^[ \t]*window\.[a-zA-Z_$][0-9a-zA-Z_$]*\s*=\s*[^;]*;",
        r"(?s)document\.[a-zA-Z_$][0-9a-zA-Z_$]*\.addEventListener\s*\([^)]*\)\s*;",
        // JSON-LD structured data
        r#"(?s)\{\s*"@context"\s*:\s*"https?:\\?/\\?/schema\.org"[^}]*\}"#,
        // css rule blocks
        r"(?m)^[ \t]*#[a-zA-Z][0-9a-zA-Z_-]*\s*\{[^}]*\}",
        r"(?m)^[ \t]*\.[a-zA-Z][0-9a-zA-Z_-]*\s*\{[^}]*\}",
        r"(?m)^[ \t]*[a-zA-Z][0-9a-zA-Z_-]*\s*\{[^}]*\}",
        r"(?m)^[ \t]*@media[^{]*\{[^}]*\}",
        r"(?m)^[ \t]*var\s+[a-zA-Z_$][0-9a-zA-Z_$]*\s*=[^;]*;",
        r"(?m)^[ \t]*function\s+[a-zA-Z_$][0-9a-zA-Z_$]*\s*\([^)]*\)\s*\{[^}]*\}",
        r"\([^)]*\)\s*=>\s*\{[^}]*\}",
        r"\(\s*function\s*\([^)]*\)\s*\{[^}]*\}\s*\)",
        // script comments
        r"(?m)^[ \t]*//.*$",
        r"(?s)/\*.*?\*/",
    ])
});

/// Applied to individual text nodes after parsing. Unanchored, since a text
/// node's boundaries rarely coincide with source lines.
pub(crate) static TEXT_IDIOMS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\(\s*RLQ\s*=\s*window\.RLQ\s*\|\|\s*\[\]\s*\)\.push\s*\(\s*function\s*\([^)]*\)\s*\{[^}]*\}\s*\)\s*;",
        r#"\{\s*"@context"\s*:\s*"https?:\\?/\\?/schema\.org"[^}]*\}"#,
        r"\(\s*function\s*\([^)]*\)\s*\{[^}]*\}\s*\)\s*\.\s*call\s*\([^)]*\)\s*;",
        r"\(\s*function\s*\([^)]*\)\s*\{[^}]*\}\s*\)\s*\([^)]*\)\s*;?",
        r"var\s+[a-zA-Z_$][0-9a-zA-Z_$]*\s*=[^;]*;",
        r"function\s+[a-zA-Z_$][0-9a-zA-Z_$]*\s*\([^)]*\)\s*\{[^}]*\}",
        r"window\.[a-zA-Z_$][0-9a-zA-Z_$]*\s*=\s*[^;]*;",
        r"document\.[a-zA-Z_$][0-9a-zA-Z_$]*\.addEventListener\s*\([^)]*\)\s*;",
        r"\([^)]*\)\s*=>\s*\{[^}]*\}",
        r"\(\s*function\s*\([^)]*\)\s*\{[^}]*\}\s*\)",
    ])
});

/// Removes every match of every pattern, in order.
pub(crate) fn strip_all<'a>(patterns: impl IntoIterator<Item = &'a Regex>, input: &str) -> String {
    let mut text = input.to_string();
    for pattern in patterns {
        if let std::borrow::Cow::Owned(replaced) = pattern.replace_all(&text, "") {
            text = replaced;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_patterns_compile() {
        assert_eq!(DOCUMENT_IDIOMS.len(), 22);
        assert_eq!(TEXT_IDIOMS.len(), 10);
    }

    #[test]
    fn event_handler_respects_word_boundary() {
        let input = r#"<meta content="x"><b onclick="go()" onmouseover='h()'>t</b>"#;
        let out = EVENT_HANDLER_ATTR.replace_all(input, "");
        assert!(out.contains(r#"content="x""#));
        assert!(!out.contains("onclick"));
        assert!(!out.contains("onmouseover"));
    }

    #[test]
    fn iife_in_text_is_removed() {
        let out = strip_all(TEXT_IDIOMS.iter(), "before (function(x) { console.log(x); })(); after");
        assert_eq!(out, "before  after");
    }

    #[test]
    fn plain_prose_is_untouched() {
        let prose = "The variable was set (as expected) and the function ran.";
        assert_eq!(strip_all(TEXT_IDIOMS.iter(), prose), prose);
        assert_eq!(strip_all(DOCUMENT_IDIOMS.iter(), prose), prose);
    }
}

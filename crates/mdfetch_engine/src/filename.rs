use sha2::{Digest, Sha256};
use url::Url;

/// Windows-safe, deterministic filename: `{sanitized_host_and_path}--{short_hash(url)}.md`
pub fn deterministic_filename(url: &str) -> String {
    let stem = sanitize_stem(&readable_stem(url));
    let hash = short_hash(url);
    format!("{stem}--{hash}.md")
}

fn readable_stem(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or("untitled");
            let path = parsed.path().trim_matches('/');
            if path.is_empty() {
                host.to_string()
            } else {
                format!("{host}_{path}")
            }
        }
        Err(_) => url.to_string(),
    }
}

fn sanitize_stem(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);

    // Collapse multiple underscores
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    if compacted.is_empty() {
        compacted = "untitled".to_string();
    }
    truncate_on_char_boundary(&mut compacted, 80);
    if is_reserved_windows_name(&compacted) {
        compacted.push('_');
    }
    compacted
}

fn truncate_on_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '&' | '=' | '#' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_and_path_form_the_stem() {
        let name = deterministic_filename("https://example.com/docs/intro?x=1");
        assert!(name.starts_with("example.com_docs_intro--"), "{name}");
        assert!(name.ends_with(".md"));
    }

    #[test]
    fn same_url_same_name() {
        assert_eq!(
            deterministic_filename("https://example.com/"),
            deterministic_filename("https://example.com/")
        );
        assert_ne!(
            deterministic_filename("https://example.com/a"),
            deterministic_filename("https://example.com/b")
        );
    }

    #[test]
    fn long_multibyte_stem_is_truncated_safely() {
        let url = format!("https://example.com/{}", "ü".repeat(100));
        let name = deterministic_filename(&url);
        assert!(name.split("--").next().unwrap().len() <= 80);
    }

    #[test]
    fn reserved_names_are_suffixed() {
        assert_eq!(sanitize_stem("con"), "con_");
    }
}

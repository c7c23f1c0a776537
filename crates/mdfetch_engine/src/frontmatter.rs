use crate::pipeline::Rendered;

/// Prefixes rendered content with a YAML front-matter block describing where
/// and how it was fetched.
pub fn build_markdown_document(rendered: &Rendered, fetched_utc: &str) -> String {
    format!(
        "---\nurl: {url}\nbackend: {backend}\nkind: {kind}\nfetched_utc: {fetched_utc}\n---\n\n{body}\n",
        url = rendered.url,
        backend = rendered.backend,
        kind = rendered.kind,
        fetched_utc = fetched_utc,
        body = rendered.content.trim_end(),
    )
}

//! Two-phase HTML cleaner.
//!
//! Phase one strips script, style, comment and handler markup lexically.
//! Phase two parses what is left and re-serializes it element by element,
//! dropping page chrome and neutralizing the attributes that can run script.
//! When phase two cannot complete, the phase-one text is returned as is.

use std::fmt::Write as _;

use ego_tree::NodeRef;
use mdfetch_logging::mdfetch_warn;
use scraper::node::{Element, Node};
use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::patterns::{
    strip_all, DOCUMENT_IDIOMS, EVENT_HANDLER_ATTR, HTML_COMMENT, SCRIPT_BLOCK, STYLE_BLOCK,
    TEXT_IDIOMS,
};

/// Nesting depth beyond which the structural pass gives up.
pub const MAX_DEPTH: usize = 512;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text children are not markup and must not be escaped.
const RAW_TEXT_ELEMENTS: &[&str] = &["style"];

/// Fallback containers the parser leaves as raw text. Their content is
/// markup and is parsed and cleaned on its own.
const REPARSED_ELEMENTS: &[&str] = &["noscript", "noembed", "noframes"];

/// Obsolete literal-text containers, written out as `pre`.
const LITERAL_ELEMENTS: &[&str] = &["xmp", "plaintext"];

/// Which page zones survive cleaning. Everything is stripped by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    pub keep_header: bool,
    pub keep_footer: bool,
    pub keep_nav: bool,
    pub keep_styles: bool,
    pub keep_comments: bool,
}

impl CleaningOptions {
    pub fn keep_all() -> Self {
        Self {
            keep_header: true,
            keep_footer: true,
            keep_nav: true,
            keep_styles: true,
            keep_comments: true,
        }
    }

    fn skips_element(&self, name: &str) -> bool {
        match name {
            "header" => !self.keep_header,
            "footer" => !self.keep_footer,
            "nav" => !self.keep_nav,
            "style" => !self.keep_styles,
            "script" => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
enum StructureError {
    #[error("document nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

/// Cleans `html` according to `opts`. Never fails: input the structural pass
/// cannot handle comes back with only the lexical cleanup applied.
pub fn clean(html: &[u8], opts: &CleaningOptions) -> Vec<u8> {
    clean_str(&String::from_utf8_lossy(html), opts).into_bytes()
}

/// [`clean`] with the default, strip-everything options.
pub fn strip_javascript(html: &[u8]) -> Vec<u8> {
    clean(html, &CleaningOptions::default())
}

pub fn clean_str(html: &str, opts: &CleaningOptions) -> String {
    let stripped = strip_markup(html, opts);
    match rebuild(&stripped, opts) {
        Ok(rebuilt) => rebuilt,
        Err(err) => {
            mdfetch_warn!("structural cleanup skipped: {}", err);
            stripped
        }
    }
}

/// Phase one: lexical removal, in a fixed order.
fn strip_markup(html: &str, opts: &CleaningOptions) -> String {
    let mut text = SCRIPT_BLOCK.replace_all(html, "").into_owned();
    if !opts.keep_styles {
        text = STYLE_BLOCK.replace_all(&text, "").into_owned();
    }
    if !opts.keep_comments {
        text = HTML_COMMENT.replace_all(&text, "").into_owned();
    }
    text = EVENT_HANDLER_ATTR.replace_all(&text, "").into_owned();
    strip_all(DOCUMENT_IDIOMS.iter(), &text)
}

/// Phase two: parse and re-serialize.
fn rebuild(html: &str, opts: &CleaningOptions) -> Result<String, StructureError> {
    let document = Html::parse_document(html);
    let mut writer = TreeWriter {
        opts,
        out: String::with_capacity(html.len()),
    };
    writer.write_node(document.tree.root(), 0)?;
    Ok(writer.out)
}

struct TreeWriter<'o> {
    opts: &'o CleaningOptions,
    out: String,
}

impl TreeWriter<'_> {
    fn write_node(&mut self, node: NodeRef<'_, Node>, depth: usize) -> Result<(), StructureError> {
        if depth > MAX_DEPTH {
            return Err(StructureError::TooDeep { limit: MAX_DEPTH });
        }

        match node.value() {
            Node::Document | Node::Fragment => self.write_children(node, depth),
            Node::Doctype(doctype) => {
                let _ = write!(self.out, "<!DOCTYPE {}>", doctype.name());
                Ok(())
            }
            Node::Comment(comment) => {
                if self.opts.keep_comments {
                    self.out.push_str("<!--");
                    self.out.push_str(comment);
                    self.out.push_str("-->");
                }
                Ok(())
            }
            Node::Text(text) => {
                if parent_is_one_of(node, REPARSED_ELEMENTS) {
                    return self.write_fragment(text, depth);
                }
                let cleaned = strip_all(TEXT_IDIOMS.iter(), text);
                if parent_is_one_of(node, RAW_TEXT_ELEMENTS) {
                    self.out.push_str(&cleaned);
                } else {
                    self.out.push_str(&html_escape::encode_text(&cleaned));
                }
                Ok(())
            }
            Node::Element(element) => self.write_element(node, element, depth),
            Node::ProcessingInstruction(_) => Ok(()),
        }
    }

    fn write_children(&mut self, node: NodeRef<'_, Node>, depth: usize) -> Result<(), StructureError> {
        for child in node.children() {
            self.write_node(child, depth + 1)?;
        }
        Ok(())
    }

    fn write_fragment(&mut self, markup: &str, depth: usize) -> Result<(), StructureError> {
        let fragment = Html::parse_fragment(markup);
        self.write_children(*fragment.root_element(), depth + 1)
    }

    fn write_element(
        &mut self,
        node: NodeRef<'_, Node>,
        element: &Element,
        depth: usize,
    ) -> Result<(), StructureError> {
        let name = element.name();
        if self.opts.skips_element(name) {
            return Ok(());
        }

        let tag = if LITERAL_ELEMENTS.contains(&name) {
            "pre"
        } else {
            name
        };
        self.out.push('<');
        self.out.push_str(tag);
        for (key, value) in element.attrs() {
            if is_event_handler(key) || (!self.opts.keep_styles && key.eq_ignore_ascii_case("style")) {
                continue;
            }
            let value = if name == "a" && key.eq_ignore_ascii_case("href") && is_script_url(value) {
                "#"
            } else {
                value
            };
            let _ = write!(
                self.out,
                " {}=\"{}\"",
                key,
                html_escape::encode_double_quoted_attribute(value)
            );
        }
        self.out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return Ok(());
        }

        // Frame fallback text is never shown.
        if name != "iframe" {
            self.write_children(node, depth)?;
        }
        let _ = write!(self.out, "</{tag}>");
        Ok(())
    }
}

fn parent_is_one_of(node: NodeRef<'_, Node>, names: &[&str]) -> bool {
    node.parent()
        .and_then(|parent| parent.value().as_element())
        .is_some_and(|element| names.contains(&element.name()))
}

fn is_event_handler(attr: &str) -> bool {
    attr.len() > 2 && attr.get(..2).is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}

fn is_script_url(href: &str) -> bool {
    href.trim().to_ascii_lowercase().starts_with("javascript:")
}

//! Shared HTML rewriting passes.
//!
//! Streaming attribute and text edits go through `lol_html`. Edits that need
//! to see a whole subtree before deciding (listing detection) re-render a
//! `scraper` tree instead.

use crate::utils::{escape_attr, escape_html};
use ego_tree::NodeRef;
use lol_html::html_content::{ContentType, TextType};
use lol_html::{doc_text, rewrite_str, RewriteStrSettings};
use scraper::node::Node;
use scraper::{ElementRef, Html};
use std::fmt::Display;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Parents whose text is serialized without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

/// Unwrap a rewriter result, keeping the input markup when rewriting failed
pub fn finish<E: Display>(result: Result<String, E>, html: &str, pass: &str) -> String {
    match result {
        Ok(rewritten) => rewritten,
        Err(e) => {
            ::log::warn!("HTML rewrite pass '{}' failed, keeping markup: {}", pass, e);
            html.to_string()
        }
    }
}

/// Rewrite every visible text node.
///
/// `replace` sees the raw (still entity-encoded) text of one whole node and
/// returns markup-safe replacement text, or `None` to keep it. Script and
/// style bodies are never passed in.
pub fn rewrite_text<F>(html: &str, pass: &str, mut replace: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut buffer = String::new();
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            document_content_handlers: vec![doc_text!(|chunk| {
                if !matches!(chunk.text_type(), TextType::Data | TextType::RCData) {
                    return Ok(());
                }
                // Chunks split a text node arbitrarily; hold them until the node ends
                buffer.push_str(chunk.as_str());
                if !chunk.last_in_text_node() {
                    chunk.remove();
                    return Ok(());
                }
                let text = std::mem::take(&mut buffer);
                let replacement = replace(&text).unwrap_or(text);
                chunk.replace(&replacement, ContentType::Html);
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );
    finish(result, html, pass)
}

/// Re-serialize a parsed document, letting `replace` substitute the markup of
/// any element (its whole subtree included)
pub fn render_with<F>(doc: &Html, mut replace: F) -> String
where
    F: FnMut(ElementRef<'_>) -> Option<String>,
{
    let mut out = String::new();
    render_node(doc.tree.root(), false, &mut replace, &mut out);
    out
}

fn render_node<F>(node: NodeRef<'_, Node>, raw_text: bool, replace: &mut F, out: &mut String)
where
    F: FnMut(ElementRef<'_>) -> Option<String>,
{
    match node.value() {
        Node::Document | Node::Fragment => {
            for child in node.children() {
                render_node(child, false, replace, out);
            }
        }
        Node::Doctype(doctype) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(doctype.name());
            out.push('>');
        }
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                out.push_str(&escape_html(text));
            }
        }
        Node::Element(element) => {
            if let Some(markup) = ElementRef::wrap(node).and_then(|el| replace(el)) {
                out.push_str(&markup);
                return;
            }

            let name = element.name();
            out.push('<');
            out.push_str(name);
            for (attr, value) in element.attrs() {
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&name) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&name);
            for child in node.children() {
                render_node(child, raw, replace, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::ProcessingInstruction(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_text_skips_scripts_and_styles() {
        let html = "<p>call 555</p><script>var n = 555;</script><style>.a{}</style>";
        let out = rewrite_text(html, "test", |text| Some(text.replace("555", "000")));

        assert!(out.contains("<p>call 000</p>"));
        assert!(out.contains("var n = 555;"));
    }

    #[test]
    fn test_rewrite_text_sees_whole_node() {
        let long = "word ".repeat(5000);
        let html = format!("<div>{long}END</div>");
        let mut seen = Vec::new();
        rewrite_text(&html, "test", |text| {
            seen.push(text.len());
            None
        });

        assert_eq!(seen, vec![long.len() + 3]);
    }

    #[test]
    fn test_render_with_replaces_subtree() {
        let doc = Html::parse_document(
            "<!DOCTYPE html><html><head><script>if (a < b) {}</script></head>\
             <body><div class=\"x\">gone <b>too</b></div><p>a &amp; b<br>c</p></body></html>",
        );
        let out = render_with(&doc, |el| {
            (el.value().attr("class") == Some("x")).then(|| "<span>new</span>".to_string())
        });

        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("<span>new</span>"));
        assert!(!out.contains("gone"));
        assert!(out.contains("if (a < b) {}"));
        assert!(out.contains("<p>a &amp; b<br>c</p>"));
    }
}

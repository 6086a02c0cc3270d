use crate::parsers::TextNode;
use crate::utils::collapse_whitespace;
use scraper::node::Node;
use scraper::ElementRef;
use std::collections::HashSet;

/// Elements whose text is never visible content
const HIDDEN_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Hands out placeholder keys that stay unique for one parse.
///
/// Footer legal text gets a fixed name (`footer_copyright`, `footer_privacy`,
/// `footer_terms`); everything else is bucketed by length and numbered from a
/// single counter.
#[derive(Debug, Default)]
pub struct PlaceholderNamer {
    counter: usize,
    used: HashSet<String>,
}

impl PlaceholderNamer {
    pub fn name(&mut self, text: &str) -> String {
        let lower = text.to_lowercase();
        let fixed = if lower.contains("copyright") || text.contains('©') {
            Some("footer_copyright")
        } else if lower.contains("privacy") {
            Some("footer_privacy")
        } else if lower.contains("terms") {
            Some("footer_terms")
        } else {
            None
        };

        if let Some(base) = fixed {
            if self.used.insert(base.to_string()) {
                return base.to_string();
            }
        }

        let prefix = fixed.unwrap_or_else(|| bucket(text.chars().count()));
        loop {
            self.counter += 1;
            let name = format!("{prefix}_{}", self.counter);
            if self.used.insert(name.clone()) {
                return name;
            }
        }
    }
}

fn bucket(len: usize) -> &'static str {
    match len {
        n if n > 100 => "content_block",
        n if n > 50 => "paragraph",
        n if n > 20 => "heading",
        _ => "text",
    }
}

/// Every non-blank text node under `root`, whitespace collapsed, in document order
pub fn extract_text_nodes(root: ElementRef<'_>, namer: &mut PlaceholderNamer) -> Vec<TextNode> {
    let mut out = Vec::new();
    walk(root, root.value().name(), namer, &mut out);
    out
}

fn walk(parent: ElementRef<'_>, path: &str, namer: &mut PlaceholderNamer, out: &mut Vec<TextNode>) {
    let mut position = 0;
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => {
                let text = collapse_whitespace(text);
                if !text.is_empty() {
                    out.push(TextNode {
                        placeholder: namer.name(&text),
                        text,
                        path: path.to_string(),
                    });
                }
            }
            Node::Element(element) => {
                position += 1;
                if HIDDEN_TEXT_TAGS.contains(&element.name()) {
                    continue;
                }
                if let Some(child) = ElementRef::wrap(child) {
                    let child_path = format!("{path} > {}:nth-child({position})", element.name());
                    walk(child, &child_path, namer, out);
                }
            }
            _ => {}
        }
    }
}

/// Visible text of an element, whitespace collapsed
pub fn visible_text(root: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    collect_visible(root, &mut parts);
    collapse_whitespace(&parts.join(" "))
}

/// Character count of [`visible_text`]
pub fn visible_text_len(root: ElementRef<'_>) -> usize {
    visible_text(root).chars().count()
}

fn collect_visible<'a>(parent: ElementRef<'a>, parts: &mut Vec<&'a str>) {
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => parts.push(text),
            Node::Element(element) if !HIDDEN_TEXT_TAGS.contains(&element.name()) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_visible(child, parts);
                }
            }
            _ => {}
        }
    }
}

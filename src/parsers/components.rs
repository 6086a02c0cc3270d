//! Component classification as an ordered rule table.
//!
//! Rules run in priority order. An element taken by one rule is never taken
//! again by a later one.

use crate::parsers::ComponentKind;
use crate::parsers::text::visible_text_len;
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// How many matches a rule takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// First eligible match, trying each selector in priority order
    First,
    /// Every eligible match
    All,
    /// The first `n` eligible matches
    Limit(usize),
    /// The last eligible match
    Last,
}

/// One step of the classification cascade
#[derive(Debug, Clone, Copy)]
pub struct ComponentRule {
    pub kind: ComponentKind,
    /// For [`Pick::First`] these are tried in order; otherwise their matches are merged in document order
    pub selectors: &'static [&'static str],
    pub pick: Pick,
    /// Skip the chosen header and anything inside it
    pub outside_header: bool,
}

pub const RULES: &[ComponentRule] = &[
    ComponentRule {
        kind: ComponentKind::Header,
        selectors: &["header", "[role=banner]", "nav:first-of-type"],
        pick: Pick::First,
        outside_header: false,
    },
    ComponentRule {
        kind: ComponentKind::Nav,
        selectors: &["nav", "[role=navigation]"],
        pick: Pick::All,
        outside_header: true,
    },
    ComponentRule {
        kind: ComponentKind::Hero,
        selectors: &[
            "section:first-of-type",
            "[class*=hero], [id*=hero], [class*=banner], [id*=banner]",
        ],
        pick: Pick::First,
        outside_header: true,
    },
    ComponentRule {
        kind: ComponentKind::Section,
        selectors: &["section", "article", "[class*=section]"],
        pick: Pick::Limit(10),
        outside_header: false,
    },
    ComponentRule {
        kind: ComponentKind::Card,
        selectors: &["[class*=card]", "[class*=feature]"],
        pick: Pick::Limit(5),
        outside_header: false,
    },
    ComponentRule {
        kind: ComponentKind::Footer,
        selectors: &["footer", "[role=contentinfo]"],
        pick: Pick::Last,
        outside_header: false,
    },
];

/// Selectors tried when the cascade finds nothing
const FALLBACK_SELECTOR: &str = "main, #main, .main, [role=main], body > *";
const FALLBACK_LIMIT: usize = 5;
const FALLBACK_MIN_TEXT: usize = 50;
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template", "link", "meta"];

/// Run the cascade, then the fallbacks. Never empty for a parsed document.
pub fn extract(doc: &Html) -> Vec<(ComponentKind, ElementRef<'_>)> {
    let mut claimed = HashSet::new();
    let mut header: Option<NodeId> = None;
    let mut found = Vec::new();

    for rule in RULES {
        for element in apply_rule(doc, rule, header, &claimed) {
            claimed.insert(element.id());
            if rule.kind == ComponentKind::Header {
                header = Some(element.id());
            }
            found.push((rule.kind, element));
        }
    }

    if found.is_empty() {
        found = fallback(doc);
    }

    found
}

/// Eligible matches of a single rule
pub fn apply_rule<'a>(
    doc: &'a Html,
    rule: &ComponentRule,
    header: Option<NodeId>,
    claimed: &HashSet<NodeId>,
) -> Vec<ElementRef<'a>> {
    let eligible = |el: &ElementRef<'_>| {
        !claimed.contains(&el.id()) && !(rule.outside_header && within(el, header))
    };

    match rule.pick {
        Pick::First => rule
            .selectors
            .iter()
            .filter_map(|s| compile(s))
            .find_map(|selector| doc.select(&selector).find(|el| eligible(el)))
            .into_iter()
            .collect(),
        pick => {
            let Some(selector) = compile(&rule.selectors.join(", ")) else {
                return Vec::new();
            };
            let matches = doc.select(&selector).filter(|el| eligible(el));
            match pick {
                Pick::Limit(n) => matches.take(n).collect(),
                Pick::Last => matches.last().into_iter().collect(),
                _ => matches.collect(),
            }
        }
    }
}

fn fallback(doc: &Html) -> Vec<(ComponentKind, ElementRef<'_>)> {
    let mut found: Vec<(ComponentKind, ElementRef<'_>)> = Vec::new();
    if let Some(selector) = compile(FALLBACK_SELECTOR) {
        for el in doc.select(&selector) {
            if found.len() >= FALLBACK_LIMIT {
                break;
            }
            if NON_CONTENT_TAGS.contains(&el.value().name()) {
                continue;
            }
            // A main element and its wrapper would duplicate each other
            if found
                .iter()
                .any(|(_, f)| f.id() == el.id() || within(&el, Some(f.id())))
            {
                continue;
            }
            if visible_text_len(el) > FALLBACK_MIN_TEXT {
                found.push((ComponentKind::Other, el));
            }
        }
    }

    if found.is_empty() {
        if let Some(body) = compile("body").and_then(|s| doc.select(&s).next()) {
            ::log::debug!("No components found, wrapping the whole body");
            found.push((ComponentKind::Other, body));
        }
    }

    found
}

/// `#id` > `.firstClass` > tag name
pub fn selector_for(el: ElementRef<'_>) -> String {
    let value = el.value();
    if let Some(id) = value.id().filter(|id| !id.is_empty()) {
        format!("#{id}")
    } else if let Some(class) = value.classes().next() {
        format!(".{class}")
    } else {
        value.name().to_string()
    }
}

/// True if `el` is `node` or one of its descendants
fn within(el: &ElementRef<'_>, node: Option<NodeId>) -> bool {
    let Some(node) = node else { return false };
    el.id() == node || el.ancestors().any(|a| a.id() == node)
}

fn compile(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            ::log::warn!("Invalid component selector {:?}: {:?}", css, e);
            None
        }
    }
}

use crate::parsers::ComponentKind;
use crate::parsers::components::RULES;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

const SIDEBAR: &str = "aside, [role=complementary], #sidebar, [class*=sidebar]";
const MAIN_CANDIDATES: &[&str] = &["main", "[role=main]", "#content", ".content", "#main", ".main"];

/// Page-level layout facts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub has_header: bool,
    pub has_footer: bool,
    pub has_sidebar: bool,
    pub main_content_selector: Option<String>,
}

pub fn analyze(doc: &Html) -> Layout {
    Layout {
        has_header: rule_matches(doc, ComponentKind::Header),
        has_footer: rule_matches(doc, ComponentKind::Footer),
        has_sidebar: matches_any(doc, SIDEBAR),
        main_content_selector: MAIN_CANDIDATES
            .iter()
            .find(|css| matches_any(doc, css))
            .map(|css| css.to_string()),
    }
}

/// Header and footer agree with what component detection would pick
fn rule_matches(doc: &Html, kind: ComponentKind) -> bool {
    RULES
        .iter()
        .filter(|rule| rule.kind == kind)
        .flat_map(|rule| rule.selectors)
        .any(|css| matches_any(doc, css))
}

fn matches_any(doc: &Html, css: &str) -> bool {
    Selector::parse(css)
        .map(|selector| doc.select(&selector).next().is_some())
        .unwrap_or(false)
}

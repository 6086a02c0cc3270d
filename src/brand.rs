//! Brand substitution: finds what belongs to the source site's identity and
//! swaps it for the configured brand.

use crate::config::BrandConfig;
use crate::rewrite::{finish, rewrite_text};
use crate::results::{PageMetadata, ScrapeResult};
use crate::utils::{collapse_whitespace, escape_html};
use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

/// Where logo images are swapped to
pub const LOGO_PLACEHOLDER: &str = "/placeholders/logo.svg";

const TITLE_SEPARATORS: [char; 6] = ['|', '-', '–', '—', ':', '•'];
const STYLED_REGIONS: &[&str] = &["header", "nav", "button"];

static INLINE_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|;)\s*(?:color|background-color|background|border-color)\s*:\s*(#[0-9a-f]{3,8}\b|rgba?\([^)]*\))").unwrap()
});
static IMAGES: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static STYLED: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[style]").unwrap());
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// What a replacement overwrites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplacementKind {
    Text,
    Attribute,
    Style,
}

/// One spot in the page to overwrite with brand data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandReplacement {
    /// Structural selector of the element holding the original
    pub selector: String,
    #[serde(rename = "type")]
    pub kind: ReplacementKind,
    pub original: String,
    /// Dotted path of the brand field supplying the new value
    pub brand_key: String,
}

/// Name the source site gives itself: `og:site_name`, else the first part of the title
pub fn detect_site_name(metadata: &PageMetadata) -> Option<String> {
    if let Some(name) = metadata.site_name.as_deref().map(str::trim) {
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }
    metadata
        .title
        .split(TITLE_SEPARATORS)
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Find everything in the page that carries the source site's identity
pub fn find_replacements(html: &str, metadata: &PageMetadata, brand: &BrandConfig) -> Vec<BrandReplacement> {
    let doc = Html::parse_document(html);
    let mut replacements = Vec::new();
    let mut seen = HashSet::new();

    let mut texts: Vec<(String, &str)> = Vec::new();
    if let Some(name) = detect_site_name(metadata) {
        texts.push((name, "name"));
    }
    if brand.tagline.is_some() {
        if let Some(description) = metadata.description.as_deref().map(collapse_whitespace) {
            if !description.is_empty() {
                texts.push((description, "tagline"));
            }
        }
    }

    if let Some(body) = doc.select(&BODY).next() {
        for text_el in body.descendants().filter_map(ElementRef::wrap) {
            if matches!(text_el.value().name(), "script" | "style" | "noscript") {
                continue;
            }
            let own_text: String = text_el
                .children()
                .filter_map(|c| match c.value() {
                    Node::Text(t) => Some(&**t),
                    _ => None,
                })
                .collect();
            let own_text = collapse_whitespace(&own_text);
            for (original, key) in &texts {
                if own_text.contains(original.as_str()) {
                    let selector = structural_selector(text_el);
                    if seen.insert((selector.clone(), *key)) {
                        replacements.push(BrandReplacement {
                            selector,
                            kind: ReplacementKind::Text,
                            original: original.clone(),
                            brand_key: key.to_string(),
                        });
                    }
                }
            }
        }
    }

    for img in doc.select(&IMAGES) {
        if !is_logo(img) {
            continue;
        }
        if let Some(src) = img.value().attr("src") {
            replacements.push(BrandReplacement {
                selector: structural_selector(img),
                kind: ReplacementKind::Attribute,
                original: src.to_string(),
                brand_key: "logo".to_string(),
            });
        }
    }

    for el in doc.select(&STYLED) {
        if !in_styled_region(el) {
            continue;
        }
        let Some(style) = el.value().attr("style") else { continue };
        for capture in INLINE_COLOR.captures_iter(style) {
            replacements.push(BrandReplacement {
                selector: structural_selector(el),
                kind: ReplacementKind::Style,
                original: capture[1].to_string(),
                brand_key: "colors.primary".to_string(),
            });
        }
    }

    ::log::debug!("Found {} brand replacements", replacements.len());
    replacements
}

/// Overwrite what `replacements` mark with brand values
pub fn apply_replacements(html: &str, replacements: &[BrandReplacement], brand: &BrandConfig) -> String {
    let mut text_swaps: Vec<(&str, String)> = Vec::new();
    let mut logos = HashSet::new();
    let mut colors = HashSet::new();

    for replacement in replacements {
        match replacement.kind {
            ReplacementKind::Text => {
                let value = match replacement.brand_key.as_str() {
                    "name" => Some(brand.name.as_str()),
                    "tagline" => brand.tagline.as_deref(),
                    _ => None,
                };
                if let Some(value) = value {
                    if !text_swaps.iter().any(|(o, _)| *o == replacement.original) {
                        text_swaps.push((replacement.original.as_str(), escape_html(value)));
                    }
                }
            }
            ReplacementKind::Attribute => {
                logos.insert(replacement.original.as_str());
            }
            ReplacementKind::Style => {
                colors.insert(replacement.original.as_str());
            }
        }
    }
    // Longest first so a tagline containing the name is swapped whole
    text_swaps.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let html = if text_swaps.is_empty() {
        html.to_string()
    } else {
        rewrite_text(html, "brand text", |text| {
            let collapsed = collapse_whitespace(text);
            let mut out = text.to_string();
            let mut changed = false;
            for (original, value) in &text_swaps {
                let escaped = escape_html(original);
                if out.contains(escaped.as_str()) {
                    out = out.replace(escaped.as_str(), value);
                    changed = true;
                } else if collapsed.contains(escaped.as_str()) && !changed {
                    // Original spans reflowed whitespace
                    out = collapse_whitespace(&out).replace(escaped.as_str(), value);
                    changed = true;
                }
            }
            changed.then_some(out)
        })
    };

    if logos.is_empty() && colors.is_empty() {
        return html;
    }

    let mut handlers = vec![element!("img[src]", |el| {
        if let Some(src) = el.get_attribute("src") {
            if logos.contains(src.as_str()) {
                el.set_attribute("data-original-src", &src)?;
                el.set_attribute("src", LOGO_PLACEHOLDER)?;
            }
        }
        Ok(())
    })];
    for region in STYLED_REGIONS {
        for css in [format!("{region}[style]"), format!("{region} [style]")] {
            let colors = &colors;
            handlers.push(element!(css, move |el| {
                if let Some(style) = el.get_attribute("style") {
                    let mut updated = style.clone();
                    for color in colors.iter() {
                        updated = updated.replace(color, "var(--brand-primary)");
                    }
                    if updated != style {
                        el.set_attribute("style", &updated)?;
                    }
                }
                Ok(())
            }));
        }
    }

    let result = rewrite_str(
        &html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::new()
        },
    );
    finish(result, &html, "brand attributes")
}

/// CSS custom properties and base font for the brand
pub fn theme_css(brand: &BrandConfig) -> String {
    let font = css_safe(&brand.typography.font_family);
    format!(
        ":root {{\n  --brand-primary: {};\n  --brand-secondary: {};\n  --brand-accent: {};\n  --brand-font: '{}', sans-serif;\n}}\nbody {{\n  font-family: var(--brand-font);\n}}\n",
        css_safe(&brand.colors.primary),
        css_safe(&brand.colors.secondary),
        css_safe(&brand.colors.accent),
        font
    )
}

/// Google Fonts stylesheet for the brand font
pub fn font_stylesheet_url(brand: &BrandConfig) -> String {
    let family = css_safe(&brand.typography.font_family).replace(' ', "+");
    format!("https://fonts.googleapis.com/css2?family={family}:wght@400;600;700&display=swap")
}

/// Inject the brand theme and font link into `<head>`
pub fn inject_theme(html: &str, brand: &BrandConfig) -> String {
    let block = format!(
        "<link rel=\"stylesheet\" href=\"{}\"><style id=\"brand-theme\">{}</style>",
        font_stylesheet_url(brand),
        theme_css(brand)
    );
    let mut injected = false;
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("head", |el| {
                if !injected {
                    el.append(&block, ContentType::Html);
                    injected = true;
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );
    let out = finish(result, html, "brand theme");
    if injected { out } else { format!("{block}{out}") }
}

/// Source asset URL to its path in the generated project
pub fn asset_map(scrape: &ScrapeResult) -> BTreeMap<String, String> {
    scrape
        .assets
        .iter()
        .filter_map(|(url, asset)| {
            asset
                .file_name()
                .map(|name| (url.clone(), format!("/assets/{name}")))
        })
        .collect()
}

/// `html > body:nth-child(2) > div:nth-child(1)` style path
pub fn structural_selector(el: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    let mut current = Some(el);
    while let Some(node) = current {
        let name = node.value().name();
        let parent = node.parent().and_then(ElementRef::wrap);
        match parent {
            Some(_) => {
                let position = node.prev_siblings().filter(|s| s.value().is_element()).count() + 1;
                parts.push(format!("{name}:nth-child({position})"));
            }
            None => parts.push(name.to_string()),
        }
        current = parent;
    }
    parts.reverse();
    parts.join(" > ")
}

fn is_logo(img: ElementRef<'_>) -> bool {
    let value = img.value();
    let mentions_logo = |s: Option<&str>| s.is_some_and(|s| s.to_lowercase().contains("logo"));
    if ["src", "alt", "class", "id"].iter().any(|a| mentions_logo(value.attr(a))) {
        return true;
    }
    img.parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|p| mentions_logo(p.value().attr("class")) || mentions_logo(p.value().attr("id")))
}

fn in_styled_region(el: ElementRef<'_>) -> bool {
    STYLED_REGIONS.contains(&el.value().name())
        || el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| STYLED_REGIONS.contains(&a.value().name()))
}

/// Strip anything that could break out of a CSS or SVG attribute value
pub fn css_safe(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || " #(),.%-_".contains(*c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand() -> BrandConfig {
        BrandConfig::from_json(
            r##"{"name": "Acme Auto", "tagline": "Drive happy", "colors": {"primary": "#ff0000"}}"##,
        )
        .unwrap()
    }

    fn metadata(title: &str, description: Option<&str>) -> PageMetadata {
        PageMetadata {
            title: title.to_string(),
            description: description.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_detect_site_name() {
        assert_eq!(
            detect_site_name(&metadata("Smith Motors | New and Used Cars", None)).as_deref(),
            Some("Smith Motors")
        );
        assert_eq!(
            detect_site_name(&metadata("Smith Motors — Home", None)).as_deref(),
            Some("Smith Motors")
        );
        let mut meta = metadata("Home | Whatever", None);
        meta.site_name = Some("Smith Motors".to_string());
        assert_eq!(detect_site_name(&meta).as_deref(), Some("Smith Motors"));
        assert_eq!(detect_site_name(&metadata("", None)), None);
    }

    #[test]
    fn test_find_and_apply_replacements() {
        let html = r#"<html><head><title>Smith Motors | Home</title></head><body>
            <header style="background-color: #123456"><img class="site-logo" src="/img/l.png"><span>Smith Motors</span></header>
            <p>Best deals. Welcome to Smith Motors!</p>
            <p>Quality cars since 1990</p>
            <img src="/img/car.jpg">
            </body></html>"#;
        let meta = metadata("Smith Motors | Home", Some("Quality cars since 1990"));
        let replacements = find_replacements(html, &meta, &brand());

        let text: Vec<_> = replacements
            .iter()
            .filter(|r| r.kind == ReplacementKind::Text)
            .collect();
        assert_eq!(text.iter().filter(|r| r.brand_key == "name").count(), 2);
        assert_eq!(text.iter().filter(|r| r.brand_key == "tagline").count(), 1);
        assert!(replacements.iter().any(|r| r.kind == ReplacementKind::Attribute && r.original == "/img/l.png"));
        assert!(replacements.iter().any(|r| r.kind == ReplacementKind::Style && r.original == "#123456"));
        assert!(text[0].selector.starts_with("html > body:nth-child(2) > header:nth-child(1)"));

        let out = apply_replacements(html, &replacements, &brand());
        assert!(out.contains("<span>Acme Auto</span>"));
        assert!(out.contains("Welcome to Acme Auto!"));
        assert!(out.contains("<p>Drive happy</p>"));
        assert!(!out.contains("Smith Motors</span>"));
        assert!(out.contains(&format!("src=\"{LOGO_PLACEHOLDER}\"")));
        assert!(out.contains("data-original-src=\"/img/l.png\""));
        assert!(out.contains("src=\"/img/car.jpg\""));
        assert!(out.contains("background-color: var(--brand-primary)"));
    }

    #[test]
    fn test_tagline_requires_brand_tagline() {
        let mut brand = brand();
        brand.tagline = None;
        let meta = metadata("Smith Motors", Some("Quality cars"));
        let replacements = find_replacements("<body><p>Quality cars</p></body>", &meta, &brand);
        assert!(replacements.iter().all(|r| r.brand_key != "tagline"));
    }

    #[test]
    fn test_inject_theme() {
        let out = inject_theme("<html><head><title>x</title></head><body></body></html>", &brand());
        let head_end = out.find("</head>").unwrap();
        let theme = out.find("id=\"brand-theme\"").unwrap();
        assert!(theme < head_end);
        assert!(out.contains("--brand-primary: #ff0000;"));
        assert!(out.contains("family=Inter:wght@400;600;700"));

        let bare = inject_theme("<p>fragment</p>", &brand());
        assert!(bare.starts_with("<link rel=\"stylesheet\""));
    }

    #[test]
    fn test_css_values_are_filtered() {
        let mut brand = brand();
        brand.colors.primary = "red;}</style><script>".to_string();
        assert!(!theme_css(&brand).contains("</style>"));
    }
}

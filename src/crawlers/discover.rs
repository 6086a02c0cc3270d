//! Asset and link discovery over rendered markup.

use crate::filter::UrlFilter;
use crate::results::{AssetKind, PageMetadata};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Script hosts that are never downloaded
const ANALYTICS_HOSTS: &[&str] = &[
    "google-analytics.com",
    "googletagmanager.com",
    "googleadservices.com",
    "doubleclick.net",
    "connect.facebook.net",
    "analytics.tiktok.com",
    "static.hotjar.com",
    "cdn.segment.com",
    "js.hs-analytics.net",
    "snap.licdn.com",
    "bat.bing.com",
    "clarity.ms",
];

static CSS_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*['"]?([^'")]+?)['"]?\s*\)"#).unwrap());

macro_rules! selector {
    ($name:ident, $css:expr) => {
        static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

selector!(IMG, "img[src]");
selector!(STYLESHEET, "link[rel~=stylesheet][href]");
selector!(SCRIPT, "script[src]");
selector!(STYLE, "style");
selector!(ANCHOR, "a[href]");
selector!(TITLE, "title");
selector!(META, "meta");
selector!(ICON, "link[rel~=icon][href]");
selector!(INLINE_STYLED, "[style]");

/// A URL found on a page that should be downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub kind: AssetKind,
}

/// Everything discovered on one page before any downloading
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Stylesheet URLs in document order
    pub stylesheets: Vec<String>,
    /// Contents of inline `<style>` blocks
    pub inline_styles: Vec<String>,
    /// Images and scripts in document order, stylesheets excluded
    pub assets: Vec<Candidate>,
    /// Same-origin, normalized, deduplicated page links in document order
    pub links: Vec<String>,
    pub metadata: PageMetadata,
}

/// Discover stylesheets, assets, links and metadata on a rendered page
pub fn discover(html: &str, page_url: &Url, filter: &UrlFilter) -> Discovery {
    let doc = Html::parse_document(html);
    let mut discovery = Discovery::default();
    let mut seen = HashSet::new();

    for el in doc.select(&STYLESHEET) {
        if let Some(url) = el.value().attr("href").and_then(|h| resolve(page_url, h)) {
            if seen.insert(url.clone()) {
                discovery.stylesheets.push(url);
            }
        }
    }

    for el in doc.select(&STYLE) {
        let css = el.text().collect::<String>();
        if !css.trim().is_empty() {
            discovery.inline_styles.push(css);
        }
    }

    for el in doc.select(&IMG) {
        if let Some(url) = el.value().attr("src").and_then(|s| resolve(page_url, s)) {
            push_candidate(&mut discovery.assets, &mut seen, url, AssetKind::Image);
        }
    }

    // Inline style attributes carry background images too
    for el in doc.select(&INLINE_STYLED) {
        if let Some(style) = el.value().attr("style") {
            for candidate in css_references(style, page_url) {
                push_candidate(&mut discovery.assets, &mut seen, candidate.url, candidate.kind);
            }
        }
    }

    for el in doc.select(&SCRIPT) {
        if !is_javascript_type(el.value().attr("type")) {
            continue;
        }
        if let Some(url) = el.value().attr("src").and_then(|s| resolve(page_url, s)) {
            if is_analytics(&url) {
                ::log::debug!("Skipping analytics script {}", url);
                continue;
            }
            push_candidate(&mut discovery.assets, &mut seen, url, AssetKind::Script);
        }
    }

    let mut seen_links = HashSet::new();
    for el in doc.select(&ANCHOR) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = page_url.join(href.trim()) else {
            continue;
        };
        if !filter.should_crawl(&resolved) {
            continue;
        }
        let normalized = UrlFilter::normalize_url(&resolved).to_string();
        if seen_links.insert(normalized.clone()) {
            discovery.links.push(normalized);
        }
    }

    discovery.metadata = metadata(&doc, page_url);

    ::log::debug!(
        "Discovered {} stylesheets, {} assets, {} links on {}",
        discovery.stylesheets.len(),
        discovery.assets.len(),
        discovery.links.len(),
        page_url
    );

    discovery
}

/// `url(...)` references in CSS text, resolved against `base`
pub fn css_references(css: &str, base: &Url) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    CSS_URL
        .captures_iter(css)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| resolve(base, m.as_str()))
        .filter(|url| seen.insert(url.clone()))
        .map(|url| Candidate {
            kind: AssetKind::from_css_reference(&url),
            url,
        })
        .collect()
}

/// Resolve a reference against the page URL; `data:` and non-http targets yield `None`
pub fn resolve(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with("data:") || reference.starts_with('#') {
        return None;
    }
    let url = base.join(reference).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

fn push_candidate(
    assets: &mut Vec<Candidate>,
    seen: &mut HashSet<String>,
    url: String,
    kind: AssetKind,
) {
    if seen.insert(url.clone()) {
        assets.push(Candidate { url, kind });
    }
}

fn is_javascript_type(script_type: Option<&str>) -> bool {
    match script_type.map(|t| t.trim().to_ascii_lowercase()) {
        None => true,
        Some(t) => t.is_empty() || t == "module" || t.contains("javascript") || t.contains("ecmascript"),
    }
}

fn is_analytics(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .is_some_and(|host| {
            ANALYTICS_HOSTS
                .iter()
                .any(|blocked| host == *blocked || host.ends_with(&format!(".{blocked}")))
        })
}

fn metadata(doc: &Html, page_url: &Url) -> PageMetadata {
    let title = doc
        .select(&TITLE)
        .next()
        .map(|t| crate::utils::collapse_whitespace(&t.text().collect::<String>()))
        .unwrap_or_default();

    let mut description = None;
    let mut og_description = None;
    let mut site_name = None;
    for meta in doc.select(&META) {
        let el = meta.value();
        let content = el.attr("content").map(str::trim).filter(|c| !c.is_empty());
        let Some(content) = content else { continue };
        match (el.attr("name"), el.attr("property")) {
            (Some(name), _) if name.eq_ignore_ascii_case("description") => {
                description.get_or_insert_with(|| content.to_string());
            }
            (_, Some("og:description")) => {
                og_description.get_or_insert_with(|| content.to_string());
            }
            (_, Some("og:site_name")) => {
                site_name.get_or_insert_with(|| content.to_string());
            }
            _ => {}
        }
    }

    let favicon = doc
        .select(&ICON)
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| resolve(page_url, href));

    PageMetadata {
        title,
        description: description.or(og_description),
        favicon,
        site_name,
    }
}

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Kind of a downloaded asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Font,
    Script,
    Stylesheet,
}

impl AssetKind {
    /// Guess the kind of a `url(...)` reference found in CSS
    pub fn from_css_reference(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
        if [".woff2", ".woff", ".ttf", ".otf", ".eot"]
            .iter()
            .any(|ext| path.ends_with(ext))
        {
            AssetKind::Font
        } else {
            AssetKind::Image
        }
    }
}

/// An asset downloaded during a crawl session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Source URL, unique per session
    pub url: String,
    /// Where the bytes were written
    pub local_path: PathBuf,
    pub kind: AssetKind,
}

impl Asset {
    /// File name of the downloaded copy
    pub fn file_name(&self) -> Option<String> {
        self.local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// Title, description and favicon of a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: Option<String>,
    pub favicon: Option<String>,
    /// `og:site_name`, when the page declares one
    pub site_name: Option<String>,
}

/// Everything captured from one visited page. Immutable once built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// URL the page was loaded from
    pub url: String,
    /// Rendered HTML
    pub html: String,
    /// External stylesheet bodies, inline `<style>` blocks and the computed critical styles, in that order
    pub css: Vec<String>,
    /// Downloaded assets keyed by source URL
    pub assets: BTreeMap<String, Asset>,
    /// Same-origin links found on the page
    pub links: BTreeSet<String>,
    pub metadata: PageMetadata,
}

/// Result of a crawl session
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The target page
    pub root: ScrapeResult,
    /// Child pages, in the order they were scraped
    pub pages: Vec<ScrapeResult>,
    /// Pages scraped including the root
    pub pages_scraped: usize,
}

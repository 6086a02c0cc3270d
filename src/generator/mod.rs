//! Project generator.
//!
//! Writes a Next.js project that renders the processed pages. Every file is
//! derived only from its inputs, so generating twice from the same pages and
//! brand writes the same bytes (apart from randomized demo inventory).

pub mod assets;
pub mod placeholders;
pub mod templates;

#[cfg(test)]
mod tests;

use crate::brand::{apply_replacements, font_stylesheet_url, theme_css};
use crate::config::BrandConfig;
use crate::enhance::EnhancedContent;
use crate::error::CloneError;
use crate::parsers::{Component, EnhancedParseResult, Layout};
use crate::results::{Asset, ScrapeResult};
use crate::rewrite::finish;
use crate::sanitize::Sanitizer;
use crate::utils::{escape_html, route_slug};
use assets::{AssetResolver, copy_assets};
use lol_html::{element, rewrite_str, RewriteStrSettings};
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// One page to emit
#[derive(Debug, Clone, Copy)]
pub struct PageSource<'a> {
    pub scrape: &'a ScrapeResult,
    pub parsed: &'a EnhancedParseResult,
    pub content: &'a EnhancedContent,
}

/// What was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedProject {
    pub root: PathBuf,
    /// Paths relative to `root`, in write order
    pub files: Vec<PathBuf>,
}

/// Writes the project tree for a set of pages
pub struct ProjectGenerator<'a> {
    brand: &'a BrandConfig,
    output_dir: PathBuf,
    asset_fallback_dir: Option<PathBuf>,
    year: Option<i32>,
}

impl<'a> ProjectGenerator<'a> {
    pub fn new(output_dir: impl Into<PathBuf>, brand: &'a BrandConfig) -> Self {
        Self {
            brand,
            output_dir: output_dir.into(),
            asset_fallback_dir: None,
            year: None,
        }
    }

    /// Directory searched for assets missing from their recorded path
    pub fn with_asset_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_fallback_dir = Some(dir.into());
        self
    }

    /// Year written into copyright lines (defaults to the current year)
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Write the project. `root` becomes `/`, each child its own route.
    pub fn generate(
        &self,
        root: PageSource<'_>,
        children: &[PageSource<'_>],
    ) -> Result<GeneratedProject, CloneError> {
        ::log::info!("Generating project in {}", self.output_dir.display());
        let mut writer = ProjectWriter::new(&self.output_dir)?;

        writer.write("package.json", &self.package_json()?)?;
        writer.write("next.config.js", templates::NEXT_CONFIG)?;
        writer.write(".gitignore", templates::GITIGNORE)?;
        writer.write("brand-config.json", &serde_json::to_string_pretty(self.brand)?)?;

        let routes = self.routes(root, children);
        let resolver = self.copy_assets(&mut writer, &routes)?;

        writer.write("app/layout.tsx", &self.layout(root.content)?)?;
        writer.write("app/globals.css", &self.globals_css(&routes, &resolver))?;
        for (route, page) in &routes {
            let html = serde_json::to_string(&self.page_markup(*page, &resolver))?;
            match route.as_str() {
                "/" => {
                    let file = templates::render(templates::ROOT_PAGE, &[("HTML", html.as_str())]);
                    writer.write("app/page.tsx", &file)?;
                }
                slug => {
                    let title = serde_json::to_string(&page_title(slug, self.brand))?;
                    let file = templates::render(
                        templates::CHILD_PAGE,
                        &[("TITLE", title.as_str()), ("HTML", html.as_str())],
                    );
                    writer.write(&format!("app{slug}/page.tsx"), &file)?;
                }
            }
        }

        writer.write("content/placeholders.json", &self.placeholder_manifest(&routes)?)?;
        writer.write("content/components.json", &self.component_manifest(&routes)?)?;
        for (name, svg) in placeholders::placeholder_svgs(self.brand) {
            writer.write(&format!("public/placeholders/{name}"), &svg)?;
        }

        ::log::info!(
            "Generated {} files for {} routes",
            writer.files.len(),
            routes.len()
        );
        Ok(GeneratedProject {
            root: self.output_dir.clone(),
            files: writer.files,
        })
    }

    /// Route for every page. Children whose route is empty or taken are dropped.
    fn routes<'p>(
        &self,
        root: PageSource<'p>,
        children: &[PageSource<'p>],
    ) -> Vec<(String, PageSource<'p>)> {
        let mut routes = vec![("/".to_string(), root)];
        let mut taken = BTreeSet::from(["/".to_string()]);
        for page in children {
            let slug = route_slug(&page.scrape.url);
            let route = format!("/{slug}");
            if slug.is_empty() || !taken.insert(route.clone()) {
                ::log::debug!("No route for {}, skipping", page.scrape.url);
                continue;
            }
            routes.push((route, *page));
        }
        routes
    }

    fn copy_assets(
        &self,
        writer: &mut ProjectWriter,
        routes: &[(String, PageSource<'_>)],
    ) -> Result<AssetResolver, CloneError> {
        let mut assets: BTreeMap<String, Asset> = BTreeMap::new();
        let mut paths: BTreeMap<String, String> = BTreeMap::new();
        for (_, page) in routes {
            for (url, asset) in &page.scrape.assets {
                assets.entry(url.clone()).or_insert_with(|| asset.clone());
            }
            for (url, path) in &page.parsed.asset_map {
                paths.entry(url.clone()).or_insert_with(|| path.clone());
            }
        }

        let copied = copy_assets(
            &assets,
            &writer.root.join("public/assets"),
            self.asset_fallback_dir.as_deref(),
        )?;
        let mut resolved = BTreeMap::new();
        for (url, name) in copied {
            writer.files.push(PathBuf::from(format!("public/assets/{name}")));
            let path = paths
                .remove(&url)
                .unwrap_or_else(|| format!("/assets/{name}"));
            resolved.insert(url, path);
        }
        Ok(AssetResolver::new(resolved))
    }

    /// Branded, sanitized body markup with asset references rewritten
    fn page_markup(&self, page: PageSource<'_>, resolver: &AssetResolver) -> String {
        let branded = page.parsed.branded_html(self.brand);
        let with_copy = page.content.apply_hero(&branded);
        resolver.rewrite_html(&self.clean(&with_copy))
    }

    /// Sanitized, script-free markup reduced to the body's content
    fn clean(&self, html: &str) -> String {
        let sanitizer = match self.year {
            Some(year) => Sanitizer::new(self.brand).with_year(year),
            None => Sanitizer::new(self.brand),
        };
        body_markup(&strip_scripts(&sanitizer.sanitize(html)))
    }

    /// A piece of a page's source markup, branded and cleaned like the page
    fn clean_fragment(&self, page: PageSource<'_>, html: &str) -> String {
        self.clean(&apply_replacements(html, &page.parsed.replacements, self.brand))
    }

    fn clean_text(&self, page: PageSource<'_>, text: &str) -> String {
        let markup = self.clean_fragment(page, &escape_html(text));
        let text: String = Html::parse_fragment(&markup).root_element().text().collect();
        text.trim().to_string()
    }

    /// Placeholder texts per route. Values are the source texts after
    /// branding and sanitizing.
    fn placeholder_manifest(&self, routes: &[(String, PageSource<'_>)]) -> Result<String, CloneError> {
        let manifest: BTreeMap<&str, PagePlaceholders<'_>> = routes
            .iter()
            .map(|(route, page)| {
                let text = page
                    .parsed
                    .parse
                    .text_map
                    .iter()
                    .map(|(key, text)| (key.clone(), self.clean_text(*page, text)))
                    .collect();
                (
                    route.as_str(),
                    PagePlaceholders {
                        text,
                        content: page.content,
                    },
                )
            })
            .collect();
        Ok(serde_json::to_string_pretty(&manifest)?)
    }

    /// Component model per route, with markup and texts cleaned
    fn component_manifest(&self, routes: &[(String, PageSource<'_>)]) -> Result<String, CloneError> {
        let manifest: BTreeMap<&str, PageComponents<'_>> = routes
            .iter()
            .map(|(route, page)| {
                let components = page
                    .parsed
                    .parse
                    .components
                    .iter()
                    .map(|component| {
                        let mut component = component.clone();
                        component.html = self.clean_fragment(*page, &component.html);
                        for node in &mut component.text_nodes {
                            node.text = self.clean_text(*page, &node.text);
                        }
                        component
                    })
                    .collect();
                (
                    route.as_str(),
                    PageComponents {
                        components,
                        layout: &page.parsed.parse.layout,
                    },
                )
            })
            .collect();
        Ok(serde_json::to_string_pretty(&manifest)?)
    }

    fn package_json(&self) -> Result<String, CloneError> {
        let package = serde_json::json!({
            "name": package_name(&self.brand.name),
            "version": "0.1.0",
            "private": true,
            "scripts": {
                "dev": "next dev",
                "build": "next build",
                "start": "next start"
            },
            "dependencies": {
                "next": "14.2.5",
                "react": "18.3.1",
                "react-dom": "18.3.1"
            },
            "devDependencies": {
                "@types/node": "20.14.10",
                "@types/react": "18.3.3",
                "typescript": "5.5.3"
            }
        });
        Ok(serde_json::to_string_pretty(&package)?)
    }

    fn layout(&self, content: &EnhancedContent) -> Result<String, CloneError> {
        let title = serde_json::to_string(&self.brand.name)?;
        let description = serde_json::to_string(&content.meta_description)?;
        let font_url = serde_json::to_string(&font_stylesheet_url(self.brand))?;
        let guard = serde_json::to_string(&templates::guard_script())?;
        Ok(templates::render(
            templates::LAYOUT,
            &[
                ("TITLE", title.as_str()),
                ("DESCRIPTION", description.as_str()),
                ("FONT_URL", font_url.as_str()),
                ("GUARD_SCRIPT", guard.as_str()),
            ],
        ))
    }

    /// Brand theme followed by each distinct site stylesheet
    fn globals_css(&self, routes: &[(String, PageSource<'_>)], resolver: &AssetResolver) -> String {
        let mut css = theme_css(self.brand);
        let mut seen = HashSet::new();
        for sheet in routes.iter().flat_map(|(_, page)| page.scrape.css.iter()) {
            if sheet.trim().is_empty() || !seen.insert(sheet.as_str()) {
                continue;
            }
            css.push('\n');
            css.push_str(&resolver.rewrite_css(sheet));
            if !css.ends_with('\n') {
                css.push('\n');
            }
        }
        css
    }
}

/// Creates directories on demand and records every file written
struct ProjectWriter {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl ProjectWriter {
    fn new(root: &Path) -> Result<Self, CloneError> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            files: Vec::new(),
        })
    }

    fn write(&mut self, relative: &str, contents: &str) -> Result<(), CloneError> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        ::log::debug!("Wrote {}", relative);
        self.files.push(PathBuf::from(relative));
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PagePlaceholders<'a> {
    text: BTreeMap<String, String>,
    content: &'a EnhancedContent,
}

#[derive(Serialize)]
struct PageComponents<'a> {
    components: Vec<Component>,
    layout: &'a Layout,
}

fn strip_scripts(html: &str) -> String {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("script", |el| {
                el.remove();
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );
    finish(result, html, "strip scripts")
}

/// Inner markup of `<body>`, or the whole input when there is none
fn body_markup(html: &str) -> String {
    let doc = Html::parse_document(html);
    match doc.select(&BODY).next() {
        Some(body) => body.inner_html().trim().to_string(),
        None => html.trim().to_string(),
    }
}

/// npm package name for the brand (`Acme Auto` -> `acme-auto-site`)
fn package_name(brand_name: &str) -> String {
    let slug: String = brand_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "site".to_string()
    } else {
        format!("{slug}-site")
    }
}

/// `Acme Auto | Used Cars` for route `/inventory/used-cars`
fn page_title(route: &str, brand: &BrandConfig) -> String {
    let last = route.rsplit('/').find(|s| !s.is_empty()).unwrap_or_default();
    let words: Vec<String> = last
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        brand.name.clone()
    } else {
        format!("{} | {}", brand.name, words.join(" "))
    }
}

use crate::error::CloneError;
use crate::results::Asset;
use crate::rewrite::finish;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use url::Url;

static CSS_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*['"]?([^'")\s]+)['"]?\s*\)"#).unwrap());

/// Maps references found in markup and CSS to copied project assets.
///
/// Lookup order: exact URL, then URL without query or fragment, then a
/// path-suffix match in either direction. Anything else is left alone.
#[derive(Debug, Clone, Default)]
pub struct AssetResolver {
    paths: BTreeMap<String, String>,
}

impl AssetResolver {
    /// `paths` maps source URLs to project paths (`/assets/logo-1.png`)
    pub fn new(paths: BTreeMap<String, String>) -> Self {
        Self { paths }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn resolve(&self, reference: &str) -> Option<&str> {
        let reference = reference.trim();
        if reference.is_empty()
            || reference.starts_with('#')
            || reference.starts_with("data:")
            || reference.starts_with("/assets/")
            || reference.starts_with("/placeholders/")
        {
            return None;
        }

        if let Some(path) = self.paths.get(reference) {
            return Some(path);
        }

        let stripped = strip_query(reference);
        if let Some((_, path)) = self
            .paths
            .iter()
            .find(|(url, _)| strip_query(url) == stripped)
        {
            return Some(path);
        }

        let tail = relative_tail(stripped);
        if tail.is_empty() {
            return None;
        }
        self.paths
            .iter()
            .find(|(url, _)| {
                let url = strip_query(url);
                ends_with_segment(url, tail)
                    || source_path(url).is_some_and(|path| ends_with_segment(stripped, &path))
            })
            .map(|(_, path)| path.as_str())
    }

    /// Rewrite asset references in `src`, `poster`, `srcset`, inline styles
    /// and stylesheet links
    pub fn rewrite_html(&self, html: &str) -> String {
        if self.is_empty() {
            return html.to_string();
        }
        let result = rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!("[src], [poster]", |el| {
                        for attr in ["src", "poster"] {
                            if let Some(value) = el.get_attribute(attr) {
                                if let Some(path) = self.resolve(&value) {
                                    el.set_attribute(attr, path)?;
                                }
                            }
                        }
                        Ok(())
                    }),
                    element!("[srcset]", |el| {
                        if let Some(srcset) = el.get_attribute("srcset") {
                            el.set_attribute("srcset", &self.rewrite_srcset(&srcset))?;
                        }
                        Ok(())
                    }),
                    element!("[style]", |el| {
                        if let Some(style) = el.get_attribute("style") {
                            el.set_attribute("style", &self.rewrite_css(&style))?;
                        }
                        Ok(())
                    }),
                    element!("link[href]", |el| {
                        if let Some(href) = el.get_attribute("href") {
                            if let Some(path) = self.resolve(&href) {
                                el.set_attribute("href", path)?;
                            }
                        }
                        Ok(())
                    }),
                ],
                ..RewriteStrSettings::new()
            },
        );
        finish(result, html, "asset urls")
    }

    /// Rewrite every `url(...)` the resolver knows
    pub fn rewrite_css(&self, css: &str) -> String {
        CSS_URL
            .replace_all(css, |caps: &Captures| match self.resolve(&caps[1]) {
                Some(path) => format!("url({path})"),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    fn rewrite_srcset(&self, srcset: &str) -> String {
        srcset
            .split(',')
            .map(|candidate| {
                let candidate = candidate.trim();
                let (url, descriptor) = candidate
                    .split_once(char::is_whitespace)
                    .unwrap_or((candidate, ""));
                let url = self.resolve(url).unwrap_or(url);
                if descriptor.is_empty() {
                    url.to_string()
                } else {
                    format!("{url} {}", descriptor.trim())
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Reference with leading `./`, `../` and `/` removed
fn relative_tail(reference: &str) -> &str {
    let mut tail = reference;
    loop {
        let next = tail
            .trim_start_matches("./")
            .trim_start_matches("../")
            .trim_start_matches('/');
        if next == tail {
            return tail;
        }
        tail = next;
    }
}

fn source_path(url: &str) -> Option<String> {
    let path = Url::parse(url).ok()?.path().trim_start_matches('/').to_string();
    (!path.is_empty()).then_some(path)
}

/// `haystack` ends with `tail` on a path segment boundary
fn ends_with_segment(haystack: &str, tail: &str) -> bool {
    match haystack.strip_suffix(tail) {
        Some("") => true,
        Some(head) => head.ends_with('/'),
        None => false,
    }
}

/// Copy downloaded assets into `dest`.
///
/// Each asset is read from its recorded path, else from `fallback_dir` under
/// the same file name. Assets found in neither place are skipped with a
/// warning. Returns the copied assets' source URLs and file names.
pub fn copy_assets(
    assets: &BTreeMap<String, Asset>,
    dest: &Path,
    fallback_dir: Option<&Path>,
) -> Result<Vec<(String, String)>, CloneError> {
    let mut copied = Vec::new();
    for (url, asset) in assets {
        let Some(name) = asset.file_name() else {
            ::log::warn!("Asset {} has no file name, skipping", url);
            continue;
        };
        let mut candidates: Vec<PathBuf> = vec![asset.local_path.clone()];
        if let Some(fallback) = fallback_dir.map(|dir| dir.join(&name)) {
            if fallback != asset.local_path {
                candidates.push(fallback);
            }
        }
        let Some(source) = candidates.into_iter().find(|path| path.is_file()) else {
            ::log::warn!(
                "Asset {} not found at {}, skipping",
                url,
                asset.local_path.display()
            );
            continue;
        };

        fs::create_dir_all(dest)?;
        fs::copy(&source, dest.join(&name))?;
        ::log::trace!("Copied {} -> {}", source.display(), name);
        copied.push((url.clone(), name));
    }
    Ok(copied)
}

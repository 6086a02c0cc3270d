// Re-export modules
pub mod brand;
pub mod config;
pub mod crawlers;
pub mod enhance;
pub mod error;
pub mod filter;
pub mod generator;
pub mod parsers;
pub mod results;
pub mod rewrite;
pub mod sanitize;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{BrandConfig, CrawlConfig};
pub use enhance::{ContentEnhancer, ContentKind, NoEnhancer};
pub use error::{CloneError, FailureCategory};
pub use generator::GeneratedProject;
pub use results::{CrawlReport, ScrapeResult};

use crawlers::{FetchAsset, PageDriver};
use generator::{PageSource, ProjectGenerator};
use std::path::{Path, PathBuf};

/// Clone a website into a branded project.
///
/// Crawls the target, parses and brands every page, sanitizes it and writes
/// the project. Output directories created by a failed run are removed.
pub struct SiteClone<E: ContentEnhancer = NoEnhancer> {
    crawl: CrawlConfig,
    brand: BrandConfig,
    output_dir: PathBuf,
    asset_fallback_dir: Option<PathBuf>,
    enhancer: E,
}

impl SiteClone<NoEnhancer> {
    pub fn new(target_url: &str, brand: BrandConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            crawl: CrawlConfig::new(target_url),
            brand,
            output_dir: output_dir.into(),
            asset_fallback_dir: None,
            enhancer: NoEnhancer,
        }
    }
}

impl<E: ContentEnhancer> SiteClone<E> {
    /// Replace the crawl settings. The target URL comes from `config`.
    pub fn with_config(mut self, config: CrawlConfig) -> Self {
        self.crawl = config;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.crawl.max_depth = max_depth;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.crawl.max_pages = max_pages;
        self
    }

    /// Skip assets larger than this many bytes
    pub fn with_max_asset_size(mut self, bytes: u64) -> Self {
        self.crawl.max_asset_size_bytes = bytes;
        self
    }

    /// Per-navigation timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.crawl.timeout_ms = timeout_ms;
        self
    }

    pub fn with_webdriver_url(mut self, url: &str) -> Self {
        self.crawl.webdriver_url = url.to_string();
        self
    }

    /// Second place to look for downloaded assets missing from their recorded
    /// path, e.g. the asset directory kept from an earlier crawl
    pub fn with_asset_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_fallback_dir = Some(dir.into());
        self
    }

    /// Use `enhancer` for hero, about and call-to-action copy
    pub fn with_enhancer<N: ContentEnhancer>(self, enhancer: N) -> SiteClone<N> {
        SiteClone {
            crawl: self.crawl,
            brand: self.brand,
            output_dir: self.output_dir,
            asset_fallback_dir: self.asset_fallback_dir,
            enhancer,
        }
    }

    pub fn crawl_config(&self) -> &CrawlConfig {
        &self.crawl
    }

    /// Crawl through WebDriver and generate the project
    pub async fn run(&self) -> Result<GeneratedProject, CloneError> {
        let report = crawlers::crawl_site(&self.crawl).await?;
        self.build(&report).await
    }

    /// Crawl through a caller-supplied browser and fetcher
    pub async fn run_with<D, F>(&self, driver: D, fetcher: F) -> Result<GeneratedProject, CloneError>
    where
        D: PageDriver,
        F: FetchAsset,
    {
        let report = crawlers::crawl(&self.crawl, driver, fetcher).await?;
        self.build(&report).await
    }

    /// Turn a finished crawl into a project
    pub async fn build(&self, report: &CrawlReport) -> Result<GeneratedProject, CloneError> {
        let mut parsed = Vec::with_capacity(report.pages.len() + 1);
        for scrape in std::iter::once(&report.root).chain(&report.pages) {
            let page = parsers::parse_enhanced(scrape, &self.brand);
            let content =
                enhance::enhance_page(&self.enhancer, &self.brand, &page.parse, &scrape.metadata)
                    .await;
            ::log::debug!(
                "Parsed {}: {} components, {} replacements",
                scrape.url,
                page.parse.components.len(),
                page.replacements.len()
            );
            parsed.push((scrape, page, content));
        }

        let mut sources = parsed.iter().map(|(scrape, page, content)| PageSource {
            scrape,
            parsed: page,
            content,
        });
        let Some(root) = sources.next() else {
            return Err(CloneError::Config("nothing to generate".to_string()));
        };
        let children: Vec<PageSource<'_>> = sources.collect();

        let mut generator = ProjectGenerator::new(&self.output_dir, &self.brand);
        if let Some(dir) = &self.asset_fallback_dir {
            generator = generator.with_asset_fallback_dir(dir);
        }
        cleanup_on_error(&self.output_dir, || generator.generate(root, &children))
    }
}

/// Run `generate`, deleting `output_dir` afterwards if it failed and the
/// directory did not exist beforehand
fn cleanup_on_error<T, F>(output_dir: &Path, generate: F) -> Result<T, CloneError>
where
    F: FnOnce() -> Result<T, CloneError>,
{
    let existed = output_dir.exists();
    let result = generate();
    if result.is_err() && !existed && output_dir.exists() {
        ::log::warn!("Removing partial output {}", output_dir.display());
        if let Err(e) = std::fs::remove_dir_all(output_dir) {
            ::log::warn!("Could not remove {}: {}", output_dir.display(), e);
        }
    }
    result
}

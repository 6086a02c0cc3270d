use crate::config::CrawlConfig;
use crate::crawlers::discover::{Candidate, css_references, discover, resolve};
use crate::crawlers::driver::{PageDriver, WebDriverSession};
use crate::crawlers::fetch::{AssetFetcher, FetchAsset};
use crate::error::CloneError;
use crate::filter::UrlFilter;
use crate::results::{Asset, AssetKind, CrawlReport, ScrapeResult};
use crate::utils::url_basename;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Normalized URLs visited in one crawl session. Membership is write-once.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    /// Mark a URL as visited, returning false if it already was
    pub fn insert(&mut self, url: &str) -> bool {
        self.urls.insert(normalize(url))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(&normalize(url))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

fn normalize(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => UrlFilter::normalize_url(&parsed).to_string(),
        Err(_) => url.to_string(),
    }
}

/// Check that the target is an absolute http(s) URL
pub fn validate_target(target: &str) -> Result<Url, CloneError> {
    let url = Url::parse(target).map_err(|e| CloneError::invalid_url(target, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CloneError::invalid_url(target, "only http and https are supported"));
    }
    Ok(url)
}

/// Crawl the configured target through a WebDriver browser
pub async fn crawl_site(config: &CrawlConfig) -> Result<CrawlReport, CloneError> {
    validate_target(&config.target_url)?;
    let fetcher = AssetFetcher::from_config(config)?;
    let driver = WebDriverSession::connect(&config.resolved_webdriver_url()).await?;
    crawl(config, driver, fetcher).await
}

/// Run one crawl session over `driver`. The driver is closed exactly once,
/// whatever the outcome.
pub async fn crawl<D, F>(config: &CrawlConfig, mut driver: D, fetcher: F) -> Result<CrawlReport, CloneError>
where
    D: PageDriver,
    F: FetchAsset,
{
    let outcome = match CrawlSession::new(config, fetcher) {
        Ok(mut session) => session.run(&mut driver).await,
        Err(e) => Err(e),
    };
    driver.close().await;
    outcome
}

/// State owned by one crawl session
struct CrawlSession<F> {
    config: CrawlConfig,
    root: Url,
    filter: UrlFilter,
    fetcher: Arc<F>,
    visited: VisitedSet,
    pages_scraped: usize,
    /// Every asset URL attempted this session; `None` marks a failed download
    downloaded: HashMap<String, Option<Asset>>,
    stylesheet_bodies: HashMap<String, String>,
    used_names: HashSet<String>,
}

impl<F: FetchAsset> CrawlSession<F> {
    fn new(config: &CrawlConfig, fetcher: F) -> Result<Self, CloneError> {
        let root = validate_target(&config.target_url)?;
        if config.max_pages == 0 {
            return Err(CloneError::Config("max_pages must be at least 1".to_string()));
        }
        let filter = UrlFilter::new(&root, &config.exclude_patterns)
            .map_err(|e| CloneError::Config(format!("invalid exclude pattern: {e}")))?;

        Ok(Self {
            config: config.clone(),
            root,
            filter,
            fetcher: Arc::new(fetcher),
            visited: VisitedSet::default(),
            pages_scraped: 0,
            downloaded: HashMap::new(),
            stylesheet_bodies: HashMap::new(),
            used_names: HashSet::new(),
        })
    }

    /// Depth-first crawl over an explicit frontier stack. Children are pushed
    /// in reverse so they are visited in document order.
    async fn run<D: PageDriver>(&mut self, driver: &mut D) -> Result<CrawlReport, CloneError> {
        ::log::info!("Starting crawl of {}", self.root);

        let mut frontier = vec![(self.root.to_string(), 0usize)];
        let mut root = None;
        let mut pages = Vec::new();

        while let Some((url, depth)) = frontier.pop() {
            if self.visited.contains(&url) {
                ::log::trace!("Skipping already visited: {}", url);
                continue;
            }
            if depth > self.config.max_depth {
                continue;
            }
            if self.pages_scraped >= self.config.max_pages {
                ::log::debug!("Page budget of {} reached", self.config.max_pages);
                break;
            }

            self.visited.insert(&url);
            self.pages_scraped += 1;

            match self.scrape_page(driver, &url).await {
                Ok((result, links)) => {
                    if depth < self.config.max_depth && self.pages_scraped < self.config.max_pages {
                        let children: Vec<String> = links
                            .into_iter()
                            .filter(|link| !self.visited.contains(link))
                            .take(self.config.max_links_per_page)
                            .collect();
                        ::log::debug!("Queuing {} child pages of {}", children.len(), url);
                        frontier.extend(children.into_iter().rev().map(|link| (link, depth + 1)));
                    }

                    if depth == 0 {
                        root = Some(result);
                    } else {
                        pages.push(result);
                    }
                }
                Err(e) if depth == 0 => {
                    ::log::error!("Failed to scrape {}: {}", url, e);
                    return Err(e);
                }
                Err(e) => {
                    ::log::warn!("Skipping child page {}: {}", url, e);
                }
            }
        }

        let root = root.ok_or_else(|| CloneError::Browser("root page was not scraped".to_string()))?;

        ::log::info!(
            "Crawl complete - {} pages scraped, {} assets downloaded",
            self.pages_scraped,
            self.downloaded.values().filter(|a| a.is_some()).count()
        );

        Ok(CrawlReport {
            root,
            pages,
            pages_scraped: self.pages_scraped,
        })
    }

    /// Scrape one page, returning its result and its links in document order
    async fn scrape_page<D: PageDriver>(
        &mut self,
        driver: &mut D,
        url: &str,
    ) -> Result<(ScrapeResult, Vec<String>), CloneError> {
        ::log::info!(
            "Scraping page {}/{}: {}",
            self.pages_scraped,
            self.config.max_pages,
            url
        );
        let worker_start = std::time::Instant::now();

        driver.navigate(url, self.config.timeout()).await?;
        let page = driver.capture().await?;

        let page_url = Url::parse(&page.url)
            .or_else(|_| Url::parse(url))
            .map_err(|e| CloneError::invalid_url(url, e))?;
        if page_url.as_str() != url {
            // Redirect target counts as visited too
            self.visited.insert(page_url.as_str());
            if url == self.root.as_str() && !self.filter.is_same_origin(&page_url) {
                ::log::info!("Root redirected to {}, following links there", page_url);
                self.filter.allow_origin(&page_url);
            }
        }

        let discovery = discover(&page.html, &page_url, &self.filter);

        let mut css = Vec::new();
        let mut assets = BTreeMap::new();
        let mut css_refs = Vec::new();

        let sheet_candidates = discovery
            .stylesheets
            .iter()
            .map(|url| Candidate {
                url: url.clone(),
                kind: AssetKind::Stylesheet,
            })
            .collect();
        for (candidate, asset) in self.collect(sheet_candidates).await {
            if let Some(asset) = asset {
                assets.insert(candidate.url.clone(), asset);
            }
            if let Some(body) = self.stylesheet_bodies.get(&candidate.url) {
                if let Ok(base) = Url::parse(&candidate.url) {
                    css_refs.extend(css_references(body, &base));
                }
                css.push(body.clone());
            }
        }

        for inline in &discovery.inline_styles {
            css_refs.extend(css_references(inline, &page_url));
            css.push(inline.clone());
        }

        if !page.critical_css.trim().is_empty() {
            css.push(page.critical_css.clone());
        }

        let mut candidates = discovery.assets.clone();
        candidates.extend(
            page.background_urls
                .iter()
                .filter_map(|bg| resolve(&page_url, bg))
                .map(|url| Candidate {
                    url,
                    kind: AssetKind::Image,
                }),
        );
        candidates.extend(css_refs);

        for (candidate, asset) in self.collect(candidates).await {
            if let Some(asset) = asset {
                assets.insert(candidate.url, asset);
            }
        }

        ::log::debug!(
            "Processed {} in {:.2} seconds ({} assets, {} links)",
            page_url,
            worker_start.elapsed().as_secs_f64(),
            assets.len(),
            discovery.links.len()
        );

        let result = ScrapeResult {
            url: page_url.to_string(),
            html: page.html,
            css,
            assets,
            links: discovery.links.iter().cloned().collect(),
            metadata: discovery.metadata,
        };
        Ok((result, discovery.links))
    }

    /// Download every candidate not yet attempted this session, then report
    /// each candidate's asset in the order given
    async fn collect(&mut self, candidates: Vec<Candidate>) -> Vec<(Candidate, Option<Asset>)> {
        let mut queued = HashSet::new();
        let pending: Vec<Candidate> = candidates
            .iter()
            .filter(|c| !self.downloaded.contains_key(&c.url) && queued.insert(c.url.clone()))
            .cloned()
            .collect();

        let fetched = self.fetch_all(&pending).await;
        for (candidate, bytes) in pending.into_iter().zip(fetched) {
            let asset = match bytes {
                Some(bytes) => self.store(&candidate, bytes).await,
                None => None,
            };
            self.downloaded.insert(candidate.url, asset);
        }

        let mut reported = HashSet::new();
        candidates
            .into_iter()
            .filter(|c| reported.insert(c.url.clone()))
            .map(|c| {
                let asset = self.downloaded.get(&c.url).cloned().flatten();
                (c, asset)
            })
            .collect()
    }

    /// Fetch in discovery order, with at most `asset_concurrency` requests in flight
    async fn fetch_all(&self, pending: &[Candidate]) -> Vec<Option<Vec<u8>>> {
        let limit = self.config.asset_concurrency.max(1);
        if limit == 1 {
            let mut results = Vec::with_capacity(pending.len());
            for candidate in pending {
                results.push(self.fetcher.fetch(&candidate.url).await);
            }
            return results;
        }

        let semaphore = Arc::new(Semaphore::new(limit));
        let mut tasks = JoinSet::new();
        for (index, candidate) in pending.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&semaphore);
            let url = candidate.url.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, fetcher.fetch(&url).await)
            });
        }

        let mut results = vec![None; pending.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, bytes)) => results[index] = bytes,
                Err(e) => ::log::warn!("Asset download task failed: {}", e),
            }
        }
        results
    }

    /// Write downloaded bytes under the asset directory
    async fn store(&mut self, candidate: &Candidate, bytes: Vec<u8>) -> Option<Asset> {
        if candidate.kind == AssetKind::Stylesheet {
            self.stylesheet_bodies.insert(
                candidate.url.clone(),
                String::from_utf8_lossy(&bytes).into_owned(),
            );
        }

        let file_name = self.unique_name(&candidate.url);
        let local_path = self.config.asset_dir.join(&file_name);

        let written = match tokio::fs::create_dir_all(&self.config.asset_dir).await {
            Ok(()) => tokio::fs::write(&local_path, &bytes).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            ::log::warn!(
                "Could not write asset {} to {}: {}",
                candidate.url,
                local_path.display(),
                e
            );
            return None;
        }

        Some(Asset {
            url: candidate.url.clone(),
            local_path,
            kind: candidate.kind,
        })
    }

    /// `{timestamp}-{basename}`, with a counter if the name was already handed out
    fn unique_name(&mut self, url: &str) -> String {
        let stamp = chrono::Utc::now().timestamp_millis();
        let base = url_basename(url);
        let mut name = format!("{stamp}-{base}");
        let mut counter = 1;
        while !self.used_names.insert(name.clone()) {
            name = format!("{stamp}-{counter}-{base}");
            counter += 1;
        }
        name
    }
}

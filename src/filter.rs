use regex::Regex;
use url::Url;

/// Static file extensions that are never followed as pages
const STATIC_EXTENSIONS: &str =
    r"(?i)\.(jpg|jpeg|png|gif|webp|avif|css|js|ico|svg|woff|woff2|ttf|eot|pdf|zip|mp4|webm|mp3|xml|json)$";

/// Decides which discovered links belong to the crawl: same origin as the
/// target (or where the target redirected to), http/https, not a static file,
/// not excluded by user patterns.
#[derive(Debug)]
pub struct UrlFilter {
    origins: Vec<url::Origin>,
    exclude_regexes: Vec<Regex>,
}

impl UrlFilter {
    /// Create a filter scoped to the origin of `root`
    pub fn new(root: &Url, exclude_patterns: &[String]) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(exclude_patterns.len() + 1);
        exclude_regexes.push(Regex::new(STATIC_EXTENSIONS)?);
        for pattern in exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            origins: vec![root.origin()],
            exclude_regexes,
        })
    }

    /// Also accept links on `url`'s origin (the root redirected there)
    pub fn allow_origin(&mut self, url: &Url) {
        let origin = url.origin();
        if !self.origins.contains(&origin) {
            self.origins.push(origin);
        }
    }

    /// Same scheme, host and port as the crawl root
    pub fn is_same_origin(&self, url: &Url) -> bool {
        self.origins.contains(&url.origin())
    }

    /// Determine if a URL should be crawled based on all filtering rules
    pub fn should_crawl(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if !self.is_same_origin(url) {
            return false;
        }

        // Patterns run against the path so query strings do not defeat the extension check
        let path = url.path();
        let url_str = url.as_str();
        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(path) || regex.is_match(url_str))
    }

    /// Create a normalized version of the URL (fragment removed)
    pub fn normalize_url(url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}

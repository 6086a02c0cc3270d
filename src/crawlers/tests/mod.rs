
use crate::crawlers::driver::{PageDriver, RenderedPage};
use crate::crawlers::fetch::FetchAsset;
use crate::error::{CloneError, NavigationError, NavigationKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory browser serving canned pages
pub(super) struct FakeDriver {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    current: Option<String>,
    pub navigations: Arc<Mutex<Vec<String>>>,
    pub closes: Arc<AtomicUsize>,
}

impl FakeDriver {
    pub fn new(pages: &[(&str, String)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.clone()))
                .collect(),
            redirects: HashMap::new(),
            current: None,
            navigations: Arc::new(Mutex::new(Vec::new())),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FakeDriver {
    /// Navigating to `from` lands on `to`
    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }
}

impl PageDriver for FakeDriver {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), NavigationError> {
        self.navigations.lock().unwrap().push(url.to_string());
        let target = self.redirects.get(url).map_or(url, String::as_str);
        if self.pages.contains_key(target) {
            self.current = Some(target.to_string());
            Ok(())
        } else {
            Err(NavigationError::new(
                url,
                NavigationKind::Generic,
                "net::ERR_NAME_NOT_RESOLVED",
            ))
        }
    }

    async fn capture(&mut self) -> Result<RenderedPage, CloneError> {
        let url = self.current.clone().unwrap_or_default();
        Ok(RenderedPage {
            html: self.pages.get(&url).cloned().unwrap_or_default(),
            url,
            critical_css: "body {\n  color: rgb(0, 0, 0);\n}\n".to_string(),
            background_urls: Vec::new(),
        })
    }

    async fn close(self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Fetcher answering from a map; unknown URLs fail like an exhausted retry loop
#[derive(Default)]
pub(super) struct FakeFetcher {
    responses: HashMap<String, Vec<u8>>,
    pub calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl FakeFetcher {
    pub fn with(mut self, url: &str, body: &[u8]) -> Self {
        self.responses.insert(url.to_string(), body.to_vec());
        self
    }
}

impl FetchAsset for FakeFetcher {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;
        self.responses.get(url).cloned()
    }
}

/// A page linking to the given paths
pub(super) fn page_with_links(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{href}\">{href}</a>"))
        .collect();
    format!("<html><head><title>{title}</title></head><body><h1>{title}</h1>{anchors}</body></html>")
}

use crate::error::{CloneError, NavigationError, NavigationKind};
use fantoccini::{Client, ClientBuilder};
use serde_json::{Value, json};
use std::time::{Duration, Instant};

/// Selectors whose computed styles are captured on every page
pub const CRITICAL_SELECTORS: &[&str] = &[
    "body", "header", "nav", "main", "footer", "h1", "h2", "h3", "p", "a", "button",
];

/// Computed properties captured for each critical selector
pub const CRITICAL_PROPERTIES: &[&str] = &[
    "font-family",
    "font-size",
    "color",
    "background-color",
    "margin",
    "padding",
    "display",
    "position",
];

/// Titles of bot-wall interstitials
const BLOCKED_TITLES: &[&str] = &[
    "access denied",
    "just a moment",
    "attention required",
    "request blocked",
    "403 forbidden",
];

const POLL_INTERVAL: Duration = Duration::from_millis(250);

const IDLE_PROBE_JS: &str = "return [document.readyState, \
    performance.getEntriesByType('resource').length, document.title];";

const COMPUTED_STYLES_JS: &str = r#"
const selectors = arguments[0];
const props = arguments[1];
let out = '';
for (const sel of selectors) {
  const el = document.querySelector(sel);
  if (!el) continue;
  const cs = window.getComputedStyle(el);
  let body = '';
  for (const p of props) {
    const v = cs.getPropertyValue(p);
    if (v) body += '  ' + p + ': ' + v + ';\n';
  }
  if (body) out += sel + ' {\n' + body + '}\n';
}
return out;
"#;

const BACKGROUND_IMAGES_JS: &str = r#"
const urls = [];
for (const el of document.querySelectorAll('*')) {
  const bg = window.getComputedStyle(el).backgroundImage;
  if (!bg || bg === 'none') continue;
  const re = /url\(["']?([^"')]+)["']?\)/g;
  let m;
  while ((m = re.exec(bg)) !== null) urls.push(m[1]);
}
return urls;
"#;

/// A page as rendered by the browser
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    /// Final URL after redirects
    pub url: String,
    pub html: String,
    /// Synthesized CSS block of computed styles for [`CRITICAL_SELECTORS`]
    pub critical_css: String,
    /// `background-image` URLs from computed styles, in document order
    pub background_urls: Vec<String>,
}

/// A single reusable browser page. The crawl drives it sequentially.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Load `url` and wait until the network is idle
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), NavigationError>;

    /// Capture the currently loaded page
    async fn capture(&mut self) -> Result<RenderedPage, CloneError>;

    /// Release the browser session
    async fn close(self);
}

/// [`PageDriver`] backed by a WebDriver session
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Connect to the WebDriver instance, trying common local ports when the configured one fails
    pub async fn connect(webdriver_url: &str) -> Result<Self, CloneError> {
        let first_error = match ClientBuilder::native().connect(webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", webdriver_url);
                return Ok(Self { client });
            }
            Err(e) => e.to_string(),
        };

        ::log::warn!(
            "Failed to connect to WebDriver at {}: {}",
            webdriver_url,
            first_error
        );

        let fallback_urls = [
            "http://localhost:9515", // ChromeDriver default
            "http://localhost:4444", // Selenium / geckodriver default
            "http://127.0.0.1:4444",
        ];

        for url in fallback_urls.iter().filter(|u| **u != webdriver_url) {
            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = ClientBuilder::native().connect(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(Self { client });
            }
        }

        Err(CloneError::Browser(format!(
            "could not connect to WebDriver at {webdriver_url}: {first_error}"
        )))
    }

    /// Poll until `document.readyState` is complete and the resource count is
    /// unchanged for two consecutive polls
    async fn wait_for_network_idle(&self, url: &str, deadline: Instant) -> Result<(), NavigationError> {
        let mut last_count: Option<u64> = None;
        let mut stable_polls = 0;

        loop {
            let probe = self
                .client
                .execute(IDLE_PROBE_JS, vec![])
                .await
                .map_err(|e| NavigationError::classify(url, e.to_string()))?;

            let ready = probe.get(0).and_then(Value::as_str) == Some("complete");
            let count = probe.get(1).and_then(Value::as_u64).unwrap_or(0);
            let title = probe.get(2).and_then(Value::as_str).unwrap_or("");

            let lowered = title.to_lowercase();
            if BLOCKED_TITLES.iter().any(|t| lowered.starts_with(t)) {
                return Err(NavigationError::new(
                    url,
                    NavigationKind::Blocked,
                    format!("interstitial page: {title}"),
                ));
            }

            if ready && last_count == Some(count) {
                stable_polls += 1;
                if stable_polls >= 2 {
                    return Ok(());
                }
            } else {
                stable_polls = 0;
            }
            last_count = Some(count);

            if Instant::now() >= deadline {
                if ready {
                    // Long-polling pages never go quiet; a loaded document is good enough
                    ::log::debug!("Network never idled on {}, continuing", url);
                    return Ok(());
                }
                return Err(NavigationError::new(
                    url,
                    NavigationKind::Timeout,
                    "page did not finish loading",
                ));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

impl PageDriver for WebDriverSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), NavigationError> {
        let deadline = Instant::now() + timeout;

        match tokio::time::timeout(timeout, self.client.goto(url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(NavigationError::classify(url, e.to_string())),
            Err(_) => {
                return Err(NavigationError::new(
                    url,
                    NavigationKind::Timeout,
                    format!("navigation exceeded {} ms", timeout.as_millis()),
                ));
            }
        }

        self.wait_for_network_idle(url, deadline).await
    }

    async fn capture(&mut self) -> Result<RenderedPage, CloneError> {
        let browser_error = |e: fantoccini::error::CmdError| CloneError::Browser(e.to_string());

        let url = self.client.current_url().await.map_err(browser_error)?;
        let html = self.client.source().await.map_err(browser_error)?;

        let critical_css = self
            .client
            .execute(
                COMPUTED_STYLES_JS,
                vec![json!(CRITICAL_SELECTORS), json!(CRITICAL_PROPERTIES)],
            )
            .await
            .map_err(browser_error)?
            .as_str()
            .unwrap_or_default()
            .to_string();

        // Computed backgrounds are a bonus; a failing script is not worth losing the page over
        let background_urls = match self.client.execute(BACKGROUND_IMAGES_JS, vec![]).await {
            Ok(Value::Array(values)) => values
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Ok(_) => Vec::new(),
            Err(e) => {
                ::log::warn!("Could not read computed backgrounds on {}: {}", url, e);
                Vec::new()
            }
        };

        Ok(RenderedPage {
            url: url.to_string(),
            html,
            critical_css,
            background_urls,
        })
    }

    async fn close(self) {
        if let Err(e) = self.client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        } else {
            ::log::debug!("WebDriver session closed");
        }
    }
}

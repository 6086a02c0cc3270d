use std::fmt;

/// Why a page failed to load, as reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// The site refused the browser (bot wall, 403, interstitial)
    Blocked,
    /// Navigation or network-idle wait exceeded the configured timeout
    Timeout,
    /// Anything else
    Generic,
}

impl fmt::Display for NavigationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationKind::Blocked => write!(f, "blocked"),
            NavigationKind::Timeout => write!(f, "timeout"),
            NavigationKind::Generic => write!(f, "generic"),
        }
    }
}

/// A page failed to load. Fatal to the crawl when it happens on the root page.
#[derive(Debug, Clone, thiserror::Error)]
#[error("navigation to {url} failed ({kind}): {detail}")]
pub struct NavigationError {
    pub url: String,
    pub kind: NavigationKind,
    pub detail: String,
}

impl NavigationError {
    pub fn new(url: &str, kind: NavigationKind, detail: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            kind,
            detail: detail.into(),
        }
    }

    /// Build a navigation error from raw driver error text, guessing the kind
    pub fn classify(url: &str, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let lower = detail.to_lowercase();
        let kind = if lower.contains("timeout") || lower.contains("timed out") {
            NavigationKind::Timeout
        } else if lower.contains("403")
            || lower.contains("blocked")
            || lower.contains("access denied")
            || lower.contains("forbidden")
            || lower.contains("captcha")
        {
            NavigationKind::Blocked
        } else {
            NavigationKind::Generic
        };
        Self::new(url, kind, detail)
    }
}

/// Per-asset failures. These are logged and the asset is dropped; they never abort a crawl.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("download of {url} failed: {detail}")]
    Download { url: String, detail: String },

    #[error("asset {url} is {size} bytes, limit is {max}")]
    TooLarge { url: String, size: u64, max: u64 },
}

/// All errors that can surface from the pipeline
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("browser session error: {0}")]
    Browser(String),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse, user-facing grouping of failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Blocked,
    Timeout,
    Network,
    InvalidInput,
    Generic,
}

impl FailureCategory {
    pub fn message(&self) -> &'static str {
        match self {
            FailureCategory::Blocked => {
                "The website blocked automated access. Try a different page or site."
            }
            FailureCategory::Timeout => {
                "The website took too long to respond. Try again or raise the timeout."
            }
            FailureCategory::Network => {
                "Could not reach the browser or the website. Check that WebDriver is running."
            }
            FailureCategory::InvalidInput => "The URL or configuration is not valid.",
            FailureCategory::Generic => "Cloning failed. See the logs for details.",
        }
    }
}

impl CloneError {
    pub fn category(&self) -> FailureCategory {
        match self {
            CloneError::Navigation(e) => match e.kind {
                NavigationKind::Blocked => FailureCategory::Blocked,
                NavigationKind::Timeout => FailureCategory::Timeout,
                NavigationKind::Generic => FailureCategory::Generic,
            },
            CloneError::Browser(_) => FailureCategory::Network,
            CloneError::InvalidUrl { .. } | CloneError::Config(_) => FailureCategory::InvalidInput,
            CloneError::Io(_) | CloneError::Json(_) | CloneError::Http(_) => {
                FailureCategory::Generic
            }
        }
    }

    pub fn invalid_url(url: &str, reason: impl fmt::Display) -> Self {
        CloneError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

use crate::error::CloneError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one crawl session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// URL to start crawling from (http/https only). May be left out of a
    /// config file and supplied on the command line.
    #[serde(default)]
    pub target_url: String,

    /// Maximum link depth below the target page
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum number of pages scraped in one session
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Assets larger than this are skipped
    #[serde(default = "default_max_asset_size")]
    pub max_asset_size_bytes: u64,

    /// Per-navigation timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Directory downloaded assets are written to
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,

    /// Number of assets downloaded at once (1 = sequential)
    #[serde(default = "default_asset_concurrency")]
    pub asset_concurrency: usize,

    /// Child links followed per page
    #[serde(default = "default_max_links_per_page")]
    pub max_links_per_page: usize,

    /// Download attempts per asset
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// First retry delay in milliseconds, doubled on each retry
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    /// Regex patterns for links that are never followed
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// User agent sent with asset downloads
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_max_depth() -> usize {
    1
}

fn default_max_pages() -> usize {
    10
}

fn default_max_asset_size() -> u64 {
    10 * 1024 * 1024
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from(".site-clone/assets")
}

fn default_asset_concurrency() -> usize {
    1
}

fn default_max_links_per_page() -> usize {
    5
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_base_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
        .to_string()
}

impl CrawlConfig {
    /// Create a new configuration with default values
    pub fn new(target_url: &str) -> Self {
        Self {
            target_url: target_url.to_string(),
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            max_asset_size_bytes: default_max_asset_size(),
            timeout_ms: default_timeout_ms(),
            webdriver_url: default_webdriver_url(),
            asset_dir: default_asset_dir(),
            asset_concurrency: default_asset_concurrency(),
            max_links_per_page: default_max_links_per_page(),
            retry_attempts: default_retry_attempts(),
            retry_base_ms: default_retry_base_ms(),
            exclude_patterns: Vec::new(),
            user_agent: default_user_agent(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CloneError> {
        let contents = read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The WebDriver URL, with `WEBDRIVER_URL` taking precedence when set
    pub fn resolved_webdriver_url(&self) -> String {
        match std::env::var("WEBDRIVER_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => self.webdriver_url.clone(),
        }
    }
}

/// Brand data substituted into the clone. Read-only for the whole run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default)]
    pub colors: BrandColors,
    #[serde(default)]
    pub typography: Typography,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub social: SocialLinks,
    #[serde(default)]
    pub dealership: Dealership,
    #[serde(default)]
    pub media: Media,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

impl Default for BrandColors {
    fn default() -> Self {
        Self {
            primary: "#1e40af".to_string(),
            secondary: "#0f172a".to_string(),
            accent: "#f59e0b".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Typography {
    pub font_family: String,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: Address,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
}

impl Address {
    /// `street, city, state zip`, skipping empty parts
    pub fn formatted(&self) -> String {
        let state_zip = [self.state.as_str(), self.zip.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        [self.street.as_str(), self.city.as_str(), state_zip.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dealership {
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub financing: Financing,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_hours: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    #[serde(default = "default_placeholder_count")]
    pub placeholder_count: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            placeholder_count: default_placeholder_count(),
        }
    }
}

fn default_placeholder_count() -> usize {
    12
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financing {
    #[serde(default)]
    pub partners: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    /// Replacement for embedded videos; a placeholder block is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl BrandConfig {
    /// Load a brand from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CloneError> {
        let contents = read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, CloneError> {
        let brand: Self = serde_json::from_str(json)?;
        if brand.name.trim().is_empty() {
            return Err(CloneError::Config("brand name must not be empty".to_string()));
        }
        Ok(brand)
    }
}

fn read_to_string(path: &Path) -> Result<String, CloneError> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_config_defaults() {
        let config: CrawlConfig =
            serde_json::from_str(r#"{"target_url": "https://example.com"}"#).unwrap();
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.max_pages, 10);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_base_ms, 1000);
        assert_eq!(config.max_links_per_page, 5);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_brand_config_camel_case() {
        let brand = BrandConfig::from_json(
            r##"{
                "name": "Summit Auto",
                "colors": {"primary": "#111111", "secondary": "#222222", "accent": "#333333"},
                "typography": {"fontFamily": "Roboto"},
                "contact": {
                    "phone": "(555) 010-2000",
                    "email": "hello@summit.test",
                    "address": {"street": "1 Peak Rd", "city": "Denver", "state": "CO", "zip": "80202"}
                },
                "social": {"facebook": "https://facebook.com/summit"},
                "dealership": {"inventory": {"placeholderCount": 6}, "salesHours": "Mon-Sat 9-7"}
            }"##,
        )
        .unwrap();
        assert_eq!(brand.typography.font_family, "Roboto");
        assert_eq!(brand.dealership.inventory.placeholder_count, 6);
        assert_eq!(brand.dealership.sales_hours.as_deref(), Some("Mon-Sat 9-7"));
        assert_eq!(brand.contact.address.formatted(), "1 Peak Rd, Denver, CO 80202");
        assert!(brand.social.twitter.is_none());
    }

    #[test]
    fn test_brand_defaults_and_validation() {
        let brand = BrandConfig::from_json(r#"{"name": "Acme"}"#).unwrap();
        assert_eq!(brand.dealership.inventory.placeholder_count, 12);
        assert_eq!(brand.typography.font_family, "Inter");

        assert!(BrandConfig::from_json(r#"{"name": "  "}"#).is_err());
    }
}

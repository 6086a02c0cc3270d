mod project_tests;

use crate::config::BrandConfig;
use crate::enhance::EnhancedContent;
use crate::parsers::{EnhancedParseResult, parse_enhanced};
use crate::results::{Asset, AssetKind, PageMetadata, ScrapeResult};
use std::path::PathBuf;

pub(super) fn brand() -> BrandConfig {
    BrandConfig::from_json(
        r##"{
            "name": "Acme Auto",
            "tagline": "Drive happy",
            "colors": {"primary": "#cc0000"},
            "contact": {"phone": "(800) 555-0100", "email": "hello@acme.test"}
        }"##,
    )
    .unwrap()
}

/// A scraped page plus everything derived from it
pub(super) struct Fixture {
    pub scrape: ScrapeResult,
    pub parsed: EnhancedParseResult,
    pub content: EnhancedContent,
}

impl Fixture {
    pub fn new(url: &str, html: &str, brand: &BrandConfig) -> Self {
        Self::with_assets(url, html, Vec::new(), brand)
    }

    pub fn with_assets(url: &str, html: &str, assets: Vec<(&str, PathBuf)>, brand: &BrandConfig) -> Self {
        let scrape = ScrapeResult {
            url: url.to_string(),
            html: html.to_string(),
            css: vec!["body { background: url(/img/bg.png); }".to_string()],
            assets: assets
                .into_iter()
                .map(|(url, local_path)| {
                    (
                        url.to_string(),
                        Asset {
                            url: url.to_string(),
                            local_path,
                            kind: AssetKind::Image,
                        },
                    )
                })
                .collect(),
            links: Default::default(),
            metadata: PageMetadata {
                title: "Smith Motors | Home".to_string(),
                ..PageMetadata::default()
            },
        };
        let parsed = parse_enhanced(&scrape, brand);
        let content = EnhancedContent::defaults(brand);
        Self {
            scrape,
            parsed,
            content,
        }
    }

    pub fn source(&self) -> crate::generator::PageSource<'_> {
        crate::generator::PageSource {
            scrape: &self.scrape,
            parsed: &self.parsed,
            content: &self.content,
        }
    }
}

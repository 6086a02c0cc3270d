use crate::brand::{self, BrandReplacement};
use crate::config::BrandConfig;
use crate::parsers::{ParseResult, Parser};
use crate::results::ScrapeResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Structural parse plus brand substitution for one page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedParseResult {
    #[serde(flatten)]
    pub parse: ParseResult,
    /// Page markup with the brand theme injected, replacements not yet applied
    pub html: String,
    pub replacements: Vec<BrandReplacement>,
    /// Source asset URL to project path
    pub asset_map: BTreeMap<String, String>,
}

impl EnhancedParseResult {
    /// Markup with every replacement applied
    pub fn branded_html(&self, brand: &BrandConfig) -> String {
        brand::apply_replacements(&self.html, &self.replacements, brand)
    }
}

pub fn parse_enhanced(scrape: &ScrapeResult, brand: &BrandConfig) -> EnhancedParseResult {
    let parse = Parser::parse(scrape);
    let replacements = brand::find_replacements(&scrape.html, &scrape.metadata, brand);

    EnhancedParseResult {
        parse,
        html: brand::inject_theme(&scrape.html, brand),
        replacements,
        asset_map: brand::asset_map(scrape),
    }
}

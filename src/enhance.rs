//! Optional copywriting hook.
//!
//! An enhancer may rewrite a handful of key texts for the brand. Without one,
//! or when it has nothing to offer, a fixed default per text kind is used.

use crate::config::BrandConfig;
use crate::parsers::{ComponentKind, ParseResult};
use crate::results::PageMetadata;
use crate::rewrite::finish;
use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Which text an enhancer is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    HeroHeadline,
    HeroSubheadline,
    About,
    CallToAction,
    MetaDescription,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::HeroHeadline,
        ContentKind::HeroSubheadline,
        ContentKind::About,
        ContentKind::CallToAction,
        ContentKind::MetaDescription,
    ];
}

/// Source of replacement copy
#[allow(async_fn_in_trait)]
pub trait ContentEnhancer {
    /// New text for `kind`, or `None` to fall back to the default
    async fn enhance(
        &self,
        brand: &BrandConfig,
        kind: ContentKind,
        original: Option<&str>,
    ) -> Option<String>;
}

/// Always defers to the defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnhancer;

impl ContentEnhancer for NoEnhancer {
    async fn enhance(&self, _: &BrandConfig, _: ContentKind, _: Option<&str>) -> Option<String> {
        None
    }
}

/// Deterministic copy used when no enhancer answers
pub fn default_content(kind: ContentKind, brand: &BrandConfig) -> String {
    let name = &brand.name;
    let tagline = brand.tagline.as_deref();
    match kind {
        ContentKind::HeroHeadline => format!("Welcome to {name}"),
        ContentKind::HeroSubheadline => tagline
            .unwrap_or("Quality vehicles, fair prices and service you can count on.")
            .to_string(),
        ContentKind::About => format!(
            "{name} is a locally owned dealership helping drivers find the right vehicle, with transparent pricing and a team that puts customers first."
        ),
        ContentKind::CallToAction => format!("Contact {name} Today"),
        ContentKind::MetaDescription => match tagline {
            Some(tagline) => format!("{name} - {tagline}"),
            None => format!("{name} - new and used vehicles, financing and service."),
        },
    }
}

/// Final copy for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedContent {
    pub hero_headline: String,
    pub hero_subheadline: String,
    pub about: String,
    pub call_to_action: String,
    pub meta_description: String,
}

impl EnhancedContent {
    /// Defaults for every kind
    pub fn defaults(brand: &BrandConfig) -> Self {
        Self {
            hero_headline: default_content(ContentKind::HeroHeadline, brand),
            hero_subheadline: default_content(ContentKind::HeroSubheadline, brand),
            about: default_content(ContentKind::About, brand),
            call_to_action: default_content(ContentKind::CallToAction, brand),
            meta_description: default_content(ContentKind::MetaDescription, brand),
        }
    }

    /// Write the headline into the first `<h1>` and the subheadline into the
    /// first `<p>` after it
    pub fn apply_hero(&self, html: &str) -> String {
        let headline_done = Cell::new(false);
        let subheadline_done = Cell::new(false);
        let result = rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!("h1", |el| {
                        if !headline_done.get() {
                            el.set_inner_content(&self.hero_headline, ContentType::Text);
                            headline_done.set(true);
                        }
                        Ok(())
                    }),
                    element!("p", |el| {
                        if headline_done.get() && !subheadline_done.get() {
                            el.set_inner_content(&self.hero_subheadline, ContentType::Text);
                            subheadline_done.set(true);
                        }
                        Ok(())
                    }),
                ],
                ..RewriteStrSettings::new()
            },
        );
        finish(result, html, "hero copy")
    }

    fn slot(&mut self, kind: ContentKind) -> &mut String {
        match kind {
            ContentKind::HeroHeadline => &mut self.hero_headline,
            ContentKind::HeroSubheadline => &mut self.hero_subheadline,
            ContentKind::About => &mut self.about,
            ContentKind::CallToAction => &mut self.call_to_action,
            ContentKind::MetaDescription => &mut self.meta_description,
        }
    }
}

/// Ask `enhancer` for every kind, keeping defaults where it declines
pub async fn enhance_page<E: ContentEnhancer>(
    enhancer: &E,
    brand: &BrandConfig,
    parse: &ParseResult,
    metadata: &PageMetadata,
) -> EnhancedContent {
    let hero_texts: Vec<&str> = parse
        .components_of(ComponentKind::Hero)
        .flat_map(|c| c.text_nodes.iter().map(|n| n.text.as_str()))
        .collect();
    let about = parse
        .components_of(ComponentKind::Section)
        .flat_map(|c| c.text_nodes.iter())
        .map(|n| n.text.as_str())
        .find(|text| text.chars().count() > 50);

    let mut content = EnhancedContent::defaults(brand);
    for kind in ContentKind::ALL {
        let original = match kind {
            ContentKind::HeroHeadline => hero_texts.first().copied(),
            ContentKind::HeroSubheadline => hero_texts.get(1).copied(),
            ContentKind::About => about,
            ContentKind::CallToAction => None,
            ContentKind::MetaDescription => metadata.description.as_deref(),
        };
        match enhancer.enhance(brand, kind, original).await {
            Some(text) if !text.trim().is_empty() => *content.slot(kind) = text.trim().to_string(),
            _ => ::log::debug!("Using default copy for {:?}", kind),
        }
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::Parser;

    fn brand() -> BrandConfig {
        BrandConfig::from_json(r#"{"name": "Acme Auto", "tagline": "Drive happy"}"#).unwrap()
    }

    /// Rewrites only headlines, echoing what it was given
    struct HeadlineWriter;

    impl ContentEnhancer for HeadlineWriter {
        async fn enhance(
            &self,
            brand: &BrandConfig,
            kind: ContentKind,
            original: Option<&str>,
        ) -> Option<String> {
            (kind == ContentKind::HeroHeadline)
                .then(|| format!("{} ({})", brand.name, original.unwrap_or("none")))
        }
    }

    #[test]
    fn test_defaults_are_deterministic() {
        let brand = brand();
        assert_eq!(EnhancedContent::defaults(&brand), EnhancedContent::defaults(&brand));
        assert_eq!(default_content(ContentKind::HeroHeadline, &brand), "Welcome to Acme Auto");
        assert_eq!(default_content(ContentKind::HeroSubheadline, &brand), "Drive happy");
        assert_eq!(
            default_content(ContentKind::MetaDescription, &brand),
            "Acme Auto - Drive happy"
        );
    }

    #[test]
    fn test_apply_hero() {
        let content = EnhancedContent::defaults(&brand());
        let html = "<p>Top bar</p><section><h1>Smith <b>Motors</b></h1><p>Since 1990</p><p>Keep</p></section><h1>Second</h1>";
        let out = content.apply_hero(html);
        assert_eq!(
            out,
            "<p>Top bar</p><section><h1>Welcome to Acme Auto</h1><p>Drive happy</p><p>Keep</p></section><h1>Second</h1>"
        );
    }

    #[tokio::test]
    async fn test_no_enhancer_yields_defaults() {
        let brand = brand();
        let parse = Parser::parse_html("<section><h1>Old</h1></section>");
        let content = enhance_page(&NoEnhancer, &brand, &parse, &PageMetadata::default()).await;
        assert_eq!(content, EnhancedContent::defaults(&brand));
    }

    #[tokio::test]
    async fn test_enhancer_sees_original_hero_text() {
        let brand = brand();
        let parse = Parser::parse_html("<section><h1>Smith Motors</h1><p>Since 1990</p></section>");
        let content = enhance_page(&HeadlineWriter, &brand, &parse, &PageMetadata::default()).await;
        assert_eq!(content.hero_headline, "Acme Auto (Smith Motors)");
        assert_eq!(content.hero_subheadline, "Drive happy");
    }
}

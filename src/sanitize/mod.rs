//! Content sanitizer.
//!
//! A fixed, ordered list of rewrite rules. Each rule takes markup and returns
//! markup, so any of them can be run and tested alone. Link and form
//! neutralization run last so the content rules still see working markup.

pub mod contact;
pub mod content;
pub mod inventory;
pub mod links;
pub mod media;

#[cfg(test)]
mod tests;

use crate::config::BrandConfig;
use chrono::Datelike;

/// Values the rules substitute in
#[derive(Debug, Clone, Copy)]
pub struct SanitizeContext<'a> {
    pub brand: &'a BrandConfig,
    /// Year written into copyright lines
    pub year: i32,
}

impl<'a> SanitizeContext<'a> {
    pub fn new(brand: &'a BrandConfig) -> Self {
        Self {
            brand,
            year: chrono::Local::now().year(),
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }
}

/// A named markup rewrite
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&str, &SanitizeContext<'_>) -> String,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

pub const RULES: &[Rule] = &[
    Rule { name: "structured-data", apply: contact::drop_structured_data },
    Rule { name: "phone", apply: contact::replace_phones },
    Rule { name: "email", apply: contact::replace_emails },
    Rule { name: "address", apply: contact::replace_addresses },
    Rule { name: "video", apply: media::replace_videos },
    Rule { name: "social", apply: media::replace_social_links },
    Rule { name: "hours", apply: content::replace_hours },
    Rule { name: "copyright", apply: content::replace_copyright },
    Rule { name: "images", apply: media::classify_images },
    Rule { name: "inventory", apply: inventory::replace_listings },
    Rule { name: "listing-scrub", apply: inventory::scrub_listing_text },
    Rule { name: "paths", apply: links::normalize_paths },
    Rule { name: "links", apply: links::neutralize },
];

/// Runs every rule in order over a page
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer<'a> {
    context: SanitizeContext<'a>,
}

impl<'a> Sanitizer<'a> {
    pub fn new(brand: &'a BrandConfig) -> Self {
        Self {
            context: SanitizeContext::new(brand),
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.context = self.context.with_year(year);
        self
    }

    pub fn sanitize(&self, html: &str) -> String {
        RULES.iter().fold(html.to_string(), |markup, rule| {
            let out = (rule.apply)(&markup, &self.context);
            ::log::trace!("Sanitizer rule '{}' done ({} -> {} bytes)", rule.name, markup.len(), out.len());
            out
        })
    }
}

/// Sanitize with the current year
pub fn sanitize(html: &str, brand: &BrandConfig) -> String {
    Sanitizer::new(brand).sanitize(html)
}

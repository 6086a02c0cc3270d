//! Vehicle listing detection.
//!
//! Listing grids are swapped wholesale for demo cards, lone listing items for
//! a single generic card, and whatever listing text survives is scrubbed.

use crate::parsers::text::visible_text;
use crate::rewrite::{render_with, rewrite_text};
use crate::sanitize::SanitizeContext;
use crate::utils::escape_attr;
use rand::Rng;
use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static MILEAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:miles|mileage|odometer)\b|\b\d{1,3}(?:,\d{3})+\s*mi\b").unwrap()
});
static PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\$\s?\d|\b(?:price|msrp)\b").unwrap());
static IDENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:19|20)\d{2}\b|\b(?:make|model|stock|vin)\b").unwrap()
});
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
static ITEM_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)vehicle|listing|inventory|car-item|car-card|srp").unwrap()
});

const MAKES: &str = "acura|audi|bmw|buick|cadillac|chevrolet|chevy|chrysler|dodge|ford|gmc|honda|hyundai|infiniti|jeep|kia|lexus|lincoln|mazda|mercedes-benz|mercedes|mitsubishi|nissan|ram|subaru|tesla|toyota|volkswagen|vw|volvo";

static VIN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-HJ-NPR-Z0-9]{17}\b").unwrap());
static STOCK_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bstock\s*(?:#|no\.|number|:)\s*:?\s*([A-Z0-9][A-Z0-9-]*)").unwrap()
});
static PRICE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\s?(?:\d{1,3}(?:,\d{3})+|\d{4,})(?:\.\d{2})?").unwrap()
});
static MILEAGE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:\d{1,3}(?:,\d{3})+|\d{4,})\s*(?:miles|mi)\b").unwrap()
});
static YMM_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?:19|20)\d{{2}}\s+(?:{MAKES})\b(?:\s+[A-Z0-9][\w-]*)?")).unwrap()
});

/// Demo vehicles cards rotate through
const DEMO_VEHICLES: &[(&str, &str)] = &[
    ("Honda", "Accord"),
    ("Toyota", "Camry"),
    ("Ford", "F-150"),
    ("Chevrolet", "Silverado"),
    ("Nissan", "Altima"),
    ("Jeep", "Wrangler"),
    ("Hyundai", "Tucson"),
    ("Subaru", "Outback"),
];
const NEWEST_DEMO_YEAR: u32 = 2024;
const DEMO_COLORS: &[&str] = &["#1f2937", "#374151", "#9ca3af", "#b91c1c", "#1d4ed8", "#f3f4f6", "#065f46"];

/// Tags never treated as a listing container
const PAGE_LEVEL_TAGS: &[&str] = &["html", "head", "body", "main"];

/// Page structure: never a grid, and neither is anything wrapping it
static LANDMARKS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("header, nav, footer, main, [role=banner], [role=navigation], [role=contentinfo], [role=main]")
        .unwrap()
});

/// Text has all three listing keyword families
pub fn looks_like_listing_block(text: &str) -> bool {
    MILEAGE.is_match(text) && PRICE.is_match(text) && IDENTITY.is_match(text)
}

/// Relaxed single-listing test: mileage or price, plus a model year
pub fn looks_like_listing_item(text: &str) -> bool {
    (MILEAGE.is_match(text) || PRICE.is_match(text)) && YEAR.is_match(text)
}

fn is_listing_container(el: ElementRef<'_>) -> bool {
    if PAGE_LEVEL_TAGS.contains(&el.value().name())
        || LANDMARKS.matches(&el)
        || el.select(&LANDMARKS).next().is_some()
    {
        return false;
    }
    if !looks_like_listing_block(&visible_text(el)) {
        return false;
    }
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| looks_like_listing_item(&visible_text(*child)))
        .count()
        >= 2
}

fn is_listing_item(el: ElementRef<'_>) -> bool {
    el.value()
        .attr("class")
        .is_some_and(|class| ITEM_CLASS.is_match(class))
        && looks_like_listing_item(&visible_text(el))
}

/// One demo card; year, make and model sit in separate elements
pub fn demo_card(index: usize) -> String {
    let (make, model) = DEMO_VEHICLES[index % DEMO_VEHICLES.len()];
    let year = NEWEST_DEMO_YEAR - (index % 7) as u32;
    let color = DEMO_COLORS[rand::rng().random_range(0..DEMO_COLORS.len())];
    format!(
        "<div class=\"vehicle-card demo-vehicle\" data-demo-vehicle=\"true\">\
         <div class=\"vehicle-card__image\" style=\"background-color: {color}\"></div>\
         <div class=\"vehicle-card__body\">\
         <h3 class=\"vehicle-card__title\"><span class=\"vehicle-year\">{year}</span> \
         <span class=\"vehicle-make\">{make}</span> <span class=\"vehicle-model\">{model}</span></h3>\
         <p class=\"vehicle-card__price\">$XX,XXX</p>\
         <p class=\"vehicle-card__mileage\">XX,XXX miles</p>\
         <p class=\"vehicle-card__stock\">Stock #: DEMO-{:03}</p>\
         </div></div>",
        index + 1
    )
}

/// Card standing in for a single listing
pub fn generic_card() -> String {
    "<div class=\"vehicle-card demo-vehicle\" data-demo-vehicle=\"true\">\
     <div class=\"vehicle-card__body\">\
     <h3 class=\"vehicle-card__title\">YEAR Make Model</h3>\
     <p class=\"vehicle-card__price\">$XX,XXX</p>\
     <p class=\"vehicle-card__mileage\">XX,XXX miles</p>\
     <p class=\"vehicle-card__stock\">Stock #: DEMO-XXX</p>\
     </div></div>"
        .to_string()
}

/// The container keeps its own tag and attributes; its children become demo cards
fn demo_grid(el: ElementRef<'_>, count: usize) -> String {
    let name = el.value().name();
    let attrs: String = el
        .value()
        .attrs()
        .map(|(attr, value)| format!(" {attr}=\"{}\"", escape_attr(value)))
        .collect();
    let cards: String = (0..count).map(demo_card).collect();
    format!("<{name}{attrs} data-demo-inventory=\"true\">{cards}</{name}>")
}

/// Swap listing containers and stray listing items for demo cards
pub fn replace_listings(html: &str, ctx: &SanitizeContext<'_>) -> String {
    let count = ctx.brand.dealership.inventory.placeholder_count;
    let doc = Html::parse_document(html);
    let mut grids = 0;
    let mut items = 0;

    let rendered = render_with(&doc, |el| {
        if is_listing_container(el) {
            grids += 1;
            Some(demo_grid(el, count))
        } else if is_listing_item(el) {
            items += 1;
            Some(generic_card())
        } else {
            None
        }
    });

    if grids == 0 && items == 0 {
        return html.to_string();
    }
    ::log::debug!("Replaced {} listing grids and {} listing items", grids, items);
    rendered
}

/// Safety net over all text: VINs, stock numbers, prices, mileage and
/// `year make model` runs
pub fn scrub_listing_text(html: &str, _ctx: &SanitizeContext<'_>) -> String {
    rewrite_text(html, "listing scrub", |text| {
        // Brand copyright lines may legitimately read like `2025 Toyota of ...`
        if text.contains('©') {
            return None;
        }
        let mut out = VIN_TEXT.replace_all(text, "XXXXXXXXXXXXXXXXX").into_owned();
        out = STOCK_TEXT
            .replace_all(&out, |caps: &Captures<'_>| {
                if caps[1].to_uppercase().starts_with("DEMO") {
                    caps[0].to_string()
                } else {
                    "Stock #: DEMO-XXX".to_string()
                }
            })
            .into_owned();
        out = PRICE_TEXT.replace_all(&out, "$$XX,XXX").into_owned();
        out = MILEAGE_TEXT.replace_all(&out, "XX,XXX miles").into_owned();
        out = YMM_TEXT.replace_all(&out, "YEAR Make Model").into_owned();
        (out != text).then_some(out)
    })
}

//! SVG stand-ins for media that cannot be reused.

use crate::brand::css_safe;
use crate::config::BrandConfig;
use crate::utils::escape_html;

/// File names under `public/placeholders`, in write order
pub const PLACEHOLDER_FILES: &[&str] = &[
    "logo.svg",
    "banner.svg",
    "team.svg",
    "testimonial.svg",
    "product.svg",
];

/// Every placeholder as `(file name, svg)`
pub fn placeholder_svgs(brand: &BrandConfig) -> Vec<(&'static str, String)> {
    PLACEHOLDER_FILES
        .iter()
        .map(|&name| (name, svg_for(name, brand)))
        .collect()
}

fn svg_for(name: &str, brand: &BrandConfig) -> String {
    let primary = css_safe(&brand.colors.primary);
    let secondary = css_safe(&brand.colors.secondary);
    let accent = css_safe(&brand.colors.accent);
    let font = escape_html(&css_safe(&brand.typography.font_family));
    let label = escape_html(&brand.name);

    match name {
        "logo.svg" => format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="240" height="60" viewBox="0 0 240 60"><rect width="240" height="60" rx="8" fill="{primary}"/><text x="120" y="38" text-anchor="middle" font-family="{font}, sans-serif" font-size="22" font-weight="700" fill="#ffffff">{label}</text></svg>"##
        ),
        "banner.svg" => format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="1600" height="600" viewBox="0 0 1600 600"><defs><linearGradient id="g" x1="0" y1="0" x2="1" y2="1"><stop offset="0" stop-color="{primary}"/><stop offset="1" stop-color="{secondary}"/></linearGradient></defs><rect width="1600" height="600" fill="url(#g)"/><text x="800" y="320" text-anchor="middle" font-family="{font}, sans-serif" font-size="64" font-weight="700" fill="#ffffff">{label}</text></svg>"##
        ),
        "team.svg" => format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="400" viewBox="0 0 400 400"><rect width="400" height="400" fill="#f3f4f6"/><circle cx="200" cy="150" r="70" fill="{secondary}"/><path d="M80 360c0-70 54-120 120-120s120 50 120 120z" fill="{secondary}"/></svg>"##
        ),
        "testimonial.svg" => format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200" viewBox="0 0 200 200"><circle cx="100" cy="100" r="100" fill="{accent}"/><circle cx="100" cy="80" r="34" fill="#ffffff"/><path d="M40 170c0-36 27-60 60-60s60 24 60 60z" fill="#ffffff"/></svg>"##
        ),
        _ => format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="640" height="400" viewBox="0 0 640 400"><rect width="640" height="400" fill="#e5e7eb"/><path d="M120 260l50-70h300l50 70v50H120z" fill="{primary}"/><circle cx="200" cy="310" r="32" fill="#374151"/><circle cx="440" cy="310" r="32" fill="#374151"/><text x="320" y="120" text-anchor="middle" font-family="{font}, sans-serif" font-size="28" fill="#6b7280">Photo coming soon</text></svg>"##
        ),
    }
}

use crate::rewrite::finish;
use crate::sanitize::SanitizeContext;
use lol_html::{element, rewrite_str, RewriteStrSettings};

/// Marks an anchor whose navigation was disabled
pub const LINK_DISABLED_ATTR: &str = "data-link-disabled";
/// Marks a form whose submission was disabled
pub const FORM_DISABLED_ATTR: &str = "data-form-disabled";

const PATH_ATTRS: &[&str] = &[
    "src",
    "href",
    "style",
    "srcset",
    "poster",
    "data-original-src",
    "data-original-href",
];

/// Backslashes in URL-bearing attributes become forward slashes
pub fn normalize_paths(html: &str, _ctx: &SanitizeContext<'_>) -> String {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", |el| {
                for attr in PATH_ATTRS {
                    if let Some(value) = el.get_attribute(attr) {
                        if value.contains('\\') {
                            el.set_attribute(attr, &value.replace('\\', "/"))?;
                        }
                    }
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );
    finish(result, html, "paths")
}

/// Disable navigation and submission.
///
/// Anchors other than `mailto:`/`tel:` point at `#` and keep their target in
/// `data-original-href`. Forms post nowhere, submit buttons become plain
/// buttons, and every inline `on*` handler is dropped.
pub fn neutralize(html: &str, _ctx: &SanitizeContext<'_>) -> String {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("*", |el| {
                    let handlers: Vec<String> = el
                        .attributes()
                        .iter()
                        .map(|attr| attr.name())
                        .filter(|name| name.starts_with("on"))
                        .collect();
                    for name in handlers {
                        el.remove_attribute(&name);
                    }
                    Ok(())
                }),
                element!("a[href]", |el| {
                    let Some(href) = el.get_attribute("href") else {
                        return Ok(());
                    };
                    let scheme = href.trim().to_lowercase();
                    if scheme.starts_with("mailto:") || scheme.starts_with("tel:") {
                        return Ok(());
                    }
                    el.set_attribute("data-original-href", &href)?;
                    el.set_attribute("href", "#")?;
                    el.set_attribute(LINK_DISABLED_ATTR, "true")?;
                    Ok(())
                }),
                element!("form", |el| {
                    if let Some(action) = el.get_attribute("action") {
                        el.set_attribute("data-original-action", &action)?;
                    }
                    el.set_attribute("action", "#")?;
                    el.set_attribute(FORM_DISABLED_ATTR, "true")?;
                    Ok(())
                }),
                element!("button", |el| {
                    let submits = el
                        .get_attribute("type")
                        .is_none_or(|t| t.eq_ignore_ascii_case("submit"));
                    if submits {
                        el.set_attribute("type", "button")?;
                    }
                    Ok(())
                }),
                element!("input[type]", |el| {
                    if el.get_attribute("type").is_some_and(|t| t.eq_ignore_ascii_case("submit")) {
                        el.set_attribute("type", "button")?;
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    );
    finish(result, html, "links")
}

use crate::rewrite::{finish, rewrite_text};
use crate::sanitize::SanitizeContext;
use crate::utils::escape_html;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use regex::Regex;
use std::sync::LazyLock;

pub static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?1[\s.-]?)?(?:\(\d{3}\)\s?|\b\d{3}[\s.-]?)\d{3}[\s.-]?\d{4}\b").unwrap()
});

pub static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

const STREET_SUFFIX: &str = r"(?i:street|st|avenue|ave|road|rd|boulevard|blvd|drive|dr|lane|ln|way|court|ct|highway|hwy|parkway|pkwy|place|pl|circle|cir)\b\.?(?:\s+(?i:suite|ste|unit)\.?\s*[\w-]+|\s+#\s*[\w-]+)?";

/// `123 Main St, City, ST 12345` and `123 Main St, City ST 12345`
pub static ADDRESS_WITH_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b\d{{1,6}}\s+(?:[A-Za-z0-9.'-]+\s+){{0,4}}?{STREET_SUFFIX},\s*[A-Za-z][A-Za-z .'-]*?,?\s+[A-Z]{{2}}\s+\d{{5}}(?:-\d{{4}})?\b"
    ))
    .unwrap()
});

/// `123 Main St City ST 12345`
pub static ADDRESS_NO_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b\d{{1,6}}\s+(?:[A-Za-z0-9.'-]+\s+){{0,4}}?{STREET_SUFFIX}\s+[A-Za-z][A-Za-z .'-]*?\s+[A-Z]{{2}}\s+\d{{5}}(?:-\d{{4}})?\b"
    ))
    .unwrap()
});

/// URL-valued attributes; the link handlers own these
const URL_ATTRIBUTES: &[&str] = &["href", "src", "srcset", "action", "poster"];

const MAP_HOSTS: &[&str] = &["google.com/maps", "maps.google.", "goo.gl/maps", "maps.app.goo.gl"];

/// Phone numbers in text and `tel:` links become the brand phone
pub fn replace_phones(html: &str, ctx: &SanitizeContext<'_>) -> String {
    let phone = &ctx.brand.contact.phone;
    let replacement = escape_html(phone);
    let html = rewrite_text(html, "phone text", |text| {
        PHONE
            .is_match(text)
            .then(|| PHONE.replace_all(text, regex::NoExpand(&replacement)).into_owned())
    });
    let html = rewrite_attributes(&html, "phone attributes", |value| {
        PHONE
            .is_match(value)
            .then(|| PHONE.replace_all(value, regex::NoExpand(phone.as_str())).into_owned())
    });

    let digits: String = phone.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();
    let href = format!("tel:{digits}");
    let result = rewrite_str(
        &html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("a[href]", |el| {
                let is_tel = el
                    .get_attribute("href")
                    .is_some_and(|h| h.trim().to_lowercase().starts_with("tel:"));
                if is_tel {
                    el.set_attribute("href", &href)?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );
    finish(result, &html, "phone links")
}

/// Email addresses in text and `mailto:` links become the brand email
pub fn replace_emails(html: &str, ctx: &SanitizeContext<'_>) -> String {
    let email = &ctx.brand.contact.email;
    let replacement = escape_html(email);
    let html = rewrite_text(html, "email text", |text| {
        EMAIL
            .is_match(text)
            .then(|| EMAIL.replace_all(text, regex::NoExpand(&replacement)).into_owned())
    });
    let html = rewrite_attributes(&html, "email attributes", |value| {
        EMAIL
            .is_match(value)
            .then(|| EMAIL.replace_all(value, regex::NoExpand(email.as_str())).into_owned())
    });

    let href = format!("mailto:{email}");
    let result = rewrite_str(
        &html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("a[href]", |el| {
                let is_mailto = el
                    .get_attribute("href")
                    .is_some_and(|h| h.trim().to_lowercase().starts_with("mailto:"));
                if is_mailto {
                    el.set_attribute("href", &href)?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );
    finish(result, &html, "email links")
}

/// Street addresses become the brand address; map links and embeds point at it
pub fn replace_addresses(html: &str, ctx: &SanitizeContext<'_>) -> String {
    let address = ctx.brand.contact.address.formatted();
    let replacement = escape_html(&address);
    let html = rewrite_text(html, "address text", |text| swap_addresses(text, &replacement));
    let html = rewrite_attributes(&html, "address attributes", |value| {
        swap_addresses(value, &address)
    });

    let query: String = url::form_urlencoded::byte_serialize(address.as_bytes()).collect();
    let link = format!("https://www.google.com/maps/search/?api=1&query={query}");
    let embed = format!("https://www.google.com/maps?q={query}&output=embed");
    let result = rewrite_str(
        &html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("a[href]", |el| {
                    if el.get_attribute("href").is_some_and(|h| is_map_url(&h)) {
                        el.set_attribute("href", &link)?;
                    }
                    Ok(())
                }),
                element!("iframe[src]", |el| {
                    if el.get_attribute("src").is_some_and(|s| is_map_url(&s)) {
                        el.set_attribute("src", &embed)?;
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    );
    finish(result, &html, "map links")
}

fn swap_addresses(text: &str, replacement: &str) -> Option<String> {
    if !ADDRESS_WITH_COMMA.is_match(text) && !ADDRESS_NO_COMMA.is_match(text) {
        return None;
    }
    let text = ADDRESS_WITH_COMMA.replace_all(text, regex::NoExpand(replacement));
    Some(
        ADDRESS_NO_COMMA
            .replace_all(&text, regex::NoExpand(replacement))
            .into_owned(),
    )
}

/// Drop JSON-LD blocks. They restate the business's name, phone, email and
/// address in a form the text passes never see.
pub fn drop_structured_data(html: &str, _ctx: &SanitizeContext<'_>) -> String {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("script[type]", |el| {
                let is_ld = el
                    .get_attribute("type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"));
                if is_ld {
                    el.remove();
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );
    finish(result, html, "structured data")
}

/// Rewrite non-URL attribute values (`title`, `alt`, `aria-label`, `value`,
/// `data-*`, ...). `replace` gets the decoded value and returns plain text.
fn rewrite_attributes<F>(html: &str, pass: &str, replace: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", |el| {
                let edits: Vec<(String, String)> = el
                    .attributes()
                    .iter()
                    .filter(|attr| !URL_ATTRIBUTES.contains(&attr.name().as_str()))
                    .filter_map(|attr| replace(&attr.value()).map(|value| (attr.name(), value)))
                    .collect();
                for (name, value) in edits {
                    el.set_attribute(&name, &value)?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );
    finish(result, html, pass)
}

fn is_map_url(url: &str) -> bool {
    let url = url.to_lowercase();
    MAP_HOSTS.iter().any(|host| url.contains(host))
}

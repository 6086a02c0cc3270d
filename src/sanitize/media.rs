use crate::config::SocialLinks;
use crate::rewrite::finish;
use crate::sanitize::SanitizeContext;
use crate::utils::escape_attr;
use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

const VIDEO_HOSTS: &[&str] = &["youtube.com", "youtube-nocookie.com", "youtu.be", "vimeo.com"];

const VIDEO_PLACEHOLDER: &str = "<div class=\"video-placeholder\" data-video-removed=\"true\"><p>Video coming soon</p></div>";

/// Placeholder art an image role maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Team,
    Testimonial,
    Product,
}

impl ImageRole {
    pub fn placeholder(&self) -> &'static str {
        match self {
            ImageRole::Team => "/placeholders/team.svg",
            ImageRole::Testimonial => "/placeholders/testimonial.svg",
            ImageRole::Product => "/placeholders/product.svg",
        }
    }
}

// Keywords must stand alone: `car` matches `red-car.jpg`, not `card.jpg`
static TEAM_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^a-z])(?:team|staff|employees?)(?:[^a-z]|$)").unwrap());
static TESTIMONIAL_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^a-z])(?:testimonials?|reviews?|customers?)(?:[^a-z]|$)").unwrap()
});
static PRODUCT_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^a-z])(?:products?|services?|cars?|vehicles?)(?:[^a-z]|$)").unwrap()
});

/// Decide an image's role from its file name, alt text and classes
pub fn classify_image(src: &str, alt: &str, class: &str) -> Option<ImageRole> {
    let file = src
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .unwrap_or_default();
    let haystack = format!("{file} {alt} {class}").to_lowercase();
    if TEAM_WORDS.is_match(&haystack) {
        Some(ImageRole::Team)
    } else if TESTIMONIAL_WORDS.is_match(&haystack) {
        Some(ImageRole::Testimonial)
    } else if PRODUCT_WORDS.is_match(&haystack) {
        Some(ImageRole::Product)
    } else {
        None
    }
}

/// Team, testimonial and product photos are swapped for placeholder art
pub fn classify_images(html: &str, _ctx: &SanitizeContext<'_>) -> String {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img[src]", |el| {
                let src = el.get_attribute("src").unwrap_or_default();
                if src.starts_with("/placeholders/") {
                    return Ok(());
                }
                let alt = el.get_attribute("alt").unwrap_or_default();
                let class = el.get_attribute("class").unwrap_or_default();
                if let Some(role) = classify_image(&src, &alt, &class) {
                    el.set_attribute("data-original-src", &src)?;
                    el.set_attribute("src", role.placeholder())?;
                    el.remove_attribute("srcset");
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );
    finish(result, html, "images")
}

/// Embedded videos become the configured video or a placeholder block
pub fn replace_videos(html: &str, ctx: &SanitizeContext<'_>) -> String {
    let video_url = ctx.brand.media.video_url.as_deref().filter(|u| !u.trim().is_empty());
    let as_video = video_url.map(|url| {
        format!("<video controls preload=\"metadata\" src=\"{}\"></video>", escape_attr(url))
    });
    let as_iframe = video_url.map(|url| {
        format!(
            "<iframe src=\"{}\" allowfullscreen loading=\"lazy\" title=\"Video\"></iframe>",
            escape_attr(url)
        )
    });

    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("video", |el| {
                    el.replace(as_video.as_deref().unwrap_or(VIDEO_PLACEHOLDER), ContentType::Html);
                    Ok(())
                }),
                element!("iframe[src]", |el| {
                    if el.get_attribute("src").is_some_and(|src| is_video_host(&src)) {
                        el.replace(as_iframe.as_deref().unwrap_or(VIDEO_PLACEHOLDER), ContentType::Html);
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    );
    finish(result, html, "videos")
}

fn is_video_host(src: &str) -> bool {
    host_of(src).is_some_and(|host| VIDEO_HOSTS.iter().any(|h| host_matches(&host, h)))
}

/// Links to social networks point at the brand's profiles, or nowhere
pub fn replace_social_links(html: &str, ctx: &SanitizeContext<'_>) -> String {
    let social = &ctx.brand.social;
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("a[href]", |el| {
                let Some(href) = el.get_attribute("href") else {
                    return Ok(());
                };
                if let Some(target) = social_target(&href, social) {
                    el.set_attribute("href", &target)?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );
    finish(result, html, "social links")
}

/// Replacement for a link if it points at a known social network
pub fn social_target(href: &str, social: &SocialLinks) -> Option<String> {
    let host = host_of(href)?;
    let configured = if host_matches(&host, "facebook.com") {
        &social.facebook
    } else if host_matches(&host, "twitter.com") || host_matches(&host, "x.com") {
        &social.twitter
    } else if host_matches(&host, "instagram.com") {
        &social.instagram
    } else if host_matches(&host, "linkedin.com") {
        &social.linkedin
    } else if host_matches(&host, "youtube.com") || host_matches(&host, "youtu.be") {
        &social.youtube
    } else {
        return None;
    };
    Some(configured.clone().unwrap_or_else(|| "#".to_string()))
}

fn host_of(url: &str) -> Option<String> {
    let url = if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    };
    Url::parse(&url).ok()?.host_str().map(str::to_lowercase)
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{domain}"))
}

use super::brand;
use crate::sanitize::SanitizeContext;
use crate::sanitize::media::{classify_images, replace_social_links, replace_videos};

#[test]
fn test_videos_become_placeholders_without_configured_url() {
    let brand = brand();
    let ctx = SanitizeContext::new(&brand);
    let html = r#"<video autoplay><source src="/promo.mp4"></video><iframe src="https://www.youtube.com/embed/abc"></iframe><iframe src="https://example.com/widget"></iframe>"#;
    let out = replace_videos(html, &ctx);

    assert_eq!(out.matches("video-placeholder").count(), 2);
    assert!(!out.contains("promo.mp4"));
    assert!(!out.contains("youtube.com"));
    assert!(out.contains("https://example.com/widget"));
}

#[test]
fn test_videos_use_configured_url() {
    let mut brand = brand();
    brand.media.video_url = Some("https://player.vimeo.com/video/42".to_string());
    let ctx = SanitizeContext::new(&brand);
    let out = replace_videos(r#"<iframe src="//player.vimeo.com/video/1"></iframe>"#, &ctx);

    assert!(out.contains(r#"<iframe src="https://player.vimeo.com/video/42""#));
    assert!(!out.contains("video/1\""));
}

#[test]
fn test_social_links_follow_brand() {
    let brand = brand();
    let ctx = SanitizeContext::new(&brand);
    let html = r#"<a href="https://facebook.com/smith">f</a><a href="https://instagram.com/smith">i</a><a href="/about">a</a>"#;
    let out = replace_social_links(html, &ctx);

    assert!(out.contains(r#"href="https://facebook.com/acme""#));
    assert!(out.contains(r##"href="#">i</a>"##));
    assert!(out.contains(r#"href="/about""#));
}

#[test]
fn test_images_classified_into_placeholders() {
    let brand = brand();
    let ctx = SanitizeContext::new(&brand);
    let html = r#"<img src="/img/sales-team.jpg" srcset="/img/sales-team@2x.jpg 2x"><img src="/img/x.jpg" alt="Customer review"><img src="/img/hero.jpg">"#;
    let out = classify_images(html, &ctx);

    assert!(out.contains(r#"src="/placeholders/team.svg""#));
    assert!(out.contains(r#"data-original-src="/img/sales-team.jpg""#));
    assert!(!out.contains("srcset"));
    assert!(out.contains(r#"src="/placeholders/testimonial.svg""#));
    assert!(out.contains(r#"<img src="/img/hero.jpg">"#));
}

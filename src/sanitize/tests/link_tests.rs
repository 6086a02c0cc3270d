use super::brand;
use crate::sanitize::SanitizeContext;
use crate::sanitize::links::{neutralize, normalize_paths};

#[test]
fn test_anchors_disabled_with_original_kept() {
    let brand = brand();
    let ctx = SanitizeContext::new(&brand);
    let out = neutralize(r#"<a href="/inventory" onclick="track()">Browse</a>"#, &ctx);

    assert!(out.contains(r##"href="#""##));
    assert!(out.contains(r#"data-original-href="/inventory""#));
    assert!(out.contains(r#"data-link-disabled="true""#));
    assert!(!out.contains("onclick"));
}

#[test]
fn test_mailto_and_tel_stay_live() {
    let brand = brand();
    let ctx = SanitizeContext::new(&brand);
    let html = r#"<a href="mailto:a@b.test">m</a><a href="TEL:123">t</a>"#;
    assert_eq!(neutralize(html, &ctx), html);
}

#[test]
fn test_forms_and_submit_buttons() {
    let brand = brand();
    let ctx = SanitizeContext::new(&brand);
    let html = r#"<form action="/lead" onsubmit="send()"><input type="text" name="n"><input type="submit" value="Go"><button>Send</button><button type="reset">Clear</button></form>"#;
    let out = neutralize(html, &ctx);

    assert!(out.contains(r##"action="#""##));
    assert!(out.contains(r#"data-original-action="/lead""#));
    assert!(out.contains(r#"data-form-disabled="true""#));
    assert!(!out.contains("onsubmit"));
    assert!(!out.contains(r#"type="submit""#));
    assert!(out.contains(r#"<button type="button">Send</button>"#));
    assert!(out.contains(r#"<button type="reset">Clear</button>"#));
    assert!(out.contains(r#"<input type="text" name="n">"#));
}

#[test]
fn test_backslash_paths() {
    let brand = brand();
    let ctx = SanitizeContext::new(&brand);
    let html = r#"<img src="img\logo.png"><a href="pages\about.html">a</a><div style="background:url(img\bg.jpg)"></div>"#;
    let out = normalize_paths(html, &ctx);

    assert!(out.contains(r#"src="img/logo.png""#));
    assert!(out.contains(r#"href="pages/about.html""#));
    assert!(out.contains("url(img/bg.jpg)"));
    assert!(!out.contains('\\'));
}

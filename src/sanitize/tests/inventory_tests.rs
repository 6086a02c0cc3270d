use super::brand;
use crate::sanitize::inventory::{replace_listings, scrub_listing_text};
use crate::sanitize::{SanitizeContext, Sanitizer};

#[test]
fn test_single_vehicle_item_becomes_generic_card() {
    let brand = brand();
    let html = r#"<html><body><div class="vehicle-item">2019 Honda Accord, 45,000 miles, $18,500, Stock #A123</div></body></html>"#;
    let out = Sanitizer::new(&brand).sanitize(html);

    assert!(out.contains("YEAR Make Model"));
    assert!(out.contains("$XX,XXX"));
    assert!(out.contains("XX,XXX miles"));
    assert!(out.contains("Stock #: DEMO-XXX"));
    assert!(!out.contains("Honda Accord"));
    assert!(!out.contains("18,500"));
    assert!(!out.contains("A123"));
}

#[test]
fn test_listing_grid_replaced_with_configured_card_count() {
    let brand = brand();
    let ctx = SanitizeContext::new(&brand);
    let html = r#"<html><body>
        <h2>Our inventory</h2>
        <div id="results" class="grid">
          <div class="tile">2018 Ford Focus 60,000 miles $9,995</div>
          <div class="tile">2021 Kia Soul 12,000 miles $17,450</div>
          <div class="tile">2017 Mazda CX-5 80,100 miles $14,200</div>
        </div>
        <p>Financing available</p>
        </body></html>"#;
    let out = replace_listings(html, &ctx);

    let grid_start = out.find("data-demo-inventory=\"true\"").unwrap();
    let grid_tag = &out[out[..grid_start].rfind('<').unwrap()..grid_start];
    assert!(grid_tag.starts_with("<div "));
    assert!(grid_tag.contains(r#"id="results""#));
    assert!(grid_tag.contains(r#"class="grid""#));
    assert_eq!(out.matches("data-demo-vehicle=\"true\"").count(), 3);
    assert!(out.contains("DEMO-001") && out.contains("DEMO-003"));
    assert!(!out.contains("Ford Focus"));
    assert!(out.contains("<h2>Our inventory</h2>"));
    assert!(out.contains("<p>Financing available</p>"));
}

#[test]
fn test_page_wrappers_are_not_wiped() {
    let brand = brand();
    let ctx = SanitizeContext::new(&brand);
    // One listing-looking child is not a grid
    let html = r#"<html><body><main><section>
        <h1>Welcome</h1>
        <p>Trade in your 2015 sedan, price matched, low miles welcome.</p>
        </section></main></body></html>"#;
    assert_eq!(replace_listings(html, &ctx), html);
}

#[test]
fn test_framework_root_keeps_page_structure() {
    let brand = brand();
    let ctx = SanitizeContext::new(&brand);
    let html = r#"<html><body><div id="__next">
        <header><p>Since 1998: fair price on every 2024 model</p><p>Low miles, great price, 2023 deals</p></header>
        <main>
          <h1>Used cars</h1>
          <div class="grid">
            <div class="tile">2018 Ford Focus 60,000 miles $9,995</div>
            <div class="tile">2021 Kia Soul 12,000 miles $17,450</div>
          </div>
        </main>
        <footer><p>Family owned</p></footer>
        </div></body></html>"#;
    let out = replace_listings(html, &ctx);

    assert!(out.contains(r#"<div id="__next">"#));
    assert!(out.contains("<header>"));
    assert!(out.contains("<h1>Used cars</h1>"));
    assert!(out.contains("<footer><p>Family owned</p></footer>"));
    assert_eq!(out.matches("data-demo-inventory=\"true\"").count(), 1);
    assert!(!out.contains("Ford Focus"));
}

#[test]
fn test_scrub_catches_leftovers() {
    let brand = brand();
    let ctx = SanitizeContext::new(&brand);
    let html = "<p>Featured: 2020 Toyota Camry SE for $22,900 with 31,250 miles. VIN 1HGCM82633A004352. Stock No. T9931</p>";
    let out = scrub_listing_text(html, &ctx);

    assert!(out.contains("YEAR Make Model"));
    assert!(out.contains("$XX,XXX"));
    assert!(out.contains("XX,XXX miles"));
    assert!(out.contains("XXXXXXXXXXXXXXXXX"));
    assert!(out.contains("Stock #: DEMO-XXX"));
    assert!(!out.contains("Camry"));
    assert!(!out.contains("T9931"));
}

#[test]
fn test_scrub_leaves_copyright_and_plain_text() {
    let brand = brand();
    let ctx = SanitizeContext::new(&brand);
    let html = "<p>© 2031 Toyota of Springfield. All rights reserved</p><p>Stock up on savings</p>";
    assert_eq!(scrub_listing_text(html, &ctx), html);
}

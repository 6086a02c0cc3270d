use super::{Fixture, brand};
use crate::generator::ProjectGenerator;
use std::fs;
use std::path::{Path, PathBuf};

const HOME: &str = r#"<html><head><title>Smith Motors | Home</title></head><body>
    <header><img class="logo" src="/img/logo.png"><nav><a href="/about">About</a></nav></header>
    <section class="hero"><h1>Smith Motors</h1><p>Family owned since 1990</p></section>
    <section><p>Call 312-555-7890 or email sales@smith.test for a test drive today.</p></section>
    <script>trackVisitor()</script>
    <footer><p>© 2019 Smith Motors</p></footer>
    </body></html>"#;

const ABOUT: &str = r#"<html><body><section><h1>About Smith Motors</h1><p>Our story starts in a small garage downtown.</p></section></body></html>"#;

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

#[test]
fn test_writes_project_tree() {
    let brand = brand();
    let tmp = tempfile::tempdir().unwrap();
    let home = Fixture::new("https://smith.test/", HOME, &brand);
    let about = Fixture::new("https://smith.test/About.html", ABOUT, &brand);

    let project = ProjectGenerator::new(tmp.path().join("site"), &brand)
        .with_year(2030)
        .generate(home.source(), &[about.source()])
        .unwrap();

    for expected in [
        "package.json",
        "next.config.js",
        ".gitignore",
        "brand-config.json",
        "app/layout.tsx",
        "app/globals.css",
        "app/page.tsx",
        "app/about/page.tsx",
        "content/placeholders.json",
        "content/components.json",
        "public/placeholders/logo.svg",
        "public/placeholders/product.svg",
    ] {
        assert!(project.files.contains(&PathBuf::from(expected)), "missing {expected}");
        assert!(project.root.join(expected).is_file());
    }

    let page = read(&project.root, "app/page.tsx");
    assert!(page.contains("dangerouslySetInnerHTML"));
    assert!(page.contains("Welcome to Acme Auto"));
    assert!(page.contains("(800) 555-0100"));
    assert!(page.contains("© 2030 Acme Auto"));
    assert!(page.contains("/placeholders/logo.svg"));
    assert!(!page.contains("trackVisitor"));
    assert!(!page.contains("sales@smith.test"));
    assert!(!page.contains("<head>"));

    let about_page = read(&project.root, "app/about/page.tsx");
    assert!(about_page.contains(r#"title: "Acme Auto | About""#));

    let layout = read(&project.root, "app/layout.tsx");
    assert!(layout.contains(r#"title: "Acme Auto""#));
    assert!(layout.contains(r#"description: "Acme Auto - Drive happy""#));
    assert!(layout.contains("fonts.googleapis.com"));
    assert!(layout.contains("data-link-disabled"));

    let css = read(&project.root, "app/globals.css");
    assert!(css.starts_with(":root"));
    assert!(css.contains("--brand-primary: #cc0000"));
    assert_eq!(css.matches("body { background").count(), 1);

    let package: serde_json::Value = serde_json::from_str(&read(&project.root, "package.json")).unwrap();
    assert_eq!(package["name"], "acme-auto-site");

    let placeholders: serde_json::Value =
        serde_json::from_str(&read(&project.root, "content/placeholders.json")).unwrap();
    assert!(placeholders["/"]["text"].as_object().is_some_and(|m| !m.is_empty()));
    assert_eq!(placeholders["/about"]["content"]["heroHeadline"], "Welcome to Acme Auto");
}

#[test]
fn test_no_file_carries_source_identity() {
    let brand = brand();
    let tmp = tempfile::tempdir().unwrap();
    let contact = r#"<html><head><script type="application/ld+json">{"name": "Smith Motors", "telephone": "312-555-7890"}</script></head><body>
        <section><h1>Contact Smith Motors</h1>
        <a href="/call" title="Call 312-555-7890" aria-label="Email sales@smith.test">Reach Smith Motors at 312-555-7890</a>
        <img src="/img/lot.jpg" alt="Visit 123 Main St, Springfield, IL 62704"></section>
        </body></html>"#;
    let home = Fixture::new("https://smith.test/", HOME, &brand);
    let contact = Fixture::new("https://smith.test/contact", contact, &brand);

    let project = ProjectGenerator::new(tmp.path().join("site"), &brand)
        .with_year(2030)
        .generate(home.source(), &[contact.source()])
        .unwrap();

    for file in &project.files {
        let contents = String::from_utf8_lossy(&fs::read(project.root.join(file)).unwrap()).into_owned();
        for original in ["sales@smith.test", "312-555-7890", "Smith Motors", "123 Main St", "trackVisitor"] {
            assert!(
                !contents.contains(original),
                "{} contains {original}",
                file.display()
            );
        }
    }

    let components: serde_json::Value =
        serde_json::from_str(&read(&project.root, "content/components.json")).unwrap();
    let home_components = components["/"]["components"].as_array().unwrap();
    assert!(home_components.iter().any(|c| c["html"].as_str().unwrap().contains("(800) 555-0100")));
    let placeholders = read(&project.root, "content/placeholders.json");
    assert!(placeholders.contains("Acme Auto"));
}

#[test]
fn test_generation_is_reproducible() {
    let brand = brand();
    let tmp = tempfile::tempdir().unwrap();
    let home = Fixture::new("https://smith.test/", HOME, &brand);
    let about = Fixture::new("https://smith.test/about", ABOUT, &brand);

    let first = ProjectGenerator::new(tmp.path().join("a"), &brand)
        .with_year(2030)
        .generate(home.source(), &[about.source()])
        .unwrap();
    let second = ProjectGenerator::new(tmp.path().join("b"), &brand)
        .with_year(2030)
        .generate(home.source(), &[about.source()])
        .unwrap();

    assert_eq!(first.files, second.files);
    for file in &first.files {
        assert_eq!(
            fs::read(first.root.join(file)).unwrap(),
            fs::read(second.root.join(file)).unwrap(),
            "{} differs",
            file.display()
        );
    }
}

#[test]
fn test_assets_copied_with_fallback_and_rewritten() {
    let brand = brand();
    let tmp = tempfile::tempdir().unwrap();
    let fallback = tmp.path().join("cache");
    fs::create_dir_all(&fallback).unwrap();
    fs::write(fallback.join("bg-1.png"), b"png").unwrap();

    let html = r#"<html><body><section><h1>Hi</h1><div style="background:url('/img/bg.png?v=3')">Plenty of text to keep this section around for the parser.</div><img src="/img/missing.jpg"></section></body></html>"#;
    let home = Fixture::with_assets(
        "https://smith.test/",
        html,
        vec![
            ("https://smith.test/img/bg.png", tmp.path().join("gone/bg-1.png")),
            ("https://smith.test/img/missing.jpg", tmp.path().join("gone/missing-2.jpg")),
        ],
        &brand,
    );

    let project = ProjectGenerator::new(tmp.path().join("site"), &brand)
        .with_asset_fallback_dir(&fallback)
        .generate(home.source(), &[])
        .unwrap();

    assert!(project.files.contains(&PathBuf::from("public/assets/bg-1.png")));
    assert!(!project.root.join("public/assets/missing-2.jpg").exists());

    let page = read(&project.root, "app/page.tsx");
    assert!(page.contains("url(/assets/bg-1.png)"));
    assert!(page.contains("/img/missing.jpg"));

    let css = read(&project.root, "app/globals.css");
    assert!(css.contains("url(/assets/bg-1.png)"));
}

#[test]
fn test_children_without_distinct_route_are_skipped() {
    let brand = brand();
    let tmp = tempfile::tempdir().unwrap();
    let home = Fixture::new("https://smith.test/", HOME, &brand);
    let query_home = Fixture::new("https://smith.test/?ref=nav", ABOUT, &brand);
    let about = Fixture::new("https://smith.test/about", ABOUT, &brand);
    let about_again = Fixture::new("https://smith.test/about/", ABOUT, &brand);

    let project = ProjectGenerator::new(tmp.path(), &brand)
        .generate(
            home.source(),
            &[query_home.source(), about.source(), about_again.source()],
        )
        .unwrap();

    let pages: Vec<&PathBuf> = project
        .files
        .iter()
        .filter(|f| f.ends_with("page.tsx"))
        .collect();
    assert_eq!(pages, vec![&PathBuf::from("app/page.tsx"), &PathBuf::from("app/about/page.tsx")]);
}

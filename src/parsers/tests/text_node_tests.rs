use crate::parsers::{ComponentKind, Parser, PlaceholderNamer};
use std::collections::HashSet;

#[cfg(test)]
mod naming_tests {
    use super::*;

    #[test]
    fn test_length_buckets_share_one_counter() {
        let mut namer = PlaceholderNamer::default();
        assert_eq!(namer.name("Home"), "text_1");
        assert_eq!(namer.name(&"a".repeat(20)), "text_2");
        assert_eq!(namer.name(&"a".repeat(21)), "heading_3");
        assert_eq!(namer.name(&"a".repeat(51)), "paragraph_4");
        assert_eq!(namer.name(&"a".repeat(101)), "content_block_5");
    }

    #[test]
    fn test_footer_names() {
        let mut namer = PlaceholderNamer::default();
        assert_eq!(namer.name("Copyright 2020 Smith"), "footer_copyright");
        assert_eq!(namer.name("Privacy Policy"), "footer_privacy");
        assert_eq!(namer.name("Terms of Use"), "footer_terms");
        // Repeats get a counter suffix instead of clobbering the first
        assert_eq!(namer.name("© 2021 Other"), "footer_copyright_1");
        assert_eq!(namer.name("privacy"), "footer_privacy_2");
    }

    #[test]
    fn test_copyright_checked_before_privacy() {
        let mut namer = PlaceholderNamer::default();
        assert_eq!(
            namer.name("© 2020 Smith. Privacy. Terms."),
            "footer_copyright"
        );
    }
}

#[cfg(test)]
mod extraction_tests {
    use super::*;

    #[test]
    fn test_paths_and_order() {
        let html = r#"<body><section class="intro">
            <h1>Hello</h1>
            <div><p>One</p><p>Two</p></div>
            </section></body>"#;
        let result = Parser::parse_html(html);
        let hero = &result.components[0];
        assert_eq!(hero.kind, ComponentKind::Hero);

        let nodes: Vec<(&str, &str)> = hero
            .text_nodes
            .iter()
            .map(|n| (n.text.as_str(), n.path.as_str()))
            .collect();
        assert_eq!(
            nodes,
            vec![
                ("Hello", "section > h1:nth-child(1)"),
                ("One", "section > div:nth-child(2) > p:nth-child(1)"),
                ("Two", "section > div:nth-child(2) > p:nth-child(2)"),
            ]
        );
    }

    #[test]
    fn test_script_text_ignored_and_whitespace_collapsed() {
        let html = "<body><section><script>var x = 1;</script><p>  Hi\n   there </p></section></body>";
        let result = Parser::parse_html(html);
        let nodes = &result.components[0].text_nodes;

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text, "Hi there");
        assert_eq!(nodes[0].path, "section > p:nth-child(2)");
    }

    #[test]
    fn test_placeholders_unique_across_components() {
        let html = r#"<body>
            <header><a>Home</a><a>Home</a></header>
            <section><p>Copyright 2020</p></section>
            <div class="card"><p>Copyright 2021</p><p>Home</p></div>
            <footer><p>© 2022 Smith</p><a>Privacy</a><a>Privacy</a></footer>
            </body>"#;
        let result = Parser::parse_html(html);

        let keys: Vec<&str> = result
            .components
            .iter()
            .flat_map(|c| c.text_nodes.iter().map(|n| n.placeholder.as_str()))
            .collect();
        let unique: HashSet<&str> = keys.iter().copied().collect();
        assert_eq!(unique.len(), keys.len());
        assert_eq!(result.text_map.len(), keys.len());
        assert_eq!(result.text_map["footer_copyright"], "Copyright 2020");
    }
}

use url::Url;

/// Last path segment of a URL made safe for use as a file name
pub fn url_basename(url: &str) -> String {
    let segment = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(|s| s.to_string()))
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "asset".to_string());
    sanitize_filename(&segment)
}

/// Convert a string to a sanitized filename
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    let cleaned = if cleaned.is_empty() {
        "asset".to_string()
    } else {
        cleaned
    };

    // Limit filename length, keeping the extension
    if cleaned.len() > 100 {
        match cleaned.rfind('.') {
            Some(dot) if cleaned.len() - dot <= 10 => {
                format!("{}{}", &cleaned[..100 - (cleaned.len() - dot)], &cleaned[dot..])
            }
            _ => cleaned[..100].to_string(),
        }
    } else {
        cleaned
    }
}

/// Route slug for a page URL (`/about-us/team/` -> `about-us/team`)
pub fn route_slug(url: &str) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_default();
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            let segment = segment
                .trim_end_matches(".html")
                .trim_end_matches(".htm")
                .trim_end_matches(".php");
            let slug: String = segment
                .to_lowercase()
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
                .collect();
            slug.split('-')
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("-")
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Escape text for an HTML text node
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for a double-quoted attribute value
pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Collapse runs of whitespace into single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

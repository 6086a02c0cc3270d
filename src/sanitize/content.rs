use crate::rewrite::rewrite_text;
use crate::sanitize::SanitizeContext;
use crate::utils::escape_html;
use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_HOURS: &str = "Mon-Fri: 9:00 AM - 7:00 PM, Sat: 9:00 AM - 6:00 PM, Sun: Closed";

const DAY: &str = r"(?:mon|tue|tues|wed|thu|thur|thurs|fri|sat|sun)(?:day|sday|nesday|rsday|urday)?\.?";
const TIME: &str = r"\d{1,2}(?::\d{2})?\s*(?:am|pm|a\.m\.|p\.m\.)?";

/// `Mon-Fri 9am-7pm`, `Saturday: 9:00 AM to 5:00 PM`
pub static HOURS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{DAY}(?:\s*(?:-|–|to|through|&|,)\s*{DAY})?\s*:?\s*{TIME}\s*(?:-|–|to)\s*{TIME}"
    ))
    .unwrap()
});

/// `© 2019 Smith Motors LLC`, `Copyright 2015-2020 ...` up to the end of the text
pub static COPYRIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:©|&copy;|&#169;|\(c\)|copyright)\s*(?:©|&copy;|&#169;)?\s*(?:19|20)\d{2}(?:\s*[-–]\s*(?:19|20)\d{2})?.*").unwrap()
});

/// Business hours collapse into one schedule line
pub fn replace_hours(html: &str, ctx: &SanitizeContext<'_>) -> String {
    let schedule = escape_html(
        ctx.brand
            .dealership
            .sales_hours
            .as_deref()
            .unwrap_or(DEFAULT_HOURS),
    );
    rewrite_text(html, "hours", |text| {
        let mut matches = HOURS.find_iter(text);
        let first = matches.next()?;
        // A run of several day ranges becomes a single schedule
        let mut out = format!("{}{}", &text[..first.start()], schedule);
        let mut rest = first.end();
        for m in matches {
            let gap = &text[rest..m.start()];
            if !is_separator(gap) {
                out.push_str(gap.trim_end_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(c)));
            }
            rest = m.end();
        }
        let tail = &text[rest..];
        if rest == first.end() || !is_separator(tail) || tail.trim().is_empty() {
            out.push_str(tail);
        }
        Some(out)
    })
}

/// Copyright lines name the brand and the current year
pub fn replace_copyright(html: &str, ctx: &SanitizeContext<'_>) -> String {
    let line = format!(
        "© {} {}. All rights reserved",
        ctx.year,
        escape_html(&ctx.brand.name)
    );
    rewrite_text(html, "copyright", |text| {
        COPYRIGHT
            .is_match(text)
            .then(|| COPYRIGHT.replace(text, regex::NoExpand(&line)).into_owned())
    })
}

const SEPARATORS: &str = ",;|&/";

/// Only punctuation, whitespace or `and` between two day ranges
fn is_separator(gap: &str) -> bool {
    gap.split(|c: char| c.is_whitespace() || SEPARATORS.contains(c))
        .all(|word| word.is_empty() || word.eq_ignore_ascii_case("and"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrandConfig;

    fn brand() -> BrandConfig {
        BrandConfig::from_json(r#"{"name": "Acme Auto"}"#).unwrap()
    }

    #[test]
    fn test_hours_replaced_once_per_text() {
        let brand = brand();
        let ctx = SanitizeContext::new(&brand);
        let out = replace_hours(
            "<p>Mon-Fri 9am-7pm, Saturday: 9:00 AM to 5:00 PM</p>",
            &ctx,
        );
        assert_eq!(out, format!("<p>{DEFAULT_HOURS}</p>"));
    }

    #[test]
    fn test_removed_ranges_leave_no_separators() {
        let brand = brand();
        let ctx = SanitizeContext::new(&brand);
        for (input, expected) in [
            (
                "<p>Mon-Fri 9am-7pm; Sat 9am-5pm; Sun 10am - 4pm</p>",
                format!("<p>{DEFAULT_HOURS}</p>"),
            ),
            (
                "<p>Mon-Fri 9am-7pm, Sat 9am-5pm, </p>",
                format!("<p>{DEFAULT_HOURS}</p>"),
            ),
            (
                "<li>Hours: Mon-Fri 9am-7pm and Sat 9am-5pm.</li>",
                format!("<li>Hours: {DEFAULT_HOURS}.</li>"),
            ),
            (
                "<p>Sales Mon-Fri 9am-7pm. Service Sat 8am-1pm</p>",
                format!("<p>Sales {DEFAULT_HOURS}. Service</p>"),
            ),
        ] {
            assert_eq!(replace_hours(input, &ctx), expected, "{input}");
        }
    }

    #[test]
    fn test_hours_use_brand_schedule() {
        let mut brand = brand();
        brand.dealership.sales_hours = Some("Open daily 8-8".to_string());
        let ctx = SanitizeContext::new(&brand);
        let out = replace_hours("<span>Sun 10am - 4pm</span>", &ctx);
        assert_eq!(out, "<span>Open daily 8-8</span>");
    }

    #[test]
    fn test_copyright_line() {
        let brand = brand();
        let ctx = SanitizeContext::new(&brand).with_year(2031);
        for input in [
            "<p>© 2019 Smith Motors LLC. All Rights Reserved.</p>",
            "<p>Copyright 2015-2020 Smith Motors</p>",
            "<p>&copy; 2019 Smith</p>",
        ] {
            assert_eq!(
                replace_copyright(input, &ctx),
                "<p>© 2031 Acme Auto. All rights reserved</p>"
            );
        }
    }

    #[test]
    fn test_copyright_keeps_leading_text() {
        let brand = brand();
        let ctx = SanitizeContext::new(&brand).with_year(2031);
        assert_eq!(
            replace_copyright("<small>Site map | © 2019 Smith</small>", &ctx),
            "<small>Site map | © 2031 Acme Auto. All rights reserved</small>"
        );
    }
}

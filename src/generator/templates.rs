//! Project file templates. Tokens are written `{{NAME}}` and filled in a
//! single pass, so substituted text is never scanned again.

use crate::sanitize::links::{FORM_DISABLED_ATTR, LINK_DISABLED_ATTR};

pub const NEXT_CONFIG: &str = r#"/** @type {import('next').NextConfig} */
const nextConfig = {
  images: { unoptimized: true },
};

module.exports = nextConfig;
"#;

pub const GITIGNORE: &str = "node_modules/\n.next/\nout/\n.env*.local\n";

pub const LAYOUT: &str = r#"import './globals.css';
import type { Metadata } from 'next';

export const metadata: Metadata = {
  title: {{TITLE}},
  description: {{DESCRIPTION}},
};

export default function RootLayout({ children }: { children: React.ReactNode }) {
  return (
    <html lang="en">
      <head>
        <link rel="stylesheet" href={{FONT_URL}} />
        <script dangerouslySetInnerHTML={{ __html: {{GUARD_SCRIPT}} }} />
      </head>
      <body>{children}</body>
    </html>
  );
}
"#;

pub const ROOT_PAGE: &str = r#"export default function Home() {
  return <div className="site-clone" dangerouslySetInnerHTML={{ __html: {{HTML}} }} />;
}
"#;

pub const CHILD_PAGE: &str = r#"import type { Metadata } from 'next';

export const metadata: Metadata = {
  title: {{TITLE}},
};

export default function Page() {
  return <div className="site-clone" dangerouslySetInnerHTML={{ __html: {{HTML}} }} />;
}
"#;

/// Fill `{{NAME}}` tokens from `values`. Unknown tokens are left as written.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let token = after.find("}}").map(|end| (&after[..end], end));
        match token.and_then(|(name, end)| {
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        }) {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Client script that swallows clicks on disabled links and disabled form submissions
pub fn guard_script() -> String {
    format!(
        "document.addEventListener('click',function(e){{var t=e.target;if(t&&t.closest&&t.closest('[{LINK_DISABLED_ATTR}]')){{e.preventDefault();}}}},true);\
document.addEventListener('submit',function(e){{var t=e.target;if(t&&t.closest&&t.closest('[{FORM_DISABLED_ATTR}]')){{e.preventDefault();}}}},true);"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_pass() {
        let out = render("a {{X}} b {{Y}} {{ __html: {{X}} }}", &[("X", "{{Y}}"), ("Y", "2")]);
        assert_eq!(out, "a {{Y}} b 2 {{ __html: {{Y}} }}");
    }

    #[test]
    fn test_render_unclosed_token() {
        assert_eq!(render("x {{OPEN", &[("OPEN", "y")]), "x {{OPEN");
    }

    #[test]
    fn test_guard_script_targets_disabled_markers() {
        let script = guard_script();
        assert!(script.contains("[data-link-disabled]"));
        assert!(script.contains("[data-form-disabled]"));
    }
}

//! Relative reference rewriting.
//!
//! Static bundles reference their assets relative to `index.html`. Once the
//! markup is embedded in another page those references would resolve against
//! the host page, so every relative reference is rewritten to an absolute URL
//! under the content's public directory:
//!
//! - `css/site.css` → `{base_url}/{namespace}/{id}/{tag}/css/site.css`
//! - `../shared/logo.png` → `{base_url}/{namespace}/{id}/shared/logo.png`
//!
//! Absolute URLs, protocol-relative URLs, root-relative paths, fragment-only
//! references, and anything with a scheme (`data:`, `mailto:`, ...) are left
//! alone. Query strings and fragments are copied verbatim.

use std::borrow::Cow;
use std::sync::LazyLock;

use lol_html::html_content::{ContentType, Element};
use lol_html::{HandlerResult, RewriteStrSettings, element, text};
use regex::Regex;
use stc_core::ResolvedFile;

use crate::markup::rewrite_html;

/// `url(...)` in CSS, with optional quotes.
static CSS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(url\(\s*)("[^"]*"|'[^']*'|[^)"'\s]*)(\s*\))"#).unwrap()
});

/// `@import "..."` in CSS (the `url()` form is covered by [`CSS_URL_RE`]).
static CSS_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(@import\s+)("[^"]*"|'[^']*')"#).unwrap());

/// URI scheme prefix (`https:`, `data:`, `mailto:`, ...).
static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").unwrap());

/// Attributes holding a single URL.
const URL_ATTRS: &[&str] = &[
    "href",
    "src",
    "poster",
    "action",
    "formaction",
    "data",
    "background",
    "cite",
    "longdesc",
    "manifest",
    "icon",
    "xlink:href",
];

/// Attributes holding a comma-separated image candidate list.
const SRCSET_ATTRS: &[&str] = &["srcset", "imagesrcset"];

/// HTML-escaped quotes that may wrap a `url()` argument inside a `style` attribute.
const ESCAPED_QUOTES: &[&str] = &["&quot;", "&#34;", "&#39;", "&apos;"];

/// Rewrites relative references against a content directory's public URL.
#[derive(Debug, Clone)]
pub struct PathProxyRewriter {
    base_url: String,
    dir: Vec<String>,
}

impl PathProxyRewriter {
    /// Create a rewriter for a directory below the public content base URL.
    ///
    /// `dir` is a URL path relative to `base_url` (e.g. `static-content-nodes/42/src`).
    pub fn new(base_url: &str, dir: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            dir: dir
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Create a rewriter for the directory holding a resolved entry point.
    pub fn for_resolved(file: &ResolvedFile, base_url: &str) -> Self {
        Self::new(base_url, file.relative_dir())
    }

    /// Public URL of the content directory, with trailing slash.
    #[must_use]
    pub fn base(&self) -> String {
        if self.dir.is_empty() {
            format!("{}/", self.base_url)
        } else {
            format!("{}/{}/", self.base_url, self.dir.join("/"))
        }
    }

    /// Rewrite all relative references in a document.
    ///
    /// Returns the input unchanged (borrowed) when nothing is relative.
    #[must_use]
    pub fn rewrite<'a>(&self, html: &'a str) -> Cow<'a, str> {
        let mut stylesheet = String::new();
        let settings = RewriteStrSettings {
            element_content_handlers: vec![
                element!("*", |el| self.rewrite_element(el)),
                // A stylesheet may arrive in several chunks; rewrite it whole.
                text!("style", move |chunk| {
                    stylesheet.push_str(chunk.as_str());
                    if chunk.last_in_text_node() {
                        chunk.replace(&self.rewrite_css(&stylesheet), ContentType::Html);
                        stylesheet.clear();
                    } else {
                        chunk.remove();
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        };

        match rewrite_html(html, settings) {
            Ok(out) if out != html => Cow::Owned(out),
            Ok(_) => Cow::Borrowed(html),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to rewrite document, leaving it unchanged");
                Cow::Borrowed(html)
            }
        }
    }

    /// Rewrite URL-bearing attributes of one element.
    fn rewrite_element(&self, el: &mut Element<'_, '_>) -> HandlerResult {
        let edits: Vec<(String, String)> = el
            .attributes()
            .iter()
            .filter_map(|attr| {
                let name = attr.name();
                let value = attr.value();
                let lower = name.to_ascii_lowercase();
                let rewritten = if URL_ATTRS.contains(&lower.as_str()) {
                    self.rewrite_url(&value)
                } else if SRCSET_ATTRS.contains(&lower.as_str()) {
                    self.rewrite_srcset(&value)
                } else if lower == "style" {
                    match self.rewrite_css(&value) {
                        Cow::Owned(css) => Some(css),
                        Cow::Borrowed(_) => None,
                    }
                } else {
                    None
                };
                rewritten.map(|v| (name, v))
            })
            .collect();

        for (name, value) in edits {
            el.set_attribute(&name, &value)?;
        }
        Ok(())
    }

    /// Rewrite `url()` and `@import` references in a stylesheet fragment.
    fn rewrite_css<'c>(&self, css: &'c str) -> Cow<'c, str> {
        let mut changed = false;
        let urls = CSS_URL_RE.replace_all(css, |caps: &regex::Captures| {
            let (open, arg, close) = (&caps[1], &caps[2], &caps[3]);
            match self.rewrite_css_arg(arg) {
                Some(arg) => {
                    changed = true;
                    format!("{open}{arg}{close}")
                }
                None => caps[0].to_owned(),
            }
        });
        let imports = CSS_IMPORT_RE.replace_all(&urls, |caps: &regex::Captures| {
            match self.rewrite_css_arg(&caps[2]) {
                Some(arg) => {
                    changed = true;
                    format!("{}{arg}", &caps[1])
                }
                None => caps[0].to_owned(),
            }
        });

        if changed {
            Cow::Owned(imports.into_owned())
        } else {
            Cow::Borrowed(css)
        }
    }

    /// Rewrite one CSS string or bare URL, keeping its quotes.
    fn rewrite_css_arg(&self, arg: &str) -> Option<String> {
        for quote in ["\"", "'"].iter().chain(ESCAPED_QUOTES) {
            if let Some(inner) = arg
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
            {
                return self
                    .rewrite_url(inner)
                    .map(|url| format!("{quote}{url}{quote}"));
            }
        }
        self.rewrite_url(arg)
    }

    /// Rewrite a `srcset` candidate list.
    fn rewrite_srcset(&self, value: &str) -> Option<String> {
        let mut out = String::with_capacity(value.len() * 2);
        let mut changed = false;
        let mut rest = value;

        loop {
            let candidate = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
            out.push_str(&rest[..rest.len() - candidate.len()]);
            rest = candidate;
            if rest.is_empty() {
                break;
            }

            let url_end = rest.find(|c: char| c.is_ascii_whitespace()).unwrap_or(rest.len());
            let token = &rest[..url_end];
            let url = token.trim_end_matches(',');
            let commas = &token[url.len()..];
            match self.rewrite_url(url) {
                Some(rewritten) => {
                    changed = true;
                    out.push_str(&rewritten);
                }
                None => out.push_str(url),
            }
            out.push_str(commas);
            rest = &rest[url_end..];

            // Descriptors run to the next comma unless the URL already ended the candidate.
            if commas.is_empty() {
                let descriptor_end = rest.find(',').unwrap_or(rest.len());
                out.push_str(&rest[..descriptor_end]);
                rest = &rest[descriptor_end..];
            }
        }

        changed.then_some(out)
    }

    /// Rewrite a single URL if it is relative.
    ///
    /// Returns `None` for anything that must pass through unchanged.
    #[must_use]
    pub fn rewrite_url(&self, url: &str) -> Option<String> {
        let trimmed = url.trim();
        if !is_relative(trimmed) {
            return None;
        }

        let split = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
        let (path, suffix) = trimmed.split_at(split);

        let mut segments: Vec<&str> = self.dir.iter().map(String::as_str).collect();
        let mut trailing_slash = path.ends_with('/');
        for component in path.split('/') {
            match component {
                "" => {}
                "." => trailing_slash = true,
                ".." => {
                    // Never climb above the public content root.
                    segments.pop();
                    trailing_slash = true;
                }
                other => {
                    segments.push(other);
                    trailing_slash = false;
                }
            }
        }
        trailing_slash |= path.ends_with('/');

        let mut rewritten = self.base_url.clone();
        for segment in &segments {
            rewritten.push('/');
            rewritten.push_str(segment);
        }
        if trailing_slash || segments.is_empty() {
            rewritten.push('/');
        }
        rewritten.push_str(suffix);
        Some(rewritten)
    }
}

/// True for references that resolve against the document's directory.
fn is_relative(url: &str) -> bool {
    !(url.is_empty()
        || url.starts_with(['/', '\\', '#', '?'])
        || SCHEME_RE.is_match(url))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const BASE: &str = "https://example.com/sites/default/files";

    fn rewriter() -> PathProxyRewriter {
        PathProxyRewriter::new(BASE, "static-content-nodes/42/src")
    }

    #[test]
    fn test_base() {
        assert_eq!(
            rewriter().base(),
            "https://example.com/sites/default/files/static-content-nodes/42/src/"
        );
        assert_eq!(PathProxyRewriter::new("/files/", "").base(), "/files/");
    }

    #[test]
    fn test_rewrite_url_relative() {
        let r = rewriter();
        assert_eq!(
            r.rewrite_url("css/site.css").as_deref(),
            Some("https://example.com/sites/default/files/static-content-nodes/42/src/css/site.css")
        );
        assert_eq!(
            r.rewrite_url("./app.js").as_deref(),
            Some("https://example.com/sites/default/files/static-content-nodes/42/src/app.js")
        );
    }

    #[test]
    fn test_rewrite_url_parent() {
        assert_eq!(
            rewriter().rewrite_url("../shared/logo.png").as_deref(),
            Some("https://example.com/sites/default/files/static-content-nodes/42/shared/logo.png")
        );
    }

    #[test]
    fn test_rewrite_url_clamps_traversal() {
        assert_eq!(
            rewriter().rewrite_url("../../../../../etc/passwd").as_deref(),
            Some("https://example.com/sites/default/files/etc/passwd")
        );
    }

    #[test]
    fn test_rewrite_url_preserves_query_and_fragment() {
        assert_eq!(
            rewriter().rewrite_url("img/a.png?v=2&amp;x=../y#top").as_deref(),
            Some(
                "https://example.com/sites/default/files/static-content-nodes/42/src/img/a.png?v=2&amp;x=../y#top"
            )
        );
    }

    #[test]
    fn test_rewrite_url_directory_reference() {
        let r = rewriter();
        assert_eq!(
            r.rewrite_url("docs/").as_deref(),
            Some("https://example.com/sites/default/files/static-content-nodes/42/src/docs/")
        );
        assert_eq!(
            r.rewrite_url("..").as_deref(),
            Some("https://example.com/sites/default/files/static-content-nodes/42/")
        );
    }

    #[test]
    fn test_rewrite_url_skips_non_relative() {
        let r = rewriter();
        for url in [
            "https://cdn.example.com/x.js",
            "http://example.com",
            "//cdn.example.com/x.js",
            "/absolute/path.css",
            "data:image/png;base64,AAAA",
            "mailto:someone@example.com",
            "tel:+123",
            "javascript:void(0)",
            "#section",
            "?page=2",
            "",
        ] {
            assert_eq!(r.rewrite_url(url), None, "{url} should pass through");
        }
    }

    #[test]
    fn test_rewrite_document() {
        let html = r##"<!DOCTYPE html>
<html><head>
<link rel="stylesheet" href="css/site.css">
<script src='js/app.js'></script>
</head><body>
<img src=img/a.png alt="a.png">
<a href="#top">Top</a> <a href="https://example.org/">out</a>
<p>See css/site.css for details.</p>
</body></html>"##;
        let expected = r##"<!DOCTYPE html>
<html><head>
<link rel="stylesheet" href="https://example.com/sites/default/files/static-content-nodes/42/src/css/site.css">
<script src="https://example.com/sites/default/files/static-content-nodes/42/src/js/app.js"></script>
</head><body>
<img src="https://example.com/sites/default/files/static-content-nodes/42/src/img/a.png" alt="a.png">
<a href="#top">Top</a> <a href="https://example.org/">out</a>
<p>See css/site.css for details.</p>
</body></html>"##;
        assert_eq!(rewriter().rewrite(html), expected);
    }

    #[test]
    fn test_rewrite_absolute_document_is_identical() {
        let html = r#"<html><head><link href="https://cdn.example.com/a.css" rel=stylesheet>
<script src="//cdn.example.com/a.js"></script></head>
<body><img src="data:image/gif;base64,R0lGOD"><a href="mailto:x@y.z">m</a>
<div style="background: url('/bg.png')"></div></body></html>"#;
        let out = rewriter().rewrite(html);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, html);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let html = r#"<img src="a.png" srcset="a.png 1x, b.png 2x"><style>p{background:url(bg.png)}</style>"#;
        let once = rewriter().rewrite(html).into_owned();
        let twice = rewriter().rewrite(&once).into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rewrite_style_element_and_attribute() {
        let html = r#"<style>@import "base.css"; .a{background:url( 'img/bg.png' )} .b{background:url(/x.png)}</style><div style="background-image:url('img/c.png')"></div>"#;
        let expected = concat!(
            r#"<style>@import "https://example.com/sites/default/files/static-content-nodes/42/src/base.css"; "#,
            r#".a{background:url( 'https://example.com/sites/default/files/static-content-nodes/42/src/img/bg.png' )} "#,
            r#".b{background:url(/x.png)}</style>"#,
            r#"<div style="background-image:url('https://example.com/sites/default/files/static-content-nodes/42/src/img/c.png')"></div>"#,
        );
        assert_eq!(rewriter().rewrite(html), expected);
    }

    #[test]
    fn test_rewrite_css_arg_keeps_escaped_quotes() {
        assert_eq!(
            rewriter().rewrite_css_arg("&quot;img/c.png&quot;").as_deref(),
            Some("&quot;https://example.com/sites/default/files/static-content-nodes/42/src/img/c.png&quot;")
        );
    }

    #[test]
    fn test_rewrite_leaves_script_body_alone() {
        let html = r#"<script>document.write('<img src="x.png">')</script>"#;
        assert_eq!(rewriter().rewrite(html), html);
    }

    #[test]
    fn test_rewrite_ignores_markup_in_comments_and_values() {
        let html = r#"<!-- <img src="old.png"> --><p title="<img src=x.png>">t</p>"#;
        let out = rewriter().rewrite(html);
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_rewrite_srcset() {
        let r = PathProxyRewriter::new("/files", "ns/1");
        assert_eq!(
            r.rewrite_srcset("a.png 1x, https://cdn/b.png 2x,c.png").as_deref(),
            Some("/files/ns/1/a.png 1x, https://cdn/b.png 2x,/files/ns/1/c.png")
        );
        assert_eq!(r.rewrite_srcset("https://cdn/b.png 2x"), None);
    }

    #[test]
    fn test_rewrite_srcset_data_uri_with_commas() {
        let r = PathProxyRewriter::new("/files", "ns/1");
        assert_eq!(
            r.rewrite_srcset("data:image/png;base64,AA,BB 1x, a.png 2x").as_deref(),
            Some("data:image/png;base64,AA,BB 1x, /files/ns/1/a.png 2x")
        );
    }

    #[test]
    fn test_rewrite_ignores_unrelated_attributes() {
        let html = r#"<a title="css/site.css" data-src="x.png" href="page.html">page.html</a>"#;
        assert_eq!(
            rewriter().rewrite(html),
            r#"<a title="css/site.css" data-src="x.png" href="https://example.com/sites/default/files/static-content-nodes/42/src/page.html">page.html</a>"#
        );
    }
}

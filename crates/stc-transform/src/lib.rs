//! Content transformation strategies for STC.
//!
//! A resolved entry point is turned into embeddable output by exactly one
//! strategy:
//!
//! | strategy | selected by | effect |
//! |---|---|---|
//! | [`raw_pass`] | [`ProcessingMode::Raw`] | bytes returned unmodified |
//! | [`PathProxyRewriter`] | [`ProcessingMode::Proxied`] | relative references made absolute |
//! | [`harden`] | [`ProcessingMode::Hardened`] | proxying, then [`sanitize`] |
//! | [`IframeReference`] | `RenderMethod::Iframe` | public URL only, document never read |
//!
//! All markup handling is byte-preserving: only the attributes and CSS
//! arguments a strategy changes are rewritten, so hardened output differs from
//! proxied output only where script-executing constructs were removed.

mod iframe;
mod markup;
mod proxy;
mod sanitize;

pub use iframe::{DEFAULT_IFRAME_HEIGHT, IframeReference};
pub use markup::escape_html;
pub use proxy::PathProxyRewriter;
pub use sanitize::sanitize;

use stc_core::ProcessingMode;

/// Return document bytes as trusted markup.
///
/// Invalid UTF-8 sequences are replaced (and logged); valid documents come
/// back byte-for-byte.
#[must_use]
pub fn raw_pass(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(
                valid_up_to = e.utf8_error().valid_up_to(),
                "Document is not valid UTF-8, replacing invalid sequences"
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

/// Rewrite relative references, then strip script-executing constructs.
#[must_use]
pub fn harden(html: &str, rewriter: &PathProxyRewriter) -> String {
    sanitize(&rewriter.rewrite(html))
}

/// Apply the strategy for `mode` to a document.
#[must_use]
pub fn transform(mode: ProcessingMode, bytes: Vec<u8>, rewriter: &PathProxyRewriter) -> String {
    let html = raw_pass(bytes);
    match mode {
        ProcessingMode::Raw => html,
        ProcessingMode::Proxied => rewriter.rewrite(&html).into_owned(),
        ProcessingMode::Hardened => harden(&html, rewriter),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const DOC: &str = r#"<link href="css/a.css"><img src="i.png" onerror="x()"><script src="app.js"></script><p>Hi</p>"#;

    fn rewriter() -> PathProxyRewriter {
        PathProxyRewriter::new("/files", "static-content-nodes/1/dist")
    }

    #[test]
    fn test_raw_pass_is_identity() {
        assert_eq!(raw_pass(DOC.as_bytes().to_vec()), DOC);
    }

    #[test]
    fn test_raw_pass_replaces_invalid_utf8() {
        assert_eq!(raw_pass(vec![b'a', 0xff, b'b']), "a\u{FFFD}b");
    }

    #[test]
    fn test_transform_modes() {
        let bytes = || DOC.as_bytes().to_vec();

        assert_eq!(transform(ProcessingMode::Raw, bytes(), &rewriter()), DOC);
        assert_eq!(
            transform(ProcessingMode::Proxied, bytes(), &rewriter()),
            r#"<link href="/files/static-content-nodes/1/dist/css/a.css"><img src="/files/static-content-nodes/1/dist/i.png" onerror="x()"><script src="/files/static-content-nodes/1/dist/app.js"></script><p>Hi</p>"#
        );
        assert_eq!(
            transform(ProcessingMode::Hardened, bytes(), &rewriter()),
            r#"<link href="/files/static-content-nodes/1/dist/css/a.css"><img src="/files/static-content-nodes/1/dist/i.png"><p>Hi</p>"#
        );
    }

    #[test]
    fn test_hardened_matches_proxied_apart_from_removals() {
        let payload = r#"<div class="c" onclick="steal()"><a href="page.html" title="t">link</a>
<script>alert(1)</script><img src="x.png" onload=go() alt="pic"> text</div>"#;
        let proxied = rewriter().rewrite(payload).into_owned();
        let hardened = harden(payload, &rewriter());

        let expected = proxied
            .replace(r#" onclick="steal()""#, "")
            .replace("<script>alert(1)</script>", "")
            .replace(" onload=go()", "");
        assert_eq!(hardened, expected);
    }

    #[test]
    fn test_harden_is_idempotent() {
        let once = harden(DOC, &rewriter());
        assert_eq!(harden(&once, &rewriter()), once);
    }
}

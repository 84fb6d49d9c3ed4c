//! HTML rewriting on top of an HTML5 tokenizer.
//!
//! Documents are streamed through `lol_html`, which splits markup exactly the
//! way browsers do: comments, quoted values and raw-text elements are opaque,
//! and a lone quote inside an unquoted value does not hide the rest of the
//! tag. Bytes no handler touches are copied to the output unchanged. A start
//! tag whose attributes are edited is re-emitted with its remaining
//! attributes in their original form.

use lol_html::errors::RewritingError;
use lol_html::{RewriteStrSettings, rewrite_str};

/// Run `settings` over a document.
///
/// Strict mode is off so that documents the tokenizer cannot disambiguate
/// (e.g. `<select><xmp>`) are still processed instead of rejected.
pub(crate) fn rewrite_html<'h, 's>(
    html: &str,
    settings: RewriteStrSettings<'h, 's>,
) -> Result<String, RewritingError> {
    rewrite_str(
        html,
        RewriteStrSettings {
            strict: false,
            ..settings
        },
    )
}

/// Escape a string for use in HTML text or a double-quoted attribute.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use lol_html::element;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_untouched_document_is_byte_identical() {
        let html = "<!DOCTYPE html>\n<!-- <b> --><P CLASS=x  id='y'>a &amp; b</P><script>if (a<b) {}</script>";
        let out = rewrite_html(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![element!("*", |_el| Ok(()))],
                ..RewriteStrSettings::new()
            },
        )
        .unwrap();
        assert_eq!(out, html);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}

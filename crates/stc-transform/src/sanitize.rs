//! Removal of script-executing constructs.
//!
//! Strips `<script>` elements (including unterminated ones), inline event
//! handler attributes (`on*`), and attributes whose value uses the
//! `javascript:` scheme. Every other element, attribute, and text byte is
//! left as it was.
//!
//! Markup is tokenized the way a browser would, so comments and quoted
//! values never hide or fake a tag. Passes are repeated until the output
//! stops changing, so fragments that reassemble into a new construct after a
//! removal are caught too and sanitizing is idempotent.

use lol_html::html_content::Element;
use lol_html::{HandlerResult, RewriteStrSettings, element};

use crate::markup::rewrite_html;

/// Remove script-executing constructs from a document.
///
/// A document the tokenizer rejects yields an empty string.
#[must_use]
pub fn sanitize(html: &str) -> String {
    let mut current = html.to_owned();
    loop {
        let next = match sanitize_pass(&current) {
            Ok(next) => next,
            Err(e) => {
                tracing::error!(error = %e, "Failed to sanitize document, dropping it");
                return String::new();
            }
        };
        if next == current {
            return current;
        }
        current = next;
    }
}

/// One sanitizing pass.
fn sanitize_pass(html: &str) -> Result<String, lol_html::errors::RewritingError> {
    rewrite_html(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("script", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("*", |el| strip_attributes(el)),
            ],
            ..RewriteStrSettings::new()
        },
    )
}

/// Drop event handlers and `javascript:` attributes from one element.
fn strip_attributes(el: &mut Element<'_, '_>) -> HandlerResult {
    let doomed: Vec<String> = el
        .attributes()
        .iter()
        .filter(|attr| {
            let name = attr.name();
            let is_handler = name.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("on"));
            is_handler || is_javascript_url(&attr.value())
        })
        .map(|attr| attr.name())
        .collect();

    for name in doomed {
        el.remove_attribute(&name);
    }
    Ok(())
}

/// True if a URL uses the `javascript:` scheme once browser leniency is applied.
///
/// Browsers ignore leading whitespace and control characters, skip tabs and
/// newlines inside the scheme, and decode character references before
/// parsing the URL.
fn is_javascript_url(value: &str) -> bool {
    const SCHEME: &str = "javascript:";

    let mut scheme = String::with_capacity(SCHEME.len());
    let mut rest = value;
    while scheme.len() < SCHEME.len() {
        let Some((c, consumed)) = next_decoded_char(rest) else {
            break;
        };
        rest = &rest[consumed..];
        if c <= ' ' {
            continue;
        }
        scheme.push(c.to_ascii_lowercase());
    }
    scheme == SCHEME
}

/// Decode one character, resolving numeric and a few named character references.
///
/// Returns the character and the number of bytes consumed.
fn next_decoded_char(s: &str) -> Option<(char, usize)> {
    let first = s.chars().next()?;
    if first != '&' {
        return Some((first, first.len_utf8()));
    }

    let named: &[(&str, char)] = &[
        ("&colon;", ':'),
        ("&Tab;", '\t'),
        ("&NewLine;", '\n'),
        ("&amp;", '&'),
    ];
    for (entity, c) in named {
        if s.starts_with(entity) {
            return Some((*c, entity.len()));
        }
    }

    let Some(body) = s.strip_prefix("&#") else {
        return Some(('&', 1));
    };
    let (radix, digits_start) = match body.as_bytes().first() {
        Some(b'x' | b'X') => (16, 3),
        _ => (10, 2),
    };
    let digits: &str = &s[digits_start..];
    let len = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if len == 0 {
        return Some(('&', 1));
    }
    let decoded = u32::from_str_radix(&digits[..len], radix)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or('\u{FFFD}');
    let mut consumed = digits_start + len;
    if digits[len..].starts_with(';') {
        consumed += 1;
    }
    Some((decoded, consumed))
}

//! Renderer adapters for host pages.
//!
//! Host integrations (blocks, field formatters, paragraph behaviors, template
//! functions) all need the same thing: markup for a locator that can be
//! dropped into a page and never breaks it. [`EmbedAdapter`] provides that on
//! top of [`RenderDispatcher`].

use std::sync::Arc;

use stc_core::ContentLocator;
use stc_transform::escape_html;

use crate::dispatcher::{RenderDispatcher, RenderResult, RenderedContent};
use crate::error::RenderError;
use crate::settings::SettingsStore;

/// Markup for a host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embeddable {
    /// Rendered content.
    Content(String),
    /// Visible failure notice in place of the content.
    Placeholder(String),
}

impl Embeddable {
    #[must_use]
    pub fn html(&self) -> &str {
        match self {
            Self::Content(html) | Self::Placeholder(html) => html,
        }
    }

    #[must_use]
    pub fn into_html(self) -> String {
        match self {
            Self::Content(html) | Self::Placeholder(html) => html,
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

/// Renders a locator into embeddable markup.
pub trait RendererAdapter: Send + Sync {
    fn render(&self, locator: &ContentLocator) -> Embeddable;
}

/// Adapter delegating to a [`RenderDispatcher`] with the current settings.
pub struct EmbedAdapter {
    dispatcher: Arc<RenderDispatcher>,
    settings: Arc<dyn SettingsStore>,
}

impl EmbedAdapter {
    pub fn new(dispatcher: Arc<RenderDispatcher>, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            dispatcher,
            settings,
        }
    }

    /// Turn a render result into markup.
    ///
    /// Template results are transformed with their selected processing mode.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Io` if a template result's document cannot be read.
    pub fn embed(&self, result: &RenderResult) -> Result<String, RenderError> {
        match result {
            RenderResult::DocumentArray(content) => Ok(wrap_content(content)),
            RenderResult::TemplateInjected(context) => {
                Ok(wrap_content(&self.dispatcher.materialize(context)?))
            }
            RenderResult::Iframe(frame) => Ok(frame.element()),
        }
    }
}

impl RendererAdapter for EmbedAdapter {
    fn render(&self, locator: &ContentLocator) -> Embeddable {
        let settings = self.settings.snapshot();
        let html = self
            .dispatcher
            .render(locator, &settings)
            .and_then(|result| self.embed(&result));
        match html {
            Ok(html) => Embeddable::Content(html),
            Err(e) => Embeddable::Placeholder(error_placeholder(locator, &e)),
        }
    }
}

/// Wrap transformed markup in its identifying container.
#[must_use]
pub fn wrap_content(content: &RenderedContent) -> String {
    format!(
        r#"<div class="static-content" data-static-id="{}" data-static-location="{}">{}</div>"#,
        escape_html(content.locator.id.as_str()),
        content.locator.namespace,
        content.markup
    )
}

/// Placeholder shown when content does not exist.
#[must_use]
pub fn not_found_placeholder(locator: &ContentLocator) -> String {
    format!(
        r#"<div class="messages messages--error">Static content not found: {}</div>"#,
        escape_html(&locator.to_string())
    )
}

/// Placeholder for any render error. Non-`NotFound` errors are logged.
#[must_use]
pub fn error_placeholder(locator: &ContentLocator, error: &RenderError) -> String {
    if error.is_not_found() {
        return not_found_placeholder(locator);
    }
    tracing::error!(namespace = %locator.namespace, id = %locator.id, error = %error, "Failed to render static content");
    format!(
        r#"<div class="messages messages--error">Static content could not be loaded: {}</div>"#,
        escape_html(&locator.to_string())
    )
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use stc_core::{GlobalSettings, Namespace, RenderMethod};

    use super::*;
    use crate::settings::StaticSettings;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn adapter(root: &Path, settings: GlobalSettings) -> EmbedAdapter {
        EmbedAdapter::new(
            Arc::new(RenderDispatcher::new(root, "/files")),
            Arc::new(StaticSettings::new(settings)),
        )
    }

    #[test]
    fn test_document_is_wrapped() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "static-content-blocks/7/raw/index.html", "<p>Hi</p>");

        let locator = ContentLocator::new(Namespace::Blocks, "7").unwrap();
        let out = adapter(temp.path(), GlobalSettings::default()).render(&locator);

        assert_eq!(
            out,
            Embeddable::Content(
                r#"<div class="static-content" data-static-id="7" data-static-location="static-content-blocks"><p>Hi</p></div>"#
                    .to_owned()
            )
        );
    }

    #[test]
    fn test_template_result_is_materialized() {
        let temp = tempfile::tempdir().unwrap();
        write(
            temp.path(),
            "static-content-twig/t/proxied/index.html",
            r#"<img src="a.png">"#,
        );
        let settings = GlobalSettings {
            render_method: RenderMethod::TemplateInjected,
            ..GlobalSettings::default()
        };

        let locator = ContentLocator::new(Namespace::Twig, "t").unwrap();
        let out = adapter(temp.path(), settings).render(&locator);

        assert!(!out.is_placeholder());
        assert!(
            out.html()
                .contains(r#"<img src="/files/static-content-twig/t/proxied/a.png">"#)
        );
    }

    #[test]
    fn test_iframe_result_is_frame_element() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "static-content-pages/p/index.html", "<html>");
        let settings = GlobalSettings {
            render_method: RenderMethod::Iframe,
            ..GlobalSettings::default()
        };

        let locator = ContentLocator::new(Namespace::Pages, "p").unwrap();
        let out = adapter(temp.path(), settings).render(&locator);

        assert_eq!(
            out.into_html(),
            r#"<iframe src="/files/static-content-pages/p/index.html" width="100%" height="600px" frameborder="0"></iframe>"#
        );
    }

    #[test]
    fn test_not_found_placeholder() {
        let temp = tempfile::tempdir().unwrap();
        let locator = ContentLocator::new(Namespace::Nodes, "99").unwrap();

        let out = adapter(temp.path(), GlobalSettings::default()).render(&locator);

        assert!(out.is_placeholder());
        assert_eq!(
            out.html(),
            r#"<div class="messages messages--error">Static content not found: static-content-nodes/99</div>"#
        );
    }

    #[test]
    fn test_id_is_escaped_in_wrapper() {
        let locator = ContentLocator::new(Namespace::Nodes, "a\"b").unwrap();
        let content = RenderedContent {
            locator,
            subdirectory: stc_core::SubdirectoryTag::Root,
            processing_mode: stc_core::ProcessingMode::Raw,
            markup: String::new(),
            custom_settings: std::collections::HashMap::new(),
            from_cache: false,
        };
        assert!(wrap_content(&content).contains(r#"data-static-id="a&quot;b""#));
    }
}

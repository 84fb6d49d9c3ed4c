//! `stc render` command implementation.

use std::sync::Arc;

use clap::Args;
use stc_core::{ContentLocator, GlobalSettings, ProcessingMode, RenderMethod};
use stc_render::{EmbedAdapter, StaticSettings, error_placeholder};

use super::{ContentArgs, dispatcher};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Content namespace (e.g. `static-content-nodes` or `nodes`).
    namespace: String,

    /// Content identifier.
    id: String,

    /// Render method for this run; per-item overrides still apply.
    #[arg(short, long)]
    method: Option<String>,

    /// Processing mode to ask for (`raw`, `proxied`, `hardened`); an
    /// override document still wins over it.
    #[arg(long)]
    mode: Option<String>,

    /// Print the render result as JSON instead of embeddable markup.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    content: ContentArgs,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let locator = ContentLocator::parse(&self.namespace, &self.id)?;
        let config = self.content.load(None, None)?;

        let mut settings = config.global_settings();
        if let Some(method) = &self.method {
            apply_method(&mut settings, method.parse()?);
        }

        let requested = self.requested_mode()?;

        let dispatcher = Arc::new(dispatcher(&config));
        let result = match dispatcher.render_with_mode(&locator, &settings, requested) {
            Ok(result) => result,
            Err(e) => {
                output.print(&error_placeholder(&locator, &e))?;
                return Err(e.into());
            }
        };

        if self.json {
            output.print(&serde_json::to_string_pretty(&result)?)?;
        } else {
            let adapter = EmbedAdapter::new(
                Arc::clone(&dispatcher),
                Arc::new(StaticSettings::new(settings)),
            );
            output.print(&adapter.embed(&result)?)?;
        }
        Ok(())
    }

    fn requested_mode(&self) -> Result<Option<ProcessingMode>, CliError> {
        Ok(self.mode.as_deref().map(str::parse).transpose()?)
    }
}

/// Make `method` the render method for every namespace.
fn apply_method(settings: &mut GlobalSettings, method: RenderMethod) {
    settings.render_method = method;
    settings.namespace_render_methods.clear();
}

//! `stc resolve` command implementation.

use clap::Args;
use stc_core::{ContentLocator, RenderMethod};
use stc_render::RenderPlan;

use super::{ContentArgs, dispatcher};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Content namespace (e.g. `static-content-nodes` or `nodes`).
    namespace: String,

    /// Content identifier.
    id: String,

    #[command(flatten)]
    content: ContentArgs,
}

impl ResolveArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let locator = ContentLocator::parse(&self.namespace, &self.id)?;
        let config = self.content.load(None, None)?;
        let dispatcher = dispatcher(&config);

        let plan = dispatcher.plan(&locator, &config.global_settings())?;
        for line in describe(&plan, dispatcher.base_url()) {
            output.print(&line)?;
        }
        Ok(())
    }
}

/// Human-readable lines describing a plan.
fn describe(plan: &RenderPlan, base_url: &str) -> Vec<String> {
    let mode = if plan.render_method == RenderMethod::Iframe {
        "n/a".to_owned()
    } else {
        plan.processing_mode.to_string()
    };
    vec![
        format!("file:            {}", plan.resolved.absolute_path.display()),
        format!("subdirectory:    {}", plan.resolved.tag),
        format!("processing mode: {mode}"),
        format!("render method:   {}", plan.render_method),
        format!("public url:      {}", plan.resolved.public_url(base_url)),
    ]
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use stc_core::{DirectoryOverride, Namespace, ProcessingMode, ResolvedFile, SubdirectoryTag};

    use super::*;

    fn plan(render_method: RenderMethod) -> RenderPlan {
        RenderPlan {
            locator: ContentLocator::new(Namespace::Nodes, "42").unwrap(),
            resolved: ResolvedFile {
                absolute_path: PathBuf::from("/srv/public/static-content-nodes/42/src/index.html"),
                tag: SubdirectoryTag::Src,
                relative_path: "static-content-nodes/42/src/index.html".to_owned(),
            },
            overrides: DirectoryOverride::default(),
            render_method,
            processing_mode: ProcessingMode::Proxied,
        }
    }

    #[test]
    fn test_describe_document_plan() {
        assert_eq!(
            describe(&plan(RenderMethod::DocumentArray), "/files"),
            vec![
                "file:            /srv/public/static-content-nodes/42/src/index.html",
                "subdirectory:    src",
                "processing mode: proxied",
                "render method:   document-array",
                "public url:      /files/static-content-nodes/42/src/index.html",
            ]
        );
    }

    #[test]
    fn test_describe_iframe_plan_has_no_mode() {
        let lines = describe(&plan(RenderMethod::Iframe), "/files");
        assert_eq!(lines[2], "processing mode: n/a");
    }
}

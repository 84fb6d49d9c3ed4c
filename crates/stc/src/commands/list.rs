//! `stc list` command implementation.

use clap::Args;
use stc_core::Namespace;
use stc_render::{ContentCatalog, FsCatalog};

use super::{ContentArgs, dispatcher};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Content namespace (e.g. `static-content-nodes` or `nodes`).
    namespace: String,

    #[command(flatten)]
    content: ContentArgs,
}

impl ListArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let namespace: Namespace = self.namespace.parse()?;
        let config = self.content.load(None, None)?;
        let dispatcher = dispatcher(&config);
        let catalog = FsCatalog::new(dispatcher.root().to_path_buf())
            .with_override_loader(dispatcher.override_loader().clone());

        let items = catalog.list_by_type(namespace);
        if items.is_empty() {
            output.info(&format!("No content in {namespace}"));
            return Ok(());
        }
        for item in items {
            output.print(&format!("{}\t{}", item.id, item.label))?;
        }
        Ok(())
    }
}

//! `stc serve` command implementation.

use clap::Args;
use stc_server::{run_server, server_config_from_stc_config};

use super::ContentArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    #[command(flatten)]
    content: ContentArgs,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.content.load(self.host, self.port)?;

        output.highlight(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Content root: {}",
            config.content_resolved.root.display()
        ));
        output.info(&format!("Base URL: {}", config.base_url()));
        if config.content_resolved.cache_enabled {
            output.info("Cache: enabled");
        } else {
            output.info("Cache: disabled");
        }

        let server_config = server_config_from_stc_config(&config, version.to_owned());
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        output.success("Server stopped");
        Ok(())
    }
}

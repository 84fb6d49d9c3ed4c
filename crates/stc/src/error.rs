//! CLI error types.

use stc_config::ConfigError;
use stc_core::{LocatorError, ParseEnumError};
use stc_render::RenderError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Locator(#[from] LocatorError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Validation(#[from] ParseEnumError),
}

//! CLI command implementations.

pub(crate) mod list;
pub(crate) mod render;
pub(crate) mod resolve;
pub(crate) mod serve;

use std::path::PathBuf;

use clap::Args;
use stc_cache::MemoryCache;
use stc_config::{CliSettings, Config};
use stc_render::RenderDispatcher;

use crate::error::CliError;

pub(crate) use list::ListArgs;
pub(crate) use render::RenderArgs;
pub(crate) use resolve::ResolveArgs;
pub(crate) use serve::ServeArgs;

/// Options shared by every command that reads the content root.
#[derive(Args)]
pub(crate) struct ContentArgs {
    /// Path to configuration file (default: auto-discover stc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Public content root (overrides config).
    #[arg(short, long, env = "STC_ROOT")]
    root: Option<PathBuf>,

    /// Public base URL of the content root (overrides config).
    #[arg(long, env = "STC_BASE_URL")]
    base_url: Option<String>,

    /// Disable caching.
    #[arg(long)]
    no_cache: bool,
}

impl ContentArgs {
    /// Load configuration with these flags applied on top.
    pub(crate) fn load(&self, host: Option<String>, port: Option<u16>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            host,
            port,
            root: self.root.clone(),
            base_url: self.base_url.clone(),
            cache_enabled: self.no_cache.then_some(false),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Dispatcher for a loaded configuration.
pub(crate) fn dispatcher(config: &Config) -> RenderDispatcher {
    let content = &config.content_resolved;
    let dispatcher = RenderDispatcher::new(content.root.clone(), &config.base_url())
        .with_override_filename(&content.override_filename);
    if content.cache_enabled {
        dispatcher.with_cache(&MemoryCache::new())
    } else {
        dispatcher
    }
}

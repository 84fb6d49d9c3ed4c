//! Configuration management for STC.
//!
//! Parses `stc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [content]
//! root = "public"
//! base_url = "https://example.com/sites/default/files"
//! override_filename = "stc.options.yml"
//! cache_enabled = true
//!
//! [render]
//! render_method = "document-array"
//! default_processing = "hardened"
//!
//! [render.namespaces]
//! static-content-pages = "iframe"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 7980
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `content.base_url`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use stc_core::{
    DEFAULT_OVERRIDE_FILENAME, GlobalSettings, Namespace, ProcessingMode, RenderMethod,
    parse_or_default,
};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override public content root.
    pub root: Option<PathBuf>,
    /// Override public content base URL.
    pub base_url: Option<String>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "stc.toml";

/// Path under the server that exposes the content root.
pub const FILES_ROUTE: &str = "/files";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Content configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Render defaults as written in the file.
    pub render: RenderConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7980,
        }
    }
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    root: Option<String>,
    base_url: Option<String>,
    override_filename: Option<String>,
    cache_enabled: Option<bool>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Public content root holding the namespace directories.
    pub root: PathBuf,
    /// Public base URL of the content root. `None` means "served by us".
    pub base_url: Option<String>,
    /// File name of per-item override documents.
    pub override_filename: String,
    /// Whether rendered output is cached in memory.
    pub cache_enabled: bool,
}

/// Render defaults.
///
/// Values stay strings until [`Config::global_settings`] so that unsupported
/// names degrade to defaults instead of failing the whole file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Default render method.
    pub render_method: Option<String>,
    /// Processing mode for bundled (`dist`/`build`) content.
    pub default_processing: Option<String>,
    /// Render method per namespace directory name.
    pub namespaces: BTreeMap<String, String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`content.base_url`").
        field: String,
        /// Error message (e.g., "${`CDN_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to be absolute http(s) or root-relative.
fn require_base_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") && !url.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http://, https:// or /"
        )));
    }
    Ok(())
}

/// Require a bare file name (no directories).
fn require_file_name(value: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(value, field)?;
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(ConfigError::Validation(format!(
            "{field} must be a file name, got {value:?}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `stc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(root) = &settings.root {
            self.content_resolved.root.clone_from(root);
        }
        if let Some(base_url) = &settings.base_url {
            self.content_resolved.base_url = Some(base_url.clone());
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.content_resolved.cache_enabled = cache_enabled;
        }
    }

    /// Public base URL of the content root.
    ///
    /// Falls back to the server's own [`FILES_ROUTE`] when no base URL is
    /// configured.
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.content_resolved.base_url {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None => format!(
                "http://{}:{}{FILES_ROUTE}",
                self.server.host, self.server.port
            ),
        }
    }

    /// Build the global settings snapshot from the `[render]` section.
    ///
    /// Unsupported values are logged and replaced by their defaults.
    #[must_use]
    pub fn global_settings(&self) -> GlobalSettings {
        let defaults = GlobalSettings::default();
        let mut namespace_render_methods = BTreeMap::new();

        for (name, method) in &self.render.namespaces {
            let Ok(namespace) = name.parse::<Namespace>() else {
                tracing::warn!(namespace = %name, "Unknown namespace in [render.namespaces], ignoring");
                continue;
            };
            match method.parse::<RenderMethod>() {
                Ok(method) => {
                    namespace_render_methods.insert(namespace, method);
                }
                Err(e) => {
                    tracing::warn!(%namespace, "{e}, using render.render_method");
                }
            }
        }

        GlobalSettings {
            render_method: parse_or_default(
                "render.render_method",
                self.render.render_method.as_deref(),
                defaults.render_method,
            ),
            default_processing: parse_or_default::<ProcessingMode>(
                "render.default_processing",
                self.render.default_processing.as_deref(),
                defaults.default_processing,
            ),
            namespace_render_methods,
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            content: ContentConfigRaw::default(),
            render: RenderConfig::default(),
            content_resolved: ContentConfig {
                root: base.join("public"),
                base_url: None,
                override_filename: DEFAULT_OVERRIDE_FILENAME.to_owned(),
                cache_enabled: true,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_content()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate content configuration.
    fn validate_content(&self) -> Result<(), ConfigError> {
        if let Some(ref base_url) = self.content_resolved.base_url {
            require_non_empty(base_url, "content.base_url")?;
            require_base_url(base_url, "content.base_url")?;
        }
        require_file_name(
            &self.content_resolved.override_filename,
            "content.override_filename",
        )?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref url) = self.content.base_url {
            self.content.base_url = Some(expand::expand_env(url, "content.base_url")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.content_resolved = ContentConfig {
            root: config_dir.join(self.content.root.as_deref().unwrap_or("public")),
            base_url: self.content.base_url.clone(),
            override_filename: self
                .content
                .override_filename
                .clone()
                .unwrap_or_else(|| DEFAULT_OVERRIDE_FILENAME.to_owned()),
            cache_enabled: self.content.cache_enabled.unwrap_or(true),
        };
    }
}

//! Render dispatch.
//!
//! [`RenderDispatcher`] is the single entry point for rendering a
//! [`ContentLocator`]. Each call runs one synchronous chain:
//!
//! ```text
//! resolve ─┬─ not found ──────────────────────────────▶ RenderError::NotFound
//!          └─ resolved ─▶ overrides ─▶ method + mode ─┬─ iframe ─────▶ public URL
//!                                                     ├─ template ───▶ metadata
//!                                                     └─ document ───▶ transformed markup
//! ```
//!
//! Transformed markup is cached per locator. The etag covers everything the
//! output depends on (entry point, override document, mode, base URL), so
//! edits on disk are picked up without explicit invalidation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use stc_cache::{Cache, CacheBucket, CacheBucketExt, NullCacheBucket};
use stc_core::{
    ContentLocator, DirectoryOverride, GlobalSettings, OverrideLoader, PathResolver,
    ProcessingMode, RenderMethod, ResolvedFile, SubdirectoryTag, select_processing_mode,
};
use stc_transform::{IframeReference, PathProxyRewriter};

use crate::error::RenderError;

/// Cache bucket holding transformed markup.
const CACHE_BUCKET: &str = "rendered";

/// Custom setting holding the iframe height.
const IFRAME_HEIGHT_SETTING: &str = "iframe_height";

/// Decisions made for one request before any content is read.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub locator: ContentLocator,
    pub resolved: ResolvedFile,
    pub overrides: DirectoryOverride,
    pub render_method: RenderMethod,
    /// Ignored when `render_method` is [`RenderMethod::Iframe`].
    pub processing_mode: ProcessingMode,
}

/// Output of [`RenderDispatcher::render`], shaped by the render method.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "render_method", rename_all = "kebab-case")]
pub enum RenderResult {
    /// Final markup for direct embedding.
    DocumentArray(RenderedContent),
    /// Metadata for an external template renderer.
    TemplateInjected(TemplateContext),
    /// Public URL for an isolating frame.
    Iframe(IframeContent),
}

impl RenderResult {
    #[must_use]
    pub fn render_method(&self) -> RenderMethod {
        match self {
            Self::DocumentArray(_) => RenderMethod::DocumentArray,
            Self::TemplateInjected(_) => RenderMethod::TemplateInjected,
            Self::Iframe(_) => RenderMethod::Iframe,
        }
    }

    #[must_use]
    pub fn locator(&self) -> &ContentLocator {
        match self {
            Self::DocumentArray(c) => &c.locator,
            Self::TemplateInjected(c) => &c.locator,
            Self::Iframe(c) => &c.locator,
        }
    }

    /// Subdirectory the entry point was found in.
    #[must_use]
    pub fn subdirectory(&self) -> SubdirectoryTag {
        match self {
            Self::DocumentArray(c) => c.subdirectory,
            Self::TemplateInjected(c) => c.subdirectory,
            Self::Iframe(c) => c.subdirectory,
        }
    }

    /// Processing mode, `None` for iframe results.
    #[must_use]
    pub fn processing_mode(&self) -> Option<ProcessingMode> {
        match self {
            Self::DocumentArray(c) => Some(c.processing_mode),
            Self::TemplateInjected(c) => Some(c.processing_mode),
            Self::Iframe(_) => None,
        }
    }
}

/// Transformed content plus the metadata adapters need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedContent {
    #[serde(flatten)]
    pub locator: ContentLocator,
    pub subdirectory: SubdirectoryTag,
    pub processing_mode: ProcessingMode,
    pub markup: String,
    pub custom_settings: HashMap<String, serde_json::Value>,
    /// Whether the markup was served from cache.
    #[serde(skip)]
    pub from_cache: bool,
}

/// Everything a template renderer needs to produce the output itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateContext {
    #[serde(flatten)]
    pub locator: ContentLocator,
    pub subdirectory: SubdirectoryTag,
    pub processing_mode: ProcessingMode,
    /// Public URL of the entry point.
    pub public_url: String,
    pub custom_settings: HashMap<String, serde_json::Value>,
    #[serde(skip)]
    pub resolved: ResolvedFile,
}

/// Frame reference; the document itself is never opened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IframeContent {
    #[serde(flatten)]
    pub locator: ContentLocator,
    pub subdirectory: SubdirectoryTag,
    #[serde(flatten)]
    pub reference: IframeReference,
    /// Frame height from the item's custom settings.
    pub height: Option<String>,
    pub custom_settings: HashMap<String, serde_json::Value>,
}

impl IframeContent {
    /// `<iframe>` element for this reference.
    #[must_use]
    pub fn element(&self) -> String {
        self.reference.element(self.height.as_deref())
    }
}

/// Resolves, configures and transforms static content.
///
/// Holds only read-only configuration and a cache handle; concurrent calls
/// are independent.
pub struct RenderDispatcher {
    resolver: PathResolver,
    overrides: OverrideLoader,
    base_url: String,
    bucket: Box<dyn CacheBucket>,
}

impl RenderDispatcher {
    /// Create a dispatcher for a content root published at `base_url`.
    ///
    /// Caching is off until [`with_cache`](Self::with_cache) is called.
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        let root = root.into();
        Self {
            resolver: PathResolver::new(root.clone()),
            overrides: OverrideLoader::new(root),
            base_url: base_url.trim_end_matches('/').to_owned(),
            bucket: Box::new(NullCacheBucket),
        }
    }

    /// Use a custom override document file name.
    #[must_use]
    pub fn with_override_filename(mut self, filename: &str) -> Self {
        self.overrides = OverrideLoader::with_filename(self.resolver.root(), filename);
        self
    }

    /// Cache transformed markup in `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: &dyn Cache) -> Self {
        self.bucket = cache.bucket(CACHE_BUCKET);
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn override_loader(&self) -> &OverrideLoader {
        &self.overrides
    }

    /// Render content for a locator.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::NotFound` if no entry point exists.
    /// Returns `RenderError::Io` if the entry point cannot be read.
    pub fn render(
        &self,
        locator: &ContentLocator,
        settings: &GlobalSettings,
    ) -> Result<RenderResult, RenderError> {
        self.render_with_mode(locator, settings, None)
    }

    /// Render content, preferring `requested` over the subdirectory's mode.
    ///
    /// # Errors
    ///
    /// Same as [`RenderDispatcher::render`].
    pub fn render_with_mode(
        &self,
        locator: &ContentLocator,
        settings: &GlobalSettings,
        requested: Option<ProcessingMode>,
    ) -> Result<RenderResult, RenderError> {
        let plan = self.plan_with_mode(locator, settings, requested)?;
        self.execute(plan)
    }

    /// Resolve the entry point and decide render method and processing mode.
    ///
    /// Render method precedence: override document, then the namespace
    /// default, then the global default.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::NotFound` if no entry point exists.
    pub fn plan(
        &self,
        locator: &ContentLocator,
        settings: &GlobalSettings,
    ) -> Result<RenderPlan, RenderError> {
        self.plan_with_mode(locator, settings, None)
    }

    /// Like [`RenderDispatcher::plan`], with a processing mode asked for by
    /// the caller. An override document still takes precedence over it.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::NotFound` if no entry point exists.
    pub fn plan_with_mode(
        &self,
        locator: &ContentLocator,
        settings: &GlobalSettings,
        requested: Option<ProcessingMode>,
    ) -> Result<RenderPlan, RenderError> {
        let Some(resolved) = self.resolver.resolve(locator) else {
            tracing::debug!(namespace = %locator.namespace, id = %locator.id, "Static content not found");
            return Err(RenderError::NotFound(locator.clone()));
        };
        tracing::debug!(
            namespace = %locator.namespace,
            id = %locator.id,
            subdirectory = %resolved.tag,
            "Resolved static content"
        );

        let overrides = self.overrides.load(locator);
        let render_method = overrides
            .render_method
            .unwrap_or_else(|| settings.render_method_for(locator.namespace));
        let processing_mode = select_processing_mode(
            resolved.tag,
            &overrides,
            requested,
            settings.default_processing,
        );
        tracing::debug!(
            namespace = %locator.namespace,
            id = %locator.id,
            %render_method,
            mode = %processing_mode,
            "Selected render method and processing mode"
        );

        Ok(RenderPlan {
            locator: locator.clone(),
            resolved,
            overrides,
            render_method,
            processing_mode,
        })
    }

    /// Produce the result for a plan.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Io` if the entry point cannot be read.
    pub fn execute(&self, plan: RenderPlan) -> Result<RenderResult, RenderError> {
        let RenderPlan {
            locator,
            resolved,
            overrides,
            render_method,
            processing_mode,
        } = plan;

        match render_method {
            RenderMethod::Iframe => Ok(RenderResult::Iframe(IframeContent {
                subdirectory: resolved.tag,
                reference: IframeReference::for_resolved(&resolved, &self.base_url),
                height: overrides.custom_str(IFRAME_HEIGHT_SETTING),
                custom_settings: overrides.custom_settings,
                locator,
            })),
            RenderMethod::TemplateInjected => Ok(RenderResult::TemplateInjected(TemplateContext {
                subdirectory: resolved.tag,
                processing_mode,
                public_url: resolved.public_url(&self.base_url),
                custom_settings: overrides.custom_settings,
                locator,
                resolved,
            })),
            RenderMethod::DocumentArray => {
                let (markup, from_cache) = self.transform(&locator, &resolved, processing_mode)?;
                Ok(RenderResult::DocumentArray(RenderedContent {
                    subdirectory: resolved.tag,
                    processing_mode,
                    markup,
                    custom_settings: overrides.custom_settings,
                    from_cache,
                    locator,
                }))
            }
        }
    }

    /// Transform the document behind a template context.
    ///
    /// For template renderers that want final markup after all.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Io` if the entry point cannot be read.
    pub fn materialize(&self, context: &TemplateContext) -> Result<RenderedContent, RenderError> {
        let (markup, from_cache) =
            self.transform(&context.locator, &context.resolved, context.processing_mode)?;
        Ok(RenderedContent {
            locator: context.locator.clone(),
            subdirectory: context.subdirectory,
            processing_mode: context.processing_mode,
            markup,
            custom_settings: context.custom_settings.clone(),
            from_cache,
        })
    }

    /// Drop cached output for a locator.
    pub fn invalidate(&self, locator: &ContentLocator) {
        tracing::debug!(namespace = %locator.namespace, id = %locator.id, "Invalidating cached output");
        self.bucket.remove(&locator.relative_dir());
    }

    /// Read and transform an entry point, going through the cache.
    fn transform(
        &self,
        locator: &ContentLocator,
        resolved: &ResolvedFile,
        mode: ProcessingMode,
    ) -> Result<(String, bool), RenderError> {
        let key = locator.relative_dir();
        let etag = self.cache_etag(locator, resolved, mode);

        if let Some(etag) = &etag
            && let Some(cached) = self.bucket.get_json::<CachedMarkup>(&key, etag)
        {
            tracing::debug!(namespace = %locator.namespace, id = %locator.id, "Serving cached output");
            return Ok((cached.markup, true));
        }

        let bytes = std::fs::read(&resolved.absolute_path).map_err(|source| RenderError::Io {
            path: resolved.absolute_path.clone(),
            source,
        })?;
        let rewriter = PathProxyRewriter::for_resolved(resolved, &self.base_url);
        let markup = stc_transform::transform(mode, bytes, &rewriter);
        tracing::debug!(
            namespace = %locator.namespace,
            id = %locator.id,
            %mode,
            bytes = markup.len(),
            "Transformed static content"
        );

        if let Some(etag) = etag {
            self.bucket
                .set_json(&key, &etag, &CachedMarkupRef { markup: &markup });
        }
        Ok((markup, false))
    }

    /// Etag for cached output, or `None` if the entry point cannot be stat'ed.
    fn cache_etag(
        &self,
        locator: &ContentLocator,
        resolved: &ResolvedFile,
        mode: ProcessingMode,
    ) -> Option<String> {
        let meta = std::fs::metadata(&resolved.absolute_path).ok()?;
        let mtime = unix_nanos(meta.modified().ok()?)?;
        let override_mtime = std::fs::metadata(self.overrides.path_for(locator))
            .and_then(|m| m.modified())
            .ok()
            .and_then(unix_nanos)
            .unwrap_or(0);

        Some(format!(
            "{}:{mtime}:{}:{override_mtime}:{mode}:{}",
            resolved.tag,
            meta.len(),
            self.base_url
        ))
    }
}

fn unix_nanos(time: SystemTime) -> Option<u128> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_nanos())
}

/// Cached markup (owned).
#[derive(Deserialize)]
struct CachedMarkup {
    markup: String,
}

/// Borrowed view of cached markup for serialization.
#[derive(Serialize)]
struct CachedMarkupRef<'a> {
    markup: &'a str,
}

//! Cache abstraction layer for STC.
//!
//! Resolution and transformation are cheap, but a busy site renders the same
//! items over and over. These traits let the dispatcher keep transformed
//! output without knowing where it is stored:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Key-value store with etag-based invalidation
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`MemoryCache`]: In-process map shared by all buckets of one cache
//!
//! # Example
//!
//! ```
//! use stc_cache::{Cache, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! let bucket = cache.bucket("rendered");
//! bucket.set("static-content-nodes/42", "v1", b"<p>hello</p>");
//! assert_eq!(bucket.get("static-content-nodes/42", "v1"), Some(b"<p>hello</p>".to_vec()));
//! assert_eq!(bucket.get("static-content-nodes/42", "v2"), None);
//! ```

mod ext;
mod memory;

pub use ext::CacheBucketExt;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`].
///
/// Each bucket stores key-value pairs where values are invalidated by an etag.
/// The etag is an opaque string chosen by the caller (e.g., a file mtime or a
/// settings fingerprint). A cache hit occurs only when both the key and etag
/// match.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value.
    ///
    /// Returns `Some(value)` if the key exists **and** was stored with the same
    /// `etag`. Returns `None` on cache miss or etag mismatch.
    ///
    /// If `etag` is an empty string, etag validation is skipped.
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>>;

    /// Store a value in the cache.
    ///
    /// Overwrites any existing entry for the same key, regardless of the
    /// previous etag.
    fn set(&self, key: &str, etag: &str, value: &[u8]);

    /// Drop the entry for a key, if any.
    fn remove(&self, key: &str);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// Buckets produced by one `Cache` are logically isolated from each other.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    ///
    /// Calling `bucket` multiple times with the same name returns handles that
    /// share the same underlying storage.
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`] that never stores or retrieves data.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str, _etag: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _etag: &str, _value: &[u8]) {}

    fn remove(&self, _key: &str) {}
}

/// No-op [`Cache`] that always returns [`NullCacheBucket`]s.
///
/// Use when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}

//! Typed access to [`CacheBucket`] values.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheBucket;

/// JSON helpers on top of the byte-oriented [`CacheBucket`].
///
/// Kept separate so `CacheBucket` stays object-safe; every bucket gets these
/// methods through the blanket impl.
///
/// # Example
///
/// ```
/// use stc_cache::{Cache, CacheBucketExt, MemoryCache};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Entry { markup: String }
///
/// let cache = MemoryCache::new();
/// let bucket = cache.bucket("rendered");
///
/// bucket.set_json("static-content-nodes/1", "v1", &Entry { markup: "<p>Hi</p>".into() });
/// let entry: Option<Entry> = bucket.get_json("static-content-nodes/1", "v1");
/// assert_eq!(entry.map(|e| e.markup).as_deref(), Some("<p>Hi</p>"));
/// ```
pub trait CacheBucketExt: CacheBucket {
    /// Deserialize a cached value.
    ///
    /// An entry that no longer deserializes (e.g. written by an older build)
    /// counts as a miss.
    fn get_json<T: DeserializeOwned>(&self, key: &str, etag: &str) -> Option<T> {
        let bytes = self.get(key, etag)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Serialize and store a value. Serialization failures skip the write.
    fn set_json<T: Serialize>(&self, key: &str, etag: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, etag, &bytes),
            Err(e) => tracing::warn!(key, error = %e, "Failed to serialize cache entry"),
        }
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::{Cache, MemoryCache};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Rendered {
        markup: String,
        tag: String,
    }

    #[test]
    fn test_json_round_trip_through_boxed_bucket() {
        let bucket: Box<dyn CacheBucket> = MemoryCache::new().bucket("rendered");
        let value = Rendered {
            markup: "<p>x</p>".to_owned(),
            tag: "src".to_owned(),
        };
        bucket.set_json("k", "e", &value);
        assert_eq!(bucket.get_json::<Rendered>("k", "e"), Some(value));
    }

    #[test]
    fn test_undecodable_entry_is_miss() {
        let bucket = MemoryCache::new().bucket("rendered");
        bucket.set("k", "e", b"not json");
        assert_eq!(bucket.get_json::<Rendered>("k", "e"), None);
    }
}

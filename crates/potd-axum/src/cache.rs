//! Response caches.
//!
//! Only found results are cached. A successful scrape drops everything
//! through the [`CacheInvalidator`] port.

use axum::body::Bytes;
use chrono::NaiveDate;
use moka::future::Cache;
use potd_core::{CacheInvalidator, ImageSize, ImageVariant, PictureDto};

/// Default number of entries per cache.
pub const DEFAULT_CACHE_CAPACITY: u64 = 256;

/// Key for scaled image renditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageKey {
    pub date: NaiveDate,
    pub variant: ImageVariant,
    pub size: ImageSize,
}

/// Bounded caches for the read endpoints.
#[derive(Clone)]
pub struct ResponseCaches {
    pub(crate) pictures: Cache<NaiveDate, PictureDto>,
    pub(crate) images: Cache<ImageKey, Bytes>,
    pub(crate) trmnl: Cache<NaiveDate, Bytes>,
}

impl Default for ResponseCaches {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ResponseCaches {
    pub fn new(capacity: u64) -> Self {
        Self {
            pictures: Cache::builder().max_capacity(capacity).build(),
            images: Cache::builder().max_capacity(capacity).build(),
            // TRMNL renders are only ever requested for a handful of dates
            trmnl: Cache::builder().max_capacity(capacity.min(16)).build(),
        }
    }
}

impl CacheInvalidator for ResponseCaches {
    fn invalidate_all(&self) {
        self.pictures.invalidate_all();
        self.images.invalidate_all();
        self.trmnl.invalidate_all();
        tracing::debug!("Response caches cleared");
    }
}

impl std::fmt::Debug for ResponseCaches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCaches")
            .field("pictures", &self.pictures.entry_count())
            .field("images", &self.images.entry_count())
            .field("trmnl", &self.trmnl.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn test_invalidate_all_clears_every_cache() {
        let caches = ResponseCaches::new(8);
        let key = ImageKey {
            date: day(),
            variant: ImageVariant::Dithered,
            size: ImageSize::new(Some(100), None),
        };
        caches.images.insert(key, Bytes::from_static(b"png")).await;
        caches.trmnl.insert(day(), Bytes::from_static(b"trmnl")).await;
        assert!(caches.images.get(&key).await.is_some());

        caches.invalidate_all();

        assert!(caches.images.get(&key).await.is_none());
        assert!(caches.trmnl.get(&day()).await.is_none());
    }

    #[tokio::test]
    async fn test_image_keys_distinguish_sizes() {
        let caches = ResponseCaches::default();
        let small = ImageKey {
            date: day(),
            variant: ImageVariant::Original,
            size: ImageSize::new(Some(10), None),
        };
        let large = ImageKey {
            size: ImageSize::new(Some(10), Some(20)),
            ..small
        };
        caches.images.insert(small, Bytes::from_static(b"a")).await;
        assert!(caches.images.get(&large).await.is_none());
        assert_eq!(caches.images.get(&small).await.unwrap(), Bytes::from_static(b"a"));
    }
}

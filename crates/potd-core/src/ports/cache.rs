//! Cache invalidation port.
//!
//! Adapters that cache responses register an invalidator so a fresh scrape
//! is visible immediately.

/// Drops every cached entry.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate_all(&self);
}

//! Composition utilities for building services with `SQLite` backends.
//!
//! Construction only; no domain logic lives here.

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::repositories::SqlitePictureRepository;

/// Factory for creating repository instances with `SQLite` backends.
pub struct CoreFactory;

impl CoreFactory {
    /// Create a picture repository from a pool.
    pub fn picture_repository(pool: SqlitePool) -> Arc<SqlitePictureRepository> {
        Arc::new(SqlitePictureRepository::new(pool))
    }
}

//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx`, `reqwest` or `image` types in any signature
//! - Repository traits are minimal and query-focused
//! - Adapter-internal errors are mapped to the port error at the boundary

pub mod cache;
pub mod image_processor;
pub mod picture_repository;
pub mod summarizer;
pub mod wikipedia;

use thiserror::Error;

pub use cache::CacheInvalidator;
pub use image_processor::{ImageProcessingError, ImageProcessorPort};
pub use picture_repository::PictureRepository;
pub use summarizer::{NoopSummarizer, SummarizerError, SummarizerPort};
pub use wikipedia::{FetchError, WikipediaPort};

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same identifier already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored data could not be interpreted.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Core error type for semantic domain errors.
///
/// Adapters map this to their own error types (HTTP status codes,
/// CLI exit codes).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Image decoding, scaling or encoding failed.
    #[error(transparent)]
    Image(#[from] ImageProcessingError),

    /// Validation error (invalid input).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested picture or image does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error (unexpected condition).
    #[error("Internal error: {0}")]
    Internal(String),
}

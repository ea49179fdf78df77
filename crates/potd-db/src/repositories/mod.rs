//! Repository implementations using `SQLite`.
//!
//! The `SqlitePool` is confined to this module and never exposed through
//! the port trait signatures.

mod row_mappers;
mod sqlite_picture_repository;

pub use sqlite_picture_repository::SqlitePictureRepository;

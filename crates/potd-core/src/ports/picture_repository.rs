//! Picture repository port definition.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::RepositoryError;
use crate::domain::{NewPicture, Picture};

/// Port for picture persistence operations.
///
/// Implementations handle the actual storage mechanism (`SQLite`, etc.).
/// Dates are unique: inserting a second record for the same date fails with
/// [`RepositoryError::AlreadyExists`].
#[async_trait]
pub trait PictureRepository: Send + Sync {
    /// Find the picture stored for `date`.
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<Picture>, RepositoryError>;

    /// Find any picture whose resolved image URL equals `image_url`.
    async fn find_by_image_url(&self, image_url: &str)
    -> Result<Option<Picture>, RepositoryError>;

    /// Find the picture with the most recent date.
    async fn find_latest(&self) -> Result<Option<Picture>, RepositoryError>;

    /// Insert a new picture and return it with its assigned id.
    async fn insert(&self, picture: NewPicture) -> Result<Picture, RepositoryError>;
}

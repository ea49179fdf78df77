//! `SQLite` implementation of the `PictureRepository` trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

use potd_core::{NewPicture, Picture, PictureRepository, RepositoryError};

use super::row_mappers::{
    PICTURE_SELECT_COLUMNS, PictureRow, format_date, format_datetime, row_to_picture,
};

/// `SQLite` implementation of the `PictureRepository` trait.
pub struct SqlitePictureRepository {
    pool: SqlitePool,
}

impl SqlitePictureRepository {
    /// Create a new `SQLite` picture repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        value: String,
    ) -> Result<Option<Picture>, RepositoryError> {
        let sql = format!("SELECT {PICTURE_SELECT_COLUMNS} FROM picture_of_the_day WHERE {clause}");
        let row = sqlx::query_as::<_, PictureRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(row_to_picture).transpose()
    }

    async fn get_by_id(&self, id: i64) -> Result<Picture, RepositoryError> {
        let sql = format!("SELECT {PICTURE_SELECT_COLUMNS} FROM picture_of_the_day WHERE id = ?");
        let row = sqlx::query_as::<_, PictureRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| RepositoryError::NotFound(format!("picture id={id}")))?;

        row_to_picture(row)
    }
}

/// Map `SQLx` errors to `RepositoryError`.
fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return RepositoryError::AlreadyExists(db.message().to_string());
        }
    }
    RepositoryError::Storage(e.to_string())
}

#[async_trait]
impl PictureRepository for SqlitePictureRepository {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<Picture>, RepositoryError> {
        self.fetch_one_where("date = ?", format_date(date)).await
    }

    async fn find_by_image_url(
        &self,
        image_url: &str,
    ) -> Result<Option<Picture>, RepositoryError> {
        self.fetch_one_where("image_url = ? ORDER BY date DESC LIMIT 1", image_url.to_string())
            .await
    }

    async fn find_latest(&self) -> Result<Option<Picture>, RepositoryError> {
        let sql = format!(
            "SELECT {PICTURE_SELECT_COLUMNS} FROM picture_of_the_day ORDER BY date DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, PictureRow>(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(row_to_picture).transpose()
    }

    async fn insert(&self, picture: NewPicture) -> Result<Picture, RepositoryError> {
        let picture = picture.clipped();

        let result = sqlx::query(
            r#"
            INSERT INTO picture_of_the_day
                (date, description, short_description, credit, image_url, original_image, dithered_image, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(format_date(picture.date))
        .bind(&picture.description)
        .bind(&picture.short_description)
        .bind(&picture.credit)
        .bind(&picture.image_url)
        .bind(&picture.original_image)
        .bind(&picture.dithered_image)
        .bind(picture.created_at.map(format_datetime))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        tracing::debug!(date = %picture.date, id = result.last_insert_rowid(), "Inserted picture");
        self.get_by_id(result.last_insert_rowid()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn new_picture(date: NaiveDate, image_url: &str) -> NewPicture {
        NewPicture {
            description: Some("A lake".into()),
            short_description: Some("Lake".into()),
            credit: Some("Jane Doe".into()),
            image_url: Some(image_url.into()),
            original_image: Some(vec![0x89, b'P', b'N', b'G']),
            dithered_image: Some(vec![1, 0, 1]),
            created_at: Some(Utc::now()),
            ..NewPicture::for_date(date)
        }
    }

    async fn repo() -> SqlitePictureRepository {
        SqlitePictureRepository::new(setup_test_database().await.unwrap())
    }

    #[tokio::test]
    async fn test_insert_and_find_by_date() {
        let repo = repo().await;
        let saved = repo.insert(new_picture(day(1), "https://u/a.jpg")).await.unwrap();
        assert!(saved.id > 0);
        assert!(saved.created_at.is_some());

        let found = repo.find_by_date(day(1)).await.unwrap().unwrap();
        assert_eq!(found, saved);
        assert_eq!(found.original_image, Some(vec![0x89, b'P', b'N', b'G']));
        assert!(repo.find_by_date(day(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_date_is_already_exists() {
        let repo = repo().await;
        repo.insert(new_picture(day(1), "https://u/a.jpg")).await.unwrap();
        let err = repo
            .insert(new_picture(day(1), "https://u/b.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists(_)));
        let kept = repo.find_by_date(day(1)).await.unwrap().unwrap();
        assert_eq!(kept.image_url.as_deref(), Some("https://u/a.jpg"));
    }

    #[tokio::test]
    async fn test_find_latest_and_by_image_url() {
        let repo = repo().await;
        assert!(repo.find_latest().await.unwrap().is_none());

        repo.insert(new_picture(day(3), "https://u/a.jpg")).await.unwrap();
        repo.insert(new_picture(day(12), "https://u/b.jpg")).await.unwrap();
        repo.insert(new_picture(day(7), "https://u/a.jpg")).await.unwrap();

        assert_eq!(repo.find_latest().await.unwrap().unwrap().date, day(12));
        let reused = repo.find_by_image_url("https://u/a.jpg").await.unwrap().unwrap();
        assert_eq!(reused.date, day(7));
        assert!(repo.find_by_image_url("https://u/none.jpg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_long_description_is_clipped() {
        let repo = repo().await;
        let mut picture = new_picture(day(1), "https://u/a.jpg");
        picture.description = Some("é".repeat(6000));

        let saved = repo.insert(picture).await.unwrap();
        assert_eq!(saved.description.unwrap().chars().count(), 5000);
    }
}

//! Row mapping helpers for `SQLite` queries.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use potd_core::{Picture, RepositoryError};

/// Shared SELECT column list for picture queries.
pub const PICTURE_SELECT_COLUMNS: &str = "id, date, description, short_description, credit, image_url, original_image, dithered_image, created_at";

/// Storage format for `date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage format for `created_at`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(sqlx::FromRow)]
pub struct PictureRow {
    pub id: i64,
    pub date: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub credit: Option<String>,
    pub image_url: Option<String>,
    pub original_image: Option<Vec<u8>>,
    pub dithered_image: Option<Vec<u8>>,
    pub created_at: Option<String>,
}

/// Helper to parse datetime strings that may have a "UTC" suffix.
pub fn parse_datetime(datetime_str: Option<String>) -> Option<DateTime<Utc>> {
    datetime_str.and_then(|s| {
        let trimmed = s.trim_end_matches(" UTC");
        NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT)
            .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
            .ok()
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Convert a row into a domain `Picture`.
pub fn row_to_picture(row: PictureRow) -> Result<Picture, RepositoryError> {
    let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT).map_err(|e| {
        RepositoryError::Serialization(format!("invalid date '{}': {e}", row.date))
    })?;

    Ok(Picture {
        id: row.id,
        date,
        description: row.description,
        short_description: row.short_description,
        credit: row.credit,
        image_url: row.image_url,
        original_image: row.original_image,
        dithered_image: row.dithered_image,
        created_at: parse_datetime(row.created_at),
    })
}

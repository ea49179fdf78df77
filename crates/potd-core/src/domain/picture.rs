//! Picture-of-the-day records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Stored when the summarizer cannot produce a short description.
pub const DESCRIPTION_UNAVAILABLE: &str = "Description unavailable";

/// Column limit for `description`.
pub const MAX_DESCRIPTION_CHARS: usize = 5000;

/// Column limit for `short_description`.
pub const MAX_SHORT_DESCRIPTION_CHARS: usize = 1000;

/// A stored picture of the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub id: i64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub credit: Option<String>,
    /// Resolved original (non-thumbnail) image URL.
    pub image_url: Option<String>,
    pub original_image: Option<Vec<u8>>,
    pub dithered_image: Option<Vec<u8>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Picture {
    /// Convert to the JSON representation served by the API.
    #[must_use]
    pub fn to_dto(&self) -> PictureDto {
        PictureDto::from(self)
    }
}

/// Data for inserting a new picture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPicture {
    pub date: NaiveDate,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub credit: Option<String>,
    pub image_url: Option<String>,
    pub original_image: Option<Vec<u8>>,
    pub dithered_image: Option<Vec<u8>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewPicture {
    /// Create an otherwise empty record for `date`.
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            ..Self::default()
        }
    }

    /// Clip text fields to their column limits.
    #[must_use]
    pub fn clipped(mut self) -> Self {
        self.description = self
            .description
            .map(|d| truncate_chars(&d, MAX_DESCRIPTION_CHARS));
        self.short_description = self
            .short_description
            .map(|d| truncate_chars(&d, MAX_SHORT_DESCRIPTION_CHARS));
        self
    }
}

/// Truncate `s` to at most `max` characters, respecting char boundaries.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// JSON body for picture endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureDto {
    pub date: NaiveDate,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub credit: Option<String>,
    pub image_url: String,
    pub dithered_image_url: String,
}

impl From<&Picture> for PictureDto {
    fn from(p: &Picture) -> Self {
        Self {
            date: p.date,
            description: p.description.clone(),
            short_description: p.short_description.clone(),
            credit: p.credit.clone(),
            image_url: format!("/api/potd/{}/image", p.date),
            dithered_image_url: format!("/api/potd/{}/image/dithered", p.date),
        }
    }
}

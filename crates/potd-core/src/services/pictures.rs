//! Picture query service - read side of the API.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::info_span;

use crate::domain::{ImageSize, ImageVariant, Picture, TRMNL_HEIGHT, TRMNL_WIDTH};
use crate::ports::{CoreError, ImageProcessingError, ImageProcessorPort, PictureRepository};

/// Service for looking up stored pictures and rendering their images.
pub struct PictureService {
    repository: Arc<dyn PictureRepository>,
    images: Arc<dyn ImageProcessorPort>,
}

impl PictureService {
    pub fn new(repository: Arc<dyn PictureRepository>, images: Arc<dyn ImageProcessorPort>) -> Self {
        Self { repository, images }
    }

    /// Today's picture, falling back to the most recent one.
    pub async fn today_or_latest(&self) -> Result<Option<Picture>, CoreError> {
        self.today_or_latest_at(Local::now().date_naive()).await
    }

    async fn today_or_latest_at(&self, today: NaiveDate) -> Result<Option<Picture>, CoreError> {
        if let Some(picture) = self.repository.find_by_date(today).await? {
            return Ok(Some(picture));
        }
        Ok(self.repository.find_latest().await?)
    }

    pub async fn by_date(&self, date: NaiveDate) -> Result<Option<Picture>, CoreError> {
        Ok(self.repository.find_by_date(date).await?)
    }

    /// Stored image bytes for `date`, scaled to `size` when requested.
    pub async fn image(
        &self,
        date: NaiveDate,
        variant: ImageVariant,
        size: ImageSize,
    ) -> Result<Vec<u8>, CoreError> {
        if size.width == Some(0) || size.height == Some(0) {
            return Err(CoreError::Validation(
                "width and height must be positive".to_string(),
            ));
        }
        let too_large = |d: Option<u32>| d.is_some_and(|d| d > ImageSize::MAX_DIMENSION);
        if too_large(size.width) || too_large(size.height) {
            return Err(CoreError::Validation(format!(
                "width and height must not exceed {}",
                ImageSize::MAX_DIMENSION
            )));
        }

        let picture = self
            .repository
            .find_by_date(date)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("picture for {date}")))?;

        let bytes = match variant {
            ImageVariant::Original => picture.original_image,
            ImageVariant::Dithered => picture.dithered_image,
        }
        .ok_or_else(|| CoreError::NotFound(format!("{variant} image for {date}")))?;

        if size.is_original() {
            return Ok(bytes);
        }

        let images = Arc::clone(&self.images);
        run_blocking(move || {
            info_span!("ImageService.scaleImage", ?size).in_scope(|| images.scale(&bytes, size))
        })
        .await
    }

    /// TRMNL rendition of today's (or the latest) picture.
    pub async fn trmnl_image(&self) -> Result<(NaiveDate, Vec<u8>), CoreError> {
        let picture = self
            .today_or_latest()
            .await?
            .ok_or_else(|| CoreError::NotFound("no pictures stored".to_string()))?;
        let image = self.trmnl_image_for(picture.date).await?;
        Ok((picture.date, image))
    }

    /// Cover-fit the original of `date` to the display and dither it.
    pub async fn trmnl_image_for(&self, date: NaiveDate) -> Result<Vec<u8>, CoreError> {
        let original = self
            .repository
            .find_by_date(date)
            .await?
            .and_then(|p| p.original_image)
            .ok_or_else(|| CoreError::NotFound(format!("original image for {date}")))?;

        let images = Arc::clone(&self.images);
        run_blocking(move || {
            let cover = info_span!("ImageService.scaleImageAndCenter").in_scope(|| {
                images.scale_and_center(&original, TRMNL_WIDTH, TRMNL_HEIGHT)
            })?;
            info_span!("ImageService.ditherImage").in_scope(|| images.dither(&cover))
        })
        .await
    }
}

async fn run_blocking<F>(f: F) -> Result<Vec<u8>, CoreError>
where
    F: FnOnce() -> Result<Vec<u8>, ImageProcessingError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CoreError::Internal(e.to_string()))?
        .map_err(CoreError::from)
}

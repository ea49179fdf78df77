//! Scraper service - stores today's featured picture.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::domain::{
    DESCRIPTION_UNAVAILABLE, ExtractionError, NewPicture, parse_featured_picture,
};
use crate::metrics::{Metrics, result};
use crate::ports::{
    CacheInvalidator, FetchError, ImageProcessingError, ImageProcessorPort, PictureRepository,
    RepositoryError, SummarizerPort, WikipediaPort,
};

/// Errors from a scrape run, including those raised by the guard around it.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Failed to fetch from Wikipedia: {0}")]
    Fetch(#[from] FetchError),

    #[error("Featured picture not found on main page: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Failed to process image: {0}")]
    Image(#[from] ImageProcessingError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Scrape rate limit exceeded")]
    RateLimited,

    #[error("Circuit breaker is open")]
    CircuitOpen,
}

impl ScrapeError {
    /// Whether another attempt may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_transient(),
            Self::Repository(RepositoryError::Storage(_)) => true,
            _ => false,
        }
    }
}

/// What a successful scrape did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// A record for the date already existed.
    Skipped { date: NaiveDate },
    /// A new record was stored.
    Saved {
        date: NaiveDate,
        image_url: String,
        /// Image bytes and summary were copied from an earlier record.
        reused: bool,
    },
}

/// Everything the scraper talks to.
#[derive(Clone)]
pub struct ScraperDeps {
    pub repository: Arc<dyn PictureRepository>,
    pub wikipedia: Arc<dyn WikipediaPort>,
    pub summarizer: Arc<dyn SummarizerPort>,
    pub images: Arc<dyn ImageProcessorPort>,
    pub caches: Arc<dyn CacheInvalidator>,
    pub metrics: Metrics,
}

/// Fetches, processes and stores the featured picture of the day.
pub struct ScraperService {
    deps: ScraperDeps,
    running: Mutex<()>,
}

impl ScraperService {
    pub fn new(deps: ScraperDeps) -> Self {
        Self {
            deps,
            running: Mutex::new(()),
        }
    }

    /// Scrape for today's local date.
    pub async fn scrape(&self) -> Result<ScrapeOutcome, ScrapeError> {
        self.scrape_for(Local::now().date_naive()).await
    }

    /// Scrape and store the current featured picture under `date`.
    pub async fn scrape_for(&self, date: NaiveDate) -> Result<ScrapeOutcome, ScrapeError> {
        let span = info_span!("Scraper.scrape", %date);
        async move {
            let _guard = self.running.lock().await;
            let started = Instant::now();
            info!("Starting Wikipedia picture of the day scrape");

            let outcome = self.run(date).await;
            let elapsed = started.elapsed().as_secs_f64();

            match &outcome {
                Ok(ScrapeOutcome::Skipped { .. }) => {
                    self.deps.metrics.record_scrape(result::SKIPPED, elapsed);
                }
                Ok(ScrapeOutcome::Saved { .. }) => {
                    self.deps.metrics.record_scrape(result::SUCCESS, elapsed);
                    self.deps
                        .metrics
                        .scraper_last_success
                        .set(Utc::now().timestamp_millis());
                    self.deps.caches.invalidate_all();
                    info!("Saved picture of the day");
                }
                Err(e) => {
                    self.deps.metrics.record_scrape(result::FAILURE, elapsed);
                    error!(error = %e, "Scrape failed");
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(&self, date: NaiveDate) -> Result<ScrapeOutcome, ScrapeError> {
        let repo = &self.deps.repository;

        if repo.find_by_date(date).await?.is_some() {
            info!("Picture of the day already exists, skipping");
            return Ok(ScrapeOutcome::Skipped { date });
        }

        let html = self.deps.wikipedia.fetch_main_page().await?;
        let featured = parse_featured_picture(&html)?;
        info!(
            thumbnail = %featured.thumbnail_url,
            image_url = %featured.image_url,
            "Found featured picture"
        );

        let (original_image, dithered_image, short_description, reused) =
            match repo.find_by_image_url(&featured.image_url).await? {
                Some(existing) => {
                    info!(
                        existing_date = %existing.date,
                        "Image already stored, reusing binary data and summary"
                    );
                    (
                        existing.original_image,
                        existing.dithered_image,
                        existing.short_description,
                        true,
                    )
                }
                None => {
                    let original = self.download(&featured.image_url).await?;
                    let dithered = self.dither(original.clone()).await?;
                    let summary = self.summarize(&featured.description).await;
                    (Some(original), Some(dithered), Some(summary), false)
                }
            };

        let record = NewPicture {
            date,
            description: Some(featured.description),
            short_description,
            credit: Some(featured.credit),
            image_url: Some(featured.image_url.clone()),
            original_image,
            dithered_image,
            created_at: Some(Utc::now()),
        }
        .clipped();

        match repo.insert(record).await {
            Ok(_) => Ok(ScrapeOutcome::Saved {
                date,
                image_url: featured.image_url,
                reused,
            }),
            Err(RepositoryError::AlreadyExists(_)) => {
                warn!("Picture of the day was stored concurrently, skipping");
                Ok(ScrapeOutcome::Skipped { date })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let span = info_span!("ImageService.downloadImage", %url);
        async {
            let bytes = self.deps.wikipedia.download_image(url).await?;
            info!(size = bytes.len(), "Image downloaded");
            Ok(bytes)
        }
        .instrument(span)
        .await
    }

    async fn dither(&self, original: Vec<u8>) -> Result<Vec<u8>, ScrapeError> {
        let images = Arc::clone(&self.deps.images);
        let span = info_span!("ImageService.ditherImage", size = original.len());
        tokio::task::spawn_blocking(move || span.in_scope(|| images.dither(&original)))
            .await
            .map_err(|e| ScrapeError::Internal(e.to_string()))?
            .map_err(ScrapeError::from)
    }

    async fn summarize(&self, description: &str) -> String {
        debug!("Generating short description");
        match self.deps.summarizer.summarize(description).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Failed to generate short description");
                DESCRIPTION_UNAVAILABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{
        CountingInvalidator, FakeImages, FakeRepository, FakeWikipedia, ORIGINAL_URL,
        RecordingSummarizer, main_page_html, stored,
    };

    struct Fixture {
        repo: Arc<FakeRepository>,
        wiki: Arc<FakeWikipedia>,
        summarizer: Arc<RecordingSummarizer>,
        images: Arc<FakeImages>,
        caches: Arc<CountingInvalidator>,
        metrics: Metrics,
        service: ScraperService,
    }

    fn fixture(repo: FakeRepository, wiki: FakeWikipedia, summarizer: RecordingSummarizer) -> Fixture {
        let repo = Arc::new(repo);
        let wiki = Arc::new(wiki);
        let summarizer = Arc::new(summarizer);
        let images = Arc::new(FakeImages::default());
        let caches = Arc::new(CountingInvalidator::default());
        let metrics = Metrics::new().unwrap();
        let service = ScraperService::new(ScraperDeps {
            repository: repo.clone(),
            wikipedia: wiki.clone(),
            summarizer: summarizer.clone(),
            images: images.clone(),
            caches: caches.clone(),
            metrics: metrics.clone(),
        });
        Fixture {
            repo,
            wiki,
            summarizer,
            images,
            caches,
            metrics,
            service,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn executions(metrics: &Metrics, label: &str) -> u64 {
        metrics.scraper_execution.with_label_values(&[label]).get()
    }

    #[tokio::test]
    async fn test_new_image_is_downloaded_dithered_and_summarized() {
        let f = fixture(
            FakeRepository::default(),
            FakeWikipedia::new(main_page_html()),
            RecordingSummarizer::replying("Pines ring a calm lake at sunrise."),
        );

        let outcome = f.service.scrape_for(day(10)).await.unwrap();
        assert_eq!(
            outcome,
            ScrapeOutcome::Saved {
                date: day(10),
                image_url: ORIGINAL_URL.to_string(),
                reused: false,
            }
        );

        assert_eq!(*f.wiki.downloads.lock().unwrap(), vec![ORIGINAL_URL]);
        assert_eq!(f.images.calls(), vec!["dither"]);
        assert_eq!(
            f.summarizer.calls(),
            vec!["A quiet lake at dawn surrounded by pines."]
        );

        let saved = f.repo.all().pop().unwrap();
        assert_eq!(saved.credit.as_deref(), Some("Jane Doe"));
        assert_eq!(
            saved.short_description.as_deref(),
            Some("Pines ring a calm lake at sunrise.")
        );
        assert_eq!(saved.original_image.as_deref(), Some(&b"fake-image-bytes"[..]));
        assert_eq!(
            saved.dithered_image.as_deref(),
            Some(&b"dithered:fake-image-bytes"[..])
        );
        assert!(saved.created_at.is_some());

        assert_eq!(executions(&f.metrics, result::SUCCESS), 1);
        assert!(f.metrics.scraper_last_success.get() > 0);
        assert_eq!(f.caches.count(), 1);
    }

    #[tokio::test]
    async fn test_known_image_reuses_bytes_and_summary() {
        let f = fixture(
            FakeRepository::with(vec![stored(1, day(1), ORIGINAL_URL)]),
            FakeWikipedia::new(main_page_html()),
            RecordingSummarizer::replying("unused"),
        );

        let outcome = f.service.scrape_for(day(10)).await.unwrap();
        assert!(matches!(outcome, ScrapeOutcome::Saved { reused: true, .. }));

        assert!(f.wiki.downloads.lock().unwrap().is_empty());
        assert!(f.summarizer.calls().is_empty());
        assert!(f.images.calls().is_empty());

        let saved = f.repo.all().into_iter().find(|p| p.date == day(10)).unwrap();
        assert_eq!(saved.original_image, Some(vec![1, 2, 3]));
        assert_eq!(saved.dithered_image, Some(vec![4, 5, 6]));
        assert_eq!(saved.short_description.as_deref(), Some("A short summary"));
        assert_eq!(saved.description.as_deref(), Some("A quiet lake at dawn surrounded by pines."));
    }

    #[tokio::test]
    async fn test_existing_date_is_skipped_without_fetching() {
        let f = fixture(
            FakeRepository::with(vec![stored(1, day(10), "https://elsewhere/x.png")]),
            FakeWikipedia::new(main_page_html()),
            RecordingSummarizer::replying("unused"),
        );

        let outcome = f.service.scrape_for(day(10)).await.unwrap();
        assert_eq!(outcome, ScrapeOutcome::Skipped { date: day(10) });
        assert_eq!(f.wiki.page_calls(), 0);
        assert_eq!(executions(&f.metrics, result::SKIPPED), 1);
        assert_eq!(f.caches.count(), 0);
    }

    #[tokio::test]
    async fn test_summarizer_failure_stores_placeholder() {
        let f = fixture(
            FakeRepository::default(),
            FakeWikipedia::new(main_page_html()),
            RecordingSummarizer::failing(),
        );

        f.service.scrape_for(day(10)).await.unwrap();
        let saved = f.repo.all().pop().unwrap();
        assert_eq!(
            saved.short_description.as_deref(),
            Some(DESCRIPTION_UNAVAILABLE)
        );
    }

    #[tokio::test]
    async fn test_missing_container_fails_and_counts_failure() {
        let f = fixture(
            FakeRepository::default(),
            FakeWikipedia::new("<html><body><p>redesigned</p></body></html>"),
            RecordingSummarizer::replying("unused"),
        );

        let err = f.service.scrape_for(day(10)).await.unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::Extraction(ExtractionError::MissingContainer)
        ));
        assert!(!err.is_retryable());
        assert_eq!(executions(&f.metrics, result::FAILURE), 1);
        assert_eq!(f.repo.all().len(), 0);
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ScrapeError::Fetch(FetchError::Network { message: "reset".into() }).is_retryable());
        assert!(ScrapeError::Repository(RepositoryError::Storage("locked".into())).is_retryable());
        assert!(!ScrapeError::Fetch(FetchError::Status { status: 404, url: "u".into() }).is_retryable());
        assert!(!ScrapeError::CircuitOpen.is_retryable());
        assert!(!ScrapeError::RateLimited.is_retryable());
    }
}

//! In-memory fakes for service tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{ImageSize, NewPicture, Picture};
use crate::ports::{
    CacheInvalidator, FetchError, ImageProcessingError, ImageProcessorPort, PictureRepository,
    RepositoryError, SummarizerError, SummarizerPort, WikipediaPort,
};

pub const THUMB_SRC: &str =
    "//upload.wikimedia.org/wikipedia/commons/thumb/a/a4/Lake.jpg/300px-Lake.jpg";
pub const ORIGINAL_URL: &str = "https://upload.wikimedia.org/wikipedia/commons/a/a4/Lake.jpg";

pub fn main_page_html() -> String {
    format!(
        r#"<html><body><div id="mp-tfp"><table><tr>
        <td><a href="/wiki/File:Lake.jpg"><img src="{THUMB_SRC}" width="300"></a></td>
        <td><p>A quiet lake at dawn surrounded by pines. Photograph credit: Jane Doe</p></td>
        </tr></table></div></body></html>"#
    )
}

#[derive(Default)]
pub struct FakeRepository {
    pictures: Mutex<Vec<Picture>>,
    pub fail_with_storage: Mutex<bool>,
}

impl FakeRepository {
    pub fn with(pictures: Vec<Picture>) -> Self {
        Self {
            pictures: Mutex::new(pictures),
            fail_with_storage: Mutex::new(false),
        }
    }

    pub fn all(&self) -> Vec<Picture> {
        self.pictures.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if *self.fail_with_storage.lock().unwrap() {
            return Err(RepositoryError::Storage("database is locked".into()));
        }
        Ok(())
    }
}

pub fn stored(id: i64, date: NaiveDate, image_url: &str) -> Picture {
    Picture {
        id,
        date,
        description: Some(format!("Picture for {date}")),
        short_description: Some("A short summary".into()),
        credit: Some("Someone".into()),
        image_url: Some(image_url.into()),
        original_image: Some(vec![1, 2, 3]),
        dithered_image: Some(vec![4, 5, 6]),
        created_at: None,
    }
}

#[async_trait]
impl PictureRepository for FakeRepository {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<Picture>, RepositoryError> {
        self.check()?;
        Ok(self.all().into_iter().find(|p| p.date == date))
    }

    async fn find_by_image_url(
        &self,
        image_url: &str,
    ) -> Result<Option<Picture>, RepositoryError> {
        self.check()?;
        Ok(self
            .all()
            .into_iter()
            .find(|p| p.image_url.as_deref() == Some(image_url)))
    }

    async fn find_latest(&self) -> Result<Option<Picture>, RepositoryError> {
        self.check()?;
        Ok(self.all().into_iter().max_by_key(|p| p.date))
    }

    async fn insert(&self, picture: NewPicture) -> Result<Picture, RepositoryError> {
        self.check()?;
        let mut pictures = self.pictures.lock().unwrap();
        if pictures.iter().any(|p| p.date == picture.date) {
            return Err(RepositoryError::AlreadyExists(picture.date.to_string()));
        }
        let stored = Picture {
            id: pictures.len() as i64 + 1,
            date: picture.date,
            description: picture.description,
            short_description: picture.short_description,
            credit: picture.credit,
            image_url: picture.image_url,
            original_image: picture.original_image,
            dithered_image: picture.dithered_image,
            created_at: picture.created_at,
        };
        pictures.push(stored.clone());
        Ok(stored)
    }
}

/// Serves canned HTML and image bytes, optionally failing the first calls.
pub struct FakeWikipedia {
    pub html: String,
    pub image: Vec<u8>,
    pub page_failures: Mutex<VecDeque<FetchError>>,
    pub page_calls: AtomicUsize,
    pub downloads: Mutex<Vec<String>>,
}

impl FakeWikipedia {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            image: b"fake-image-bytes".to_vec(),
            page_failures: Mutex::new(VecDeque::new()),
            page_calls: AtomicUsize::new(0),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_first(self, failures: impl IntoIterator<Item = FetchError>) -> Self {
        self.page_failures.lock().unwrap().extend(failures);
        self
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WikipediaPort for FakeWikipedia {
    async fn fetch_main_page(&self) -> Result<String, FetchError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.page_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(self.html.clone())
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.downloads.lock().unwrap().push(url.to_string());
        Ok(self.image.clone())
    }
}

/// Records every prompt text; answers with a fixed summary or an error.
pub struct RecordingSummarizer {
    pub reply: Result<String, SummarizerError>,
    pub calls: Mutex<Vec<String>>,
}

impl RecordingSummarizer {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Err(SummarizerError::Api("quota exceeded".into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummarizerPort for RecordingSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizerError> {
        self.calls.lock().unwrap().push(text.to_string());
        self.reply.clone()
    }
}

/// Tags its output so tests can tell which transformation ran.
#[derive(Default)]
pub struct FakeImages {
    pub calls: Mutex<Vec<String>>,
}

impl FakeImages {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageProcessorPort for FakeImages {
    fn scale(&self, data: &[u8], size: ImageSize) -> Result<Vec<u8>, ImageProcessingError> {
        self.calls.lock().unwrap().push(format!("scale {size:?}"));
        let mut out = b"scaled:".to_vec();
        out.extend_from_slice(data);
        Ok(out)
    }

    fn scale_and_center(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ImageProcessingError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("cover {width}x{height}"));
        let mut out = b"cover:".to_vec();
        out.extend_from_slice(data);
        Ok(out)
    }

    fn dither(&self, data: &[u8]) -> Result<Vec<u8>, ImageProcessingError> {
        self.calls.lock().unwrap().push("dither".to_string());
        let mut out = b"dithered:".to_vec();
        out.extend_from_slice(data);
        Ok(out)
    }
}

#[derive(Default)]
pub struct CountingInvalidator {
    pub count: AtomicUsize,
}

impl CountingInvalidator {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl CacheInvalidator for CountingInvalidator {
    fn invalidate_all(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together.
//! All concrete implementations are instantiated here.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use potd_core::ports::{ImageProcessorPort, PictureRepository, SummarizerPort, WikipediaPort};
use potd_core::{
    FaultTolerance, GuardedScraper, Metrics, NoopSummarizer, PictureService, ScrapeScheduler,
    ScraperDeps, ScraperService, ScraperSettings, database_path,
};
use potd_db::{CoreFactory, setup_database};
use potd_gemini::{GeminiConfig, GeminiSummarizer};
use potd_imaging::{DEFAULT_NOISE_AMPLITUDE, ImageProcessor};
use potd_wiki::{DefaultWikipediaClient, WikiClientConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cache::{DEFAULT_CACHE_CAPACITY, ResponseCaches};

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins.
    #[default]
    AllowAll,
    /// Allow specific origins.
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// Database file; `None` uses the default data directory.
    pub database_path: Option<PathBuf>,
    pub wiki: WikiClientConfig,
    pub gemini: GeminiConfig,
    pub scraper: ScraperSettings,
    /// Entries per response cache.
    pub cache_capacity: u64,
    /// Dither noise amplitude, zero for a deterministic dither.
    pub noise_amplitude: f32,
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Create config with default paths and policies.
    pub fn with_defaults() -> Self {
        Self {
            port: 8080,
            database_path: None,
            wiki: WikiClientConfig::default(),
            gemini: GeminiConfig::default(),
            scraper: ScraperSettings::with_defaults(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            noise_amplitude: DEFAULT_NOISE_AMPLITUDE,
            cors: CorsConfig::default(),
        }
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }

    fn resolve_database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(database_path()?),
        }
    }
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    /// Read side: lookups and image renditions.
    pub pictures: Arc<PictureService>,
    /// Scraper wrapped in its fault tolerance policies.
    pub scraper: Arc<GuardedScraper>,
    pub caches: Arc<ResponseCaches>,
    pub metrics: Metrics,
}

/// Adapters the services are built from.
pub struct ServiceDeps {
    pub repository: Arc<dyn PictureRepository>,
    pub wikipedia: Arc<dyn WikipediaPort>,
    pub summarizer: Arc<dyn SummarizerPort>,
    pub images: Arc<dyn ImageProcessorPort>,
    pub metrics: Metrics,
}

/// Build the services and caches from already constructed adapters.
pub fn assemble(
    deps: ServiceDeps,
    fault_tolerance: FaultTolerance,
    cache_capacity: u64,
) -> AxumContext {
    let caches = Arc::new(ResponseCaches::new(cache_capacity));

    let scraper = Arc::new(ScraperService::new(ScraperDeps {
        repository: Arc::clone(&deps.repository),
        wikipedia: deps.wikipedia,
        summarizer: deps.summarizer,
        images: Arc::clone(&deps.images),
        caches: caches.clone(),
        metrics: deps.metrics.clone(),
    }));

    AxumContext {
        pictures: Arc::new(PictureService::new(deps.repository, deps.images)),
        scraper: Arc::new(GuardedScraper::new(scraper, fault_tolerance)),
        caches,
        metrics: deps.metrics,
    }
}

/// Bootstrap the Axum server with all services.
pub async fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    config.scraper.validate()?;

    let db_path = config.resolve_database_path()?;
    info!(
        database_path = %db_path.display(),
        main_page = %config.wiki.main_page_url(),
        "Axum bootstrap resolved paths"
    );

    // 1. Database pool with schema
    let pool = setup_database(&db_path).await?;
    let repository = CoreFactory::picture_repository(pool);

    // 2. Metrics registry shared by the scraper, the wiki client and /metrics
    let metrics = Metrics::new().context("Failed to register metrics")?;

    // 3. Outbound clients
    let wikipedia = DefaultWikipediaClient::new(&config.wiki, Some(metrics.clone()))
        .context("Failed to build Wikipedia client")?;
    let summarizer: Arc<dyn SummarizerPort> = if config.gemini.is_configured() {
        Arc::new(GeminiSummarizer::new(config.gemini.clone())?)
    } else {
        warn!("GEMINI_API_KEY not set, short descriptions will be unavailable");
        Arc::new(NoopSummarizer)
    };

    // 4. Image processing
    let images = ImageProcessor::new().with_noise_amplitude(config.noise_amplitude);

    Ok(assemble(
        ServiceDeps {
            repository,
            wikipedia: Arc::new(wikipedia),
            summarizer,
            images: Arc::new(images),
            metrics,
        },
        FaultTolerance::new(&config.scraper.fault_tolerance),
        config.cache_capacity,
    ))
}

/// Start the web server and the scrape scheduler.
///
/// Runs until Ctrl-C, then stops the scheduler and drains open connections.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;

    let ctx = bootstrap(&config).await?;

    let cancel = CancellationToken::new();
    let scheduler = ScrapeScheduler::new(Arc::clone(&ctx.scraper), &config.scraper)?;
    let scheduler_handle = scheduler.spawn(cancel.clone());

    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("potd web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    cancel.cancel();
    if let Err(e) = scheduler_handle.await {
        warn!(error = %e, "Scheduler task ended abnormally");
    }
    info!("potd web server stopped");
    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                return;
            }
            info!("Shutdown requested");
        }
        () = cancel.cancelled() => {}
    }
    cancel.cancel();
}

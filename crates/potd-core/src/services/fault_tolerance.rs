//! Rate limiting, retry and circuit breaking around the scrape job.
//!
//! Policies compose from the outside in: the rate limiter admits the call,
//! the retry policy repeats it on retryable errors, and every single attempt
//! passes through the circuit breaker.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use super::scraper::{ScrapeError, ScrapeOutcome, ScraperService};
use crate::settings::FaultToleranceSettings;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Fixed-window rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    permits: u32,
    window: Duration,
    state: Mutex<Option<(Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(permits: u32, window: Duration) -> Self {
        Self {
            permits,
            window,
            state: Mutex::new(None),
        }
    }

    /// Take a permit from the current window.
    pub fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut state = lock(&self.state);
        match state.as_mut() {
            Some((start, used)) if now.duration_since(*start) < self.window => {
                if *used >= self.permits {
                    return false;
                }
                *used += 1;
                true
            }
            _ => {
                *state = Some((now, 1));
                self.permits > 0
            }
        }
    }
}

#[derive(Debug)]
enum BreakerState {
    Closed { outcomes: VecDeque<bool> },
    Open { until: Instant },
    HalfOpen { trial_in_flight: bool },
}

/// Rolling-window circuit breaker.
///
/// The window holds the success flags of the last `volume` attempts. Once it
/// is full and the share of failures reaches `failure_ratio`, the breaker
/// opens for `delay`. After that a single trial attempt decides between
/// closing and reopening.
#[derive(Debug)]
pub struct CircuitBreaker {
    volume: usize,
    failure_ratio: f64,
    delay: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(volume: usize, failure_ratio: f64, delay: Duration) -> Self {
        Self {
            volume,
            failure_ratio,
            delay,
            state: Mutex::new(BreakerState::Closed {
                outcomes: VecDeque::with_capacity(volume),
            }),
        }
    }

    /// Admit an attempt or fail with [`ScrapeError::CircuitOpen`].
    ///
    /// The attempt counts as failed unless the permit is completed, so a
    /// dropped attempt still settles a half-open trial.
    pub fn acquire(&self) -> Result<BreakerPermit<'_>, ScrapeError> {
        let mut state = lock(&self.state);
        match &mut *state {
            BreakerState::Closed { .. } => Ok(BreakerPermit::new(self)),
            BreakerState::Open { until } => {
                if Instant::now() >= *until {
                    info!("Circuit breaker half-open, allowing trial call");
                    *state = BreakerState::HalfOpen {
                        trial_in_flight: true,
                    };
                    Ok(BreakerPermit::new(self))
                } else {
                    Err(ScrapeError::CircuitOpen)
                }
            }
            BreakerState::HalfOpen { trial_in_flight } => {
                if *trial_in_flight {
                    Err(ScrapeError::CircuitOpen)
                } else {
                    *trial_in_flight = true;
                    Ok(BreakerPermit::new(self))
                }
            }
        }
    }

    /// Record the result of an admitted attempt.
    fn record(&self, success: bool) {
        let mut state = lock(&self.state);
        match &mut *state {
            BreakerState::Closed { outcomes } => {
                outcomes.push_back(success);
                while outcomes.len() > self.volume {
                    outcomes.pop_front();
                }
                if outcomes.len() == self.volume {
                    let failures = outcomes.iter().filter(|ok| !**ok).count();
                    if failures as f64 / self.volume as f64 >= self.failure_ratio {
                        warn!(failures, volume = self.volume, "Circuit breaker opened");
                        *state = BreakerState::Open {
                            until: Instant::now() + self.delay,
                        };
                    }
                }
            }
            BreakerState::HalfOpen { .. } => {
                if success {
                    info!("Circuit breaker closed");
                    *state = BreakerState::Closed {
                        outcomes: VecDeque::with_capacity(self.volume),
                    };
                } else {
                    warn!("Trial call failed, circuit breaker reopened");
                    *state = BreakerState::Open {
                        until: Instant::now() + self.delay,
                    };
                }
            }
            BreakerState::Open { .. } => {}
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(*lock(&self.state), BreakerState::Open { .. })
    }
}

/// Admission to one attempt through a [`CircuitBreaker`].
#[derive(Debug)]
#[must_use = "dropping a permit records a failed attempt"]
pub struct BreakerPermit<'a> {
    breaker: &'a CircuitBreaker,
    settled: bool,
}

impl<'a> BreakerPermit<'a> {
    const fn new(breaker: &'a CircuitBreaker) -> Self {
        Self {
            breaker,
            settled: false,
        }
    }

    /// Record the attempt's result.
    pub fn complete(mut self, success: bool) {
        self.settled = true;
        self.breaker.record(success);
    }
}

impl Drop for BreakerPermit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Guarded attempt abandoned before completion, counting it as a failure");
            self.breaker.record(false);
        }
    }
}

/// Fixed-delay retry for retryable errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

/// The composed guard.
#[derive(Debug)]
pub struct FaultTolerance {
    rate_limiter: Option<RateLimiter>,
    retry: Option<RetryPolicy>,
    breaker: Option<CircuitBreaker>,
}

impl FaultTolerance {
    pub fn new(settings: &FaultToleranceSettings) -> Self {
        Self {
            rate_limiter: settings.rate_limit_enabled.then(|| {
                RateLimiter::new(settings.rate_limit_permits, settings.rate_limit_window)
            }),
            retry: settings.retry_enabled.then_some(RetryPolicy {
                max_retries: settings.max_retries,
                delay: settings.retry_delay,
            }),
            breaker: settings.circuit_breaker_enabled.then(|| {
                CircuitBreaker::new(
                    settings.request_volume_threshold,
                    settings.failure_ratio,
                    settings.circuit_open_delay,
                )
            }),
        }
    }

    /// A guard that lets every call straight through.
    pub fn disabled() -> Self {
        Self::new(&FaultToleranceSettings::disabled())
    }

    /// Run `op` under all enabled policies.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ScrapeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScrapeError>>,
    {
        if let Some(limiter) = &self.rate_limiter {
            if !limiter.try_acquire() {
                warn!("Scrape rejected by rate limiter");
                return Err(ScrapeError::RateLimited);
            }
        }

        let max_retries = self.retry.map_or(0, |r| r.max_retries);
        let mut attempt = 0;
        loop {
            let result = self.attempt(&mut op).await;
            match result {
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    let delay = self.retry.map_or(Duration::ZERO, |r| r.delay);
                    warn!(
                        error = %e,
                        attempt,
                        max_retries,
                        delay_secs = delay.as_secs(),
                        "Scrape attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    async fn attempt<T, F, Fut>(&self, op: &mut F) -> Result<T, ScrapeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScrapeError>>,
    {
        let Some(breaker) = &self.breaker else {
            return op().await;
        };
        let permit = breaker.acquire()?;
        let result = op().await;
        permit.complete(result.is_ok());
        result
    }
}

/// The scraper wrapped in its fault tolerance policies.
pub struct GuardedScraper {
    scraper: Arc<ScraperService>,
    fault_tolerance: FaultTolerance,
}

impl GuardedScraper {
    pub fn new(scraper: Arc<ScraperService>, fault_tolerance: FaultTolerance) -> Self {
        Self {
            scraper,
            fault_tolerance,
        }
    }

    /// Scrape today's picture under the configured policies.
    pub async fn scrape(&self) -> Result<ScrapeOutcome, ScrapeError> {
        self.fault_tolerance.run(|| self.scraper.scrape()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Metrics, result};
    use crate::ports::{FetchError, RepositoryError};
    use crate::services::scraper::ScraperDeps;
    use crate::services::testing::{
        CountingInvalidator, FakeImages, FakeRepository, FakeWikipedia, ORIGINAL_URL,
        RecordingSummarizer, main_page_html,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn network() -> ScrapeError {
        ScrapeError::Fetch(FetchError::Network {
            message: "connection reset".into(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_refuses_second_call_in_window() {
        let limiter = RateLimiter::new(1, Duration::from_secs(600));
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        tokio::time::advance(Duration::from_secs(601)).await;
        assert!(limiter.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaker_opens_after_two_failures_in_four() {
        let breaker = CircuitBreaker::new(4, 0.5, Duration::from_secs(3600));
        for ok in [true, false, true] {
            breaker.acquire().unwrap().complete(ok);
        }
        assert!(!breaker.is_open());

        breaker.acquire().unwrap().complete(false);
        assert!(breaker.is_open());
        assert!(matches!(breaker.acquire(), Err(ScrapeError::CircuitOpen)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaker_half_open_trial() {
        let breaker = CircuitBreaker::new(2, 0.5, Duration::from_secs(60));
        breaker.record(false);
        breaker.record(false);
        assert!(breaker.is_open());

        tokio::time::advance(Duration::from_secs(61)).await;
        let trial = breaker.acquire().unwrap();
        assert!(matches!(breaker.acquire(), Err(ScrapeError::CircuitOpen)));
        trial.complete(false);
        assert!(breaker.is_open());

        tokio::time::advance(Duration::from_secs(61)).await;
        breaker.acquire().unwrap().complete(true);
        assert!(!breaker.is_open());
        assert!(breaker.acquire().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_retryable_errors_then_succeeds() {
        let settings = FaultToleranceSettings {
            rate_limit_enabled: false,
            circuit_breaker_enabled: false,
            ..FaultToleranceSettings::default()
        };
        let guard = FaultTolerance::new(&settings);
        let calls = AtomicUsize::new(0);

        let result = guard
            .run(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(network())
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let settings = FaultToleranceSettings {
            rate_limit_enabled: false,
            circuit_breaker_enabled: false,
            ..FaultToleranceSettings::default()
        };
        let guard = FaultTolerance::new(&settings);
        let calls = AtomicUsize::new(0);

        let result: Result<(), _> = guard
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ScrapeError::Repository(RepositoryError::Storage(
                    "locked".into(),
                )))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_non_retryable_error_is_not_retried() {
        let settings = FaultToleranceSettings {
            rate_limit_enabled: false,
            circuit_breaker_enabled: false,
            ..FaultToleranceSettings::default()
        };
        let guard = FaultTolerance::new(&settings);
        let calls = AtomicUsize::new(0);

        let result: Result<(), _> = guard
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ScrapeError::Internal("boom".into()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_breaker_stops_retry_loop() {
        let settings = FaultToleranceSettings {
            rate_limit_enabled: false,
            request_volume_threshold: 2,
            ..FaultToleranceSettings::default()
        };
        let guard = FaultTolerance::new(&settings);
        let calls = AtomicUsize::new(0);

        let result: Result<(), _> = guard
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(network())
            })
            .await;

        assert!(matches!(result, Err(ScrapeError::CircuitOpen)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rate_limited_call_never_runs() {
        let guard = FaultTolerance::new(&FaultToleranceSettings::default());
        let calls = AtomicUsize::new(0);
        let op = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ScrapeError>(())
        };

        assert!(guard.run(op).await.is_ok());
        assert!(matches!(guard.run(op).await, Err(ScrapeError::RateLimited)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_trial_reopens_breaker() {
        let settings = FaultToleranceSettings {
            rate_limit_enabled: false,
            retry_enabled: false,
            request_volume_threshold: 1,
            circuit_open_delay: Duration::from_secs(60),
            ..FaultToleranceSettings::default()
        };
        let guard = FaultTolerance::new(&settings);

        let failed: Result<(), _> = guard.run(|| async { Err(network()) }).await;
        assert!(matches!(failed, Err(ScrapeError::Fetch(_))));

        tokio::time::advance(Duration::from_secs(61)).await;
        let abandoned = tokio::time::timeout(
            Duration::from_secs(1),
            guard.run(std::future::pending::<Result<(), ScrapeError>>),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(matches!(
            guard.run(|| async { Ok(()) }).await,
            Err(ScrapeError::CircuitOpen)
        ));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(guard.run(|| async { Ok(()) }).await.is_ok());
    }

    fn guarded(
        repo: Arc<FakeRepository>,
        wiki: Arc<FakeWikipedia>,
        metrics: &Metrics,
        settings: &FaultToleranceSettings,
    ) -> GuardedScraper {
        let scraper = ScraperService::new(ScraperDeps {
            repository: repo,
            wikipedia: wiki,
            summarizer: Arc::new(RecordingSummarizer::replying("A lake.")),
            images: Arc::new(FakeImages::default()),
            caches: Arc::new(CountingInvalidator::default()),
            metrics: metrics.clone(),
        });
        GuardedScraper::new(Arc::new(scraper), FaultTolerance::new(settings))
    }

    #[tokio::test(start_paused = true)]
    async fn test_guarded_scrape_retries_network_failures() {
        let settings = FaultToleranceSettings {
            rate_limit_enabled: false,
            ..FaultToleranceSettings::default()
        };
        let repo = Arc::new(FakeRepository::default());
        let wiki = Arc::new(FakeWikipedia::new(main_page_html()).failing_first([
            FetchError::Network {
                message: "connection reset".into(),
            },
        ]));
        let metrics = Metrics::new().unwrap();
        let guard = guarded(repo.clone(), wiki.clone(), &metrics, &settings);

        let outcome = guard.scrape().await.unwrap();

        assert!(matches!(
            outcome,
            ScrapeOutcome::Saved { ref image_url, reused: false, .. } if image_url == ORIGINAL_URL
        ));
        assert_eq!(wiki.page_calls(), 2);
        assert_eq!(repo.all().len(), 1);
        let executions = |label: &str| metrics.scraper_execution.with_label_values(&[label]).get();
        assert_eq!(executions(result::FAILURE), 1);
        assert_eq!(executions(result::SUCCESS), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_storage_failures_open_breaker_around_scraper() {
        let settings = FaultToleranceSettings {
            rate_limit_enabled: false,
            max_retries: 5,
            request_volume_threshold: 2,
            ..FaultToleranceSettings::default()
        };
        let repo = Arc::new(FakeRepository::default());
        *repo.fail_with_storage.lock().unwrap() = true;
        let wiki = Arc::new(FakeWikipedia::new(main_page_html()));
        let metrics = Metrics::new().unwrap();
        let guard = guarded(repo.clone(), wiki.clone(), &metrics, &settings);

        let outcome = guard.scrape().await;

        assert!(matches!(outcome, Err(ScrapeError::CircuitOpen)));
        assert_eq!(
            metrics
                .scraper_execution
                .with_label_values(&[result::FAILURE])
                .get(),
            2
        );
        assert_eq!(wiki.page_calls(), 0);

        *repo.fail_with_storage.lock().unwrap() = false;
        assert!(matches!(guard.scrape().await, Err(ScrapeError::CircuitOpen)));
    }
}

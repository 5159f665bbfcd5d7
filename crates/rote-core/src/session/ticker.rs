//! Pause-aware elapsed-time ticker for study sessions.
//!
//! Uses tokio-cron-scheduler to count unpaused study seconds and emit
//! `ElapsedTick` events while a session runs. Paused time is not counted.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info};

use crate::error::{RoteError, RoteResult};
use crate::events::{ElapsedTickEvent, EventBus, StudyEvent};

/// Configuration for the elapsed-time ticker.
#[derive(Debug, Clone)]
pub struct TickerConfig {
    /// Seconds between ticks (default: 1)
    pub tick_interval_secs: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 1,
        }
    }
}

impl TickerConfig {
    /// Create config with a custom tick interval.
    pub fn with_interval(tick_interval_secs: u64) -> Self {
        Self {
            tick_interval_secs: tick_interval_secs.max(1), // Minimum 1 second
        }
    }
}

/// Counts elapsed unpaused seconds for one session.
///
/// Wraps tokio-cron-scheduler to tick at the configured interval. Each
/// unpaused tick advances the counter and emits an `ElapsedTick` event when
/// an event bus is attached; ticks that land while paused do neither.
pub struct ElapsedTicker {
    scheduler: JobScheduler,
    elapsed_secs: Arc<AtomicU64>,
    paused: Arc<AtomicBool>,
    session_id: String,
    event_bus: Option<EventBus>,
    config: TickerConfig,
}

impl ElapsedTicker {
    /// Create a new ticker for a session.
    ///
    /// Note: Call `start()` to begin counting.
    pub async fn new(session_id: impl Into<String>, config: TickerConfig) -> RoteResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| RoteError::internal(format!("Failed to create ticker scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            elapsed_secs: Arc::new(AtomicU64::new(0)),
            paused: Arc::new(AtomicBool::new(false)),
            session_id: session_id.into(),
            event_bus: None,
            config,
        })
    }

    /// Attach an event bus for `ElapsedTick` events.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Get the ticker configuration.
    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    /// Start ticking at the configured interval.
    pub async fn start(&self) -> RoteResult<()> {
        let elapsed_secs = self.elapsed_secs.clone();
        let paused = self.paused.clone();
        let session_id = self.session_id.clone();
        let event_bus = self.event_bus.clone();
        let interval = self.config.tick_interval_secs;

        let job = Job::new_repeated_async(
            std::time::Duration::from_secs(interval),
            move |_uuid, _lock| {
                let elapsed_secs = elapsed_secs.clone();
                let paused = paused.clone();
                let session_id = session_id.clone();
                let event_bus = event_bus.clone();
                Box::pin(async move {
                    if paused.load(Ordering::SeqCst) {
                        return;
                    }
                    let total = elapsed_secs.fetch_add(interval, Ordering::SeqCst) + interval;
                    if let Some(ref event_bus) = event_bus {
                        event_bus.emit(StudyEvent::ElapsedTick(ElapsedTickEvent::new(
                            session_id.clone(),
                            total,
                        )));
                    }
                })
            },
        )
        .map_err(|e| RoteError::internal(format!("Failed to create tick job: {}", e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| RoteError::internal(format!("Failed to add tick job: {}", e)))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| RoteError::internal(format!("Failed to start ticker: {}", e)))?;

        debug!(
            session_id = %self.session_id,
            tick_interval_secs = interval,
            "Elapsed ticker started"
        );

        Ok(())
    }

    /// Stop counting. Subsequent ticks are skipped until `resume()`.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        debug!(session_id = %self.session_id, "Ticker paused");
    }

    /// Resume counting after a pause.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        debug!(session_id = %self.session_id, "Ticker resumed");
    }

    /// Whether the ticker is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Unpaused seconds counted so far.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs.load(Ordering::SeqCst)
    }

    /// Stop the ticker gracefully.
    pub async fn shutdown(&mut self) -> RoteResult<()> {
        info!(session_id = %self.session_id, "Shutting down elapsed ticker");
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| RoteError::internal(format!("Failed to shut down ticker: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_config_defaults() {
        let config = TickerConfig::default();
        assert_eq!(config.tick_interval_secs, 1);
    }

    #[test]
    fn test_ticker_config_with_interval() {
        let config = TickerConfig::with_interval(5);
        assert_eq!(config.tick_interval_secs, 5);

        // Test minimum clamping
        let config_min = TickerConfig::with_interval(0);
        assert_eq!(config_min.tick_interval_secs, 1);
    }

    #[tokio::test]
    async fn test_pause_resume_flags() {
        let ticker = ElapsedTicker::new("sess-1", TickerConfig::default())
            .await
            .unwrap();
        assert!(!ticker.is_paused());
        assert_eq!(ticker.elapsed_secs(), 0);

        ticker.pause();
        assert!(ticker.is_paused());

        ticker.resume();
        assert!(!ticker.is_paused());
    }

    // Note: Full async tests for tick counting would require waiting on
    // wall-clock time and are better suited for integration tests
}

//! Study session orchestration.
//!
//! The orchestrator owns the lifecycle of one session at a time: it creates
//! the session remotely (falling back to a local-only session when the
//! service is unreachable), drives the queue, routes each answer through the
//! remote scheduler with a local SM-2 fallback, and ends the session when
//! the queue exhausts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::StudyConfig;
use crate::error::{RoteError, RoteResult};
use crate::events::{
    CardPresentedEvent, EventBus, ProgressUpdatedEvent, SessionCompletedEvent, StudyEvent,
};
use crate::scheduling::{ScheduleStore, Sm2Scheduler};
use crate::traits::SchedulingService;
use crate::types::{
    AlgorithmId, AnswerOutcome, Card, CardSchedule, QualityRating, ScheduleSource, SessionStats,
    SessionSummary, StudySession,
};

use super::queue::{QueueState, SessionQueue};
use super::ticker::{ElapsedTicker, TickerConfig};

/// Everything owned by the currently running session.
struct ActiveSession {
    session: StudySession,
    queue: SessionQueue,
    ticker: ElapsedTicker,
}

/// Releases the in-flight flag on drop, so a submission future that is
/// cancelled mid-await cannot leave the flag set forever.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Main session orchestrator - the core of rote.
///
/// Holds at most one active session. All methods take `&self`; interior
/// state lives behind an async `RwLock` so the orchestrator can be shared
/// across tasks without wrapping it in another lock.
pub struct SessionOrchestrator {
    config: StudyConfig,
    service: Arc<dyn SchedulingService>,
    store: Arc<ScheduleStore>,
    algorithm: Sm2Scheduler,
    event_bus: Option<EventBus>,
    active: RwLock<Option<ActiveSession>>,
    answer_in_flight: AtomicBool,
}

impl SessionOrchestrator {
    /// Create a new orchestrator.
    ///
    /// Note: This method requires you to provide the service implementation.
    /// Use `rote-client` for the hosted API, or any other
    /// [`SchedulingService`] implementation.
    pub fn new(
        config: StudyConfig,
        service: Arc<dyn SchedulingService>,
        store: Arc<ScheduleStore>,
    ) -> Self {
        Self {
            config,
            service,
            store,
            algorithm: Sm2Scheduler::new(),
            event_bus: None,
            active: RwLock::new(None),
            answer_in_flight: AtomicBool::new(false),
        }
    }

    /// Set the event bus for emitting session lifecycle events.
    ///
    /// When an EventBus is configured, the orchestrator will emit:
    /// - CardPresented when a card comes up
    /// - ProgressUpdated after every answer
    /// - ElapsedTick once per unpaused tick interval
    /// - SessionCompleted on end()
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Get the orchestrator configuration.
    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    /// Fetch the cards due for review in a deck.
    pub async fn fetch_due_cards(&self, deck_id: &str, limit: usize) -> RoteResult<Vec<Card>> {
        self.service.fetch_due_cards(deck_id, limit).await
    }

    /// Start a study session over the given due cards.
    ///
    /// Fails when a session is already active or `due_cards` is empty. The
    /// card list is capped at `max_cards` (falling back to the configured
    /// session cap), then hydrated against the local schedule store so a
    /// card reviewed offline resumes from its newest known state. Session
    /// creation is attempted remotely first; if the service is unreachable
    /// the session runs with a locally generated id and `is_local_only`
    /// set.
    pub async fn start(
        &self,
        deck_id: &str,
        due_cards: Vec<Card>,
        algorithm: AlgorithmId,
        max_cards: Option<usize>,
    ) -> RoteResult<StudySession> {
        let mut active = self.active.write().await;
        if let Some(ref existing) = *active {
            return Err(RoteError::session_already_active(&existing.session.id));
        }

        if due_cards.is_empty() {
            return Err(RoteError::no_cards_due(deck_id));
        }

        let mut cards = due_cards;
        let cap = max_cards.unwrap_or(self.config.session.max_cards);
        if cards.len() > cap {
            debug!(
                deck_id,
                due = cards.len(),
                cap,
                "Truncating due cards to session cap"
            );
            cards.truncate(cap);
        }

        self.hydrate_schedules(&mut cards)?;

        // Remote session first; the session still runs when the service is down
        let (session_id, is_local_only) = match self.service.create_session(deck_id, algorithm).await
        {
            Ok(created) => (created.session_id, false),
            Err(e) => {
                warn!(
                    error = %e,
                    deck_id,
                    "Remote session creation failed, continuing locally"
                );
                (Uuid::new_v4().to_string(), true)
            }
        };

        let session = StudySession {
            id: session_id.clone(),
            deck_id: deck_id.to_string(),
            algorithm,
            started_at: Utc::now(),
            ended_at: None,
            is_local_only,
        };

        let mut queue = SessionQueue::new();
        queue.load(cards)?;

        let mut ticker = ElapsedTicker::new(
            &session_id,
            TickerConfig::with_interval(self.config.session.tick_interval_secs),
        )
        .await?;
        if let Some(ref event_bus) = self.event_bus {
            ticker = ticker.with_event_bus(event_bus.clone());
        }
        ticker.start().await?;

        let first = queue.current()?.clone();
        let total = queue.len();

        if let Some(ref event_bus) = self.event_bus {
            event_bus.emit(StudyEvent::CardPresented(CardPresentedEvent::new(
                &session_id,
                first,
                0,
                total,
            )));
            event_bus.emit(StudyEvent::ProgressUpdated(ProgressUpdatedEvent::new(
                &session_id,
                queue.progress_percent(),
                queue.remaining(),
                queue.stats(),
            )));
        }

        info!(
            session_id = %session_id,
            deck_id,
            cards = total,
            algorithm = %algorithm,
            is_local_only,
            "Study session started"
        );

        *active = Some(ActiveSession {
            session: session.clone(),
            queue,
            ticker,
        });
        Ok(session)
    }

    /// Submit the learner's answer for the current card.
    ///
    /// The schedule comes from the remote service when it is reachable and
    /// from the local SM-2 scheduler otherwise; locally computed schedules
    /// are persisted to the schedule store. When this answer exhausts the
    /// queue the session is ended automatically and the outcome carries the
    /// summary.
    ///
    /// Only one answer may be in flight at a time; a second call while the
    /// first is awaiting the service fails instead of double-recording. A
    /// call that is dropped before completing releases the guard.
    pub async fn submit_answer(
        &self,
        rating: QualityRating,
        response_time_ms: Option<u64>,
    ) -> RoteResult<AnswerOutcome> {
        if self
            .answer_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RoteError::operation_in_progress(
                "An answer is already being submitted",
            ));
        }
        // Dropped on every exit path, including cancellation of this future
        let _guard = InFlightGuard {
            flag: &self.answer_in_flight,
        };

        self.submit_answer_inner(rating, response_time_ms).await
    }

    async fn submit_answer_inner(
        &self,
        rating: QualityRating,
        response_time_ms: Option<u64>,
    ) -> RoteResult<AnswerOutcome> {
        // Snapshot under a read lock so the lock is not held across the
        // remote call
        let (session_id, card, is_local_only) = {
            let active = self.active.read().await;
            let active = active
                .as_ref()
                .ok_or_else(|| RoteError::no_active_session("No study session is active"))?;
            let card = active.queue.current()?.clone();
            (
                active.session.id.clone(),
                card,
                active.session.is_local_only,
            )
        };

        let (schedule, source) = if is_local_only {
            (
                self.schedule_locally(&card, rating)?,
                ScheduleSource::LocalFallback,
            )
        } else {
            match self
                .service
                .submit_card_answer(&session_id, &card.id, rating, response_time_ms)
                .await
            {
                Ok(schedule) => (schedule, ScheduleSource::Remote),
                Err(e) => {
                    warn!(
                        error = %e,
                        card_id = %card.id,
                        "Remote answer submission failed, scheduling locally"
                    );
                    (
                        self.schedule_locally(&card, rating)?,
                        ScheduleSource::LocalFallback,
                    )
                }
            }
        };

        // The session may have been ended or replaced while the remote call
        // was in flight; apply the answer only to the session it was taken
        // against
        let mut active_guard = self.active.write().await;
        let active = match active_guard.as_mut() {
            Some(active) if active.session.id == session_id => active,
            _ => {
                return Err(RoteError::no_active_session(
                    "Session changed while the answer was in flight",
                ))
            }
        };

        active
            .queue
            .record_answer(rating, response_time_ms, schedule.clone())?;

        let exhausted = active.queue.state() == QueueState::Exhausted;

        if let Some(ref event_bus) = self.event_bus {
            event_bus.emit(StudyEvent::ProgressUpdated(ProgressUpdatedEvent::new(
                &session_id,
                active.queue.progress_percent(),
                active.queue.remaining(),
                active.queue.stats(),
            )));
        }

        let mut outcome = AnswerOutcome {
            card_id: card.id.clone(),
            rating,
            response_time_ms,
            schedule,
            source,
            summary: None,
        };

        if exhausted {
            drop(active_guard);
            debug!(session_id = %session_id, "Queue exhausted, ending session");
            outcome.summary = Some(self.end().await?);
        } else {
            let next = active.queue.current()?.clone();
            let position = active.queue.cursor();
            let total = active.queue.len();
            if let Some(ref event_bus) = self.event_bus {
                event_bus.emit(StudyEvent::CardPresented(CardPresentedEvent::new(
                    &session_id,
                    next,
                    position,
                    total,
                )));
            }
        }

        Ok(outcome)
    }

    /// Pause the active session. Elapsed time stops counting.
    ///
    /// Pausing an already paused session is a no-op.
    pub async fn pause(&self) -> RoteResult<()> {
        let active = self.active.read().await;
        let active = active
            .as_ref()
            .ok_or_else(|| RoteError::no_active_session("No study session to pause"))?;
        active.ticker.pause();
        debug!(session_id = %active.session.id, "Session paused");
        Ok(())
    }

    /// Resume a paused session. Resuming an unpaused session is a no-op.
    pub async fn resume(&self) -> RoteResult<()> {
        let active = self.active.read().await;
        let active = active
            .as_ref()
            .ok_or_else(|| RoteError::no_active_session("No study session to resume"))?;
        active.ticker.resume();
        debug!(session_id = %active.session.id, "Session resumed");
        Ok(())
    }

    /// End the active session and return its summary.
    ///
    /// The summary is reported to the remote service on a best-effort
    /// basis; a failure there is logged but the locally computed summary is
    /// still returned.
    pub async fn end(&self) -> RoteResult<SessionSummary> {
        let mut taken = {
            let mut active = self.active.write().await;
            active
                .take()
                .ok_or_else(|| RoteError::no_active_session("No study session to end"))?
        };

        let elapsed_secs = taken.ticker.elapsed_secs();
        if let Err(e) = taken.ticker.shutdown().await {
            warn!(error = %e, session_id = %taken.session.id, "Ticker shutdown failed");
        }

        let stats = taken.queue.stats();
        let answered = stats.total();
        let ended_at = Utc::now();
        taken.session.ended_at = Some(ended_at);

        let average_response_time_ms = if answered > 0 {
            stats.total_response_time_ms / answered as u64
        } else {
            0
        };

        let summary = SessionSummary {
            session_id: taken.session.id.clone(),
            deck_id: taken.session.deck_id.clone(),
            algorithm: taken.session.algorithm,
            cards_studied: answered,
            correct_count: stats.correct_count,
            incorrect_count: stats.incorrect_count,
            accuracy: stats.accuracy(),
            average_response_time_ms,
            total_duration_secs: elapsed_secs,
            is_local_only: taken.session.is_local_only,
            started_at: taken.session.started_at,
            ended_at,
        };

        if !taken.session.is_local_only {
            if let Err(e) = self.service.end_session(&taken.session.id, &summary).await {
                warn!(
                    error = %e,
                    session_id = %taken.session.id,
                    "Remote session end failed"
                );
            }
        }

        if let Some(ref event_bus) = self.event_bus {
            event_bus.emit(StudyEvent::SessionCompleted(SessionCompletedEvent::new(
                &taken.session.id,
                summary.clone(),
            )));
        }

        info!(
            session_id = %taken.session.id,
            cards_studied = answered,
            accuracy = summary.accuracy,
            duration_secs = elapsed_secs,
            "Study session ended"
        );

        Ok(summary)
    }

    /// Whether a session is currently active.
    pub async fn is_active(&self) -> bool {
        self.active.read().await.is_some()
    }

    /// The active session, if any.
    pub async fn active_session(&self) -> Option<StudySession> {
        self.active.read().await.as_ref().map(|a| a.session.clone())
    }

    /// The card currently presented.
    pub async fn current_card(&self) -> RoteResult<Card> {
        let active = self.active.read().await;
        let active = active
            .as_ref()
            .ok_or_else(|| RoteError::no_active_session("No study session is active"))?;
        Ok(active.queue.current()?.clone())
    }

    /// Percent of the current queue answered, within `[0, 100]`.
    pub async fn progress_percent(&self) -> RoteResult<f32> {
        let active = self.active.read().await;
        let active = active
            .as_ref()
            .ok_or_else(|| RoteError::no_active_session("No study session is active"))?;
        Ok(active.queue.progress_percent())
    }

    /// Aggregate stats for the active session so far.
    pub async fn stats(&self) -> RoteResult<SessionStats> {
        let active = self.active.read().await;
        let active = active
            .as_ref()
            .ok_or_else(|| RoteError::no_active_session("No study session is active"))?;
        Ok(active.queue.stats())
    }

    /// Unpaused study seconds since the session started.
    pub async fn elapsed_secs(&self) -> RoteResult<u64> {
        let active = self.active.read().await;
        let active = active
            .as_ref()
            .ok_or_else(|| RoteError::no_active_session("No study session is active"))?;
        Ok(active.ticker.elapsed_secs())
    }

    /// Whether the active session is paused.
    pub async fn is_paused(&self) -> RoteResult<bool> {
        let active = self.active.read().await;
        let active = active
            .as_ref()
            .ok_or_else(|| RoteError::no_active_session("No study session is active"))?;
        Ok(active.ticker.is_paused())
    }

    /// Preview the interval each rating would produce for the current card.
    ///
    /// Lets a presentation layer label its answer buttons ("Good: 6d")
    /// without committing an answer.
    pub async fn preview_intervals(&self) -> RoteResult<[(QualityRating, u32); 4]> {
        let active = self.active.read().await;
        let active = active
            .as_ref()
            .ok_or_else(|| RoteError::no_active_session("No study session is active"))?;
        let card = active.queue.current()?;
        Ok(self.algorithm.preview_intervals(&card.schedule))
    }

    /// Replace each card's schedule with the locally stored one when the
    /// stored copy is newer. A card never reviewed locally keeps whatever
    /// the service sent.
    fn hydrate_schedules(&self, cards: &mut [Card]) -> RoteResult<()> {
        for card in cards.iter_mut() {
            if let Some(stored) = self.store.load(&card.id)? {
                // Option ordering makes None the oldest possible review
                if stored.last_reviewed > card.schedule.last_reviewed {
                    debug!(card_id = %card.id, "Hydrating card from local schedule store");
                    card.schedule = stored;
                }
            }
        }
        Ok(())
    }

    fn schedule_locally(&self, card: &Card, rating: QualityRating) -> RoteResult<CardSchedule> {
        let schedule = self
            .algorithm
            .process_answer(&card.schedule, rating, Utc::now());
        self.store.save(&card.id, &schedule)?;
        Ok(schedule)
    }
}

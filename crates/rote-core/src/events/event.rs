//! Study session lifecycle events.
//!
//! Events are emitted while a session runs: card presentation, progress
//! updates, elapsed-time ticks, and completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Card, SessionStats, SessionSummary};

/// Study session lifecycle events
///
/// These events are emitted to the event bus as a session progresses,
/// letting a presentation layer render cards, progress bars, and timers
/// without polling the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudyEvent {
    /// A card is now in front of the learner
    CardPresented(CardPresentedEvent),
    /// Queue progress changed after an answer
    ProgressUpdated(ProgressUpdatedEvent),
    /// One second of unpaused study time elapsed
    ElapsedTick(ElapsedTickEvent),
    /// The session ended and a summary is available
    SessionCompleted(SessionCompletedEvent),
}

impl StudyEvent {
    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CardPresented(_) => "session.card_presented",
            Self::ProgressUpdated(_) => "session.progress_updated",
            Self::ElapsedTick(_) => "session.elapsed_tick",
            Self::SessionCompleted(_) => "session.completed",
        }
    }

    /// Get the session ID this event relates to
    pub fn session_id(&self) -> &str {
        match self {
            Self::CardPresented(e) => &e.session_id,
            Self::ProgressUpdated(e) => &e.session_id,
            Self::ElapsedTick(e) => &e.session_id,
            Self::SessionCompleted(e) => &e.session_id,
        }
    }

    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::CardPresented(e) => e.timestamp,
            Self::ProgressUpdated(e) => e.timestamp,
            Self::ElapsedTick(e) => e.timestamp,
            Self::SessionCompleted(e) => e.timestamp,
        }
    }
}

/// Event payload for a card being presented
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPresentedEvent {
    /// Unique event ID
    pub event_id: String,
    /// Session presenting the card
    pub session_id: String,
    /// The card being shown
    pub card: Card,
    /// Zero-based position in the queue
    pub position: usize,
    /// Current queue length (grows when cards are requeued)
    pub total: usize,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
}

impl CardPresentedEvent {
    pub fn new(session_id: impl Into<String>, card: Card, position: usize, total: usize) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            card,
            position,
            total,
            timestamp: Utc::now(),
        }
    }
}

/// Event payload for a progress change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdatedEvent {
    /// Unique event ID
    pub event_id: String,
    /// Session the progress belongs to
    pub session_id: String,
    /// Percent of the current queue answered, within [0, 100]
    pub percent: f32,
    /// Cards left to present
    pub remaining: usize,
    /// Aggregate statistics so far
    pub stats: SessionStats,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
}

impl ProgressUpdatedEvent {
    pub fn new(
        session_id: impl Into<String>,
        percent: f32,
        remaining: usize,
        stats: SessionStats,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            percent,
            remaining,
            stats,
            timestamp: Utc::now(),
        }
    }
}

/// Event payload for an elapsed-time tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElapsedTickEvent {
    /// Unique event ID
    pub event_id: String,
    /// Session being timed
    pub session_id: String,
    /// Unpaused study seconds since the session started
    pub elapsed_secs: u64,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
}

impl ElapsedTickEvent {
    pub fn new(session_id: impl Into<String>, elapsed_secs: u64) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            elapsed_secs,
            timestamp: Utc::now(),
        }
    }
}

/// Event payload for session completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCompletedEvent {
    /// Unique event ID
    pub event_id: String,
    /// Session that completed
    pub session_id: String,
    /// Final aggregate summary
    pub summary: SessionSummary,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
}

impl SessionCompletedEvent {
    pub fn new(session_id: impl Into<String>, summary: SessionSummary) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            summary,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_strings() {
        let event = StudyEvent::ElapsedTick(ElapsedTickEvent::new("sess-1", 42));
        assert_eq!(event.event_type(), "session.elapsed_tick");
        assert_eq!(event.session_id(), "sess-1");
    }

    #[test]
    fn test_event_serde_tagging() {
        let event = StudyEvent::ElapsedTick(ElapsedTickEvent::new("sess-1", 5));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"elapsed_tick\""));
        assert!(json.contains("\"elapsed_secs\":5"));
    }
}

//! Per-card scheduling state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ease factor assigned to a card that has never been studied.
pub const DEFAULT_EASE_FACTOR: f32 = 2.5;

/// Hard floor for the ease factor. No update may take it below this.
pub const MIN_EASE_FACTOR: f32 = 1.3;

/// Scheduling state persisted per flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSchedule {
    /// Days until the next due date. Minimum 1.
    pub interval_days: u32,
    /// Ease multiplier applied to mature intervals, floored at
    /// [`MIN_EASE_FACTOR`].
    pub ease_factor: f32,
    /// Consecutive correct recalls since the last lapse.
    pub repetitions: u32,
    /// When the card is next due for review.
    pub next_review: DateTime<Utc>,
    /// Last review timestamp, absent for a card never studied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl CardSchedule {
    /// Create the schedule for a card that has never been studied.
    ///
    /// This is the one place defaults are filled: interval 1, ease factor
    /// 2.5, zero repetitions, due immediately.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            interval_days: 1,
            ease_factor: DEFAULT_EASE_FACTOR,
            repetitions: 0,
            next_review: now,
            last_reviewed: None,
        }
    }

    /// Whether the card is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }
}

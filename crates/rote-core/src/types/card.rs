//! Flashcard type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::schedule::CardSchedule;

/// A flashcard belonging to a deck, carrying its scheduling state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Unique card id.
    pub id: String,
    /// Deck the card belongs to.
    pub deck_id: String,
    /// Prompt side shown to the learner.
    pub front: String,
    /// Answer side revealed after recall.
    pub back: String,
    /// Current scheduling state.
    pub schedule: CardSchedule,
}

impl Card {
    /// Create a new card with a never-studied schedule.
    pub fn new(
        id: impl Into<String>,
        deck_id: impl Into<String>,
        front: impl Into<String>,
        back: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            deck_id: deck_id.into(),
            front: front.into(),
            back: back.into(),
            schedule: CardSchedule::new(now),
        }
    }
}

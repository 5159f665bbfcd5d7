//! Session queue state machine.
//!
//! Owns the ordered card list for one session, the append-only answer log,
//! and the cached aggregate stats. Lapsed cards are requeued to the end so
//! the learner sees them again before the queue exhausts.

use tracing::debug;

use crate::error::{RoteError, RoteResult};
use crate::types::{AnswerRecord, Card, CardSchedule, QualityRating, SessionStats};

/// Lifecycle states for a [`SessionQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// No cards loaded.
    Empty,
    /// Cards loaded, nothing answered yet.
    Loaded,
    /// At least one answer recorded and cards remain.
    InProgress,
    /// Every card answered. Terminal.
    Exhausted,
}

/// Ordered, mutable queue of cards for one study session.
///
/// The queue grows when cards are answered `Again`: the lapsed card is
/// appended to the end rather than removed, so `progress_percent` is always
/// measured against the current length and a lapse can make the reading
/// lower than a clean run at the same point.
#[derive(Debug)]
pub struct SessionQueue {
    cards: Vec<Card>,
    cursor: usize,
    answered: Vec<AnswerRecord>,
    stats: SessionStats,
    state: QueueState,
}

impl SessionQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            cursor: 0,
            answered: Vec::new(),
            stats: SessionStats::default(),
            state: QueueState::Empty,
        }
    }

    /// Load cards into the queue, replacing any previous contents.
    ///
    /// Fails with an invalid-queue error if `cards` is empty.
    pub fn load(&mut self, cards: Vec<Card>) -> RoteResult<()> {
        if cards.is_empty() {
            return Err(RoteError::invalid_queue("Cannot load an empty card list"));
        }

        self.cards = cards;
        self.cursor = 0;
        self.answered.clear();
        self.stats = SessionStats::default();
        self.state = QueueState::Loaded;
        Ok(())
    }

    /// The card currently presented.
    ///
    /// Fails when nothing is loaded or every card has been answered.
    pub fn current(&self) -> RoteResult<&Card> {
        match self.state {
            QueueState::Empty => Err(RoteError::invalid_queue("No cards loaded")),
            QueueState::Exhausted => Err(RoteError::session_exhausted(format!(
                "All {} cards have been answered",
                self.cards.len()
            ))),
            _ => Ok(&self.cards[self.cursor]),
        }
    }

    /// Record an answer for the current card and advance the cursor.
    ///
    /// The resulting schedule is written back onto the queue-held card
    /// before any requeue, so a lapsed card re-presents with its post-lapse
    /// state. Only `Again` requeues; `Hard` counts as incorrect in the
    /// stats but is not shown again this session.
    pub fn record_answer(
        &mut self,
        rating: QualityRating,
        response_time_ms: Option<u64>,
        resulting_schedule: CardSchedule,
    ) -> RoteResult<()> {
        match self.state {
            QueueState::Empty => return Err(RoteError::invalid_queue("No cards loaded")),
            QueueState::Exhausted => {
                return Err(RoteError::session_exhausted(format!(
                    "All {} cards have been answered",
                    self.cards.len()
                )))
            }
            _ => {}
        }

        let presented = self.cards[self.cursor].clone();
        self.cards[self.cursor].schedule = resulting_schedule.clone();

        if rating == QualityRating::Again {
            self.requeue_to_end();
        }

        self.answered.push(AnswerRecord {
            card: presented,
            rating,
            response_time_ms,
            resulting_schedule,
        });
        self.stats.record(rating, response_time_ms);

        self.cursor += 1;
        self.state = if self.cursor >= self.cards.len() {
            QueueState::Exhausted
        } else {
            QueueState::InProgress
        };
        Ok(())
    }

    /// Percent of the current queue answered, within `[0, 100]`.
    ///
    /// Measured against the current length, which grows on lapses; an empty
    /// queue reads 0.
    pub fn progress_percent(&self) -> f32 {
        if self.cards.is_empty() {
            return 0.0;
        }
        (self.cursor as f32 / self.cards.len() as f32 * 100.0).clamp(0.0, 100.0)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> QueueState {
        self.state
    }

    /// Zero-based position of the current card.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current queue length, including requeued cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether any cards are loaded.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards left to present.
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }

    /// The append-only answer log.
    pub fn answered(&self) -> &[AnswerRecord] {
        &self.answered
    }

    /// Cached aggregate stats.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    fn requeue_to_end(&mut self) {
        let card = self.cards[self.cursor].clone();
        debug!(card_id = %card.id, "Requeueing lapsed card to end of queue");
        self.cards.push(card);
    }
}

impl Default for SessionQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_cards(n: usize) -> Vec<Card> {
        let now = Utc::now();
        (0..n)
            .map(|i| Card::new(format!("card{}", i), "deck-1", format!("front{}", i), "back", now))
            .collect()
    }

    fn answered_schedule() -> CardSchedule {
        let mut schedule = CardSchedule::new(Utc::now());
        schedule.last_reviewed = Some(Utc::now());
        schedule
    }

    #[test]
    fn test_load_empty_fails() {
        let mut queue = SessionQueue::new();
        let err = queue.load(Vec::new()).unwrap_err();
        assert!(matches!(err, RoteError::InvalidQueue { .. }));
        assert_eq!(queue.state(), QueueState::Empty);
    }

    #[test]
    fn test_current_before_load_fails() {
        let queue = SessionQueue::new();
        let err = queue.current().unwrap_err();
        assert!(matches!(err, RoteError::InvalidQueue { .. }));
    }

    #[test]
    fn test_state_transitions() {
        let mut queue = SessionQueue::new();
        assert_eq!(queue.state(), QueueState::Empty);

        queue.load(test_cards(2)).unwrap();
        assert_eq!(queue.state(), QueueState::Loaded);

        queue
            .record_answer(QualityRating::Good, Some(900), answered_schedule())
            .unwrap();
        assert_eq!(queue.state(), QueueState::InProgress);

        queue
            .record_answer(QualityRating::Good, Some(700), answered_schedule())
            .unwrap();
        assert_eq!(queue.state(), QueueState::Exhausted);
    }

    #[test]
    fn test_record_answer_advances_and_logs() {
        let mut queue = SessionQueue::new();
        queue.load(test_cards(3)).unwrap();

        assert_eq!(queue.current().unwrap().id, "card0");
        queue
            .record_answer(QualityRating::Good, Some(1200), answered_schedule())
            .unwrap();

        assert_eq!(queue.current().unwrap().id, "card1");
        assert_eq!(queue.answered().len(), 1);
        assert_eq!(queue.answered()[0].card.id, "card0");
        assert_eq!(queue.stats().correct_count, 1);
        assert_eq!(queue.remaining(), 2);
    }

    #[test]
    fn test_again_requeues_to_end_and_represents() {
        let mut queue = SessionQueue::new();
        queue.load(test_cards(3)).unwrap();

        queue
            .record_answer(QualityRating::Good, None, answered_schedule())
            .unwrap();

        // Lapse on card1: queue grows to 4
        assert_eq!(queue.current().unwrap().id, "card1");
        queue
            .record_answer(QualityRating::Again, None, answered_schedule())
            .unwrap();
        assert_eq!(queue.len(), 4);

        queue
            .record_answer(QualityRating::Good, None, answered_schedule())
            .unwrap();

        // card1 comes back before the queue exhausts
        assert_eq!(queue.state(), QueueState::InProgress);
        assert_eq!(queue.current().unwrap().id, "card1");

        queue
            .record_answer(QualityRating::Good, None, answered_schedule())
            .unwrap();
        assert_eq!(queue.state(), QueueState::Exhausted);
    }

    #[test]
    fn test_requeued_card_carries_post_lapse_schedule() {
        let mut queue = SessionQueue::new();
        queue.load(test_cards(1)).unwrap();

        let mut lapsed = answered_schedule();
        lapsed.interval_days = 1;
        lapsed.repetitions = 0;
        lapsed.ease_factor = 2.18;

        queue
            .record_answer(QualityRating::Again, None, lapsed.clone())
            .unwrap();

        let requeued = queue.current().unwrap();
        assert_eq!(requeued.id, "card0");
        assert_eq!(requeued.schedule, lapsed);
    }

    #[test]
    fn test_hard_does_not_requeue() {
        let mut queue = SessionQueue::new();
        queue.load(test_cards(2)).unwrap();

        queue
            .record_answer(QualityRating::Hard, None, answered_schedule())
            .unwrap();

        assert_eq!(queue.len(), 2, "Hard must not grow the queue");
        assert_eq!(queue.stats().incorrect_count, 1);
    }

    #[test]
    fn test_record_after_exhausted_fails() {
        let mut queue = SessionQueue::new();
        queue.load(test_cards(1)).unwrap();
        queue
            .record_answer(QualityRating::Good, None, answered_schedule())
            .unwrap();

        let err = queue
            .record_answer(QualityRating::Good, None, answered_schedule())
            .unwrap_err();
        assert!(matches!(err, RoteError::SessionExhausted { .. }));

        let err = queue.current().unwrap_err();
        assert!(matches!(err, RoteError::SessionExhausted { .. }));
    }

    #[test]
    fn test_progress_bounds_through_lapse_heavy_session() {
        let mut queue = SessionQueue::new();
        queue.load(test_cards(3)).unwrap();

        let ratings = [
            QualityRating::Again,
            QualityRating::Again,
            QualityRating::Good,
            QualityRating::Again,
            QualityRating::Good,
            QualityRating::Good,
        ];
        for rating in ratings {
            let p = queue.progress_percent();
            assert!((0.0..=100.0).contains(&p), "Progress out of bounds: {}", p);
            queue.record_answer(rating, None, answered_schedule()).unwrap();
        }

        assert_eq!(queue.state(), QueueState::Exhausted);
        assert_eq!(queue.progress_percent(), 100.0);
    }

    #[test]
    fn test_lapse_reads_lower_than_clean_run() {
        let mut lapsed = SessionQueue::new();
        lapsed.load(test_cards(3)).unwrap();
        lapsed
            .record_answer(QualityRating::Good, None, answered_schedule())
            .unwrap();
        lapsed
            .record_answer(QualityRating::Again, None, answered_schedule())
            .unwrap();

        let mut clean = SessionQueue::new();
        clean.load(test_cards(3)).unwrap();
        clean
            .record_answer(QualityRating::Good, None, answered_schedule())
            .unwrap();
        clean
            .record_answer(QualityRating::Good, None, answered_schedule())
            .unwrap();

        // Two answers in: 2/4 after a lapse vs 2/3 on a clean run
        assert!(
            lapsed.progress_percent() < clean.progress_percent(),
            "Lapse should read lower: {} < {}",
            lapsed.progress_percent(),
            clean.progress_percent()
        );
    }

    #[test]
    fn test_progress_empty_queue_is_zero() {
        let queue = SessionQueue::new();
        assert_eq!(queue.progress_percent(), 0.0);
    }

    #[test]
    fn test_load_replaces_previous_contents() {
        let mut queue = SessionQueue::new();
        queue.load(test_cards(2)).unwrap();
        queue
            .record_answer(QualityRating::Good, Some(500), answered_schedule())
            .unwrap();

        queue.load(test_cards(5)).unwrap();

        assert_eq!(queue.state(), QueueState::Loaded);
        assert_eq!(queue.cursor(), 0);
        assert_eq!(queue.len(), 5);
        assert!(queue.answered().is_empty());
        assert_eq!(queue.stats().total(), 0);
    }
}

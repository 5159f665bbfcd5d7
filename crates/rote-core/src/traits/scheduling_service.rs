//! Remote scheduling service trait.

use async_trait::async_trait;

use crate::error::RoteResult;
use crate::types::{AlgorithmId, Card, CardSchedule, CreatedSession, QualityRating, SessionSummary};

/// Remote scheduling service seam.
///
/// The hosted API client implements this; tests substitute doubles. Any
/// method may fail with a transient error, and callers holding a local
/// fallback are expected to swallow that failure rather than surface it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchedulingService: Send + Sync {
    /// Fetch up to `limit` cards due for review in a deck.
    async fn fetch_due_cards(&self, deck_id: &str, limit: usize) -> RoteResult<Vec<Card>>;

    /// Create a session on the service.
    async fn create_session(
        &self,
        deck_id: &str,
        algorithm: AlgorithmId,
    ) -> RoteResult<CreatedSession>;

    /// Submit one answer; the service computes and persists the next
    /// schedule authoritatively.
    async fn submit_card_answer(
        &self,
        session_id: &str,
        card_id: &str,
        rating: QualityRating,
        response_time_ms: Option<u64>,
    ) -> RoteResult<CardSchedule>;

    /// Notify the service that a session ended, with its final summary.
    async fn end_session(&self, session_id: &str, summary: &SessionSummary) -> RoteResult<()>;
}

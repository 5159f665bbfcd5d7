//! Session identity, answer outcomes, and summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::algorithm::AlgorithmId;
use crate::types::card::Card;
use crate::types::rating::QualityRating;
use crate::types::schedule::CardSchedule;

/// One study session run.
///
/// Immutable once `ended_at` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    /// Server-assigned id, or a locally generated one when the service
    /// never acknowledged creation.
    pub id: String,
    /// Deck being studied.
    pub deck_id: String,
    /// Algorithm the session was created under.
    pub algorithm: AlgorithmId,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the session ended, if it has.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// True when the remote service never acknowledged session creation.
    pub is_local_only: bool,
}

/// Remote acknowledgement of session creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
    pub session_id: String,
}

/// Where an answer's resulting schedule was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSource {
    /// Computed and persisted by the remote scheduling service.
    Remote,
    /// Computed locally after a remote failure.
    LocalFallback,
}

/// Result of submitting one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    /// Card that was answered.
    pub card_id: String,
    /// Rating the learner gave.
    pub rating: QualityRating,
    /// How long the learner took, when the presentation layer measured it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// The card's schedule after this answer.
    pub schedule: CardSchedule,
    /// Whether the schedule came from the service or the local fallback.
    pub source: ScheduleSource,
    /// Present when this answer exhausted the queue and ended the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SessionSummary>,
}

/// One answered card in the session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// The card as presented (schedule state at answer time included).
    pub card: Card,
    /// Rating given.
    pub rating: QualityRating,
    /// Response time, when measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Schedule the answer produced.
    pub resulting_schedule: CardSchedule,
}

/// Cached aggregate statistics for a session in progress.
///
/// Always recomputable from the answer log; kept for O(1) reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Answers rated `Good` or better.
    pub correct_count: u32,
    /// Answers rated below `Good`.
    pub incorrect_count: u32,
    /// Sum of measured response times.
    pub total_response_time_ms: u64,
}

impl SessionStats {
    /// Total answers recorded.
    pub fn total(&self) -> u32 {
        self.correct_count + self.incorrect_count
    }

    /// Fraction of answers that were correct; 0.0 with no answers.
    pub fn accuracy(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct_count as f32 / total as f32
        }
    }

    /// Fold one answer into the aggregates.
    pub fn record(&mut self, rating: QualityRating, response_time_ms: Option<u64>) {
        if rating.is_correct() {
            self.correct_count += 1;
        } else {
            self.incorrect_count += 1;
        }
        self.total_response_time_ms += response_time_ms.unwrap_or(0);
    }
}

/// Aggregate summary returned when a session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session this summarizes.
    pub session_id: String,
    /// Deck that was studied.
    pub deck_id: String,
    /// Algorithm the session ran under.
    pub algorithm: AlgorithmId,
    /// Answers recorded (requeued lapses count each presentation).
    pub cards_studied: u32,
    /// Answers rated `Good` or better.
    pub correct_count: u32,
    /// Answers rated below `Good`.
    pub incorrect_count: u32,
    /// `correct_count / cards_studied`, 0.0 when nothing was answered.
    pub accuracy: f32,
    /// Mean measured response time, 0 when nothing was answered.
    pub average_response_time_ms: u64,
    /// Wall-clock study time, excluding paused stretches.
    pub total_duration_secs: u64,
    /// True when the remote service never saw this session.
    pub is_local_only: bool,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the session ended.
    pub ended_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_record_classifies_by_threshold() {
        let mut stats = SessionStats::default();
        stats.record(QualityRating::Easy, Some(1200));
        stats.record(QualityRating::Good, Some(800));
        stats.record(QualityRating::Hard, None);
        stats.record(QualityRating::Again, Some(3000));

        assert_eq!(stats.correct_count, 2);
        assert_eq!(stats.incorrect_count, 2);
        assert_eq!(stats.total_response_time_ms, 5000);
        assert_eq!(stats.accuracy(), 0.5);
    }

    #[test]
    fn test_stats_accuracy_zero_answers() {
        let stats = SessionStats::default();
        assert_eq!(stats.accuracy(), 0.0);
        assert!(!stats.accuracy().is_nan());
    }

    #[test]
    fn test_schedule_source_serde_tags() {
        let json = serde_json::to_string(&ScheduleSource::LocalFallback).unwrap();
        assert_eq!(json, "\"local_fallback\"");
    }
}

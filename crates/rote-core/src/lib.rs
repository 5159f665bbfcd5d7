//! rote-core - Core library for rote.
//!
//! This crate provides the core types, traits, and SessionOrchestrator
//! implementation for the rote spaced-repetition study engine.
//!
//! # Example
//!
//! ```ignore
//! use rote_core::{SessionOrchestrator, StudyConfig, AlgorithmId, QualityRating};
//!
//! let config = StudyConfig::default();
//! let orchestrator = SessionOrchestrator::new(config, service, store);
//!
//! // Start a session over the cards due today
//! let due = orchestrator.fetch_due_cards("deck-1", 50).await?;
//! let session = orchestrator.start("deck-1", due, AlgorithmId::Sm2, None).await?;
//!
//! // Answer the current card
//! let outcome = orchestrator.submit_answer(QualityRating::Good, Some(1200)).await?;
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod scheduling;
pub mod session;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::StudyConfig;
pub use error::{ErrorCode, RoteError, RoteResult};
pub use events::{EventBus, EventSubscriber, StudyEvent};
pub use scheduling::{ScheduleStore, Sm2Scheduler};
pub use session::{QueueState, SessionOrchestrator, SessionQueue};
pub use traits::SchedulingService;
pub use types::{
    AlgorithmId, AnswerOutcome, AnswerRecord, Card, CardSchedule, CreatedSession, QualityRating,
    ScheduleSource, SessionStats, SessionSummary, StudySession,
};

//! Event system for study session events
//!
//! This module provides:
//! - Event types for session progress (card presented, progress, ticks, completion)
//! - Event bus for internal pub/sub

mod bus;
mod event;

pub use bus::{EventBus, EventSubscriber};
pub use event::{
    CardPresentedEvent, ElapsedTickEvent, ProgressUpdatedEvent, SessionCompletedEvent, StudyEvent,
};

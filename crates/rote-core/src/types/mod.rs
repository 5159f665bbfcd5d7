//! Core types for rote.

mod algorithm;
mod card;
mod rating;
mod schedule;
mod session;

pub use algorithm::AlgorithmId;
pub use card::Card;
pub use rating::QualityRating;
pub use schedule::{CardSchedule, DEFAULT_EASE_FACTOR, MIN_EASE_FACTOR};
pub use session::*;

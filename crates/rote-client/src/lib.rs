//! rote-client - Client library for the rote hosted scheduling API.
//!
//! This crate provides a [`SchedulingService`] implementation backed by the
//! rote hosted API, for use with `rote_core::SessionOrchestrator`.
//!
//! # Example
//!
//! ```ignore
//! use rote_client::StudyClient;
//!
//! let client = StudyClient::new("your-api-key")?;
//!
//! // Fetch the cards due for review
//! let due = client.fetch_due_cards("deck-123", 50).await?;
//!
//! // Create a session
//! let created = client.create_session("deck-123", AlgorithmId::Sm2).await?;
//! ```

mod client;

pub use client::StudyClient;
pub use rote_core::traits::SchedulingService;

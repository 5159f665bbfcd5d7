//! Study session management: queue, timing, and orchestration.

mod orchestrator;
mod queue;
mod ticker;

pub use orchestrator::SessionOrchestrator;
pub use queue::{QueueState, SessionQueue};
pub use ticker::{ElapsedTicker, TickerConfig};

//! Scheduling: the SM-2 algorithm and local schedule persistence.

mod algorithm;
mod store;

pub use algorithm::Sm2Scheduler;
pub use store::ScheduleStore;

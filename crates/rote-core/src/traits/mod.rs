//! Core traits for rote collaborators.

mod scheduling_service;

pub use scheduling_service::*;

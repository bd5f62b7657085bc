//! Knitting-job execution: cross-thread events and the coordinator.

pub mod coordinator;
pub mod event;

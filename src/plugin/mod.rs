//! Knitting-protocol plugin contract, registry, and built-in simulator.

pub mod api;
pub mod registry;
pub mod simulator;

//! Scheduler plugin which delegates node scoring to an external reinforcement learning service
//! and binds pods either in a live cluster or in an in-memory simulated one.

pub mod config;
pub mod core;
pub mod transport;

//! Collector fixtures for integration tests.

pub mod collector;

pub use collector::spawn_collector;

//! Shared utilities

pub mod perf;

pub use perf::{Stage, Stopwatch, TurnTimings};

//! Headless simulation of many games

pub mod batch;

pub use batch::{outcome_share, run_batch, BatchConfig, BatchReport, TierCounts};

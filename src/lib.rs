//! FireSync - Weapon Battle Simulator
//!
//! Players buy one weapon per round, shape it with perks, attachments and
//! random events, and pit its balanced score against a computer opponent
//! drawn from difficulty-weighted tiers.

pub mod core;
pub mod engine;
pub mod game;
pub mod simulation;
pub mod weapons;

pub use crate::core::config::GameConfig;
pub use crate::core::error::{FireSyncError, Result};
pub use crate::core::types::{Category, Difficulty, Outcome, Tier};

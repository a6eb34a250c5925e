pub mod config;
pub mod error;
pub mod types;

pub use config::{DifficultyTable, EconomyConfig, GameConfig, RoundPlan};
pub use error::{FireSyncError, Result};
pub use types::{Category, Difficulty, GameId, Outcome, Tier};

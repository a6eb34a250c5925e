//! Player profile persisted as JSON

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::GameId;
use crate::game::session::{GameSummary, RoundReport, Scoreboard};

/// How many game ids the profile remembers
const RECENT_GAMES: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub games: Scoreboard,
    pub rounds: Scoreboard,
    /// Rounds played with each weapon
    pub weapon_usage: BTreeMap<String, u32>,
    /// Most recent last
    pub recent_games: Vec<GameId>,
}

impl Profile {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Load a profile, or start a fresh one when the file does not exist
    pub fn load_or_default(path: &Path, name: &str) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new(name));
        }
        let contents = fs::read_to_string(path)?;
        let profile: Profile = serde_json::from_str(&contents)?;
        Ok(profile)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn record_round(&mut self, report: &RoundReport) {
        self.rounds.record(report.outcome);
        *self.weapon_usage.entry(report.player.name.clone()).or_insert(0) += 1;
    }

    pub fn record_game(&mut self, summary: &GameSummary) {
        self.games.record(summary.outcome);
        self.recent_games.push(summary.id);
        if self.recent_games.len() > RECENT_GAMES {
            let excess = self.recent_games.len() - RECENT_GAMES;
            self.recent_games.drain(..excess);
        }
    }

    /// Most used weapon; ties go to the alphabetically first name
    pub fn favorite_weapon(&self) -> Option<&str> {
        self.weapon_usage
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, _)| name.as_str())
    }

    pub fn games_played(&self) -> u32 {
        self.games.total()
    }

    pub fn win_rate(&self) -> f64 {
        match self.games_played() {
            0 => 0.0,
            played => self.games.wins as f64 / played as f64,
        }
    }
}

//! Batch simulation: many independent automatic games in parallel
//!
//! Game `i` is seeded with `seed + i` and owns its session, RNG and weapon
//! instances. Only the catalog and config are shared, read-only, so the
//! report does not depend on thread scheduling.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::types::{Difficulty, Outcome, Tier};
use crate::game::autoplay::{play_auto_game, AutoGame, AutoStrategy};
use crate::game::session::Scoreboard;
use crate::weapons::WeaponCatalog;

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub games: u64,
    pub difficulty: Difficulty,
    pub strategy: AutoStrategy,
    pub perk: Option<String>,
    pub attachments: Vec<String>,
    pub seed: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            games: 1000,
            difficulty: Difficulty::Normal,
            strategy: AutoStrategy::Strongest,
            perk: None,
            attachments: Vec::new(),
            seed: 12345,
        }
    }
}

/// How often the computer drew from each tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    /// Rounds with fewer than three candidates
    pub untiered: u64,
}

impl TierCounts {
    fn record(&mut self, tier: Option<Tier>) {
        match tier {
            Some(Tier::Low) => self.low += 1,
            Some(Tier::Medium) => self.medium += 1,
            Some(Tier::High) => self.high += 1,
            None => self.untiered += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub games: u64,
    pub difficulty: Difficulty,
    pub strategy: AutoStrategy,
    pub perk: Option<String>,
    pub seed: u64,
    pub game_results: Scoreboard,
    pub round_results: Scoreboard,
    pub game_win_rate: f64,
    pub round_win_rate: f64,
    pub average_final_balance: f64,
    pub computer_tiers: TierCounts,
    pub computer_picks: BTreeMap<String, u64>,
    pub events: BTreeMap<String, u64>,
}

/// Run `batch.games` automatic games and aggregate the results
pub fn run_batch(catalog: &WeaponCatalog, config: &GameConfig, batch: &BatchConfig) -> Result<BatchReport> {
    let start = std::time::Instant::now();

    let results = (0..batch.games)
        .into_par_iter()
        .map(|i| {
            let game = AutoGame {
                difficulty: batch.difficulty,
                strategy: batch.strategy,
                perk: batch.perk.clone(),
                attachments: batch.attachments.clone(),
                seed: batch.seed.wrapping_add(i),
            };
            play_auto_game(catalog, config, &game)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut game_results = Scoreboard::default();
    let mut round_results = Scoreboard::default();
    let mut computer_tiers = TierCounts::default();
    let mut computer_picks = BTreeMap::new();
    let mut events = BTreeMap::new();
    let mut balance_total = 0u64;

    for (summary, rounds) in &results {
        game_results.record(summary.outcome);
        balance_total += summary.final_balance as u64;

        for round in rounds {
            round_results.record(round.outcome);
            computer_tiers.record(round.computer_tier);
            *computer_picks.entry(round.computer.name.clone()).or_insert(0) += 1;
            if let Some(event) = &round.event {
                *events.entry(event.clone()).or_insert(0) += 1;
            }
        }
    }

    let rate = |wins: u32, total: u32| {
        if total == 0 {
            0.0
        } else {
            wins as f64 / total as f64
        }
    };

    let report = BatchReport {
        games: batch.games,
        difficulty: batch.difficulty,
        strategy: batch.strategy,
        perk: batch.perk.clone(),
        seed: batch.seed,
        game_win_rate: rate(game_results.wins, game_results.total()),
        round_win_rate: rate(round_results.wins, round_results.total()),
        game_results,
        round_results,
        average_final_balance: if results.is_empty() {
            0.0
        } else {
            balance_total as f64 / results.len() as f64
        },
        computer_tiers,
        computer_picks,
        events,
    };

    tracing::info!(
        games = batch.games,
        difficulty = %batch.difficulty,
        win_rate = report.game_win_rate,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Batch finished"
    );

    Ok(report)
}

/// Share of all rounds that ended with `outcome`
pub fn outcome_share(report: &BatchReport, outcome: Outcome) -> f64 {
    let board = &report.round_results;
    let count = match outcome {
        Outcome::Win => board.wins,
        Outcome::Loss => board.losses,
        Outcome::Draw => board.draws,
    };
    if board.total() == 0 {
        0.0
    } else {
        count as f64 / board.total() as f64
    }
}

//! Automatic players for headless games

use std::fmt;
use std::str::FromStr;

use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;
use crate::core::error::{FireSyncError, Result};
use crate::core::types::Difficulty;
use crate::game::session::{GameSession, GameSummary, Offer, RoundReport};
use crate::weapons::WeaponCatalog;

/// How an automatic player picks among affordable offers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoStrategy {
    /// Highest balanced score
    #[default]
    Strongest,
    /// Lowest price
    Cheapest,
    /// Uniform among affordable offers
    Random,
}

impl AutoStrategy {
    pub fn pick<'o, R: Rng + ?Sized>(&self, offers: &'o [Offer], rng: &mut R) -> Option<&'o Offer> {
        let affordable: Vec<&Offer> = offers.iter().filter(|o| o.affordable).collect();
        match self {
            Self::Strongest => affordable
                .into_iter()
                .max_by_key(|o| OrderedFloat(o.weapon.balanced_score)),
            Self::Cheapest => affordable.into_iter().min_by_key(|o| o.weapon.price),
            Self::Random => affordable.choose(rng).copied(),
        }
    }
}

impl FromStr for AutoStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strongest" => Ok(Self::Strongest),
            "cheapest" => Ok(Self::Cheapest),
            "random" => Ok(Self::Random),
            other => Err(format!(
                "unknown strategy '{}' (expected strongest, cheapest or random)",
                other
            )),
        }
    }
}

impl fmt::Display for AutoStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strongest => "strongest",
            Self::Cheapest => "cheapest",
            Self::Random => "random",
        })
    }
}

/// Parameters of one automatic game
#[derive(Debug, Clone)]
pub struct AutoGame {
    pub difficulty: Difficulty,
    pub strategy: AutoStrategy,
    pub perk: Option<String>,
    /// Attachments bought before the first round, in order, when affordable
    pub attachments: Vec<String>,
    pub seed: u64,
}

/// Play a whole game without input
///
/// The session RNG uses `seed`; the player's own choices use `seed + 1` so
/// the strategy never shifts the computer's draws.
pub fn play_auto_game(
    catalog: &WeaponCatalog,
    config: &GameConfig,
    game: &AutoGame,
) -> Result<(GameSummary, Vec<RoundReport>)> {
    let mut session = GameSession::new(catalog, config, game.difficulty, game.perk.as_deref(), game.seed)?;
    let mut player_rng = ChaCha8Rng::seed_from_u64(game.seed.wrapping_add(1));

    for key in &game.attachments {
        if let Err(e) = session.buy_attachment(key) {
            tracing::debug!(attachment = %key, "Skipped attachment: {}", e);
        }
    }

    while let Some(round) = session.current_round() {
        let offers = session.offers();
        let pick = game.strategy.pick(&offers, &mut player_rng).ok_or_else(|| {
            FireSyncError::DegenerateInput(format!("no affordable weapon in round {}", round))
        })?;
        let name = pick.weapon.name.clone();
        session.play_round(&name)?;
    }

    Ok((session.summary(), session.history().to_vec()))
}

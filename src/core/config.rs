//! Game configuration loaded from TOML
//!
//! Every section is optional; anything missing falls back to the built-in
//! defaults below, which reproduce the classic five-round FireSync game.
//! Nothing here is global: the loaded `GameConfig` is passed explicitly to the
//! session, the modifier pipeline and the opponent selector.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{FireSyncError, Result};
use crate::core::types::{Category, Difficulty};
use crate::engine::modifiers::{Attachment, Attribute, ChangeKind, Effect, Perk, RandomEvent};
use crate::engine::opponent::TierWeights;
use crate::engine::scoring::ScoringWeights;

/// Allowed drift when checking that tier probabilities sum to 1.0
const TIER_SUM_TOLERANCE: f64 = 1e-3;

/// Tier weights for every difficulty level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    pub easy: TierWeights,
    pub normal: TierWeights,
    pub hard: TierWeights,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: TierWeights::new(0.6, 0.3, 0.1),
            normal: TierWeights::new(0.3, 0.4, 0.3),
            hard: TierWeights::new(0.1, 0.3, 0.6),
        }
    }
}

impl DifficultyTable {
    pub fn weights(&self, difficulty: Difficulty) -> &TierWeights {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }
}

/// Money flow between rounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Credited after a round the player won
    pub win_bonus: u32,
    /// Credited after a round the player lost
    pub loss_bonus: u32,
    /// Credited after a drawn round
    pub draw_bonus: u32,
    /// Fraction of the paid price returned when the round's weapon is sold back
    pub sell_rate: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            win_bonus: 300,
            loss_bonus: 100,
            draw_bonus: 200,
            sell_rate: 0.5,
        }
    }
}

/// One round of a game: which category is on offer and how much money arrives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundPlan {
    pub category: Category,
    pub income: u32,
}

impl RoundPlan {
    pub fn new(category: Category, income: u32) -> Self {
        Self { category, income }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub scoring: ScoringWeights,
    pub difficulty: DifficultyTable,
    pub economy: EconomyConfig,
    pub rounds: Vec<RoundPlan>,
    pub perks: Vec<Perk>,
    pub attachments: Vec<Attachment>,
    /// Checked in this order each round; the first event that fires wins
    pub events: Vec<RandomEvent>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringWeights::default(),
            difficulty: DifficultyTable::default(),
            economy: EconomyConfig::default(),
            rounds: vec![
                RoundPlan::new(Category::Pistol, 900),
                RoundPlan::new(Category::Smg, 1700),
                RoundPlan::new(Category::Heavy, 2000),
                RoundPlan::new(Category::Rifle, 2600),
                RoundPlan::new(Category::Sniper, 3500),
            ],
            perks: vec![
                Perk::new(
                    "bargain_hunter",
                    "Bargain Hunter",
                    "Every weapon costs 15% less",
                    Effect::scale(Attribute::Price, -0.15),
                ),
                Perk::new(
                    "steady_hands",
                    "Steady Hands",
                    "Recoil reduced by 20%",
                    Effect::scale(Attribute::Recoil, -0.2),
                ),
                Perk::new(
                    "eagle_eye",
                    "Eagle Eye",
                    "Accurate range increased by 15%",
                    Effect::scale(Attribute::Range, 0.15),
                ),
            ],
            attachments: vec![
                Attachment::new(
                    "extended_mag",
                    "Extended Magazine",
                    400,
                    vec![Effect::add(Attribute::Magazine, 10.0)],
                ),
                Attachment::new(
                    "compensator",
                    "Compensator",
                    350,
                    vec![Effect::scale(Attribute::Recoil, -0.25)],
                ),
                Attachment::new(
                    "heavy_barrel",
                    "Heavy Barrel",
                    500,
                    vec![
                        Effect::scale(Attribute::Damage, 0.1),
                        Effect::scale(Attribute::Recoil, 0.1),
                    ],
                ),
                Attachment::new(
                    "suppressor",
                    "Suppressor",
                    300,
                    vec![
                        Effect::scale(Attribute::Damage, -0.1),
                        Effect::scale(Attribute::Recoil, -0.3),
                    ],
                ),
            ],
            events: vec![
                RandomEvent::new("sandstorm", "Sandstorm", 0.10, Effect::scale(Attribute::Range, -0.2)),
                RandomEvent::new("downpour", "Downpour", 0.15, Effect::scale(Attribute::Recoil, 0.1)),
                RandomEvent::new("thick_fog", "Thick Fog", 0.08, Effect::scale(Attribute::Range, -0.3)),
                RandomEvent::new("adrenaline", "Adrenaline Rush", 0.05, Effect::scale(Attribute::Damage, 0.1)),
            ],
        }
    }
}

impl GameConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), rounds = config.rounds.len(), "Loaded game config");
        Ok(config)
    }

    /// Resolve the config a binary should run with
    ///
    /// An explicit path must load; its errors are returned. Without one the
    /// `fallback` file is used when present, otherwise the built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>, fallback: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if fallback.exists() => Self::load(fallback),
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate config TOML
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn find_perk(&self, key: &str) -> Option<&Perk> {
        self.perks.iter().find(|p| p.key == key)
    }

    pub fn find_attachment(&self, key: &str) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.key == key)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;

        for (difficulty, weights) in [
            (Difficulty::Easy, &self.difficulty.easy),
            (Difficulty::Normal, &self.difficulty.normal),
            (Difficulty::Hard, &self.difficulty.hard),
        ] {
            let parts = [weights.low, weights.medium, weights.high];
            if parts.iter().any(|p| !p.is_finite() || *p < 0.0 || *p > 1.0) {
                return Err(config_err(format!(
                    "{} tier weights must each lie in [0, 1]",
                    difficulty
                )));
            }
            if (weights.total() - 1.0).abs() > TIER_SUM_TOLERANCE {
                return Err(config_err(format!(
                    "{} tier weights sum to {:.4}, expected 1.0",
                    difficulty,
                    weights.total()
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.economy.sell_rate) {
            return Err(config_err(format!(
                "sell_rate ({}) must lie in [0, 1]",
                self.economy.sell_rate
            )));
        }

        if self.rounds.is_empty() {
            return Err(config_err("at least one round must be configured"));
        }

        check_unique_keys("perk", self.perks.iter().map(|p| p.key.as_str()))?;
        check_unique_keys("attachment", self.attachments.iter().map(|a| a.key.as_str()))?;
        check_unique_keys("event", self.events.iter().map(|e| e.key.as_str()))?;

        for perk in &self.perks {
            let allowed = matches!(
                perk.effect.target,
                Attribute::Price | Attribute::Recoil | Attribute::Range
            );
            if !allowed || perk.effect.kind != ChangeKind::Multiplicative {
                return Err(config_err(format!(
                    "perk '{}' must scale price, recoil or range",
                    perk.key
                )));
            }
            check_amount(&perk.key, &perk.effect)?;
        }

        for attachment in &self.attachments {
            let effects: Vec<&Effect> = attachment.effects().collect();
            if effects.is_empty() {
                return Err(config_err(format!(
                    "attachment '{}' declares no effect",
                    attachment.key
                )));
            }
            for effect in effects {
                let allowed = match effect.target {
                    Attribute::Recoil | Attribute::Damage => effect.kind == ChangeKind::Multiplicative,
                    Attribute::Magazine => effect.kind == ChangeKind::Additive,
                    _ => false,
                };
                if !allowed {
                    return Err(config_err(format!(
                        "attachment '{}' has an unsupported {:?} {:?} effect",
                        attachment.key, effect.kind, effect.target
                    )));
                }
                check_amount(&attachment.key, effect)?;
            }
        }

        for event in &self.events {
            if !(0.0..=1.0).contains(&event.probability) {
                return Err(config_err(format!(
                    "event '{}' probability ({}) must lie in [0, 1]",
                    event.key, event.probability
                )));
            }
            let allowed = matches!(
                event.effect.target,
                Attribute::Damage | Attribute::Range | Attribute::Recoil
            );
            if !allowed || event.effect.kind != ChangeKind::Multiplicative {
                return Err(config_err(format!(
                    "event '{}' must scale damage, range or recoil",
                    event.key
                )));
            }
            check_amount(&event.key, &event.effect)?;
        }

        Ok(())
    }
}

fn config_err(message: impl Into<String>) -> FireSyncError {
    FireSyncError::Config(message.into())
}

fn check_unique_keys<'a>(kind: &str, keys: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = ahash::AHashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(config_err(format!("duplicate {} key '{}'", kind, key)));
        }
    }
    Ok(())
}

fn check_amount(key: &str, effect: &Effect) -> Result<()> {
    if !effect.amount.is_finite() {
        return Err(config_err(format!("'{}' has a non-finite amount", key)));
    }
    // Scaling below -100% would flip the sign of the attribute
    if effect.kind == ChangeKind::Multiplicative && effect.amount < -1.0 {
        return Err(config_err(format!(
            "'{}' scales {:?} by {}, below -1.0",
            key, effect.target, effect.amount
        )));
    }
    Ok(())
}

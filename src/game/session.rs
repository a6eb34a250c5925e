//! Game session: one player against the computer across the configured rounds
//!
//! Each round offers a single weapon category. The player buys a weapon
//! (perk and attachments applied), the computer draws one through the tiered
//! selector, one random event hits both, and the higher balanced score wins.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{GameConfig, RoundPlan};
use crate::core::error::{FireSyncError, Result};
use crate::core::types::{Category, Difficulty, GameId, Outcome, Tier};
use crate::engine::modifiers::ModifierPipeline;
use crate::engine::opponent::select_tiered;
use crate::weapons::{WeaponCatalog, WeaponInstance};

/// A weapon the player may pick this round, already modified by the loadout
#[derive(Debug, Clone, Serialize)]
pub struct Offer {
    pub weapon: WeaponInstance,
    pub affordable: bool,
}

/// Everything that happened in one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundReport {
    /// 1-based round number
    pub round: u32,
    pub category: Category,
    pub player: WeaponInstance,
    pub computer: WeaponInstance,
    pub computer_tier: Option<Tier>,
    pub event: Option<String>,
    pub outcome: Outcome,
    pub price_paid: u32,
    pub bonus: u32,
    pub resale: u32,
    /// Balance after the bonus and resale, before the next round's income
    pub balance: u32,
}

/// Round results so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl Scoreboard {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    /// Number of recorded outcomes
    pub fn total(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// More round wins than losses wins the game
    pub fn overall(&self) -> Outcome {
        match self.wins.cmp(&self.losses) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Loss,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// End-of-game result handed to the profile layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: GameId,
    pub difficulty: Difficulty,
    pub perk: Option<String>,
    pub scoreboard: Scoreboard,
    pub final_balance: u32,
    pub outcome: Outcome,
}

pub struct GameSession<'a> {
    id: GameId,
    catalog: &'a WeaponCatalog,
    config: &'a GameConfig,
    difficulty: Difficulty,
    perk: Option<String>,
    attachments: Vec<String>,
    rng: ChaCha8Rng,
    /// Index into `config.rounds` of the round being played
    round_index: usize,
    balance: u32,
    scoreboard: Scoreboard,
    history: Vec<RoundReport>,
}

impl<'a> GameSession<'a> {
    /// Start a game. The perk is fixed for the whole game; an unknown perk key
    /// is ignored.
    pub fn new(
        catalog: &'a WeaponCatalog,
        config: &'a GameConfig,
        difficulty: Difficulty,
        perk: Option<&str>,
        seed: u64,
    ) -> Result<Self> {
        let perk = match perk {
            Some(key) if config.find_perk(key).is_some() => Some(key.to_string()),
            Some(key) => {
                tracing::warn!(perk = key, "Unknown perk, playing without one");
                None
            }
            None => None,
        };

        let first = config
            .rounds
            .first()
            .ok_or_else(|| FireSyncError::Config("no rounds configured".into()))?;

        let session = Self {
            id: GameId::new(),
            catalog,
            config,
            difficulty,
            perk,
            attachments: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            round_index: 0,
            balance: first.income,
            scoreboard: Scoreboard::default(),
            history: Vec::new(),
        };

        session.check_rounds_affordable()?;

        tracing::debug!(
            game = %session.id,
            difficulty = %difficulty,
            perk = ?session.perk,
            seed,
            "Game started"
        );

        Ok(session)
    }

    /// Every round must offer something the player can buy with that round's
    /// income alone.
    fn check_rounds_affordable(&self) -> Result<()> {
        for (idx, plan) in self.config.rounds.iter().enumerate() {
            match self.cheapest_price(plan.category) {
                None => {
                    return Err(FireSyncError::Config(format!(
                        "round {} offers no {} in the catalog",
                        idx + 1,
                        plan.category
                    )))
                }
                Some(price) if price > plan.income => {
                    return Err(FireSyncError::Config(format!(
                        "round {}: cheapest {} costs ${} but income is ${}",
                        idx + 1,
                        plan.category,
                        price,
                        plan.income
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn pipeline(&self) -> ModifierPipeline<'a> {
        ModifierPipeline::new(self.config)
    }

    /// Lowest price in a category after the perk
    fn cheapest_price(&self, category: Category) -> Option<u32> {
        let pipeline = self.pipeline();
        self.catalog
            .in_category(category)
            .map(|base| {
                let weapon = pipeline.instance(base);
                match &self.perk {
                    Some(key) => pipeline.apply_perk_key(weapon, key).price,
                    None => weapon.price,
                }
            })
            .min()
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn perk(&self) -> Option<&str> {
        self.perk.as_deref()
    }

    pub fn attachments(&self) -> &[String] {
        &self.attachments
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    pub fn history(&self) -> &[RoundReport] {
        &self.history
    }

    pub fn total_rounds(&self) -> u32 {
        self.config.rounds.len() as u32
    }

    /// 1-based number of the round about to be played
    pub fn current_round(&self) -> Option<u32> {
        self.round_plan().map(|_| self.round_index as u32 + 1)
    }

    pub fn round_plan(&self) -> Option<&'a RoundPlan> {
        self.config.rounds.get(self.round_index)
    }

    pub fn is_finished(&self) -> bool {
        self.round_plan().is_none()
    }

    /// This round's weapons with the player's loadout applied
    pub fn offers(&self) -> Vec<Offer> {
        let Some(plan) = self.round_plan() else {
            return Vec::new();
        };
        let pipeline = self.pipeline();
        self.catalog
            .in_category(plan.category)
            .map(|base| {
                let weapon = pipeline.loadout(base, self.perk.as_deref(), &self.attachments);
                Offer {
                    affordable: weapon.price <= self.balance,
                    weapon,
                }
            })
            .collect()
    }

    /// Buy an attachment for the rest of the game
    ///
    /// Refused when it would leave nothing affordable in the current round.
    pub fn buy_attachment(&mut self, key: &str) -> Result<()> {
        let plan = self
            .round_plan()
            .ok_or(FireSyncError::GameFinished(self.total_rounds()))?;
        let attachment = self
            .config
            .find_attachment(key)
            .ok_or_else(|| FireSyncError::UnknownModifier(key.to_string()))?;

        if self.attachments.iter().any(|owned| owned == key) {
            return Err(FireSyncError::AlreadyOwned(key.to_string()));
        }

        let remaining = self.balance.checked_sub(attachment.price).ok_or_else(|| {
            FireSyncError::InsufficientFunds {
                item: attachment.name.clone(),
                price: attachment.price,
                balance: self.balance,
            }
        })?;

        if let Some(cheapest) = self.cheapest_price(plan.category) {
            if cheapest > remaining {
                return Err(FireSyncError::InsufficientFunds {
                    item: attachment.name.clone(),
                    price: attachment.price + cheapest,
                    balance: self.balance,
                });
            }
        }

        self.balance = remaining;
        self.attachments.push(key.to_string());
        tracing::debug!(attachment = key, balance = self.balance, "Bought attachment");
        Ok(())
    }

    /// Play the current round with the named weapon
    pub fn play_round(&mut self, weapon_name: &str) -> Result<RoundReport> {
        let plan = self
            .round_plan()
            .ok_or(FireSyncError::GameFinished(self.total_rounds()))?;
        let round = self.round_index as u32 + 1;

        let base = self
            .catalog
            .get(weapon_name)
            .ok_or_else(|| FireSyncError::UnknownWeapon(weapon_name.to_string()))?;
        if base.category != plan.category {
            return Err(FireSyncError::NotOffered {
                weapon: weapon_name.to_string(),
                round,
            });
        }

        let pipeline = self.pipeline();

        let player = pipeline.instance(base);
        let player = match &self.perk {
            Some(key) => pipeline.apply_perk_key(player, key),
            None => player,
        };
        if player.price > self.balance {
            return Err(FireSyncError::InsufficientFunds {
                item: player.name.clone(),
                price: player.price,
                balance: self.balance,
            });
        }
        let price_paid = player.price;
        self.balance -= price_paid;

        let player = pipeline.apply_attachment_keys(player, &self.attachments);

        let event = pipeline.sample_event(&mut self.rng);

        let candidates = self.catalog.instances(plan.category, pipeline.weights());
        let tier_weights = self.config.difficulty.weights(self.difficulty);
        let selection = select_tiered(&candidates, tier_weights, &mut self.rng)?;
        let computer = selection.weapon.clone();
        let computer_tier = selection.tier;

        let (player, computer) = match event {
            Some(event) => (
                pipeline.apply_event(player, event),
                pipeline.apply_event(computer, event),
            ),
            None => (player, computer),
        };

        let outcome = Outcome::from_scores(player.balanced_score, computer.balanced_score);
        self.scoreboard.record(outcome);

        let economy = &self.config.economy;
        let bonus = match outcome {
            Outcome::Win => economy.win_bonus,
            Outcome::Loss => economy.loss_bonus,
            Outcome::Draw => economy.draw_bonus,
        };
        let resale = (price_paid as f64 * economy.sell_rate).floor() as u32;
        self.balance = self.balance.saturating_add(bonus).saturating_add(resale);

        tracing::debug!(
            round,
            player = %player.name,
            player_score = player.balanced_score,
            computer = %computer.name,
            computer_score = computer.balanced_score,
            event = ?event.map(|e| &e.key),
            outcome = %outcome,
            "Round finished"
        );

        let report = RoundReport {
            round,
            category: plan.category,
            player,
            computer,
            computer_tier,
            event: event.map(|e| e.key.clone()),
            outcome,
            price_paid,
            bonus,
            resale,
            balance: self.balance,
        };
        self.history.push(report.clone());

        self.round_index += 1;
        if let Some(next) = self.round_plan() {
            self.balance = self.balance.saturating_add(next.income);
        }

        Ok(report)
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            id: self.id,
            difficulty: self.difficulty,
            perk: self.perk.clone(),
            scoreboard: self.scoreboard,
            final_balance: self.balance,
            outcome: self.scoreboard.overall(),
        }
    }
}

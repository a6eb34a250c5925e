//! Weapon records
//!
//! `WeaponBase` is the immutable catalog entry. `WeaponInstance` is the
//! per-round copy that modifiers mutate and that carries the derived scores.

use serde::{Deserialize, Serialize};

use crate::core::error::{FireSyncError, Result};
use crate::core::types::Category;
use crate::engine::scoring::{compute_balanced_score, compute_dps, ScoringWeights};

/// Immutable weapon attributes as loaded from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponBase {
    pub name: String,
    pub category: Category,
    /// Purchase price in dollars
    pub price: u32,
    /// Damage per hit
    pub damage: u32,
    /// Rounds per minute
    pub fire_rate: f64,
    /// Rounds per magazine
    pub magazine: u32,
    pub falloff: u32,
    /// Accurate range
    pub range: f64,
    pub recoil: f64,
}

impl WeaponBase {
    /// Check the load-time invariants; records failing this never enter play
    pub fn validate(&self) -> Result<()> {
        let reject = |reason: &str| {
            Err(FireSyncError::Data {
                record: self.name.clone(),
                reason: reason.to_string(),
            })
        };

        if self.name.trim().is_empty() {
            return reject("name is empty");
        }
        if self.price == 0 {
            return reject("price must be positive");
        }
        if self.damage == 0 {
            return reject("damage must be positive");
        }
        if !self.fire_rate.is_finite() || self.fire_rate <= 0.0 {
            return reject("fire_rate must be positive");
        }
        if self.magazine == 0 {
            return reject("magazine must be positive");
        }
        if !self.range.is_finite() || self.range <= 0.0 {
            return reject("range must be positive");
        }
        if !self.recoil.is_finite() || self.recoil < 0.0 {
            return reject("recoil must not be negative");
        }
        Ok(())
    }
}

/// Per-round weapon copy with derived scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponInstance {
    pub name: String,
    pub category: Category,
    pub price: u32,
    pub damage: u32,
    pub fire_rate: f64,
    pub magazine: u32,
    pub falloff: u32,
    pub range: f64,
    pub recoil: f64,
    pub balanced_score: f64,
    pub dps: f64,
}

impl WeaponInstance {
    /// Copy a catalog entry and score it
    pub fn from_base(base: &WeaponBase, weights: &ScoringWeights) -> Self {
        let mut instance = Self {
            name: base.name.clone(),
            category: base.category,
            price: base.price,
            damage: base.damage,
            fire_rate: base.fire_rate,
            magazine: base.magazine,
            falloff: base.falloff,
            range: base.range,
            recoil: base.recoil,
            balanced_score: 0.0,
            dps: 0.0,
        };
        instance.rescore(weights);
        instance
    }

    /// Recompute the derived scores from the current attributes
    pub fn rescore(&mut self, weights: &ScoringWeights) {
        self.balanced_score = compute_balanced_score(self, weights);
        self.dps = compute_dps(self);
    }
}

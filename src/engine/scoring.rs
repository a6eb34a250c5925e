//! Weapon Scoring
//!
//! Turns raw weapon attributes into a single comparable "balanced score":
//!
//! ```text
//! score = (damage·w_damage · fire_rate·w_fire_rate + magazine·w_magazine · range·w_range)
//!         / ((falloff + recoil) · w_denominator)
//! ```
//!
//! A zero denominator scores 0.0. Nothing here updates itself: whoever mutates
//! an instance must call [`WeaponInstance::rescore`] before reading the scores.

use serde::{Deserialize, Serialize};

use crate::core::error::{FireSyncError, Result};
use crate::weapons::WeaponInstance;

/// Seconds per minute, fire rate is given in rounds per minute
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Weights applied to each term of the balanced score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub damage: f64,
    pub fire_rate: f64,
    pub magazine: f64,
    pub range: f64,
    pub denominator: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            damage: 1.0,
            fire_rate: 1.0,
            magazine: 1.0,
            range: 1.0,
            denominator: 1.0,
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<()> {
        let all = [self.damage, self.fire_rate, self.magazine, self.range, self.denominator];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(FireSyncError::Config(
                "scoring weights must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Balanced score of the instance's current attributes
pub fn compute_balanced_score(weapon: &WeaponInstance, weights: &ScoringWeights) -> f64 {
    let denominator = (weapon.falloff as f64 + weapon.recoil) * weights.denominator;
    if denominator == 0.0 {
        return 0.0;
    }

    let firepower = weapon.damage as f64 * weights.damage * weapon.fire_rate * weights.fire_rate;
    let sustain = weapon.magazine as f64 * weights.magazine * weapon.range * weights.range;

    (firepower + sustain) / denominator
}

/// Damage per second: per-hit damage times rounds per second
pub fn compute_dps(weapon: &WeaponInstance) -> f64 {
    weapon.damage as f64 * weapon.fire_rate / SECONDS_PER_MINUTE
}

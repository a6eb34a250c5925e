//! Opponent Selector
//!
//! The computer never simply takes the best weapon. Candidates are ranked by
//! balanced score and cut into three contiguous tiers; the difficulty decides
//! how likely each tier is, and the pick inside a tier is uniform.
//!
//! Partition for `n >= 3` candidates, `t = max(1, n / 3)`:
//! low = `[0, t)`, medium = `[t, n - t)`, high = `[n - t, n)`.
//! The remainder of an uneven split always lands in medium.

use std::ops::Range;

use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{FireSyncError, Result};
use crate::core::types::Tier;
use crate::weapons::WeaponInstance;

/// Probability of drawing from each tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierWeights {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl TierWeights {
    pub fn new(low: f64, medium: f64, high: f64) -> Self {
        Self { low, medium, high }
    }

    pub fn total(&self) -> f64 {
        self.low + self.medium + self.high
    }

    /// Map a uniform draw in `[0, 1)` to a tier
    pub fn tier_for(&self, draw: f64) -> Tier {
        if draw < self.low {
            Tier::Low
        } else if draw < self.low + self.medium {
            Tier::Medium
        } else {
            Tier::High
        }
    }
}

/// Index ranges of each tier in a score-sorted candidate list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPartition {
    pub low: Range<usize>,
    pub medium: Range<usize>,
    pub high: Range<usize>,
}

impl TierPartition {
    /// `None` below three candidates, where tiering is skipped
    pub fn new(len: usize) -> Option<Self> {
        if len < 3 {
            return None;
        }
        let size = (len / 3).max(1);
        Some(Self {
            low: 0..size,
            medium: size..len - size,
            high: len - size..len,
        })
    }

    pub fn range(&self, tier: Tier) -> Range<usize> {
        match tier {
            Tier::Low => self.low.clone(),
            Tier::Medium => self.medium.clone(),
            Tier::High => self.high.clone(),
        }
    }
}

/// A computer pick and the tier it came from (`None` when untiered)
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub weapon: &'a WeaponInstance,
    pub tier: Option<Tier>,
}

/// Candidates sorted by balanced score, ascending; ties keep input order
pub fn rank_by_score(candidates: &[WeaponInstance]) -> Vec<&WeaponInstance> {
    let mut ranked: Vec<&WeaponInstance> = candidates.iter().collect();
    ranked.sort_by_key(|w| OrderedFloat(w.balanced_score));
    ranked
}

/// Pick the computer's weapon and report which tier was drawn
pub fn select_tiered<'a, R: Rng + ?Sized>(
    candidates: &'a [WeaponInstance],
    weights: &TierWeights,
    rng: &mut R,
) -> Result<Selection<'a>> {
    if candidates.is_empty() {
        return Err(FireSyncError::DegenerateInput(
            "opponent selection needs at least one candidate".into(),
        ));
    }

    let ranked = rank_by_score(candidates);

    let (pool, tier) = match TierPartition::new(ranked.len()) {
        None => (&ranked[..], None),
        Some(partition) => {
            let tier = weights.tier_for(rng.gen::<f64>());
            let slice = &ranked[partition.range(tier)];
            if slice.is_empty() {
                (&ranked[..], None)
            } else {
                (slice, Some(tier))
            }
        }
    };

    let weapon = *pool.choose(rng).ok_or_else(|| {
        FireSyncError::DegenerateInput("selected tier has no candidates".into())
    })?;

    tracing::debug!(
        candidates = candidates.len(),
        tier = ?tier,
        weapon = %weapon.name,
        score = weapon.balanced_score,
        "Computer selected weapon"
    );

    Ok(Selection { weapon, tier })
}

/// Pick the computer's weapon from a non-empty candidate set
pub fn select_opponent<'a, R: Rng + ?Sized>(
    candidates: &'a [WeaponInstance],
    weights: &TierWeights,
    rng: &mut R,
) -> Result<&'a WeaponInstance> {
    select_tiered(candidates, weights, rng).map(|s| s.weapon)
}

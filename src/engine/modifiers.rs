//! Modifier pipeline: perks, attachments and random events
//!
//! Every modifier is a list of effects on weapon attributes. Applying one
//! mutates a `WeaponInstance` and rescores it before returning, so the next
//! step always reads consistent scores. Within a round the order is
//! perk → attachments → the shared random event.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;
use crate::engine::scoring::ScoringWeights;
use crate::weapons::{WeaponBase, WeaponInstance};

/// Weapon attribute a modifier can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Price,
    Damage,
    Magazine,
    Range,
    Recoil,
}

/// How an effect's amount is applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// `value *= 1 + amount`; integer attributes are floored afterwards
    #[default]
    Multiplicative,
    /// `value += amount`; integer attributes add the rounded amount
    Additive,
}

/// A single change to one attribute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub target: Attribute,
    #[serde(default)]
    pub kind: ChangeKind,
    pub amount: f64,
}

impl Effect {
    /// Relative change, e.g. `-0.2` for -20%
    pub fn scale(target: Attribute, amount: f64) -> Self {
        Self {
            target,
            kind: ChangeKind::Multiplicative,
            amount,
        }
    }

    /// Absolute change, e.g. `+10` rounds of magazine
    pub fn add(target: Attribute, amount: f64) -> Self {
        Self {
            target,
            kind: ChangeKind::Additive,
            amount,
        }
    }

    /// Mutate the attribute in place. Does not rescore.
    pub fn apply_to(&self, weapon: &mut WeaponInstance) {
        match self.target {
            Attribute::Price => weapon.price = self.change_int(weapon.price),
            Attribute::Damage => weapon.damage = self.change_int(weapon.damage),
            Attribute::Magazine => weapon.magazine = self.change_int(weapon.magazine),
            Attribute::Range => weapon.range = self.change_real(weapon.range),
            Attribute::Recoil => weapon.recoil = self.change_real(weapon.recoil),
        }
    }

    fn change_int(&self, value: u32) -> u32 {
        let changed = match self.kind {
            ChangeKind::Multiplicative => (value as f64 * (1.0 + self.amount)).floor(),
            ChangeKind::Additive => value as f64 + self.amount.round(),
        };
        changed.max(0.0) as u32
    }

    fn change_real(&self, value: f64) -> f64 {
        let changed = match self.kind {
            ChangeKind::Multiplicative => value * (1.0 + self.amount),
            ChangeKind::Additive => value + self.amount,
        };
        changed.max(0.0)
    }
}

/// Player-chosen modifier, active for a whole game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perk {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub effect: Effect,
}

impl Perk {
    pub fn new(key: &str, name: &str, description: &str, effect: Effect) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            effect,
        }
    }
}

/// Purchased modifier; stays on every weapon for the rest of the game
///
/// Declares either a single `effect` or a list of `effects` (or both, in
/// which case `effect` is applied first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub key: String,
    pub name: String,
    pub price: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
}

impl Attachment {
    pub fn new(key: &str, name: &str, price: u32, effects: Vec<Effect>) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            price,
            effect: None,
            effects,
        }
    }

    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.effect.iter().chain(self.effects.iter())
    }
}

/// Environmental modifier rolled once per round, applied to both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomEvent {
    pub key: String,
    pub name: String,
    /// Chance to fire when its turn in the catalog comes up
    pub probability: f64,
    pub effect: Effect,
}

impl RandomEvent {
    pub fn new(key: &str, name: &str, probability: f64, effect: Effect) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            probability,
            effect,
        }
    }
}

/// Any modifier the pipeline understands
#[derive(Debug, Clone, Copy)]
pub enum Modifier<'a> {
    Perk(&'a Perk),
    Attachment(&'a Attachment),
    RandomEvent(&'a RandomEvent),
}

impl<'a> Modifier<'a> {
    pub fn key(&self) -> &'a str {
        match self {
            Self::Perk(p) => &p.key,
            Self::Attachment(a) => &a.key,
            Self::RandomEvent(e) => &e.key,
        }
    }

    pub fn effects(&self) -> Box<dyn Iterator<Item = &'a Effect> + 'a> {
        match *self {
            Self::Perk(p) => Box::new(std::iter::once(&p.effect)),
            Self::Attachment(a) => Box::new(a.effects()),
            Self::RandomEvent(e) => Box::new(std::iter::once(&e.effect)),
        }
    }
}

/// Apply every effect of a modifier, then rescore
pub fn apply_modifier(
    mut weapon: WeaponInstance,
    modifier: Modifier<'_>,
    weights: &ScoringWeights,
) -> WeaponInstance {
    tracing::trace!(modifier = modifier.key(), weapon = %weapon.name, "Applying modifier");
    for effect in modifier.effects() {
        effect.apply_to(&mut weapon);
    }
    weapon.rescore(weights);
    weapon
}

pub fn apply_perk(weapon: WeaponInstance, perk: &Perk, weights: &ScoringWeights) -> WeaponInstance {
    apply_modifier(weapon, Modifier::Perk(perk), weights)
}

/// Apply attachments in order, rescoring after each one
pub fn apply_attachments<'a>(
    weapon: WeaponInstance,
    attachments: impl IntoIterator<Item = &'a Attachment>,
    weights: &ScoringWeights,
) -> WeaponInstance {
    attachments.into_iter().fold(weapon, |w, attachment| {
        apply_modifier(w, Modifier::Attachment(attachment), weights)
    })
}

pub fn apply_event(weapon: WeaponInstance, event: &RandomEvent, weights: &ScoringWeights) -> WeaponInstance {
    apply_modifier(weapon, Modifier::RandomEvent(event), weights)
}

/// Walk the catalog in order and return the first event whose roll succeeds
///
/// Events after the first success are not rolled, so at most one event
/// affects a round.
pub fn sample_event<'a, R: Rng + ?Sized>(events: &'a [RandomEvent], rng: &mut R) -> Option<&'a RandomEvent> {
    events.iter().find(|event| rng.gen::<f64>() < event.probability)
}

/// Configured view over the modifier catalogs
///
/// Lookups by key fail closed: an unknown key leaves the weapon untouched.
#[derive(Debug, Clone, Copy)]
pub struct ModifierPipeline<'a> {
    config: &'a GameConfig,
}

impl<'a> ModifierPipeline<'a> {
    pub fn new(config: &'a GameConfig) -> Self {
        Self { config }
    }

    pub fn weights(&self) -> &'a ScoringWeights {
        &self.config.scoring
    }

    pub fn instance(&self, base: &WeaponBase) -> WeaponInstance {
        WeaponInstance::from_base(base, &self.config.scoring)
    }

    pub fn apply_perk_key(&self, weapon: WeaponInstance, key: &str) -> WeaponInstance {
        match self.config.find_perk(key) {
            Some(perk) => apply_perk(weapon, perk, self.weights()),
            None => {
                tracing::warn!(perk = key, "Unknown perk, ignoring");
                weapon
            }
        }
    }

    pub fn apply_attachment_keys<S: AsRef<str>>(&self, weapon: WeaponInstance, keys: &[S]) -> WeaponInstance {
        let attachments = keys.iter().filter_map(|key| {
            let key = key.as_ref();
            let found = self.config.find_attachment(key);
            if found.is_none() {
                tracing::warn!(attachment = key, "Unknown attachment, ignoring");
            }
            found
        });
        apply_attachments(weapon, attachments, self.weights())
    }

    pub fn apply_event(&self, weapon: WeaponInstance, event: &RandomEvent) -> WeaponInstance {
        apply_event(weapon, event, self.weights())
    }

    pub fn sample_event<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'a RandomEvent> {
        let event = sample_event(&self.config.events, rng);
        if let Some(event) = event {
            tracing::debug!(event = %event.key, "Random event triggered");
        }
        event
    }

    /// Player's weapon for a round before the event: base → perk → attachments
    pub fn loadout<S: AsRef<str>>(&self, base: &WeaponBase, perk: Option<&str>, attachments: &[S]) -> WeaponInstance {
        let weapon = self.instance(base);
        let weapon = match perk {
            Some(key) => self.apply_perk_key(weapon, key),
            None => weapon,
        };
        self.apply_attachment_keys(weapon, attachments)
    }
}

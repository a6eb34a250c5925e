//! Scoring and opponent-selection engine
//!
//! Pure computation only: no I/O, no globals. Configuration and randomness
//! are always passed in.

pub mod modifiers;
pub mod opponent;
pub mod scoring;

pub use modifiers::{
    apply_attachments, apply_event, apply_modifier, apply_perk, sample_event, Attachment,
    Attribute, ChangeKind, Effect, Modifier, ModifierPipeline, Perk, RandomEvent,
};
pub use opponent::{rank_by_score, select_opponent, select_tiered, Selection, TierPartition, TierWeights};
pub use scoring::{compute_balanced_score, compute_dps, ScoringWeights};

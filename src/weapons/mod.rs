//! Weapon catalog and per-round weapon instances

pub mod catalog;
pub mod record;

pub use catalog::WeaponCatalog;
pub use record::{WeaponBase, WeaponInstance};

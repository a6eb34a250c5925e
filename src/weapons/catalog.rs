//! Load the weapon catalog from TOML
//!
//! Each `[[weapon]]` table is parsed and validated on its own, so one bad
//! record is logged and skipped instead of failing the whole catalog.

use std::fs;
use std::path::Path;

use ahash::AHashMap;

use crate::core::error::{FireSyncError, Result};
use crate::core::types::Category;
use crate::engine::scoring::ScoringWeights;
use crate::weapons::record::{WeaponBase, WeaponInstance};

/// Catalog shipped with the game
const EMBEDDED_CATALOG: &str = include_str!("../../data/weapons.toml");

/// Read-only set of validated weapons, addressed by name
#[derive(Debug, Default)]
pub struct WeaponCatalog {
    weapons: Vec<WeaponBase>,
    by_name: AHashMap<String, usize>,
    rejected: Vec<FireSyncError>,
}

impl WeaponCatalog {
    /// Load a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&contents)?;
        tracing::info!(
            path = %path.display(),
            weapons = catalog.len(),
            rejected = catalog.rejected.len(),
            "Loaded weapon catalog"
        );
        Ok(catalog)
    }

    /// The catalog compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_CATALOG)
    }

    /// Parse catalog TOML, skipping records that fail validation
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let toml: toml::Value = contents.parse()?;

        let records = toml
            .get("weapon")
            .and_then(|v| v.as_array())
            .ok_or_else(|| FireSyncError::Data {
                record: "<catalog>".into(),
                reason: "missing [[weapon]] entries".into(),
            })?;

        let mut catalog = Self::default();
        for record in records {
            match parse_weapon(record) {
                Ok(weapon) => catalog.insert(weapon),
                Err(e) => {
                    tracing::warn!("Rejected weapon record: {}", e);
                    catalog.rejected.push(e);
                }
            }
        }

        Ok(catalog)
    }

    /// Build a catalog from already-constructed records, validating each
    pub fn from_weapons(weapons: impl IntoIterator<Item = WeaponBase>) -> Self {
        let mut catalog = Self::default();
        for weapon in weapons {
            match weapon.validate() {
                Ok(()) => catalog.insert(weapon),
                Err(e) => catalog.rejected.push(e),
            }
        }
        catalog
    }

    fn insert(&mut self, weapon: WeaponBase) {
        if self.by_name.contains_key(&weapon.name) {
            self.rejected.push(FireSyncError::Data {
                record: weapon.name.clone(),
                reason: "duplicate name, first record kept".into(),
            });
            return;
        }
        self.by_name.insert(weapon.name.clone(), self.weapons.len());
        self.weapons.push(weapon);
    }

    pub fn get(&self, name: &str) -> Option<&WeaponBase> {
        self.by_name.get(name).map(|&idx| &self.weapons[idx])
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    /// All weapons in file order
    pub fn iter(&self) -> impl Iterator<Item = &WeaponBase> {
        self.weapons.iter()
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &WeaponBase> {
        self.weapons.iter().filter(move |w| w.category == category)
    }

    /// Fresh scored instances of every weapon in a category
    pub fn instances(&self, category: Category, weights: &ScoringWeights) -> Vec<WeaponInstance> {
        self.in_category(category)
            .map(|base| WeaponInstance::from_base(base, weights))
            .collect()
    }

    /// Records dropped at load time
    pub fn rejected(&self) -> &[FireSyncError] {
        &self.rejected
    }
}

fn parse_weapon(value: &toml::Value) -> Result<WeaponBase> {
    let name = value
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("<unnamed>")
        .to_string();

    let weapon: WeaponBase = value.clone().try_into().map_err(|e: toml::de::Error| {
        FireSyncError::Data {
            record: name.clone(),
            reason: e.message().to_string(),
        }
    })?;

    weapon.validate()?;
    Ok(weapon)
}

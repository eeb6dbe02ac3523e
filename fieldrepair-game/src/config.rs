//! Mod configuration consumed by the classifier and allocator
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::allocator::{CategoryTable, DamageCategory};

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("category table must have {expected} entries (got {actual})")]
    TableLength { expected: usize, actual: usize },
    #[error("no theme named {name:?} is configured")]
    UnknownTheme { name: String },
    #[error("at least one theme must be configured")]
    NoThemes,
    #[error("engine part categories must not be empty")]
    EmptyEngineCategories,
    #[error("{field} contains a blank category name")]
    BlankCategory { field: &'static str },
}

/// Number of damage rolls applied per unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRollsConfig {
    #[serde(default = "DamageRollsConfig::default_vehicle_rolls")]
    pub vehicle_rolls: u32,
    /// Rolls for mech repairs. Carried for hosts sharing one config file;
    /// vehicle repairs never read it.
    #[serde(default = "DamageRollsConfig::default_mech_rolls")]
    pub mech_rolls: u32,
}

impl DamageRollsConfig {
    #[must_use]
    pub const fn default_vehicle_rolls() -> u32 {
        3
    }

    #[must_use]
    pub const fn default_mech_rolls() -> u32 {
        3
    }
}

impl Default for DamageRollsConfig {
    fn default() -> Self {
        Self {
            vehicle_rolls: Self::default_vehicle_rolls(),
            mech_rolls: Self::default_mech_rolls(),
        }
    }
}

/// Custom component categories that steer classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentCategories {
    /// Parts tagged with any of these are never damaged.
    #[serde(default = "ComponentCategories::default_blacklisted")]
    pub blacklisted: Vec<String>,
    /// Parts tagged with any of these go to the engine pool.
    #[serde(default = "ComponentCategories::default_engine_parts")]
    pub engine_parts: Vec<String>,
}

impl ComponentCategories {
    fn default_blacklisted() -> Vec<String> {
        ["Blacklisted", "Armor", "Structure", "Quirk"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn default_engine_parts() -> Vec<String> {
        vec!["EnginePart".to_string()]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine_parts.is_empty() {
            return Err(ConfigError::EmptyEngineCategories);
        }
        if self.engine_parts.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::BlankCategory {
                field: "engine_parts",
            });
        }
        if self.blacklisted.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::BlankCategory {
                field: "blacklisted",
            });
        }
        Ok(())
    }
}

impl Default for ComponentCategories {
    fn default() -> Self {
        Self {
            blacklisted: Self::default_blacklisted(),
            engine_parts: Self::default_engine_parts(),
        }
    }
}

/// A named category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
    pub mech_table: CategoryTable,
}

impl ThemeConfig {
    /// Mostly cosmetic wear with the occasional internal failure.
    #[must_use]
    pub fn poorly_maintained() -> Self {
        use DamageCategory::{
            AmmoBox, Armor, Component, Engine, HeatSink, Skill, Structure, Weapon,
        };
        Self {
            name: "PoorlyMaintained".to_string(),
            mech_table: CategoryTable::new([
                Skill, Engine, HeatSink, AmmoBox, Component, Weapon, Weapon, Structure, Armor,
            ]),
        }
    }
}

/// Top-level mod configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModConfig {
    #[serde(default)]
    pub damage_rolls: DamageRollsConfig,
    #[serde(default)]
    pub component_categories: ComponentCategories,
    #[serde(default = "ModConfig::default_themes")]
    pub themes: Vec<ThemeConfig>,
    #[serde(default = "ModConfig::default_current_theme")]
    pub current_theme: String,
}

impl ModConfig {
    fn default_themes() -> Vec<ThemeConfig> {
        vec![ThemeConfig::poorly_maintained()]
    }

    fn default_current_theme() -> String {
        ThemeConfig::poorly_maintained().name
    }

    /// Load configuration from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed, including category
    /// tables that do not have exactly nine entries.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when categories are blank or the current theme
    /// cannot be found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.component_categories.validate()?;
        self.current_theme()?;
        Ok(())
    }

    /// The theme selected by `current_theme`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoThemes` or `ConfigError::UnknownTheme`.
    pub fn current_theme(&self) -> Result<&ThemeConfig, ConfigError> {
        if self.themes.is_empty() {
            return Err(ConfigError::NoThemes);
        }
        self.themes
            .iter()
            .find(|theme| theme.name.eq_ignore_ascii_case(self.current_theme.trim()))
            .ok_or_else(|| ConfigError::UnknownTheme {
                name: self.current_theme.clone(),
            })
    }
}

impl Default for ModConfig {
    fn default() -> Self {
        Self {
            damage_rolls: DamageRollsConfig::default(),
            component_categories: ComponentCategories::default(),
            themes: Self::default_themes(),
            current_theme: Self::default_current_theme(),
        }
    }
}

//! Vehicle parts as seen by the repair system
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Errors raised when a vehicle listing cannot be used for repairs.
#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("failed to parse vehicle: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("vehicle {vehicle:?} lists component {id} more than once")]
    DuplicateComponentId { vehicle: String, id: ComponentId },
}

/// Stable identity of an installed component within one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub u32);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-side component type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    AmmunitionBox,
    HeatSink,
    Weapon,
    Upgrade,
    JumpJet,
    Cockpit,
    #[default]
    NotSet,
}

/// Vehicle locations. Only used when reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChassisLocation {
    #[default]
    Front,
    Left,
    Right,
    Rear,
    Turret,
}

/// Critical-hit limits carried by engine parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCriticalEffects {
    pub max_hits: u32,
}

/// Explosion properties of volatile weapons. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ComponentExplosion {
    #[serde(default)]
    pub explosion_damage: f32,
    #[serde(default)]
    pub heat_damage: f32,
    #[serde(default)]
    pub stability_damage: f32,
}

/// An installed vehicle part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    #[serde(default)]
    pub ui_name: String,
    #[serde(default)]
    pub component_type: ComponentType,
    /// Custom category tags attached by the host (e.g. `"EnginePart"`).
    #[serde(default)]
    pub categories: Vec<String>,
    /// Essential parts can never be damaged or removed.
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub location: ChassisLocation,
    #[serde(default)]
    pub engine_effects: Option<EngineCriticalEffects>,
    #[serde(default)]
    pub explosion: Option<ComponentExplosion>,
}

impl Component {
    /// Create a plain component with no categories or metadata.
    #[must_use]
    pub fn new(id: u32, name: &str, component_type: ComponentType) -> Self {
        Self {
            id: ComponentId(id),
            name: name.to_string(),
            ui_name: name.to_string(),
            component_type,
            categories: Vec::new(),
            critical: false,
            location: ChassisLocation::default(),
            engine_effects: None,
            explosion: None,
        }
    }

    /// Add a custom category tag.
    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        self.categories.push(category.to_string());
        self
    }

    #[must_use]
    pub const fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    #[must_use]
    pub const fn at(mut self, location: ChassisLocation) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub const fn with_max_hits(mut self, max_hits: u32) -> Self {
        self.engine_effects = Some(EngineCriticalEffects { max_hits });
        self
    }

    #[must_use]
    pub const fn with_explosion(mut self, explosion: ComponentExplosion) -> Self {
        self.explosion = Some(explosion);
        self
    }

    /// Case-insensitive category membership test.
    #[must_use]
    pub fn is_category(&self, category: &str) -> bool {
        let wanted = category.trim();
        !wanted.is_empty()
            && self
                .categories
                .iter()
                .any(|tag| tag.trim().eq_ignore_ascii_case(wanted))
    }

    /// Returns true when any of the provided categories applies.
    #[must_use]
    pub fn is_any_category<S: AsRef<str>>(&self, categories: &[S]) -> bool {
        categories.iter().any(|c| self.is_category(c.as_ref()))
    }

    /// Name shown to players, falling back to the internal name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.ui_name.trim().is_empty() {
            &self.name
        } else {
            &self.ui_name
        }
    }
}

/// A vehicle and its installed components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl Vehicle {
    #[must_use]
    pub fn new(id: &str, components: Vec<Component>) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            components,
        }
    }

    /// Look up a component by id.
    #[must_use]
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Load a vehicle listing from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a vehicle or the
    /// listing repeats a component id.
    pub fn from_json(json: &str) -> Result<Self, VehicleError> {
        let vehicle: Self = serde_json::from_str(json)?;
        vehicle.validate()?;
        Ok(vehicle)
    }

    /// Check that every component id appears once.
    ///
    /// # Errors
    ///
    /// Returns `VehicleError::DuplicateComponentId` for the first repeated id.
    pub fn validate(&self) -> Result<(), VehicleError> {
        let mut seen = HashSet::with_capacity(self.components.len());
        match self.components.iter().find(|c| !seen.insert(c.id)) {
            Some(dup) => Err(VehicleError::DuplicateComponentId {
                vehicle: self.id.clone(),
                id: dup.id,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_match_ignores_case_and_whitespace() {
        let part = Component::new(1, "Fusion Core", ComponentType::Upgrade)
            .with_category(" EnginePart ");
        assert!(part.is_category("enginepart"));
        assert!(!part.is_category(""));
        assert!(!part.is_category("Gyro"));
        assert!(part.is_any_category(&["Gyro", "EnginePart"]));
    }

    #[test]
    fn vehicle_from_json_applies_defaults() {
        let json = r#"{
            "id": "schrek",
            "components": [
                { "id": 7, "name": "PPC", "component_type": "weapon",
                  "explosion": { "explosion_damage": 10.0 } },
                { "id": 8, "name": "Engine Shielding", "categories": ["EnginePart"],
                  "engine_effects": { "max_hits": 3 }, "location": "rear" }
            ]
        }"#;
        let vehicle = Vehicle::from_json(json).unwrap();
        assert_eq!(vehicle.components.len(), 2);
        let ppc = vehicle.component(ComponentId(7)).unwrap();
        assert_eq!(ppc.component_type, ComponentType::Weapon);
        assert!(!ppc.critical);
        assert_eq!(ppc.display_name(), "PPC");
        let shielding = vehicle.component(ComponentId(8)).unwrap();
        assert_eq!(shielding.component_type, ComponentType::NotSet);
        assert_eq!(shielding.location, ChassisLocation::Rear);
        assert_eq!(
            shielding.engine_effects,
            Some(EngineCriticalEffects { max_hits: 3 })
        );
    }

    #[test]
    fn repeated_component_ids_are_rejected() {
        let json = r#"{
            "id": "hunter",
            "components": [
                { "id": 1, "name": "Radio", "component_type": "upgrade" },
                { "id": 2, "name": "LRM 5", "component_type": "weapon" },
                { "id": 1, "name": "Searchlight", "component_type": "upgrade" }
            ]
        }"#;
        let err = Vehicle::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            VehicleError::DuplicateComponentId { id: ComponentId(1), .. }
        ));
        assert!(err.to_string().contains("#1"), "{err}");

        assert!(matches!(
            Vehicle::from_json(r#"{ "components": [] }"#),
            Err(VehicleError::Parse(_))
        ));

        let unique = Vehicle::new(
            "hunter",
            vec![
                Component::new(1, "Radio", ComponentType::Upgrade),
                Component::new(2, "LRM 5", ComponentType::Weapon),
            ],
        );
        assert!(unique.validate().is_ok());
    }
}

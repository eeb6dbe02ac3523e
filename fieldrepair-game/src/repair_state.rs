//! Per-event repair damage for a vehicle
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::allocator::{AllocationResult, allocate_damage};
use crate::classifier::{ExclusionReason, classify_components};
use crate::component::{Component, ComponentId, Vehicle, VehicleError};
use crate::config::{ConfigError, ModConfig};

/// Reasons a repair event cannot be rolled.
#[derive(Debug, Error)]
pub enum RepairError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Vehicle(#[from] VehicleError),
}

/// Damage a vehicle picked up from poor maintenance, ready for the host to
/// apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRepairState {
    pub vehicle_id: String,
    /// Rolls requested from configuration.
    pub rolls: u32,
    pub theme: String,
    pub result: AllocationResult,
    #[serde(default)]
    pub excluded: Vec<(ComponentId, ExclusionReason)>,
}

impl VehicleRepairState {
    /// Classify the vehicle's parts and allocate the configured number of
    /// vehicle damage rolls.
    ///
    /// # Errors
    ///
    /// Returns `RepairError` when the configuration is invalid or the
    /// vehicle repeats a component id.
    pub fn new<R: Rng>(
        vehicle: &Vehicle,
        config: &ModConfig,
        rng: &mut R,
    ) -> Result<Self, RepairError> {
        Self::with_rolls(vehicle, config, config.damage_rolls.vehicle_rolls, rng)
    }

    /// Same as [`VehicleRepairState::new`] with an explicit roll count.
    ///
    /// # Errors
    ///
    /// See [`VehicleRepairState::new`].
    pub fn with_rolls<R: Rng>(
        vehicle: &Vehicle,
        config: &ModConfig,
        rolls: u32,
        rng: &mut R,
    ) -> Result<Self, RepairError> {
        config.validate()?;
        vehicle.validate()?;
        let theme = config.current_theme()?;

        let classification = classify_components(&vehicle.components, &config.component_categories);
        let mut pools = classification.pools;
        let result = allocate_damage(&mut pools, rolls, &theme.mech_table, rng);

        log::debug!(
            "Vehicle {} took {} armor, {} structure, {} skill hits and {} damaged components",
            vehicle.id,
            result.armor_hits,
            result.structure_hits,
            result.pilot_skill_hits,
            result.damaged_components.len()
        );

        Ok(Self {
            vehicle_id: vehicle.id.clone(),
            rolls,
            theme: theme.name.clone(),
            result,
            excluded: classification.excluded,
        })
    }

    #[must_use]
    pub const fn armor_hits(&self) -> u32 {
        self.result.armor_hits
    }

    #[must_use]
    pub const fn structure_hits(&self) -> u32 {
        self.result.structure_hits
    }

    #[must_use]
    pub const fn pilot_skill_hits(&self) -> u32 {
        self.result.pilot_skill_hits
    }

    /// Damaged components resolved against the vehicle, in draw order.
    #[must_use]
    pub fn damaged_components<'v>(&self, vehicle: &'v Vehicle) -> Vec<&'v Component> {
        self.result
            .damaged_components
            .iter()
            .filter_map(|id| vehicle.component(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{CategoryTable, DamageCategory};
    use crate::component::ComponentType;
    use crate::config::ThemeConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn component_only_config(rolls: u32) -> ModConfig {
        let mut cfg = ModConfig::default();
        cfg.damage_rolls.vehicle_rolls = rolls;
        cfg.themes.push(ThemeConfig {
            name: "Scrapyard".to_string(),
            mech_table: CategoryTable::uniform(DamageCategory::Component),
        });
        cfg.current_theme = "Scrapyard".to_string();
        cfg
    }

    fn vehicle() -> Vehicle {
        Vehicle::new(
            "demolisher",
            vec![
                Component::new(1, "Crew Compartment", ComponentType::Cockpit).critical(),
                Component::new(2, "Searchlight", ComponentType::Upgrade),
                Component::new(3, "Radio", ComponentType::Upgrade),
                Component::new(4, "Winch", ComponentType::NotSet),
                Component::new(5, "AC/20", ComponentType::Weapon),
            ],
        )
    }

    #[test]
    fn uses_configured_roll_count_and_theme() {
        let cfg = component_only_config(5);
        let v = vehicle();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let state = VehicleRepairState::new(&v, &cfg, &mut rng).unwrap();

        assert_eq!(state.rolls, 5);
        assert_eq!(state.theme, "Scrapyard");
        assert_eq!(state.result.damaged_components.len(), 3);
        assert_eq!(state.result.abandoned_rolls, 2);
        assert_eq!(state.armor_hits() + state.structure_hits() + state.pilot_skill_hits(), 0);
        assert_eq!(state.excluded, vec![(ComponentId(1), ExclusionReason::Critical)]);

        let names: Vec<&str> = state
            .damaged_components(&v)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(!names.contains(&"Crew Compartment"));
        assert!(!names.contains(&"AC/20"));
    }

    #[test]
    fn invalid_config_fails_before_rolling() {
        let mut cfg = component_only_config(2);
        cfg.current_theme = "Missing".to_string();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let err = VehicleRepairState::new(&vehicle(), &cfg, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            RepairError::Config(ConfigError::UnknownTheme { .. })
        ));
    }

    #[test]
    fn shared_component_id_is_rejected_before_rolling() {
        let cfg = component_only_config(2);
        let v = Vehicle::new(
            "harasser",
            vec![
                Component::new(1, "Radio", ComponentType::Upgrade),
                Component::new(1, "Searchlight", ComponentType::Upgrade),
            ],
        );
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let err = VehicleRepairState::new(&v, &cfg, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            RepairError::Vehicle(VehicleError::DuplicateComponentId {
                id: ComponentId(1),
                ..
            })
        ));
    }

    #[test]
    fn zero_rolls_produce_empty_state() {
        let cfg = component_only_config(0);
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let state = VehicleRepairState::new(&vehicle(), &cfg, &mut rng).unwrap();
        assert_eq!(state.result, AllocationResult::default());
    }
}

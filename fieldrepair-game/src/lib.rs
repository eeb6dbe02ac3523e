//! Field Repairs Damage Engine
//!
//! Platform-agnostic damage allocation for vehicles coming out of poor
//! maintenance. This crate decides which parts take damage; applying that
//! damage to live game state is left to the host.

pub mod allocator;
pub mod classifier;
pub mod component;
pub mod config;
pub mod repair_state;
pub mod rng;

// Re-export commonly used types
pub use allocator::{
    AllocationResult, CategoryTable, DamageCategory, MAX_ROLL_ATTEMPTS, Resolution, RollMachine,
    RollOutcome, RollPhase, RollRecord, TABLE_SLOTS, allocate_damage,
};
pub use classifier::{
    Classification, ComponentPools, ExclusionReason, PoolKind, classify_components,
};
pub use component::{
    ChassisLocation, Component, ComponentExplosion, ComponentId, ComponentType,
    EngineCriticalEffects, Vehicle, VehicleError,
};
pub use config::{ComponentCategories, ConfigError, DamageRollsConfig, ModConfig, ThemeConfig};
pub use repair_state::{RepairError, VehicleRepairState};
pub use rng::{CountingRng, derive_stream_seed};

/// Trait for abstracting configuration loading
/// Platform-specific implementations should provide this
pub trait ConfigLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the mod configuration from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_mod_config(&self) -> Result<ModConfig, Self::Error>;
}

/// Entry point the host calls for each combat-repair event
pub struct RepairEngine<L>
where
    L: ConfigLoader,
{
    loader: L,
}

impl<L> RepairEngine<L>
where
    L: ConfigLoader,
{
    /// Create a new engine with the provided configuration loader
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Load and validate the current configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn config(&self) -> Result<ModConfig, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let config = self.loader.load_mod_config().map_err(Into::into)?;
        config.validate()?;
        Ok(config)
    }

    /// Roll repair damage for a vehicle on a stream derived from `seed` and
    /// the vehicle id.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid,
    /// or if the vehicle repeats a component id.
    pub fn repair_vehicle(
        &self,
        vehicle: &Vehicle,
        seed: u64,
    ) -> Result<VehicleRepairState, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let config = self.config()?;
        let mut rng = CountingRng::for_vehicle(seed, &vehicle.id);
        let state = VehicleRepairState::new(vehicle, &config, &mut rng)?;
        log::debug!(
            "Repair rolls for {} used {} RNG draws",
            vehicle.id,
            rng.draws()
        );
        Ok(state)
    }
}

use fieldrepair_game::{
    AllocationResult, ComponentId, CountingRng, DamageCategory, ModConfig, PoolKind, Resolution,
    RollOutcome, Vehicle, VehicleRepairState, classify_components,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Aggregate of every allocation run for one seed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub seed: u64,
    pub iterations: usize,
    pub armor_hits: u64,
    pub structure_hits: u64,
    pub pilot_skill_hits: u64,
    pub components_by_category: BTreeMap<String, u64>,
    pub abandoned_rolls: u64,
    pub attempts: u64,
    pub failures: Vec<String>,
}

impl SeedReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    fn absorb(&mut self, result: &AllocationResult) {
        self.armor_hits += u64::from(result.armor_hits);
        self.structure_hits += u64::from(result.structure_hits);
        self.pilot_skill_hits += u64::from(result.pilot_skill_hits);
        self.abandoned_rolls += u64::from(result.abandoned_rolls);
        self.attempts += result.attempts;
        for record in &result.rolls {
            if let RollOutcome::Resolved(Resolution::Component { category, .. }) = record.outcome {
                *self
                    .components_by_category
                    .entry(category.to_string())
                    .or_default() += 1;
            }
        }
    }
}

/// Run `iterations` allocations for `seed`, each on its own derived stream.
pub fn run_seed(
    vehicle: &Vehicle,
    config: &ModConfig,
    seed: u64,
    iterations: usize,
    verbose: bool,
) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport {
        seed,
        iterations,
        ..SeedReport::default()
    };

    for iteration in 0..iterations {
        let stream = format!("{}/{iteration}", vehicle.id);
        let mut rng = CountingRng::for_vehicle(seed, &stream);
        let state = VehicleRepairState::new(vehicle, config, &mut rng)?;
        if verbose {
            for record in &state.result.rolls {
                println!(
                    "   [{seed}:{iteration}] roll {} -> {:?} ({} attempts)",
                    record.roll, record.outcome, record.attempts
                );
            }
        }
        report.failures.extend(
            check_invariants(vehicle, config, &state)
                .into_iter()
                .map(|failure| format!("iteration {iteration}: {failure}")),
        );
        report.absorb(&state.result);
    }

    Ok(report)
}

/// Verify an allocation against the damage rules.
#[must_use]
pub fn check_invariants(
    vehicle: &Vehicle,
    config: &ModConfig,
    state: &VehicleRepairState,
) -> Vec<String> {
    let mut failures = Vec::new();
    let result = &state.result;
    let pools = classify_components(&vehicle.components, &config.component_categories).pools;

    if result.damaged_components.len() > state.rolls as usize {
        failures.push(format!(
            "{} components damaged by {} rolls",
            result.damaged_components.len(),
            state.rolls
        ));
    }

    let mut seen: HashSet<ComponentId> = HashSet::new();
    for id in &result.damaged_components {
        if !seen.insert(*id) {
            failures.push(format!("component {id} damaged twice"));
        }
        if pools.contains(*id).is_none() {
            failures.push(format!("component {id} was not eligible for damage"));
        }
    }

    let weapons_hit = result
        .rolls
        .iter()
        .filter(|r| {
            matches!(
                r.outcome,
                RollOutcome::Resolved(Resolution::Component {
                    category: DamageCategory::Weapon,
                    ..
                })
            )
        })
        .count();
    if !pools.is_empty(PoolKind::Weapon) && weapons_hit >= pools.len(PoolKind::Weapon) {
        failures.push(format!(
            "all {} weapons destroyed",
            pools.len(PoolKind::Weapon)
        ));
    }

    if result.engine_hits > 0 && result.engine_hits >= pools.max_engine_hits() {
        failures.push(format!(
            "{} engine hits with max {}",
            result.engine_hits, pools.max_engine_hits()
        ));
    }

    failures
}

use std::collections::HashSet;

use fieldrepair_game::{
    CategoryTable, Component, ComponentCategories, ComponentId, ComponentType, CountingRng,
    DamageCategory, MAX_ROLL_ATTEMPTS, ModConfig, PoolKind, RollOutcome, ThemeConfig, Vehicle,
    VehicleRepairState, allocate_damage, classify_components,
};

fn convoy_vehicle() -> Vehicle {
    let mut components = vec![
        Component::new(1, "Driver Station", ComponentType::Cockpit).critical(),
        Component::new(2, "Hardened Armor", ComponentType::Upgrade).with_category("Armor"),
        Component::new(3, "ICE Engine", ComponentType::Upgrade)
            .with_category("EnginePart")
            .with_max_hits(3),
        Component::new(4, "Fuel Tank", ComponentType::Upgrade)
            .with_category("EnginePart")
            .with_max_hits(2),
        Component::new(5, "Transmission", ComponentType::NotSet).with_category("EnginePart"),
        Component::new(6, "Heat Sink", ComponentType::HeatSink),
        Component::new(7, "Heat Sink", ComponentType::HeatSink),
        Component::new(8, "AC/10 Ammo", ComponentType::AmmunitionBox),
        Component::new(9, "SRM Ammo", ComponentType::AmmunitionBox),
    ];
    for id in 10..14 {
        components.push(Component::new(id, "Medium Laser", ComponentType::Weapon));
    }
    components.push(Component::new(14, "Searchlight", ComponentType::Upgrade));
    components.push(Component::new(15, "C3 Slave", ComponentType::Upgrade));
    Vehicle::new("convoy-7", components)
}

fn mixed_table() -> CategoryTable {
    CategoryTable::new([
        DamageCategory::Skill,
        DamageCategory::Engine,
        DamageCategory::Engine,
        DamageCategory::HeatSink,
        DamageCategory::AmmoBox,
        DamageCategory::Component,
        DamageCategory::Weapon,
        DamageCategory::Weapon,
        DamageCategory::Structure,
    ])
}

#[test]
fn allocations_never_duplicate_or_invent_components() {
    let vehicle = convoy_vehicle();
    let categories = ComponentCategories::default();
    let table = mixed_table();

    for seed in 0..200_u64 {
        let classification = classify_components(&vehicle.components, &categories);
        let mut pools = classification.pools.clone();
        let pooled: HashSet<ComponentId> = PoolKind::ALL
            .iter()
            .flat_map(|kind| pools.pool(*kind).to_vec())
            .collect();
        let rolls = u32::try_from(seed % 25).unwrap();
        let mut rng = CountingRng::from_seed_u64(seed);

        let result = allocate_damage(&mut pools, rolls, &table, &mut rng);

        let consumed = result.damaged_components.len();
        assert!(consumed <= rolls as usize);
        let unique: HashSet<ComponentId> = result.damaged_components.iter().copied().collect();
        assert_eq!(unique.len(), consumed, "seed {seed} repeated a component");
        assert!(unique.is_subset(&pooled), "seed {seed} consumed an unpooled part");
        assert!(!unique.contains(&ComponentId(1)));
        assert!(!unique.contains(&ComponentId(2)));
        assert!(pools.len(PoolKind::Weapon) >= 1);
        assert!(result.engine_hits < classification.pools.max_engine_hits());
        assert_eq!(result.rolls.len(), rolls as usize);
        assert_eq!(pools.total_len() + consumed, classification.pools.total_len());
    }
}

#[test]
fn single_weapon_is_never_consumed() {
    let vehicle = Vehicle::new(
        "lone-gun",
        vec![Component::new(1, "PPC", ComponentType::Weapon)],
    );
    let mut cfg = ModConfig::default();
    cfg.damage_rolls.vehicle_rolls = 10;
    cfg.themes = vec![ThemeConfig {
        name: "Guns".to_string(),
        mech_table: CategoryTable::uniform(DamageCategory::Weapon),
    }];
    cfg.current_theme = "Guns".to_string();

    for seed in 0..25 {
        let mut rng = CountingRng::from_seed_u64(seed);
        let state = VehicleRepairState::new(&vehicle, &cfg, &mut rng).unwrap();
        assert!(state.result.damaged_components.is_empty());
        assert_eq!(state.result.abandoned_rolls, 10);
        assert!(
            state
                .result
                .rolls
                .iter()
                .all(|r| r.outcome == RollOutcome::Abandoned && r.attempts == MAX_ROLL_ATTEMPTS)
        );
    }
}

#[test]
fn engine_hits_blocked_when_max_hits_is_low() {
    for max_hits in [0_u32, 1] {
        let mut components = vec![
            Component::new(1, "Engine", ComponentType::Upgrade).with_category("EnginePart"),
            Component::new(2, "Engine Cooling", ComponentType::Upgrade)
                .with_category("EnginePart"),
        ];
        if max_hits > 0 {
            components[0] = components[0].clone().with_max_hits(max_hits);
        }
        let classification = classify_components(&components, &ComponentCategories::default());
        assert_eq!(classification.pools.max_engine_hits(), max_hits);

        let mut pools = classification.pools;
        let mut rng = CountingRng::from_seed_u64(u64::from(max_hits));
        let table = CategoryTable::uniform(DamageCategory::Engine);
        let result = allocate_damage(&mut pools, 4, &table, &mut rng);
        assert_eq!(result.engine_hits, 0);
        assert!(result.damaged_components.is_empty());
        assert_eq!(pools.len(PoolKind::Engine), 2);
    }
}

#[test]
fn engine_hit_counter_spans_all_rolls() {
    let components: Vec<Component> = (1..=6)
        .map(|id| {
            Component::new(id, "Engine Part", ComponentType::Upgrade)
                .with_category("EnginePart")
                .with_max_hits(4)
        })
        .collect();
    let mut pools = classify_components(&components, &ComponentCategories::default()).pools;
    let mut rng = CountingRng::from_seed_u64(17);
    let table = CategoryTable::uniform(DamageCategory::Engine);
    let result = allocate_damage(&mut pools, 6, &table, &mut rng);
    assert_eq!(result.engine_hits, 3);
    assert_eq!(result.abandoned_rolls, 3);
    assert_eq!(pools.len(PoolKind::Engine), 3);
}

#[test]
fn scalar_hits_dominate_when_pools_are_empty() {
    let vehicle = Vehicle::new(
        "stripped",
        vec![Component::new(1, "Cockpit", ComponentType::Cockpit).critical()],
    );
    let mut cfg = ModConfig::default();
    cfg.damage_rolls.vehicle_rolls = 50;
    let mut rng = CountingRng::from_seed_u64(2024);
    let state = VehicleRepairState::new(&vehicle, &cfg, &mut rng).unwrap();

    assert!(state.result.damaged_components.is_empty());
    assert_eq!(
        state.armor_hits() + state.structure_hits() + state.pilot_skill_hits()
            + state.result.abandoned_rolls,
        50
    );
    assert!(state.armor_hits() > 0);
}

#[test]
fn repeated_component_id_is_damaged_once() {
    let components = vec![
        Component::new(1, "Radio", ComponentType::Upgrade),
        Component::new(1, "Searchlight", ComponentType::Upgrade),
    ];
    let table = CategoryTable::uniform(DamageCategory::Component);
    for seed in 0..20_u64 {
        let mut pools = classify_components(&components, &ComponentCategories::default()).pools;
        let mut rng = CountingRng::from_seed_u64(seed);
        let result = allocate_damage(&mut pools, 2, &table, &mut rng);
        assert_eq!(result.damaged_components.as_slice(), &[ComponentId(1)]);
        assert_eq!(result.abandoned_rolls, 1);
    }
}

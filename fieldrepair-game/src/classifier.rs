//! Component classification into damage pools
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::component::{Component, ComponentId, ComponentType};
use crate::config::ComponentCategories;

/// The five damageable pools a vehicle's parts are sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Engine,
    HeatSink,
    AmmoBox,
    Weapon,
    Component,
}

impl PoolKind {
    pub const ALL: [Self; 5] = [
        Self::Engine,
        Self::HeatSink,
        Self::AmmoBox,
        Self::Weapon,
        Self::Component,
    ];
}

/// Why a part was left out of every pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Critical,
    Blacklisted,
}

/// Non-essential components grouped by how they take damage.
///
/// Pools are unordered; removal swaps the last element into the gap.
/// Built by [`classify_components`], which places each id in at most one
/// pool. The allocator relies on that: an id is never drawn twice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentPools {
    pub(crate) engine_parts: Vec<ComponentId>,
    pub(crate) heat_sinks: Vec<ComponentId>,
    pub(crate) ammo_boxes: Vec<ComponentId>,
    pub(crate) weapons: Vec<ComponentId>,
    pub(crate) components: Vec<ComponentId>,
    pub(crate) max_engine_hits: u32,
}

impl ComponentPools {
    /// Highest `max_hits` declared by any engine part, 0 when none declare it.
    #[must_use]
    pub const fn max_engine_hits(&self) -> u32 {
        self.max_engine_hits
    }

    #[must_use]
    pub fn pool(&self, kind: PoolKind) -> &[ComponentId] {
        match kind {
            PoolKind::Engine => &self.engine_parts,
            PoolKind::HeatSink => &self.heat_sinks,
            PoolKind::AmmoBox => &self.ammo_boxes,
            PoolKind::Weapon => &self.weapons,
            PoolKind::Component => &self.components,
        }
    }

    fn pool_mut(&mut self, kind: PoolKind) -> &mut Vec<ComponentId> {
        match kind {
            PoolKind::Engine => &mut self.engine_parts,
            PoolKind::HeatSink => &mut self.heat_sinks,
            PoolKind::AmmoBox => &mut self.ammo_boxes,
            PoolKind::Weapon => &mut self.weapons,
            PoolKind::Component => &mut self.components,
        }
    }

    #[must_use]
    pub fn len(&self, kind: PoolKind) -> usize {
        self.pool(kind).len()
    }

    #[must_use]
    pub fn is_empty(&self, kind: PoolKind) -> bool {
        self.pool(kind).is_empty()
    }

    /// Number of components across all pools.
    #[must_use]
    pub fn total_len(&self) -> usize {
        PoolKind::ALL.iter().map(|kind| self.len(*kind)).sum()
    }

    /// Pool that currently holds `id`, if any.
    #[must_use]
    pub fn contains(&self, id: ComponentId) -> Option<PoolKind> {
        PoolKind::ALL
            .into_iter()
            .find(|kind| self.pool(*kind).contains(&id))
    }

    /// Sorted ids of a pool, for order-independent comparison.
    #[must_use]
    pub fn ids(&self, kind: PoolKind) -> Vec<ComponentId> {
        let mut ids = self.pool(kind).to_vec();
        ids.sort_unstable();
        ids
    }

    /// Remove a uniformly random element from the pool.
    pub fn take_random<R: Rng>(&mut self, kind: PoolKind, rng: &mut R) -> Option<ComponentId> {
        let pool = self.pool_mut(kind);
        if pool.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..pool.len());
        Some(pool.swap_remove(idx))
    }

    fn push(&mut self, kind: PoolKind, id: ComponentId) {
        self.pool_mut(kind).push(id);
    }
}

/// Output of [`classify_components`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub pools: ComponentPools,
    #[serde(default)]
    pub excluded: Vec<(ComponentId, ExclusionReason)>,
}

/// Sort a vehicle's components into damage pools.
///
/// First match wins: critical, blacklisted, engine part, ammo box, heat sink,
/// weapon, then everything else.
#[must_use]
pub fn classify_components(
    components: &[Component],
    categories: &ComponentCategories,
) -> Classification {
    let mut out = Classification::default();
    let mut seen = HashSet::with_capacity(components.len());

    for component in components {
        log::debug!(
            "Checking component: {} / {} ({})",
            component.name,
            component.display_name(),
            component.id
        );

        if !seen.insert(component.id) {
            log::warn!(
                "Component id {} listed again as {}, ignoring the repeat.",
                component.id,
                component.display_name()
            );
            continue;
        }

        if component.critical {
            log::debug!(
                "  - Skipping critical component: {} in location: {:?}",
                component.display_name(),
                component.location
            );
            out.excluded.push((component.id, ExclusionReason::Critical));
            continue;
        }
        if component.is_any_category(&categories.blacklisted) {
            log::debug!(
                "  - Skipping blacklisted component: {}",
                component.display_name()
            );
            out.excluded.push((component.id, ExclusionReason::Blacklisted));
            continue;
        }

        let kind = pool_kind_for(component, categories);
        match kind {
            PoolKind::Engine => {
                log::debug!("  - Found engine: {}", component.display_name());
                if let Some(effects) = component.engine_effects
                    && effects.max_hits > out.pools.max_engine_hits
                {
                    out.pools.max_engine_hits = effects.max_hits;
                    log::debug!("      engine has maxhits: {}", effects.max_hits);
                }
            }
            PoolKind::Weapon => {
                log::debug!("  - Found weapon: {}", component.display_name());
                if let Some(explosion) = component.explosion {
                    log::debug!(
                        "      weapon has component explosion: {} / {} / {}",
                        explosion.explosion_damage,
                        explosion.heat_damage,
                        explosion.stability_damage
                    );
                }
            }
            other => log::debug!(
                "  - Found {other:?}: {} in location: {:?}",
                component.display_name(),
                component.location
            ),
        }
        out.pools.push(kind, component.id);
    }

    out
}

fn pool_kind_for(component: &Component, categories: &ComponentCategories) -> PoolKind {
    if component.is_any_category(&categories.engine_parts) {
        return PoolKind::Engine;
    }
    match component.component_type {
        ComponentType::AmmunitionBox => PoolKind::AmmoBox,
        ComponentType::HeatSink => PoolKind::HeatSink,
        ComponentType::Weapon => PoolKind::Weapon,
        _ => PoolKind::Component,
    }
}

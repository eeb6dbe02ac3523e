//! Damage roll allocation across classified component pools.
//!
//! Each roll samples one of nine table slots until the drawn category can
//! absorb the hit or [`MAX_ROLL_ATTEMPTS`] draws have been spent. Ineligible
//! draws are wasted attempts; the table is never renormalized.
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::classifier::{ComponentPools, PoolKind};
use crate::component::ComponentId;
use crate::config::ConfigError;

/// Number of slots in a category table.
pub const TABLE_SLOTS: usize = 9;

/// Draws allowed for a single roll before it is abandoned.
pub const MAX_ROLL_ATTEMPTS: u32 = 30;

/// Components damaged by one allocation, in draw order.
pub type DamagedComponents = SmallVec<[ComponentId; 8]>;

/// Kind of damage a table slot maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageCategory {
    Skill,
    Engine,
    HeatSink,
    AmmoBox,
    Component,
    Weapon,
    Structure,
    Armor,
    /// Any name the allocator does not recognise. Never resolves.
    #[serde(other)]
    Unmapped,
}

impl DamageCategory {
    /// Pool a component-damaging category draws from.
    #[must_use]
    pub const fn pool(self) -> Option<PoolKind> {
        match self {
            Self::Engine => Some(PoolKind::Engine),
            Self::HeatSink => Some(PoolKind::HeatSink),
            Self::AmmoBox => Some(PoolKind::AmmoBox),
            Self::Component => Some(PoolKind::Component),
            Self::Weapon => Some(PoolKind::Weapon),
            Self::Skill | Self::Structure | Self::Armor | Self::Unmapped => None,
        }
    }
}

impl fmt::Display for DamageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Skill => "skill",
            Self::Engine => "engine",
            Self::HeatSink => "heat_sink",
            Self::AmmoBox => "ammo_box",
            Self::Component => "component",
            Self::Weapon => "weapon",
            Self::Structure => "structure",
            Self::Armor => "armor",
            Self::Unmapped => "unmapped",
        };
        f.write_str(label)
    }
}

/// Nine-slot lookup table; repeated entries weight a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DamageCategory>", into = "Vec<DamageCategory>")]
pub struct CategoryTable {
    slots: [DamageCategory; TABLE_SLOTS],
}

impl CategoryTable {
    #[must_use]
    pub const fn new(slots: [DamageCategory; TABLE_SLOTS]) -> Self {
        Self { slots }
    }

    /// Table with every slot set to `category`.
    #[must_use]
    pub const fn uniform(category: DamageCategory) -> Self {
        Self::new([category; TABLE_SLOTS])
    }

    #[must_use]
    pub const fn slots(&self) -> &[DamageCategory; TABLE_SLOTS] {
        &self.slots
    }

    /// Category stored at `index`; out-of-range indexes are unmapped.
    #[must_use]
    pub fn category(&self, index: usize) -> DamageCategory {
        self.slots
            .get(index)
            .copied()
            .unwrap_or(DamageCategory::Unmapped)
    }

    /// Number of slots assigned to `category`.
    #[must_use]
    pub fn weight(&self, category: DamageCategory) -> usize {
        self.slots.iter().filter(|slot| **slot == category).count()
    }
}

impl TryFrom<Vec<DamageCategory>> for CategoryTable {
    type Error = ConfigError;

    fn try_from(value: Vec<DamageCategory>) -> Result<Self, Self::Error> {
        let actual = value.len();
        let slots: [DamageCategory; TABLE_SLOTS] =
            value.try_into().map_err(|_| ConfigError::TableLength {
                expected: TABLE_SLOTS,
                actual,
            })?;
        Ok(Self { slots })
    }
}

impl From<CategoryTable> for Vec<DamageCategory> {
    fn from(table: CategoryTable) -> Self {
        table.slots.to_vec()
    }
}

/// What a resolved roll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Resolution {
    PilotSkill,
    Structure,
    Armor,
    Component {
        category: DamageCategory,
        id: ComponentId,
    },
}

/// Per-roll state. A roll starts in `Sampling` and ends in `Resolved` or
/// `Abandoned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollPhase {
    Sampling,
    Evaluating(DamageCategory),
    Resolved(Resolution),
    Abandoned,
}

impl RollPhase {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Abandoned)
    }
}

/// Final state of a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollOutcome {
    Resolved(Resolution),
    Abandoned,
}

/// Trace entry for one roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRecord {
    pub roll: u32,
    pub outcome: RollOutcome,
    pub attempts: u32,
}

/// Mutable state shared by every roll of one allocation.
#[derive(Debug)]
pub struct AllocationContext<'a> {
    pub pools: &'a mut ComponentPools,
    /// Engine parts consumed so far. Never reset between rolls.
    pub engine_hits: u32,
}

impl<'a> AllocationContext<'a> {
    #[must_use]
    pub fn new(pools: &'a mut ComponentPools) -> Self {
        Self {
            pools,
            engine_hits: 0,
        }
    }

    /// Whether `category` can absorb a hit right now.
    #[must_use]
    pub fn is_eligible(&self, category: DamageCategory) -> bool {
        match category {
            DamageCategory::Skill | DamageCategory::Structure | DamageCategory::Armor => true,
            DamageCategory::Engine => {
                !self.pools.is_empty(PoolKind::Engine)
                    && self.engine_hits.saturating_add(1) < self.pools.max_engine_hits
            }
            DamageCategory::HeatSink => !self.pools.is_empty(PoolKind::HeatSink),
            DamageCategory::AmmoBox => !self.pools.is_empty(PoolKind::AmmoBox),
            DamageCategory::Component => !self.pools.is_empty(PoolKind::Component),
            // At least one weapon always survives.
            DamageCategory::Weapon => self.pools.len(PoolKind::Weapon) > 1,
            DamageCategory::Unmapped => false,
        }
    }

    /// Apply `category` if eligible, consuming a pooled component when needed.
    pub fn resolve<R: Rng>(
        &mut self,
        category: DamageCategory,
        rng: &mut R,
    ) -> Option<Resolution> {
        if !self.is_eligible(category) {
            return None;
        }
        match category {
            DamageCategory::Skill => Some(Resolution::PilotSkill),
            DamageCategory::Structure => Some(Resolution::Structure),
            DamageCategory::Armor => Some(Resolution::Armor),
            DamageCategory::Unmapped => None,
            component_category => {
                let kind = component_category.pool()?;
                let id = self.pools.take_random(kind, rng)?;
                if kind == PoolKind::Engine {
                    self.engine_hits += 1;
                }
                Some(Resolution::Component {
                    category: component_category,
                    id,
                })
            }
        }
    }
}

/// Drives a single roll from `Sampling` to a terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollMachine {
    phase: RollPhase,
    attempts: u32,
}

impl Default for RollMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RollMachine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: RollPhase::Sampling,
            attempts: 0,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> RollPhase {
        self.phase
    }

    /// Category draws taken so far.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Advance one transition. Terminal phases are sticky.
    pub fn step<R: Rng>(
        &mut self,
        table: &CategoryTable,
        ctx: &mut AllocationContext<'_>,
        rng: &mut R,
    ) -> RollPhase {
        self.phase = match self.phase {
            RollPhase::Sampling => {
                self.attempts += 1;
                let idx = rng.gen_range(0..TABLE_SLOTS);
                RollPhase::Evaluating(table.category(idx))
            }
            RollPhase::Evaluating(category) => match ctx.resolve(category, rng) {
                Some(resolution) => RollPhase::Resolved(resolution),
                None if self.attempts >= MAX_ROLL_ATTEMPTS => RollPhase::Abandoned,
                None => RollPhase::Sampling,
            },
            terminal => terminal,
        };
        self.phase
    }

    /// Step until the roll resolves or is abandoned.
    pub fn run<R: Rng>(
        &mut self,
        table: &CategoryTable,
        ctx: &mut AllocationContext<'_>,
        rng: &mut R,
    ) -> RollOutcome {
        loop {
            match self.step(table, ctx, rng) {
                RollPhase::Resolved(resolution) => return RollOutcome::Resolved(resolution),
                RollPhase::Abandoned => return RollOutcome::Abandoned,
                RollPhase::Sampling | RollPhase::Evaluating(_) => {}
            }
        }
    }
}

/// Hit counters and damaged components produced by one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllocationResult {
    pub armor_hits: u32,
    pub structure_hits: u32,
    pub pilot_skill_hits: u32,
    /// Consumed components in draw order.
    pub damaged_components: DamagedComponents,
    pub engine_hits: u32,
    pub abandoned_rolls: u32,
    /// Total category draws across all rolls, at most
    /// `rolls * MAX_ROLL_ATTEMPTS`.
    pub attempts: u64,
    #[serde(default)]
    pub rolls: Vec<RollRecord>,
}

impl AllocationResult {
    fn record(&mut self, roll: u32, outcome: RollOutcome, attempts: u32) {
        match outcome {
            RollOutcome::Resolved(Resolution::PilotSkill) => self.pilot_skill_hits += 1,
            RollOutcome::Resolved(Resolution::Structure) => self.structure_hits += 1,
            RollOutcome::Resolved(Resolution::Armor) => self.armor_hits += 1,
            RollOutcome::Resolved(Resolution::Component { category, id }) => {
                self.damaged_components.push(id);
                if category == DamageCategory::Engine {
                    self.engine_hits += 1;
                }
            }
            RollOutcome::Abandoned => self.abandoned_rolls += 1,
        }
        self.attempts += u64::from(attempts);
        self.rolls.push(RollRecord {
            roll,
            outcome,
            attempts,
        });
    }

    /// Rolls that applied damage.
    #[must_use]
    pub fn resolved_rolls(&self) -> u32 {
        self.pilot_skill_hits
            + self.structure_hits
            + self.armor_hits
            + u32::try_from(self.damaged_components.len()).unwrap_or(u32::MAX)
    }
}

/// Resolve `rolls` damage rolls against `pools`, removing consumed parts.
#[must_use]
pub fn allocate_damage<R: Rng>(
    pools: &mut ComponentPools,
    rolls: u32,
    table: &CategoryTable,
    rng: &mut R,
) -> AllocationResult {
    let mut result = AllocationResult::default();
    let mut ctx = AllocationContext::new(pools);

    for roll in 0..rolls {
        let mut machine = RollMachine::new();
        let outcome = machine.run(table, &mut ctx, rng);
        match outcome {
            RollOutcome::Resolved(resolution) => {
                log::debug!("  roll {roll} resolved: {resolution:?}");
            }
            RollOutcome::Abandoned => {
                log::warn!(
                    "Roll {roll} unresolved after {} attempts, moving forward.",
                    machine.attempts()
                );
            }
        }
        result.record(roll, outcome, machine.attempts());
    }

    result
}

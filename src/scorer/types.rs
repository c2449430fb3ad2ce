use crate::mods::SetKind;
use crate::stats::{Fixed, StatKind, StatVector};
use serde::{Deserialize, Serialize};

/// One set kind's bonus as applied to a loadout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedSet {
    pub set: SetKind,
    /// Mods of this set in the loadout.
    pub mods: usize,
    /// Completed bonuses (`mods / size`, rounded down).
    pub bonuses: usize,
    /// Whether the full (max level) or reduced value was applied.
    pub full: bool,
}

/// Where a goal's reference value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Baseline {
    Absolute,
    /// The other character's committed loadout in this run.
    Committed,
    /// The other character's un-modded stats (not processed yet).
    BaseStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalResult {
    /// Index into the target's `target_stats`.
    pub index: usize,
    pub stat: StatKind,
    pub achieved: Fixed,
    pub lower: Fixed,
    pub upper: Fixed,
    pub shortfall: Fixed,
    pub optimize: bool,
}

impl GoalResult {
    pub fn met(&self) -> bool {
        self.shortfall.is_zero()
    }
}

/// Output of the stat evaluator for one loadout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Evaluation {
    /// Mod-provided stats including set bonuses.
    pub stats: StatVector,
    /// Base stats plus `stats`.
    pub totals: StatVector,
    pub sets: Vec<AppliedSet>,
    pub score: Fixed,
    pub goals: Vec<GoalResult>,
}

impl Evaluation {
    pub fn active_goals_met(&self) -> usize {
        self.goals.iter().filter(|g| g.optimize && g.met()).count()
    }

    pub fn goal(&self, index: usize) -> Option<&GoalResult> {
        self.goals.iter().find(|g| g.index == index)
    }
}

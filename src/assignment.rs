use crate::character::TargetStat;
use crate::consts::SLOT_COUNT;
use crate::mods::{CharacterId, ModId, SetKind, Slot};
use crate::stats::{ModStatKind, StatVector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a missed goal refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoalRef {
    /// A target-stat range goal.
    Stat { goal: TargetStat },
    /// A variable slot whose required primary was not available.
    Primary { slot: Slot, primary: ModStatKind },
    /// A set restriction that the pool could not fill.
    Set { set: SetKind, required: u8 },
    /// `use_only_full_sets` could not be honoured.
    FullSets,
}

/// A goal or restriction the committed loadout failed, with its shortfall.
///
/// Shortfall units: stat distance to the nearest bound for `Stat`, slots for
/// `Primary`, missing set bonuses for `Set`, mods in partial sets for `FullSets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedGoal {
    pub goal: GoalRef,
    pub shortfall: f64,
}

impl fmt::Display for MissedGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.goal {
            GoalRef::Stat { goal } => write!(
                f,
                "{} outside [{}, {}] by {:.2}",
                goal.stat, goal.minimum, goal.maximum, self.shortfall
            ),
            GoalRef::Primary { slot, primary } => {
                write!(f, "no {} {} available", primary, slot)
            }
            GoalRef::Set { set, required } => write!(
                f,
                "{} of {} {} set(s) missing",
                self.shortfall, required, set
            ),
            GoalRef::FullSets => write!(f, "{} mod(s) in partial sets", self.shortfall),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterOutcome {
    /// A new loadout was searched and committed.
    Optimized,
    /// Cancelled mid-search; the best loadout found so far was committed.
    Partial,
    /// The current loadout was kept under the change threshold.
    Kept,
    /// Locked character; current loadout frozen.
    Locked,
    /// Copied from a previous run (incremental mode).
    Reused,
    /// Invalid target; nothing committed.
    Failed,
}

/// One character's result: six slots (empty where nothing fits), missed goals and notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterResult {
    pub character_id: CharacterId,
    pub mods: [Option<ModId>; SLOT_COUNT],
    pub outcome: CharacterOutcome,
    #[serde(default)]
    pub missed_goals: Vec<MissedGoal>,
    #[serde(default)]
    pub messages: Vec<String>,
    /// Mod-provided stats of the committed loadout (base stats excluded).
    #[serde(default)]
    pub stats: StatVector,
    #[serde(default)]
    pub score: f64,
}

impl CharacterResult {
    pub fn empty(character_id: &str, outcome: CharacterOutcome) -> Self {
        Self {
            character_id: character_id.to_string(),
            mods: Default::default(),
            outcome,
            missed_goals: Vec::new(),
            messages: Vec::new(),
            stats: StatVector::new(),
            score: 0.0,
        }
    }

    pub fn mod_in(&self, slot: Slot) -> Option<&ModId> {
        self.mods[slot.index()].as_ref()
    }

    pub fn assigned_mods(&self) -> impl Iterator<Item = &ModId> {
        self.mods.iter().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Cancelled,
}

/// Terminal result of a run: per-character results in processing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub status: RunStatus,
    pub results: Vec<CharacterResult>,
}

impl RunResult {
    pub fn get(&self, character_id: &str) -> Option<&CharacterResult> {
        self.results.iter().find(|r| r.character_id == character_id)
    }
}

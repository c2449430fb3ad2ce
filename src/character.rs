use crate::consts::SLOT_COUNT;
use crate::error::{MfResult, ModForgeError};
use crate::mods::{CharacterId, SetKind, Slot};
use crate::stats::{Fixed, ModStatKind, StatKind, StatVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    /// Un-modded stats. Percent mod stats scale these.
    #[serde(default)]
    pub base_stats: StatVector,
    pub targets: Vec<Target>,
    /// Index into `targets` of the plan optimized in this pass.
    #[serde(default)]
    pub active_target: usize,
    #[serde(default)]
    pub locked: bool,
}

impl Character {
    pub fn target(&self) -> MfResult<&Target> {
        self.targets.get(self.active_target).ok_or_else(|| {
            ModForgeError::invalid_target(
                &self.id,
                format!(
                    "active target {} but only {} defined",
                    self.active_target,
                    self.targets.len()
                ),
            )
        })
    }
}

/// A per-character optimization plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub name: String,
    pub weights: StatVector,
    /// Number of complete set bonuses required per set kind.
    #[serde(default)]
    pub set_restrictions: BTreeMap<SetKind, u8>,
    /// Required primary stat per variable slot.
    #[serde(default)]
    pub primary_restrictions: BTreeMap<Slot, ModStatKind>,
    #[serde(default)]
    pub target_stats: Vec<TargetStat>,
    #[serde(default)]
    pub use_only_full_sets: bool,
}

impl Target {
    pub fn new(name: &str, weights: StatVector) -> Self {
        Self {
            name: name.to_string(),
            weights,
            set_restrictions: BTreeMap::new(),
            primary_restrictions: BTreeMap::new(),
            target_stats: Vec::new(),
            use_only_full_sets: false,
        }
    }

    /// Slots the set restrictions commit to.
    pub fn required_set_slots(&self) -> usize {
        self.set_restrictions
            .iter()
            .map(|(set, &count)| set.size() * count as usize)
            .sum()
    }

    /// Goals that steer the search (as opposed to informational ones).
    pub fn active_goals(&self) -> impl Iterator<Item = (usize, &TargetStat)> {
        self.target_stats
            .iter()
            .enumerate()
            .filter(|(_, g)| g.optimize)
    }

    /// Rejects plans no loadout could ever express.
    pub fn validate(&self, character: &str) -> MfResult<()> {
        let committed = self.required_set_slots();
        if committed > SLOT_COUNT {
            return Err(ModForgeError::invalid_target(
                character,
                format!(
                    "set restrictions commit {} slots, only {} exist",
                    committed, SLOT_COUNT
                ),
            ));
        }

        for (slot, primary) in &self.primary_restrictions {
            if !slot.is_variable() {
                return Err(ModForgeError::invalid_target(
                    character,
                    format!("{} has a fixed primary and cannot be restricted", slot),
                ));
            }
            if !slot.allowed_primaries().contains(primary) {
                return Err(ModForgeError::invalid_target(
                    character,
                    format!("{} cannot carry primary {}", slot, primary),
                ));
            }
        }

        for goal in &self.target_stats {
            if goal.minimum > goal.maximum {
                return Err(ModForgeError::invalid_target(
                    character,
                    format!(
                        "goal on {} has minimum {} above maximum {}",
                        goal.stat, goal.minimum, goal.maximum
                    ),
                ));
            }
            if let Some(rel) = &goal.relative_to {
                if rel.character == character {
                    return Err(ModForgeError::invalid_target(
                        character,
                        format!("goal on {} is relative to itself", goal.stat),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// A range goal on one stat, absolute or relative to another character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetStat {
    pub stat: StatKind,
    pub minimum: Fixed,
    pub maximum: Fixed,
    #[serde(default)]
    pub relative_to: Option<RelativeTo>,
    /// `false` marks the goal informational: reported, never chased.
    #[serde(default = "default_true")]
    pub optimize: bool,
}

fn default_true() -> bool {
    true
}

impl TargetStat {
    pub fn absolute(stat: StatKind, minimum: f64, maximum: f64) -> Self {
        Self {
            stat,
            minimum: Fixed::from_f64(minimum),
            maximum: Fixed::from_f64(maximum),
            relative_to: None,
            optimize: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeTo {
    pub character: CharacterId,
    #[serde(default)]
    pub mode: RelativeMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeMode {
    /// Bounds are added to the other character's value.
    #[default]
    Offset,
    /// Bounds are percentages of the other character's value.
    Percent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_set_restriction_is_invalid() {
        let mut t = Target::new("t", StatVector::new());
        t.set_restrictions.insert(SetKind::Speed, 1);
        t.set_restrictions.insert(SetKind::Health, 2);
        assert_eq!(t.required_set_slots(), 8);
        assert!(matches!(
            t.validate("vader"),
            Err(ModForgeError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn fixed_slot_cannot_be_restricted() {
        let mut t = Target::new("t", StatVector::new());
        t.primary_restrictions
            .insert(Slot::Square, ModStatKind::OffensePct);
        assert!(t.validate("vader").is_err());
    }

    #[test]
    fn missing_active_target_is_invalid() {
        let c = Character {
            id: "vader".into(),
            base_stats: StatVector::new(),
            targets: vec![],
            active_target: 0,
            locked: false,
        };
        assert!(c.target().is_err());
    }
}

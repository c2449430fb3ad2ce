use super::types::{Baseline, GoalResult};
use crate::character::{RelativeMode, Target};
use crate::error::{MfResult, ModForgeError};
use crate::mods::CharacterId;
use crate::stats::{Fixed, StatKind, StatVector};
use std::collections::HashMap;
use tracing::warn;

/// Lookup for goals relative to another character.
///
/// A character already committed in this run is read from its committed totals;
/// anyone else falls back to base stats as a provisional baseline.
pub struct GoalContext<'a> {
    pub base_stats: &'a HashMap<CharacterId, StatVector>,
    pub committed: &'a HashMap<CharacterId, StatVector>,
}

impl<'a> GoalContext<'a> {
    pub fn reference(&self, id: &str) -> Option<(&'a StatVector, Baseline)> {
        if let Some(totals) = self.committed.get(id) {
            return Some((totals, Baseline::Committed));
        }
        self.base_stats.get(id).map(|b| (b, Baseline::BaseStats))
    }
}

/// A goal with its reference value fixed for the duration of one character's search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedGoal {
    pub index: usize,
    pub stat: StatKind,
    pub lower: Fixed,
    pub upper: Fixed,
    /// Set for percent-relative goals: achieved is measured as a percentage of this.
    pub percent_of: Option<Fixed>,
    pub optimize: bool,
    pub baseline: Baseline,
}

/// Resolves every goal of `target` against `ctx`.
/// Returns the goals plus diagnostics for provisional baselines.
pub fn resolve_goals(
    character: &str,
    target: &Target,
    ctx: &GoalContext,
) -> MfResult<(Vec<ResolvedGoal>, Vec<String>)> {
    let mut goals = Vec::with_capacity(target.target_stats.len());
    let mut notes = Vec::new();

    for (index, goal) in target.target_stats.iter().enumerate() {
        let Some(rel) = &goal.relative_to else {
            goals.push(ResolvedGoal {
                index,
                stat: goal.stat,
                lower: goal.minimum,
                upper: goal.maximum,
                percent_of: None,
                optimize: goal.optimize,
                baseline: Baseline::Absolute,
            });
            continue;
        };

        let (stats, baseline) = ctx.reference(&rel.character).ok_or_else(|| {
            ModForgeError::invalid_target(
                character,
                format!(
                    "goal on {} is relative to unknown character '{}'",
                    goal.stat, rel.character
                ),
            )
        })?;

        if baseline == Baseline::BaseStats {
            warn!(
                "{}: goal on {} uses base stats of '{}' (not optimized earlier in this run)",
                character, goal.stat, rel.character
            );
            notes.push(format!(
                "goal on {} measured against base stats of '{}'",
                goal.stat, rel.character
            ));
        }

        let reference = stats[goal.stat];
        let resolved = match rel.mode {
            RelativeMode::Offset => ResolvedGoal {
                index,
                stat: goal.stat,
                lower: reference + goal.minimum,
                upper: reference + goal.maximum,
                percent_of: None,
                optimize: goal.optimize,
                baseline,
            },
            RelativeMode::Percent => {
                // Arithmetic guard: the ratio is undefined against a zero reference.
                if reference.is_zero() {
                    return Err(ModForgeError::invalid_target(
                        character,
                        format!(
                            "goal on {} is a percentage of '{}', whose {} is zero",
                            goal.stat, rel.character, goal.stat
                        ),
                    ));
                }
                ResolvedGoal {
                    index,
                    stat: goal.stat,
                    lower: goal.minimum,
                    upper: goal.maximum,
                    percent_of: Some(reference),
                    optimize: goal.optimize,
                    baseline,
                }
            }
        };
        goals.push(resolved);
    }

    Ok((goals, notes))
}

pub fn check_goal(goal: &ResolvedGoal, totals: &StatVector) -> GoalResult {
    let raw = totals[goal.stat];
    let achieved = match goal.percent_of {
        Some(reference) => raw
            .checked_div(reference)
            .map(|ratio| ratio.mul(Fixed::from_int(100)))
            .unwrap_or(Fixed::ZERO),
        None => raw,
    };

    let shortfall = if achieved < goal.lower {
        goal.lower - achieved
    } else if achieved > goal.upper {
        achieved - goal.upper
    } else {
        Fixed::ZERO
    };

    GoalResult {
        index: goal.index,
        stat: goal.stat,
        achieved,
        lower: goal.lower,
        upper: goal.upper,
        shortfall,
        optimize: goal.optimize,
    }
}

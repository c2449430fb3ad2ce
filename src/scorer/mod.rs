pub mod goals;
pub mod sets;
pub mod types;

pub use self::goals::{GoalContext, ResolvedGoal};
pub use self::types::{AppliedSet, Baseline, Evaluation, GoalResult};

use crate::character::{Character, Target};
use crate::consts::SLOT_COUNT;
use crate::error::MfResult;
use crate::mods::Mod;
use crate::stats::StatVector;

/// Six slots indexed by `Slot::index`, empty where nothing is equipped.
pub type Loadout<'a> = [Option<&'a Mod>; SLOT_COUNT];

/// Stat evaluator for one character and target.
///
/// Built once per character search. Everything it holds is fixed for that
/// search, so `evaluate` is a pure function of the loadout.
#[derive(Debug, Clone)]
pub struct Scorer {
    pub base: StatVector,
    pub weights: StatVector,
    pub goals: Vec<ResolvedGoal>,
    /// Treat every set bonus as max level.
    pub always_full_sets: bool,
}

impl Scorer {
    /// Resolves the target's goals against `ctx`. The returned notes describe
    /// provisional (base stat) baselines.
    pub fn new(
        character: &Character,
        target: &Target,
        ctx: &GoalContext,
        always_full_sets: bool,
    ) -> MfResult<(Self, Vec<String>)> {
        let (goals, notes) = goals::resolve_goals(&character.id, target, ctx)?;
        Ok((
            Self {
                base: character.base_stats,
                weights: target.weights,
                goals,
                always_full_sets,
            },
            notes,
        ))
    }

    /// Scorer with no goals, for totals of loadouts that are not searched.
    pub fn plain(base: StatVector, weights: StatVector, always_full_sets: bool) -> Self {
        Self {
            base,
            weights,
            goals: Vec::new(),
            always_full_sets,
        }
    }

    /// Stats a single mod adds on its own (no set bonus).
    #[inline]
    pub fn mod_stats(&self, m: &Mod) -> StatVector {
        let mut out = StatVector::new();
        m.primary.kind.contribute(m.primary.value, &self.base, &mut out);
        for s in &m.secondaries {
            s.kind.contribute(s.value, &self.base, &mut out);
        }
        out
    }

    pub fn evaluate(&self, loadout: &Loadout) -> Evaluation {
        let mut stats = StatVector::new();
        for m in loadout.iter().flatten() {
            stats += &self.mod_stats(m);
        }

        let sets = sets::applied_sets(loadout, self.always_full_sets);
        sets::apply_set_bonuses(&sets, &self.base, &mut stats);

        let totals = self.base + stats;
        let score = stats.dot(&self.weights);
        let goals = self
            .goals
            .iter()
            .map(|g| goals::check_goal(g, &totals))
            .collect();

        Evaluation {
            stats,
            totals,
            sets,
            score,
            goals,
        }
    }
}

/// One-shot evaluation of a loadout against a target.
pub fn score(
    loadout: &Loadout,
    character: &Character,
    target: &Target,
    ctx: &GoalContext,
    always_full_sets: bool,
) -> MfResult<Evaluation> {
    let (scorer, _) = Scorer::new(character, target, ctx, always_full_sets)?;
    Ok(scorer.evaluate(loadout))
}

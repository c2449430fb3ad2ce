use super::candidate::{CandidateGenerator, SearchOptions};
use super::pool::{ModPool, SlotIndices};
use super::progress::{CancellationToken, SearchProgress};
use crate::assignment::{CharacterOutcome, CharacterResult, MissedGoal};
use crate::character::Character;
use crate::config::{Config, OptimizerSettings};
use crate::consts::SLOT_COUNT;
use crate::error::{MfResult, ModForgeError};
use crate::mods::{CharacterId, Mod, ModId};
use crate::scorer::{Evaluation, GoalContext, Loadout, Scorer};
use crate::stats::{Fixed, StatVector};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Greedy, priority-ordered assignment over one pool snapshot.
///
/// Characters are solved one at a time; each commit removes its mods from the
/// pool before the next search starts. Committed totals are remembered so
/// later relative goals can read them.
pub struct AssignmentSolver<'a> {
    roster: HashMap<&'a str, &'a Character>,
    base_stats: HashMap<CharacterId, StatVector>,
    committed: HashMap<CharacterId, StatVector>,
    pool: ModPool,
    settings: OptimizerSettings,
    options: SearchOptions,
}

impl<'a> AssignmentSolver<'a> {
    pub fn new(characters: &'a [Character], mods: &[Mod], config: &Config) -> MfResult<Self> {
        let mut roster = HashMap::with_capacity(characters.len());
        for c in characters {
            if roster.insert(c.id.as_str(), c).is_some() {
                return Err(ModForgeError::Validation(format!(
                    "duplicate character id '{}'",
                    c.id
                )));
            }
        }

        let base_stats = characters
            .iter()
            .map(|c| (c.id.clone(), c.base_stats))
            .collect();

        Ok(Self {
            roster,
            base_stats,
            committed: HashMap::new(),
            pool: ModPool::snapshot(mods, &config.settings)?,
            settings: config.settings.clone(),
            options: SearchOptions::from_config(config)?,
        })
    }

    pub fn pool(&self) -> &ModPool {
        &self.pool
    }

    fn character(&self, id: &str) -> MfResult<&'a Character> {
        self.roster
            .get(id)
            .copied()
            .ok_or_else(|| ModForgeError::Validation(format!("unknown character '{}'", id)))
    }

    /// Checks the order and takes locked (and, if configured, unselected)
    /// characters' mods out of the pool before any search.
    pub fn prepare(&mut self, order: &[CharacterId]) -> MfResult<()> {
        let mut seen = HashSet::new();
        for id in order {
            self.character(id)?;
            if !seen.insert(id.as_str()) {
                return Err(ModForgeError::Validation(format!(
                    "character '{}' appears twice in the order",
                    id
                )));
            }
        }

        let mut reserved = 0;
        let mut ids: Vec<&str> = self.roster.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let character = self.roster[id];
            let unselected = self.settings.lock_unselected_characters && !seen.contains(id);
            if character.locked || unselected {
                reserved += self.pool.reserve_equipped(id);
            }
        }
        if reserved > 0 {
            info!("Reserved {} mods on locked or unselected characters", reserved);
        }
        Ok(())
    }

    fn loadout(&self, mods: &SlotIndices) -> Loadout<'_> {
        mods.map(|i| i.map(|i| self.pool.get(i)))
    }

    fn ids(&self, mods: &SlotIndices) -> [Option<ModId>; SLOT_COUNT] {
        mods.map(|i| i.map(|i| self.pool.get(i).id.clone()))
    }

    fn plain_evaluation(&self, character: &Character, mods: &SlotIndices) -> Evaluation {
        let weights = character
            .target()
            .map(|t| t.weights)
            .unwrap_or_default();
        Scorer::plain(
            character.base_stats,
            weights,
            self.settings.simulate_level_15_mods,
        )
        .evaluate(&self.loadout(mods))
    }

    fn build_result(
        &self,
        id: &str,
        mods: &SlotIndices,
        outcome: CharacterOutcome,
        evaluation: &Evaluation,
        missed_goals: Vec<MissedGoal>,
        messages: Vec<String>,
    ) -> CharacterResult {
        CharacterResult {
            character_id: id.to_string(),
            mods: self.ids(mods),
            outcome,
            missed_goals,
            messages,
            stats: evaluation.stats,
            score: evaluation.score.to_f64(),
        }
    }

    /// Commits a result from an earlier run unchanged. Fails if any of its
    /// mods is no longer in the pool or is now held by someone else.
    pub fn reuse(&mut self, previous: &CharacterResult) -> MfResult<CharacterResult> {
        let character = self.character(&previous.character_id)?;
        let mut mods: SlotIndices = [None; SLOT_COUNT];
        for (slot, id) in previous.mods.iter().enumerate() {
            let Some(id) = id else { continue };
            let idx = self.pool.index_of(id).ok_or_else(|| {
                ModForgeError::Validation(format!(
                    "previous result for '{}' uses unknown mod '{}'",
                    previous.character_id, id
                ))
            })?;
            mods[slot] = Some(idx);
        }

        if character.locked {
            // Already reserved up front; nothing to commit.
            let eval = self.plain_evaluation(character, &mods);
            self.committed.insert(character.id.clone(), eval.totals);
            return Ok(CharacterResult {
                outcome: CharacterOutcome::Locked,
                ..previous.clone()
            });
        }

        self.pool.commit(&character.id, &mods)?;
        let eval = self.plain_evaluation(character, &mods);
        self.committed.insert(character.id.clone(), eval.totals);
        debug!("Reused previous loadout for {}", character.id);

        Ok(CharacterResult {
            outcome: CharacterOutcome::Reused,
            ..previous.clone()
        })
    }

    fn failed(&self, id: &str, err: ModForgeError) -> CharacterResult {
        warn!("{}", err);
        let mut result = CharacterResult::empty(id, CharacterOutcome::Failed);
        result.messages.push(err.to_string());
        result
    }

    /// Searches and commits one character. An invalid target yields a
    /// `Failed` result and leaves the pool untouched; cancellation during the
    /// search commits the best loadout found so far as `Partial`.
    pub fn solve_character(
        &mut self,
        id: &str,
        cancel: &CancellationToken,
        report: &mut dyn FnMut(SearchProgress),
    ) -> MfResult<CharacterResult> {
        let character = self.character(id)?;

        if character.locked {
            let mods = self.pool.equipped_on(id);
            let eval = self.plain_evaluation(character, &mods);
            self.committed.insert(character.id.clone(), eval.totals);
            let mut result = self.build_result(
                id,
                &mods,
                CharacterOutcome::Locked,
                &eval,
                Vec::new(),
                Vec::new(),
            );
            result.messages.push("character is locked".to_string());
            return Ok(result);
        }

        let target = match character.target().and_then(|t| t.validate(id).map(|_| t)) {
            Ok(t) => t,
            Err(e @ ModForgeError::InvalidTarget { .. }) => return Ok(self.failed(id, e)),
            Err(e) => return Err(e),
        };

        let ctx = GoalContext {
            base_stats: &self.base_stats,
            committed: &self.committed,
        };
        let (scorer, mut messages) = match Scorer::new(
            character,
            target,
            &ctx,
            self.settings.simulate_level_15_mods,
        ) {
            Ok(s) => s,
            Err(e @ ModForgeError::InvalidTarget { .. }) => return Ok(self.failed(id, e)),
            Err(e) => return Err(e),
        };

        let pinned = self.pool.pinned_for(id);
        let current = self.pool.current_loadout(id);

        let mut generator =
            CandidateGenerator::new(&self.pool, &scorer, target, pinned, &self.options);
        let candidate = generator.generate(cancel, report);
        messages.extend(candidate.messages.iter().cloned());

        let mut chosen = candidate.mods;
        let mut evaluation = candidate.evaluation;
        let mut missed = candidate.missed_goals;
        let mut outcome = if candidate.interrupted {
            CharacterOutcome::Partial
        } else {
            CharacterOutcome::Optimized
        };

        let threshold = self.settings.mod_change_threshold;
        if threshold > 0.0 && current.iter().all(Option::is_some) && current != chosen {
            let (current_eval, current_missed) = generator.assess(&current);
            let margin = current_eval
                .score
                .abs()
                .mul(Fixed::from_f64(threshold / 100.0));
            if evaluation.score <= current_eval.score + margin {
                messages.push(format!(
                    "kept current mods: new loadout is not {}% better",
                    threshold
                ));
                chosen = current;
                evaluation = current_eval;
                missed = current_missed;
                outcome = CharacterOutcome::Kept;
            }
        }

        self.pool.commit(id, &chosen)?;
        self.committed.insert(id.to_string(), evaluation.totals);

        if !missed.is_empty() {
            debug!("{}: {} missed goal(s)", id, missed.len());
        }

        Ok(self.build_result(id, &chosen, outcome, &evaluation, missed, messages))
    }
}

use super::partitions::{self, SetPartition, SlotLabels};
use super::pool::{ModPool, SlotIndices};
use super::progress::{CancellationToken, SearchProgress};
use crate::assignment::{GoalRef, MissedGoal};
use crate::character::Target;
use crate::config::Config;
use crate::consts::SLOT_COUNT;
use crate::error::MfResult;
use crate::mods::{SetKind, SET_COUNT};
use crate::scorer::sets::{partial_set_mods, set_counts};
use crate::scorer::{Evaluation, Loadout, Scorer};
use crate::stats::{Fixed, StatVector};
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Search knobs derived from the run configuration.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub force_full_sets: bool,
    pub use_restrictions: bool,
    pub shortlist_size: usize,
    pub ladder: Vec<Fixed>,
    pub parallel: bool,
}

impl SearchOptions {
    pub fn from_config(cfg: &Config) -> MfResult<Self> {
        cfg.search.validate()?;
        Ok(Self {
            force_full_sets: cfg.settings.force_complete_sets,
            use_restrictions: cfg.settings.optimize_with_primary_and_set_restrictions,
            shortlist_size: cfg.search.shortlist_size,
            ladder: cfg.search.get_goal_ladder()?,
            parallel: cfg.search.parallel_scoring,
        })
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            force_full_sets: false,
            use_restrictions: true,
            shortlist_size: crate::consts::DEFAULT_SHORTLIST_SIZE,
            ladder: vec![
                Fixed::from_f64(0.5),
                Fixed::ONE,
                Fixed::from_int(2),
                Fixed::from_int(5),
                Fixed::from_int(20),
            ],
            parallel: true,
        }
    }
}

/// Best loadout found for one character and target.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub mods: SlotIndices,
    pub evaluation: Evaluation,
    pub missed_goals: Vec<MissedGoal>,
    pub messages: Vec<String>,
    /// The search stopped on cancellation; `mods` is the best found until then.
    pub interrupted: bool,
}

/// Ordering of candidate loadouts, best is greatest.
///
/// Fields compare in declaration order: full-set conformance (when required),
/// then active goals met, then scalar score, then restrictions met, then the
/// lowest mod ids. A loadout meeting more goals beats a higher-scoring one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct RankKey {
    pub full_sets_ok: bool,
    pub goals_met: usize,
    pub score: Fixed,
    pub restrictions_met: usize,
    /// Pool indices follow mod id order, so this prefers the lowest ids.
    pub ids: Reverse<SlotIndices>,
}

#[derive(Debug, Clone)]
struct Scored {
    mods: SlotIndices,
    eval: Evaluation,
    key: RankKey,
}

struct Entry {
    idx: usize,
    stats: StatVector,
}

/// Top mods per slot under one weighting, overall and per set kind.
#[derive(Default)]
struct Shortlist {
    any: [Vec<usize>; SLOT_COUNT],
    by_set: [[Vec<usize>; SET_COUNT]; SLOT_COUNT],
}

/// Mutable state shared by all passes of one search.
struct SearchState {
    best: Option<Scored>,
    seen: HashSet<SlotIndices>,
    passes_done: usize,
    total_passes: usize,
    interrupted: bool,
}

impl SearchState {
    fn offer(&mut self, s: Scored) {
        if self.best.as_ref().is_none_or(|b| s.key > b.key) {
            self.best = Some(s);
        }
    }
}

/// Searches the available pool for one character's best six-mod loadout.
pub struct CandidateGenerator<'a> {
    pool: &'a ModPool,
    scorer: &'a Scorer,
    target: &'a Target,
    options: &'a SearchOptions,
    pinned: SlotIndices,
    buckets: [Vec<Entry>; SLOT_COUNT],
    full_sets: bool,
    notes: Vec<String>,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(
        pool: &'a ModPool,
        scorer: &'a Scorer,
        target: &'a Target,
        pinned: SlotIndices,
        options: &'a SearchOptions,
    ) -> Self {
        let open: Vec<usize> = pool
            .available()
            .filter(|(_, m)| pinned[m.slot.index()].is_none())
            .map(|(i, _)| i)
            .collect();

        // Scoring mods is read-only, so it fans out across threads.
        let entries: Vec<Entry> = if options.parallel {
            open.par_iter()
                .map(|&idx| Entry {
                    idx,
                    stats: scorer.mod_stats(pool.get(idx)),
                })
                .collect()
        } else {
            open.iter()
                .map(|&idx| Entry {
                    idx,
                    stats: scorer.mod_stats(pool.get(idx)),
                })
                .collect()
        };

        let mut buckets: [Vec<Entry>; SLOT_COUNT] = Default::default();
        for e in entries {
            buckets[pool.get(e.idx).slot.index()].push(e);
        }

        let mut notes = Vec::new();
        if options.use_restrictions {
            for (slot, primary) in &target.primary_restrictions {
                if pinned[slot.index()].is_some() {
                    continue;
                }
                let bucket = &mut buckets[slot.index()];
                let matching = bucket
                    .iter()
                    .filter(|e| pool.get(e.idx).primary.kind == *primary)
                    .count();
                if matching > 0 {
                    bucket.retain(|e| pool.get(e.idx).primary.kind == *primary);
                } else {
                    notes.push(format!(
                        "no {} {} available; searched without the primary restriction",
                        primary, slot
                    ));
                }
            }
        }

        Self {
            pool,
            scorer,
            target,
            options,
            pinned,
            buckets,
            full_sets: target.use_only_full_sets || options.force_full_sets,
            notes,
        }
    }

    fn shortlist(&self, weights: &StatVector) -> Shortlist {
        let k = self.options.shortlist_size.max(1);
        let mut sl = Shortlist::default();

        for (slot, bucket) in self.buckets.iter().enumerate() {
            let mut ranked: Vec<(Fixed, usize)> = bucket
                .iter()
                .map(|e| (e.stats.dot(weights), e.idx))
                .collect();
            ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

            for &(_, idx) in &ranked {
                if sl.any[slot].len() < k {
                    sl.any[slot].push(idx);
                }
                let per_set = &mut sl.by_set[slot][self.pool.get(idx).set as usize];
                if per_set.len() < k {
                    per_set.push(idx);
                }
            }
        }
        sl
    }

    /// Whether any assignment of `labels` can be filled from the pool.
    fn labels_feasible(&self, labels: &SlotLabels) -> bool {
        labels.iter().enumerate().all(|(slot, label)| {
            match (self.pinned[slot], label) {
                (_, None) => true,
                (Some(p), Some(set)) => self.pool.get(p).set == *set,
                (None, Some(set)) => self.buckets[slot]
                    .iter()
                    .any(|e| self.pool.get(e.idx).set == *set),
            }
        })
    }

    fn partition_feasible(&self, p: &SetPartition) -> bool {
        p.labelings().iter().any(|l| self.labels_feasible(l))
    }

    fn assemble(&self, labels: &SlotLabels, sl: &Shortlist) -> Option<SlotIndices> {
        let mut mods = [None; SLOT_COUNT];
        for slot in 0..SLOT_COUNT {
            if let Some(p) = self.pinned[slot] {
                if let Some(set) = labels[slot] {
                    if self.pool.get(p).set != set {
                        return None;
                    }
                }
                mods[slot] = Some(p);
                continue;
            }
            mods[slot] = match labels[slot] {
                // A free slot would only add a partial set.
                None if self.full_sets => None,
                None => sl.any[slot].first().copied(),
                Some(set) => Some(*sl.by_set[slot][set as usize].first()?),
            };
        }
        Some(mods)
    }

    fn restrictions_met(&self, mods: &SlotIndices, counts: &[usize; SET_COUNT]) -> usize {
        let primaries = self
            .target
            .primary_restrictions
            .iter()
            .filter(|(slot, primary)| {
                mods[slot.index()].is_some_and(|i| self.pool.get(i).primary.kind == **primary)
            })
            .count();
        let sets: usize = self
            .target
            .set_restrictions
            .iter()
            .map(|(set, &n)| (counts[*set as usize] / set.size()).min(n as usize))
            .sum();
        primaries + sets
    }

    fn score(&self, mods: &SlotIndices) -> Scored {
        let loadout: Loadout = mods.map(|i| i.map(|i| self.pool.get(i)));
        let eval = self.scorer.evaluate(&loadout);
        let counts = set_counts(&loadout);
        let key = RankKey {
            full_sets_ok: !self.full_sets || partial_set_mods(&counts) == 0,
            goals_met: eval.active_goals_met(),
            score: eval.score,
            restrictions_met: self.restrictions_met(mods, &counts),
            ids: Reverse(*mods),
        };
        Scored {
            mods: *mods,
            eval,
            key,
        }
    }

    /// Single-slot swaps from the shortlist while they improve the rank.
    fn refine(&self, start: Scored, labels: &SlotLabels, sl: &Shortlist) -> Scored {
        let mut current = start;
        for _ in 0..2 {
            let mut improved = false;
            for slot in 0..SLOT_COUNT {
                if self.pinned[slot].is_some() {
                    continue;
                }
                let alternatives = match labels[slot] {
                    None if self.full_sets => continue,
                    None => &sl.any[slot],
                    Some(set) => &sl.by_set[slot][set as usize],
                };
                for &alt in alternatives {
                    if current.mods[slot] == Some(alt) {
                        continue;
                    }
                    let mut mods = current.mods;
                    mods[slot] = Some(alt);
                    let s = self.score(&mods);
                    if s.key > current.key {
                        current = s;
                        improved = true;
                    }
                }
            }
            if !improved {
                break;
            }
        }
        current
    }

    /// Returns false when cancellation stopped the pass early.
    #[allow(clippy::too_many_arguments)]
    fn run_pass(
        &self,
        state: &mut SearchState,
        partitions: &[SetPartition],
        sl: &Shortlist,
        target_stat_index: usize,
        target_stat_count: usize,
        cancel: &CancellationToken,
        report: &mut dyn FnMut(SearchProgress),
    ) -> bool {
        let count = partitions.len().max(1);
        let total_units = (state.total_passes * count).max(1);

        for (pi, partition) in partitions.iter().enumerate() {
            if cancel.is_cancelled() {
                state.interrupted = true;
                return false;
            }

            let done = state.passes_done * count + pi;
            report(SearchProgress {
                set_partition_index: pi,
                set_partition_count: partitions.len(),
                target_stat_index,
                target_stat_count,
                permutation_percent: (done * 100 / total_units).min(100) as u8,
            });

            let mut partition_best: Option<(Scored, SlotLabels)> = None;
            for labels in partition.labelings() {
                let Some(mods) = self.assemble(&labels, sl) else {
                    continue;
                };
                if !state.seen.insert(mods) {
                    continue;
                }
                let s = self.score(&mods);
                if partition_best.as_ref().is_none_or(|(b, _)| s.key > b.key) {
                    partition_best = Some((s, labels));
                }
            }

            if let Some((s, labels)) = partition_best {
                let refined = self.refine(s, &labels, sl);
                state.seen.insert(refined.mods);
                state.offer(refined);
            }
        }

        state.passes_done += 1;
        true
    }

    /// Picks the most demanding relaxation of the set restrictions the pool can satisfy.
    fn choose_required_sets(&mut self) -> BTreeMap<SetKind, u8> {
        if !self.options.use_restrictions {
            return BTreeMap::new();
        }
        let required = &self.target.set_restrictions;
        for variant in partitions::relaxations(required) {
            let feasible = partitions::enumerate(&variant)
                .iter()
                .any(|p| self.partition_feasible(p));
            if feasible {
                if &variant != required {
                    warn!(
                        "set restrictions {:?} cannot be met from the pool; relaxed to {:?}",
                        required, variant
                    );
                    self.notes.push(format!(
                        "set restrictions relaxed to {:?} (not enough mods)",
                        variant
                    ));
                }
                return variant;
            }
        }
        BTreeMap::new()
    }

    /// Runs the full search. Never fails: scarce mods degrade to missed goals,
    /// and cancellation (checked between set partitions) ends the search with
    /// the best loadout found so far.
    pub fn generate(
        &mut self,
        cancel: &CancellationToken,
        report: &mut dyn FnMut(SearchProgress),
    ) -> Candidate {
        let required = self.choose_required_sets();
        let partitions: Vec<SetPartition> = partitions::enumerate(&required)
            .into_iter()
            .filter(|p| self.partition_feasible(p))
            .collect();

        let active: Vec<(usize, crate::stats::StatKind)> = self
            .target
            .active_goals()
            .map(|(i, g)| (i, g.stat))
            .collect();
        let ladder = &self.options.ladder;
        let target_stat_count = active.len() + 1;

        let mut state = SearchState {
            best: None,
            seen: HashSet::new(),
            passes_done: 0,
            total_passes: 1 + active.len() * ladder.len(),
            interrupted: false,
        };

        let weights = self.scorer.weights;
        let base_list = self.shortlist(&weights);
        self.run_pass(
            &mut state,
            &partitions,
            &base_list,
            0,
            target_stat_count,
            cancel,
            report,
        );

        // Each unmet goal gets passes with its stat pushed toward the range.
        let scale = weights.max_abs().max(Fixed::ONE);
        for (gi, (goal_index, stat)) in active.iter().enumerate() {
            if state.interrupted {
                break;
            }
            let Some(result) = state
                .best
                .as_ref()
                .and_then(|b| b.eval.goal(*goal_index).copied())
            else {
                continue;
            };
            if result.met() {
                state.passes_done += ladder.len();
                continue;
            }
            let raise = result.achieved < result.lower;
            debug!(
                "chasing goal {} on {} ({})",
                goal_index,
                stat,
                if raise { "raise" } else { "lower" }
            );

            for (step, multiplier) in ladder.iter().enumerate() {
                let push = scale.mul(*multiplier);
                let mut w = weights;
                w.add_stat(*stat, if raise { push } else { -push });
                let sl = self.shortlist(&w);
                let finished = self.run_pass(
                    &mut state,
                    &partitions,
                    &sl,
                    gi + 1,
                    target_stat_count,
                    cancel,
                    report,
                );
                if !finished {
                    break;
                }

                let met = state
                    .best
                    .as_ref()
                    .and_then(|b| b.eval.goal(*goal_index))
                    .is_some_and(|g| g.met());
                if met {
                    state.passes_done += ladder.len() - step - 1;
                    break;
                }
            }
        }

        if state.interrupted {
            warn!(
                "search cancelled after {} of {} passes",
                state.passes_done, state.total_passes
            );
            self.notes
                .push("search cancelled; kept the best loadout found so far".to_string());
        } else {
            report(SearchProgress {
                set_partition_index: partitions.len(),
                set_partition_count: partitions.len(),
                target_stat_index: active.len(),
                target_stat_count,
                permutation_percent: 100,
            });
        }

        let best = match state.best {
            Some(b) => b,
            // No feasible partition, or cancelled before the first one: pins only.
            None => self.score(&self.pinned),
        };

        let missed_goals = self.missed_goals(&best);
        Candidate {
            mods: best.mods,
            evaluation: best.eval,
            missed_goals,
            messages: self.notes.clone(),
            interrupted: state.interrupted,
        }
    }

    /// Evaluation and missed goals of an arbitrary loadout, e.g. the one a
    /// character already wears.
    pub fn assess(&self, mods: &SlotIndices) -> (Evaluation, Vec<MissedGoal>) {
        let scored = self.score(mods);
        let missed = self.missed_goals(&scored);
        (scored.eval, missed)
    }

    fn missed_goals(&self, best: &Scored) -> Vec<MissedGoal> {
        let mut missed = Vec::new();

        for g in best.eval.goals.iter().filter(|g| !g.met()) {
            missed.push(MissedGoal {
                goal: GoalRef::Stat {
                    goal: self.target.target_stats[g.index].clone(),
                },
                shortfall: g.shortfall.to_f64(),
            });
        }

        for (slot, primary) in &self.target.primary_restrictions {
            let ok = best.mods[slot.index()]
                .is_some_and(|i| self.pool.get(i).primary.kind == *primary);
            if !ok {
                missed.push(MissedGoal {
                    goal: GoalRef::Primary {
                        slot: *slot,
                        primary: *primary,
                    },
                    shortfall: 1.0,
                });
            }
        }

        let loadout: Loadout = best.mods.map(|i| i.map(|i| self.pool.get(i)));
        let counts = set_counts(&loadout);
        for (set, &required) in &self.target.set_restrictions {
            let achieved = counts[*set as usize] / set.size();
            if achieved < required as usize {
                missed.push(MissedGoal {
                    goal: GoalRef::Set {
                        set: *set,
                        required,
                    },
                    shortfall: (required as usize - achieved) as f64,
                });
            }
        }

        let partial = partial_set_mods(&counts);
        if self.full_sets && partial > 0 {
            missed.push(MissedGoal {
                goal: GoalRef::FullSets,
                shortfall: partial as f64,
            });
        }

        missed
    }
}

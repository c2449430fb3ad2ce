mod common;

use common::*;
use modforge::assignment::GoalRef;
use modforge::character::{Character, TargetStat};
use modforge::config::OptimizerSettings;
use modforge::mods::{Mod, SetKind, Slot};
use modforge::optimizer::{
    Candidate, CancellationToken, CandidateGenerator, ModPool, SearchOptions, SearchProgress,
};
use modforge::scorer::{GoalContext, Scorer};
use modforge::stats::{Fixed, ModStatKind, StatKind, StatVector};
use std::collections::HashMap;

fn generate(
    character: &Character,
    mods: &[Mod],
    cancel: &CancellationToken,
    progress: &mut Vec<SearchProgress>,
) -> Candidate {
    let pool = ModPool::snapshot(mods, &OptimizerSettings::default()).unwrap();
    let target = character.target().unwrap();
    let base = HashMap::new();
    let committed = HashMap::new();
    let ctx = GoalContext {
        base_stats: &base,
        committed: &committed,
    };
    let (scorer, _) = Scorer::new(character, target, &ctx, false).unwrap();
    let options = SearchOptions::default();
    let mut generator =
        CandidateGenerator::new(&pool, &scorer, target, pool.pinned_for(&character.id), &options);
    generator.generate(cancel, &mut |p| progress.push(p))
}

#[test]
fn goal_ladder_trades_score_for_an_unmet_minimum() {
    // health-heavy mods win on weight alone; speedy ones are needed for the goal
    let mut mods = Vec::new();
    for slot in Slot::ALL {
        mods.push(
            ModBuilder::new(&format!("hp_{}", slot), slot)
                .secondary(ModStatKind::Health, 100.0)
                .build(),
        );
        mods.push(
            ModBuilder::new(&format!("sp_{}", slot), slot)
                .secondary(ModStatKind::Health, 20.0)
                .speed(5.0)
                .build(),
        );
    }
    let c = CharacterBuilder::new("c")
        .weights(StatVector::from_pairs([(StatKind::Health, Fixed::ONE)]))
        .goal(TargetStat::absolute(StatKind::Speed, 20.0, 1000.0))
        .build();

    let mut progress = Vec::new();
    let cand = generate(&c, &mods, &CancellationToken::new(), &mut progress);

    assert!(cand.evaluation.totals[StatKind::Speed] >= Fixed::from_int(20));
    assert!(cand.missed_goals.is_empty());
    // all six health mods would score 600; meeting the goal ranks above that
    assert!(cand.evaluation.score < Fixed::from_int(600));
    assert!(progress.iter().any(|p| p.target_stat_index == 1));
    assert_eq!(progress.last().map(|p| p.permutation_percent), Some(100));
}

#[test]
fn missing_primary_falls_back_with_a_note() {
    let mods = full_loadout("m", SetKind::Health, 1.0);
    let c = CharacterBuilder::new("c")
        .require_primary(Slot::Cross, ModStatKind::Tenacity)
        .build();

    let cand = generate(&c, &mods, &CancellationToken::new(), &mut Vec::new());

    assert!(cand.mods.iter().all(Option::is_some));
    assert!(cand.messages.iter().any(|m| m.contains("tenacity")));
    assert!(cand.missed_goals.iter().any(|m| matches!(
        m.goal,
        GoalRef::Primary {
            slot: Slot::Cross,
            ..
        }
    )));
}

#[test]
fn matching_primary_is_preferred_over_raw_speed() {
    let mut mods = full_loadout("m", SetKind::Health, 5.0);
    mods.push(
        ModBuilder::new("z_cross", Slot::Cross)
            .primary(ModStatKind::Tenacity, 24.0)
            .build(),
    );
    let c = CharacterBuilder::new("c")
        .require_primary(Slot::Cross, ModStatKind::Tenacity)
        .build();

    let cand = generate(&c, &mods, &CancellationToken::new(), &mut Vec::new());
    let pool = ModPool::snapshot(&mods, &OptimizerSettings::default()).unwrap();
    let cross = cand.mods[Slot::Cross.index()].map(|i| pool.get(i).id.clone());

    assert_eq!(cross.as_deref(), Some("z_cross"));
    assert!(cand.missed_goals.is_empty());
}

#[test]
fn empty_pool_gives_empty_loadout() {
    let c = CharacterBuilder::new("c").require_set(SetKind::Speed, 1).build();
    let cand = generate(&c, &[], &CancellationToken::new(), &mut Vec::new());

    assert!(cand.mods.iter().all(Option::is_none));
    assert!(cand
        .missed_goals
        .iter()
        .any(|m| matches!(m.goal, GoalRef::Set { set: SetKind::Speed, .. })));
}

#[test]
fn search_cancelled_before_any_partition_keeps_only_pins() {
    let token = CancellationToken::new();
    token.cancel();
    let mut mods = full_loadout("m", SetKind::Health, 1.0);
    mods.push(
        ModBuilder::new("pinned", Slot::Circle)
            .speed(0.0)
            .on("c")
            .locked()
            .build(),
    );
    let c = CharacterBuilder::new("c").build();

    let mut progress = Vec::new();
    let cand = generate(&c, &mods, &token, &mut progress);
    let pool = ModPool::snapshot(&mods, &OptimizerSettings::default()).unwrap();

    assert!(cand.interrupted);
    assert!(progress.is_empty());
    assert_eq!(
        cand.mods[Slot::Circle.index()],
        pool.index_of("pinned")
    );
    assert_eq!(cand.mods.iter().flatten().count(), 1);
    assert!(cand.messages.iter().any(|m| m.contains("cancelled")));
}

#[test]
fn ties_go_to_the_lowest_ids() {
    let mut mods = full_loadout("b", SetKind::Health, 3.0);
    mods.extend(full_loadout("a", SetKind::Health, 3.0));
    let c = CharacterBuilder::new("c").build();

    let cand = generate(&c, &mods, &CancellationToken::new(), &mut Vec::new());
    let pool = ModPool::snapshot(&mods, &OptimizerSettings::default()).unwrap();
    assert!(cand
        .mods
        .iter()
        .flatten()
        .all(|&i| pool.get(i).id.starts_with('a')));
}

#[test]
fn full_sets_leave_unmatched_slots_empty() {
    let mut mods: Vec<Mod> = [Slot::Square, Slot::Arrow, Slot::Diamond, Slot::Triangle]
        .iter()
        .map(|&slot| ModBuilder::new(&format!("hp_{}", slot), slot).speed(2.0).build())
        .collect();
    mods.push(
        ModBuilder::new("odd_circle", Slot::Circle)
            .set(SetKind::Speed)
            .speed(10.0)
            .build(),
    );
    mods.push(
        ModBuilder::new("odd_cross", Slot::Cross)
            .set(SetKind::Potency)
            .speed(10.0)
            .build(),
    );
    let c = CharacterBuilder::new("c").full_sets().build();

    let cand = generate(&c, &mods, &CancellationToken::new(), &mut Vec::new());
    let pool = ModPool::snapshot(&mods, &OptimizerSettings::default()).unwrap();
    let chosen: Vec<&str> = cand
        .mods
        .iter()
        .flatten()
        .map(|&i| pool.get(i).id.as_str())
        .collect();

    assert_eq!(chosen, ["hp_square", "hp_arrow", "hp_diamond", "hp_triangle"]);
    assert_eq!(cand.mods[Slot::Circle.index()], None);
    assert_eq!(cand.mods[Slot::Cross.index()], None);
    assert!(cand.missed_goals.is_empty());
    assert_eq!(cand.evaluation.stats[StatKind::Speed], Fixed::from_int(8));
}

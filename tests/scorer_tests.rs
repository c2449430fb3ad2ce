mod common;

use common::*;
use modforge::character::TargetStat;
use modforge::mods::{Mod, SetKind, Slot};
use modforge::scorer::{self, GoalContext, Loadout};
use modforge::stats::{Fixed, ModStatKind, StatKind, StatVector};
use rstest::rstest;
use std::collections::HashMap;

fn loadout(mods: &[Mod]) -> Loadout<'_> {
    let mut out: Loadout = [None; 6];
    for m in mods {
        out[m.slot.index()] = Some(m);
    }
    out
}

fn empty_ctx() -> (HashMap<String, StatVector>, HashMap<String, StatVector>) {
    (HashMap::new(), HashMap::new())
}

#[rstest]
// full bonus: every mod max level
#[case(15, false, 110.0)]
// one mod below 15: reduced bonus
#[case(12, false, 105.0)]
// simulated level 15 always counts as full
#[case(12, true, 110.0)]
fn speed_set_bonus_scales_base_speed(
    #[case] level: u8,
    #[case] always_full: bool,
    #[case] expected: f64,
) {
    let mods: Vec<Mod> = [Slot::Square, Slot::Arrow, Slot::Diamond, Slot::Triangle]
        .iter()
        .enumerate()
        .map(|(i, &slot)| {
            ModBuilder::new(&format!("s{}", i), slot)
                .set(SetKind::Speed)
                .level(if i == 0 { level } else { 15 })
                .build()
        })
        .collect();
    let c = CharacterBuilder::new("c").base(StatKind::Speed, 100.0).build();
    let (base, committed) = empty_ctx();
    let ctx = GoalContext {
        base_stats: &base,
        committed: &committed,
    };

    let eval = scorer::score(&loadout(&mods), &c, &c.targets[0], &ctx, always_full).unwrap();
    assert_eq!(eval.totals[StatKind::Speed], Fixed::from_f64(expected));
}

#[test]
fn partial_sets_grant_nothing() {
    let mods = vec![
        ModBuilder::new("a", Slot::Square).set(SetKind::Speed).build(),
        ModBuilder::new("b", Slot::Arrow).set(SetKind::Speed).build(),
        ModBuilder::new("c", Slot::Diamond).set(SetKind::Speed).build(),
    ];
    let c = CharacterBuilder::new("c").base(StatKind::Speed, 100.0).build();
    let (base, committed) = empty_ctx();
    let ctx = GoalContext {
        base_stats: &base,
        committed: &committed,
    };
    let eval = scorer::score(&loadout(&mods), &c, &c.targets[0], &ctx, false).unwrap();

    assert_eq!(eval.totals[StatKind::Speed], Fixed::from_int(100));
    assert_eq!(eval.sets.len(), 1);
    assert_eq!(eval.sets[0].bonuses, 0);
}

#[rstest]
#[case(ModStatKind::Offense, 50.0, StatKind::PhysicalDamage, 50.0)]
#[case(ModStatKind::Offense, 50.0, StatKind::SpecialDamage, 50.0)]
#[case(ModStatKind::OffensePct, 5.0, StatKind::PhysicalDamage, 200.0)]
#[case(ModStatKind::HealthPct, 2.5, StatKind::Health, 500.0)]
#[case(ModStatKind::DefensePct, 10.0, StatKind::Armor, 50.0)]
#[case(ModStatKind::CritChance, 2.0, StatKind::SpecialCritChance, 2.0)]
fn secondary_stats_map_to_character_stats(
    #[case] kind: ModStatKind,
    #[case] value: f64,
    #[case] stat: StatKind,
    #[case] expected_gain: f64,
) {
    let m = ModBuilder::new("m", Slot::Triangle).secondary(kind, value).build();
    let c = CharacterBuilder::new("c")
        .base(StatKind::Health, 20_000.0)
        .base(StatKind::PhysicalDamage, 4_000.0)
        .base(StatKind::Armor, 500.0)
        .build();
    let (base, committed) = empty_ctx();
    let ctx = GoalContext {
        base_stats: &base,
        committed: &committed,
    };
    let eval = scorer::score(&loadout(&[m]), &c, &c.targets[0], &ctx, false).unwrap();

    assert_eq!(eval.stats[stat], Fixed::from_f64(expected_gain));
}

#[test]
fn score_weights_mod_stats_only() {
    let mods = full_loadout("m", SetKind::Health, 5.0);
    let c = CharacterBuilder::new("c")
        .base(StatKind::Speed, 150.0)
        .weights(speed_weights(2))
        .build();
    let (base, committed) = empty_ctx();
    let ctx = GoalContext {
        base_stats: &base,
        committed: &committed,
    };
    let eval = scorer::score(&loadout(&mods), &c, &c.targets[0], &ctx, false).unwrap();

    assert_eq!(eval.score, Fixed::from_int(60));
    assert_eq!(eval.totals[StatKind::Speed], Fixed::from_int(180));
}

#[rstest]
#[case(100.0, 120.0, 5.0)]
#[case(80.0, 120.0, 0.0)]
#[case(80.0, 90.0, 5.0)]
fn goal_shortfall_is_distance_to_range(#[case] min: f64, #[case] max: f64, #[case] shortfall: f64) {
    let mods: Vec<Mod> = Slot::ALL
        .iter()
        .zip([20.0, 20.0, 20.0, 20.0, 15.0, 0.0])
        .map(|(&slot, v)| ModBuilder::new(&format!("m{}", slot), slot).speed(v).build())
        .collect();
    let c = CharacterBuilder::new("c")
        .goal(TargetStat::absolute(StatKind::Speed, min, max))
        .build();
    let (base, committed) = empty_ctx();
    let ctx = GoalContext {
        base_stats: &base,
        committed: &committed,
    };
    let eval = scorer::score(&loadout(&mods), &c, &c.targets[0], &ctx, false).unwrap();

    assert_eq!(eval.goals[0].achieved, Fixed::from_int(95));
    assert_eq!(eval.goals[0].shortfall, Fixed::from_f64(shortfall));
    assert_eq!(eval.active_goals_met(), usize::from(shortfall == 0.0));
}

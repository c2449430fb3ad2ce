mod common;

use common::*;
use modforge::assignment::RunResult;
use modforge::character::Character;
use modforge::config::Config;
use modforge::mods::{Mod, SetKind, Slot};
use modforge::optimizer::{optimize, CancellationToken, RunRequest};
use modforge::stats::{Fixed, ModStatKind, StatKind, StatVector};
use modforge::synth::{self, SynthParams};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use strum::IntoEnumIterator;

// --- STRATEGIES ---

prop_compose! {
    fn arb_mod(index: usize)(
        slot in 0usize..6,
        set in 0usize..8,
        speed in 0u32..20,
        health in 0u32..500,
    ) -> Mod {
        let slot = Slot::ALL[slot];
        let set = SetKind::iter().nth(set).unwrap_or(SetKind::Health);
        ModBuilder::new(&format!("m{:03}", index), slot)
            .set(set)
            .speed(speed as f64)
            .secondary(ModStatKind::Health, health as f64)
            .build()
    }
}

fn arb_pool(max: usize) -> impl Strategy<Value = Vec<Mod>> {
    (6..max).prop_flat_map(|n| (0..n).map(arb_mod).collect::<Vec<_>>())
}

fn run(characters: Vec<Character>, mods: Vec<Mod>, config: Config) -> RunResult {
    let order = characters.iter().map(|c| c.id.clone()).collect();
    let request = RunRequest::builder()
        .characters(characters)
        .mods(mods)
        .order(order)
        .config(config)
        .build();
    optimize(request, &CancellationToken::new()).unwrap()
}

fn weights(speed: u32, health: u32) -> StatVector {
    StatVector::from_pairs([
        (StatKind::Speed, Fixed::from_int(speed as i64)),
        (StatKind::Health, Fixed::from_int(health as i64)),
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_mods_serve_at_most_one_character(
        mods in arb_pool(40),
        n in 1usize..5,
    ) {
        let roster: Vec<Character> = (0..n)
            .map(|i| CharacterBuilder::new(&format!("c{}", i)).build())
            .collect();
        let result = run(roster, mods, Config::default());

        let mut seen = HashSet::new();
        for r in &result.results {
            for id in r.assigned_mods() {
                prop_assert!(seen.insert(id.clone()), "{} assigned twice", id);
            }
        }
    }

    #[test]
    fn prop_runs_are_deterministic(seed in any::<u64>()) {
        let params = SynthParams { characters: 4, mods: 60, ..SynthParams::default() };
        let profile = synth::generate_profile(&params, Some(seed));

        let a = run(profile.characters.clone(), profile.mods.clone(), Config::default());
        let b = run(profile.characters, profile.mods, Config::default());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_more_weight_never_lowers_the_stat(
        mods in arb_pool(30),
        speed_w in 0u32..5,
        health_w in 0u32..3,
        extra in 1u32..10,
    ) {
        let low = CharacterBuilder::new("c").weights(weights(speed_w, health_w)).build();
        let high = CharacterBuilder::new("c").weights(weights(speed_w + extra, health_w)).build();

        let r_low = run(vec![low], mods.clone(), Config::default());
        let r_high = run(vec![high], mods, Config::default());

        let s_low = r_low.results[0].stats[StatKind::Speed];
        let s_high = r_high.results[0].stats[StatKind::Speed];
        prop_assert!(s_high >= s_low, "{} < {}", s_high, s_low);
    }

    #[test]
    fn prop_full_sets_leave_no_partial_set(
        extra in arb_pool(24),
        required in prop::option::of(0usize..8),
        with_health_loadout in any::<bool>(),
    ) {
        // without the health loadout, complete sets may cover only some slots
        let mut mods = if with_health_loadout {
            full_loadout("base", SetKind::Health, 0.0)
        } else {
            Vec::new()
        };
        mods.extend(extra);

        let mut builder = CharacterBuilder::new("c").full_sets();
        if let Some(set) = required.and_then(|i| SetKind::iter().nth(i)) {
            builder = builder.require_set(set, 1);
        }
        let result = run(vec![builder.build()], mods.clone(), Config::default());

        let by_id: HashMap<&str, &Mod> = mods.iter().map(|m| (m.id.as_str(), m)).collect();
        let mut counts: HashMap<SetKind, usize> = HashMap::new();
        for id in result.results[0].assigned_mods() {
            *counts.entry(by_id[id.as_str()].set).or_default() += 1;
        }
        for (set, n) in counts {
            prop_assert_eq!(n % set.size(), 0, "{} has {} mods", set, n);
        }
    }
}

//! Seeded random rosters and mod pools, for benchmarks, fuzzing and demos.

use crate::character::{Character, Target, TargetStat};
use crate::consts::{MAX_MOD_LEVEL, MAX_SECONDARIES, SLICEABLE_TIER, SLOT_COUNT};
use crate::loader::Profile;
use crate::mods::{Mod, ModStat, SecondaryStat, SetKind, Slot};
use crate::stats::{Fixed, ModStatKind, StatKind, StatVector};
use strum::IntoEnumIterator;

#[derive(Debug, Clone, Copy)]
pub struct SynthParams {
    pub characters: usize,
    pub mods: usize,
    /// Fraction of characters that get a set restriction (0..=1).
    pub restricted_share: f64,
    /// Fraction of characters that get an absolute speed goal (0..=1).
    pub goal_share: f64,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            characters: 8,
            mods: 240,
            restricted_share: 0.5,
            goal_share: 0.25,
        }
    }
}

/// Per-roll secondary ranges for a 5-dot mod.
const SECONDARY_RANGES: [(ModStatKind, f64, f64); 12] = [
    (ModStatKind::Speed, 3.0, 6.0),
    (ModStatKind::Health, 214.0, 428.0),
    (ModStatKind::HealthPct, 0.56, 1.13),
    (ModStatKind::Protection, 415.0, 830.0),
    (ModStatKind::ProtectionPct, 1.12, 2.33),
    (ModStatKind::Offense, 22.8, 45.6),
    (ModStatKind::OffensePct, 0.28, 0.56),
    (ModStatKind::Defense, 4.0, 8.0),
    (ModStatKind::DefensePct, 0.85, 1.7),
    (ModStatKind::CritChance, 1.125, 2.25),
    (ModStatKind::Potency, 1.125, 2.25),
    (ModStatKind::Tenacity, 1.125, 2.25),
];

fn rng_for(seed: Option<u64>) -> fastrand::Rng {
    if let Some(s) = seed {
        fastrand::Rng::with_seed(s)
    } else {
        fastrand::Rng::new()
    }
}

fn between(rng: &mut fastrand::Rng, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * rng.f64()
}

/// Rounds to two decimals so generated profiles read cleanly as JSON.
fn round2(v: f64) -> Fixed {
    Fixed::from_f64((v * 100.0).round() / 100.0)
}

fn random_mod(rng: &mut fastrand::Rng, id: String) -> Mod {
    let slot = Slot::ALL[rng.usize(..SLOT_COUNT)];
    let sets: Vec<SetKind> = SetKind::iter().collect();
    let set = sets[rng.usize(..sets.len())];
    let pips = if rng.f64() < 0.15 { 6 } else { 5 };
    let level = if rng.f64() < 0.9 {
        MAX_MOD_LEVEL
    } else {
        rng.u8(1..MAX_MOD_LEVEL)
    };
    let tier = rng.u8(1..=SLICEABLE_TIER);

    let allowed = slot.allowed_primaries();
    let primary_kind = allowed[rng.usize(..allowed.len())];
    let primary_value = Mod::max_primary_value(primary_kind, pips).unwrap_or(1.0);

    let mut pool: Vec<(ModStatKind, f64, f64)> = SECONDARY_RANGES
        .iter()
        .copied()
        .filter(|(k, _, _)| *k != primary_kind)
        .collect();
    rng.shuffle(&mut pool);
    let secondaries = pool
        .into_iter()
        .take(MAX_SECONDARIES)
        .map(|(kind, lo, hi)| {
            let rolls = rng.u8(1..=3);
            let value: f64 = (0..rolls).map(|_| between(rng, lo, hi)).sum();
            SecondaryStat {
                kind,
                value: round2(value),
                rolls,
            }
        })
        .collect();

    Mod {
        id,
        slot,
        set,
        pips,
        level,
        tier,
        primary: ModStat {
            kind: primary_kind,
            value: Fixed::from_f64(primary_value),
        },
        secondaries,
        locked: false,
        assigned_to: None,
    }
}

fn random_character(rng: &mut fastrand::Rng, id: String, params: &SynthParams) -> Character {
    let base = StatVector::from_pairs([
        (StatKind::Health, round2(between(rng, 30_000.0, 70_000.0))),
        (StatKind::Protection, round2(between(rng, 40_000.0, 90_000.0))),
        (StatKind::Speed, round2(between(rng, 120.0, 200.0))),
        (StatKind::PhysicalDamage, round2(between(rng, 3_000.0, 6_000.0))),
        (StatKind::SpecialDamage, round2(between(rng, 3_000.0, 6_000.0))),
        (StatKind::Armor, round2(between(rng, 300.0, 800.0))),
        (StatKind::Resistance, round2(between(rng, 200.0, 600.0))),
        (StatKind::CriticalDamage, Fixed::from_int(150)),
    ]);

    let mut weights = StatVector::new();
    weights.set(StatKind::Speed, round2(between(rng, 50.0, 100.0)));
    for stat in [
        StatKind::Health,
        StatKind::Protection,
        StatKind::PhysicalDamage,
        StatKind::Potency,
        StatKind::Tenacity,
    ] {
        if rng.bool() {
            weights.set(stat, round2(between(rng, 0.0, 1.0)));
        }
    }

    let mut target = Target::new("default", weights);
    if rng.f64() < params.restricted_share {
        let sets = [SetKind::Speed, SetKind::Health, SetKind::Potency];
        target.set_restrictions.insert(sets[rng.usize(..sets.len())], 1);
    }
    if rng.f64() < params.goal_share {
        let base_speed = base.get(StatKind::Speed).to_f64();
        target.target_stats.push(TargetStat::absolute(
            StatKind::Speed,
            (base_speed + 60.0).round(),
            (base_speed + 150.0).round(),
        ));
    }

    Character {
        id,
        base_stats: base,
        targets: vec![target],
        active_target: 0,
        locked: false,
    }
}

/// Builds a profile. The same seed always yields the same profile.
pub fn generate_profile(params: &SynthParams, seed: Option<u64>) -> Profile {
    let mut rng = rng_for(seed);

    let characters: Vec<Character> = (0..params.characters)
        .map(|i| random_character(&mut rng, format!("char_{:02}", i), params))
        .collect();

    let mut mods: Vec<Mod> = (0..params.mods)
        .map(|i| random_mod(&mut rng, format!("mod_{:04}", i)))
        .collect();

    // Hand roughly half the mods to characters, one per slot.
    if !characters.is_empty() {
        let mut filled = vec![[false; SLOT_COUNT]; characters.len()];
        for m in &mut mods {
            if rng.bool() {
                let owner = rng.usize(..characters.len());
                let slot = m.slot.index();
                if !filled[owner][slot] {
                    filled[owner][slot] = true;
                    m.assigned_to = Some(characters[owner].id.clone());
                }
            }
        }
    }

    Profile { characters, mods }
}

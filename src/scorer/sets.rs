use super::types::AppliedSet;
use super::Loadout;
use crate::mods::{SetKind, SET_COUNT};
use crate::stats::{Fixed, StatVector};
use strum::IntoEnumIterator;

/// Mods per set kind, indexed by `SetKind as usize`.
pub fn set_counts(loadout: &Loadout) -> [usize; SET_COUNT] {
    let mut counts = [0; SET_COUNT];
    for m in loadout.iter().flatten() {
        counts[m.set as usize] += 1;
    }
    counts
}

/// Bonuses earned by the loadout. A set kind's count is rounded down to a
/// multiple of its size; each complete multiple grants one bonus.
pub fn applied_sets(loadout: &Loadout, always_full: bool) -> Vec<AppliedSet> {
    let counts = set_counts(loadout);
    SetKind::iter()
        .filter(|set| counts[*set as usize] > 0)
        .map(|set| {
            let mods = counts[set as usize];
            let full = always_full
                || loadout
                    .iter()
                    .flatten()
                    .filter(|m| m.set == set)
                    .all(|m| m.is_max_level());
            AppliedSet {
                set,
                mods,
                bonuses: mods / set.size(),
                full,
            }
        })
        .collect()
}

pub fn apply_set_bonuses(sets: &[AppliedSet], base: &StatVector, out: &mut StatVector) {
    for applied in sets.iter().filter(|s| s.bonuses > 0) {
        let (kind, full, reduced) = applied.set.bonus();
        let per_bonus = Fixed::from_f64(if applied.full { full } else { reduced });
        for _ in 0..applied.bonuses {
            kind.contribute(per_bonus, base, out);
        }
    }
}

/// Mods that sit in an incomplete set.
pub fn partial_set_mods(counts: &[usize; SET_COUNT]) -> usize {
    SetKind::iter()
        .map(|set| counts[set as usize] % set.size())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mods::{Mod, ModStat, Slot};
    use crate::stats::{ModStatKind, StatKind};

    fn m(slot: Slot, set: SetKind, level: u8) -> Mod {
        Mod {
            id: format!("{}-{}", slot, set),
            slot,
            set,
            pips: 5,
            level,
            tier: 5,
            primary: ModStat {
                kind: slot.allowed_primaries()[0],
                value: Fixed::ZERO,
            },
            secondaries: vec![],
            locked: false,
            assigned_to: None,
        }
    }

    #[test]
    fn counts_round_down_to_set_size() {
        let mods: Vec<Mod> = Slot::ALL
            .iter()
            .take(5)
            .map(|s| m(*s, SetKind::Speed, 15))
            .collect();
        let mut loadout: Loadout = [None; 6];
        for x in &mods {
            loadout[x.slot.index()] = Some(x);
        }
        let sets = applied_sets(&loadout, false);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].mods, 5);
        assert_eq!(sets[0].bonuses, 1);
        assert_eq!(partial_set_mods(&set_counts(&loadout)), 1);
    }

    #[test]
    fn reduced_bonus_below_max_level() {
        let a = m(Slot::Square, SetKind::Health, 15);
        let b = m(Slot::Arrow, SetKind::Health, 12);
        let loadout: Loadout = [Some(&a), Some(&b), None, None, None, None];
        let mut base = StatVector::new();
        base.set(StatKind::Health, Fixed::from_int(10_000));

        let mut out = StatVector::new();
        apply_set_bonuses(&applied_sets(&loadout, false), &base, &mut out);
        assert_eq!(out[StatKind::Health], Fixed::from_int(500));

        let mut sim = StatVector::new();
        apply_set_bonuses(&applied_sets(&loadout, true), &base, &mut sim);
        assert_eq!(sim[StatKind::Health], Fixed::from_int(1_000));
        assert_eq!(SetKind::Health.bonus().0, ModStatKind::HealthPct);
    }
}

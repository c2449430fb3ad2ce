use crate::consts::SLOT_COUNT;
use crate::mods::{SetKind, SET_COUNT};
use itertools::Itertools;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

/// A multiset of complete set bonuses a loadout commits slots to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SetPartition {
    pub groups: Vec<SetKind>,
}

/// Per-slot set requirement. `None` leaves the slot free.
pub type SlotLabels = [Option<SetKind>; SLOT_COUNT];

impl SetPartition {
    pub fn slots(&self) -> usize {
        self.groups.iter().map(|s| s.size()).sum()
    }

    /// Mods of each set kind the partition needs.
    pub fn mods_per_set(&self) -> [usize; SET_COUNT] {
        let mut counts = [0; SET_COUNT];
        for set in &self.groups {
            counts[*set as usize] += set.size();
        }
        counts
    }

    fn bonus_counts(&self) -> [usize; SET_COUNT] {
        let mut counts = [0; SET_COUNT];
        for set in &self.groups {
            counts[*set as usize] += 1;
        }
        counts
    }

    pub fn satisfies(&self, required: &BTreeMap<SetKind, u8>) -> bool {
        let have = self.bonus_counts();
        required
            .iter()
            .all(|(set, &n)| have[*set as usize] >= n as usize)
    }

    /// Every distinct way to place the partition's sets onto the six slots.
    pub fn labelings(&self) -> Vec<SlotLabels> {
        let mut remaining = self.mods_per_set();
        let free = SLOT_COUNT - self.slots().min(SLOT_COUNT);
        let mut out = Vec::new();
        let mut current = [None; SLOT_COUNT];
        label_slots(0, free, &mut remaining, &mut current, &mut out);
        out
    }
}

fn label_slots(
    slot: usize,
    free: usize,
    remaining: &mut [usize; SET_COUNT],
    current: &mut SlotLabels,
    out: &mut Vec<SlotLabels>,
) {
    if slot == SLOT_COUNT {
        out.push(*current);
        return;
    }
    if free > 0 {
        current[slot] = None;
        label_slots(slot + 1, free - 1, remaining, current, out);
    }
    for set in SetKind::iter() {
        let i = set as usize;
        if remaining[i] > 0 {
            remaining[i] -= 1;
            current[slot] = Some(set);
            label_slots(slot + 1, free, remaining, current, out);
            remaining[i] += 1;
        }
    }
    current[slot] = None;
}

/// All partitions that fit in six slots and contain `required`, smallest first.
///
/// With nothing required this is: none, each single set, each pair of
/// two-sets, each triple of two-sets, each four-set, each four-set plus two-set.
pub fn enumerate(required: &BTreeMap<SetKind, u8>) -> Vec<SetPartition> {
    let mut out = vec![SetPartition::default()];
    for k in 1..=3 {
        for groups in SetKind::iter().combinations_with_replacement(k) {
            let p = SetPartition { groups };
            if p.slots() <= SLOT_COUNT {
                out.push(p);
            }
        }
    }
    out.retain(|p| p.satisfies(required));
    out
}

/// Sub-multisets of `required`, most committed slots first. The full
/// requirement comes first and the empty one last.
pub fn relaxations(required: &BTreeMap<SetKind, u8>) -> Vec<BTreeMap<SetKind, u8>> {
    let kinds: Vec<(SetKind, u8)> = required
        .iter()
        .filter(|(_, &n)| n > 0)
        .map(|(s, &n)| (*s, n))
        .collect();
    if kinds.is_empty() {
        return vec![BTreeMap::new()];
    }

    let mut variants: Vec<BTreeMap<SetKind, u8>> = kinds
        .iter()
        .map(|(_, n)| (0..=*n).rev())
        .multi_cartesian_product()
        .map(|counts| {
            kinds
                .iter()
                .zip(counts)
                .filter(|(_, c)| *c > 0)
                .map(|((set, _), c)| (*set, c))
                .collect()
        })
        .collect();

    let slots = |m: &BTreeMap<SetKind, u8>| -> usize {
        m.iter().map(|(s, &n)| s.size() * n as usize).sum()
    };
    variants.sort_by_key(|v| std::cmp::Reverse(slots(v)));
    variants
}

#![allow(dead_code)]

use modforge::character::{Character, Target, TargetStat};
use modforge::mods::{Mod, ModStat, SecondaryStat, SetKind, Slot};
use modforge::stats::{Fixed, ModStatKind, StatKind, StatVector};

/// Builder for Mod to keep tests short. Defaults to a 5-dot level 15 health mod
/// with the first allowed primary of its slot.
pub struct ModBuilder {
    m: Mod,
}

impl ModBuilder {
    pub fn new(id: &str, slot: Slot) -> Self {
        let primary = slot.allowed_primaries()[0];
        Self {
            m: Mod {
                id: id.to_string(),
                slot,
                set: SetKind::Health,
                pips: 5,
                level: 15,
                tier: 5,
                primary: ModStat {
                    kind: primary,
                    value: Fixed::ZERO,
                },
                secondaries: Vec::new(),
                locked: false,
                assigned_to: None,
            },
        }
    }

    pub fn set(mut self, set: SetKind) -> Self {
        self.m.set = set;
        self
    }

    pub fn primary(mut self, kind: ModStatKind, value: f64) -> Self {
        self.m.primary = ModStat {
            kind,
            value: Fixed::from_f64(value),
        };
        self
    }

    pub fn secondary(mut self, kind: ModStatKind, value: f64) -> Self {
        self.m.secondaries.push(SecondaryStat {
            kind,
            value: Fixed::from_f64(value),
            rolls: 1,
        });
        self
    }

    /// Flat speed secondary, the most common test knob.
    pub fn speed(self, value: f64) -> Self {
        self.secondary(ModStatKind::Speed, value)
    }

    pub fn level(mut self, level: u8) -> Self {
        self.m.level = level;
        self
    }

    pub fn pips(mut self, pips: u8) -> Self {
        self.m.pips = pips;
        self
    }

    pub fn on(mut self, character: &str) -> Self {
        self.m.assigned_to = Some(character.to_string());
        self
    }

    pub fn locked(mut self) -> Self {
        self.m.locked = true;
        self
    }

    pub fn build(self) -> Mod {
        self.m
    }
}

pub struct CharacterBuilder {
    c: Character,
}

impl CharacterBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            c: Character {
                id: id.to_string(),
                base_stats: StatVector::new(),
                targets: vec![Target::new("default", speed_weights(1))],
                active_target: 0,
                locked: false,
            },
        }
    }

    pub fn base(mut self, stat: StatKind, value: f64) -> Self {
        self.c.base_stats.set(stat, Fixed::from_f64(value));
        self
    }

    pub fn weights(mut self, weights: StatVector) -> Self {
        self.c.targets[0].weights = weights;
        self
    }

    pub fn require_set(mut self, set: SetKind, count: u8) -> Self {
        self.c.targets[0].set_restrictions.insert(set, count);
        self
    }

    pub fn require_primary(mut self, slot: Slot, primary: ModStatKind) -> Self {
        self.c.targets[0].primary_restrictions.insert(slot, primary);
        self
    }

    pub fn goal(mut self, goal: TargetStat) -> Self {
        self.c.targets[0].target_stats.push(goal);
        self
    }

    pub fn full_sets(mut self) -> Self {
        self.c.targets[0].use_only_full_sets = true;
        self
    }

    pub fn locked(mut self) -> Self {
        self.c.locked = true;
        self
    }

    pub fn build(self) -> Character {
        self.c
    }
}

pub fn speed_weights(w: i64) -> StatVector {
    StatVector::from_pairs([(StatKind::Speed, Fixed::from_int(w))])
}

/// One mod per slot, all of `set`, each with `speed` flat speed.
pub fn full_loadout(prefix: &str, set: SetKind, speed: f64) -> Vec<Mod> {
    Slot::ALL
        .iter()
        .map(|&slot| {
            ModBuilder::new(&format!("{}_{}", prefix, slot), slot)
                .set(set)
                .speed(speed)
                .build()
        })
        .collect()
}

pub fn ids(order: &[&str]) -> Vec<String> {
    order.iter().map(|s| s.to_string()).collect()
}

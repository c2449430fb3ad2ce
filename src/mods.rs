use crate::consts::{MAX_MOD_LEVEL, SLICEABLE_TIER, SLOT_COUNT};
use crate::stats::{Fixed, ModStatKind};
use serde::{Deserialize, Serialize};
use strum::EnumCount;
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter, EnumString};

pub type ModId = String;
pub type CharacterId = String;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    EnumCountMacro,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Square,
    Arrow,
    Diamond,
    Triangle,
    Circle,
    Cross,
}

const _: () = assert!(Slot::COUNT == SLOT_COUNT);

impl Slot {
    pub const ALL: [Slot; SLOT_COUNT] = [
        Slot::Square,
        Slot::Arrow,
        Slot::Diamond,
        Slot::Triangle,
        Slot::Circle,
        Slot::Cross,
    ];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Primary stats a mod in this slot may carry. Fixed slots have exactly one.
    pub fn allowed_primaries(self) -> &'static [ModStatKind] {
        use ModStatKind::*;
        match self {
            Slot::Square => &[OffensePct],
            Slot::Diamond => &[DefensePct],
            Slot::Arrow => &[
                Speed,
                Accuracy,
                CritAvoidance,
                HealthPct,
                ProtectionPct,
                OffensePct,
                DefensePct,
            ],
            Slot::Triangle => &[
                CritChance,
                CritDamage,
                HealthPct,
                ProtectionPct,
                OffensePct,
                DefensePct,
            ],
            Slot::Circle => &[HealthPct, ProtectionPct],
            Slot::Cross => &[
                Potency,
                Tenacity,
                HealthPct,
                ProtectionPct,
                OffensePct,
                DefensePct,
            ],
        }
    }

    pub fn is_variable(self) -> bool {
        self.allowed_primaries().len() > 1
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    EnumCountMacro,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SetKind {
    Health,
    Defense,
    CritChance,
    Tenacity,
    Potency,
    CritDamage,
    Offense,
    Speed,
}

pub const SET_COUNT: usize = SetKind::COUNT;

impl SetKind {
    /// Mods needed for one bonus.
    pub fn size(self) -> usize {
        match self {
            SetKind::CritDamage | SetKind::Offense | SetKind::Speed => 4,
            _ => 2,
        }
    }

    /// The stat one completed set grants, and its `(full, reduced)` values.
    /// The full value applies only when every mod in the group is max level.
    pub fn bonus(self) -> (ModStatKind, f64, f64) {
        match self {
            SetKind::Health => (ModStatKind::HealthPct, 10.0, 5.0),
            SetKind::Defense => (ModStatKind::DefensePct, 25.0, 12.5),
            SetKind::CritChance => (ModStatKind::CritChance, 8.0, 4.0),
            SetKind::Tenacity => (ModStatKind::Tenacity, 20.0, 10.0),
            SetKind::Potency => (ModStatKind::Potency, 15.0, 7.5),
            SetKind::CritDamage => (ModStatKind::CritDamage, 30.0, 15.0),
            SetKind::Offense => (ModStatKind::OffensePct, 15.0, 7.5),
            SetKind::Speed => (ModStatKind::SpeedPct, 10.0, 5.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModStat {
    pub kind: ModStatKind,
    pub value: Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryStat {
    pub kind: ModStatKind,
    pub value: Fixed,
    #[serde(default = "default_rolls")]
    pub rolls: u8,
}

fn default_rolls() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mod {
    pub id: ModId,
    pub slot: Slot,
    pub set: SetKind,
    /// Rarity, 1..=6 dots.
    pub pips: u8,
    pub level: u8,
    /// Calibration tier, 1 (grey) ..= 5 (gold).
    #[serde(default = "default_tier")]
    pub tier: u8,
    pub primary: ModStat,
    #[serde(default)]
    pub secondaries: Vec<SecondaryStat>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub assigned_to: Option<CharacterId>,
}

fn default_tier() -> u8 {
    1
}

impl Mod {
    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_MOD_LEVEL
    }

    /// Level-15 primary value for this kind at `pips` dots.
    pub fn max_primary_value(kind: ModStatKind, pips: u8) -> Option<f64> {
        use ModStatKind::*;
        let six_dot = pips >= 6;
        let value = match kind {
            Speed => {
                if six_dot {
                    32.0
                } else {
                    30.0
                }
            }
            OffensePct | HealthPct => {
                if six_dot {
                    8.5
                } else {
                    5.88
                }
            }
            DefensePct => {
                if six_dot {
                    20.0
                } else {
                    11.75
                }
            }
            ProtectionPct => {
                if six_dot {
                    33.0
                } else {
                    23.5
                }
            }
            CritChance => {
                if six_dot {
                    20.0
                } else {
                    11.75
                }
            }
            CritDamage => {
                if six_dot {
                    42.0
                } else {
                    36.0
                }
            }
            Potency | Tenacity => {
                if six_dot {
                    30.0
                } else {
                    24.0
                }
            }
            Accuracy => {
                if six_dot {
                    30.0
                } else {
                    12.0
                }
            }
            CritAvoidance => {
                if six_dot {
                    35.0
                } else {
                    24.0
                }
            }
            _ => return None,
        };
        Some(value)
    }

    /// Secondary multiplier applied when a gold 5-dot mod is sliced to 6 dots.
    fn slice_multiplier(kind: ModStatKind) -> f64 {
        use ModStatKind::*;
        match kind {
            Speed => 1.03,
            Health | Protection | Offense | Defense => 1.10,
            HealthPct | ProtectionPct | OffensePct | DefensePct => 1.86,
            CritChance | Potency | Tenacity => 1.33,
            _ => 1.0,
        }
    }

    pub fn can_slice_to_six_dot(&self) -> bool {
        self.pips == 5 && self.is_max_level() && self.tier == SLICEABLE_TIER
    }

    /// Returns the mod as the run should see it under the simulation settings.
    pub fn simulated(&self, level_15: bool, slice_6e: bool) -> Mod {
        let mut m = self.clone();

        if level_15 && !m.is_max_level() {
            m.level = MAX_MOD_LEVEL;
            if let Some(v) = Self::max_primary_value(m.primary.kind, m.pips) {
                m.primary.value = Fixed::from_f64(v);
            }
        }

        if slice_6e && m.can_slice_to_six_dot() {
            m.pips = 6;
            if let Some(v) = Self::max_primary_value(m.primary.kind, 6) {
                m.primary.value = Fixed::from_f64(v);
            }
            for s in &mut m.secondaries {
                let scaled = s.value.to_f64() * Self::slice_multiplier(s.kind);
                s.value = Fixed::from_f64(scaled);
            }
        }

        m
    }

    /// Structural checks on a mod coming from outside the engine.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=6).contains(&self.pips) {
            return Err(format!("mod {}: pips {} out of range", self.id, self.pips));
        }
        if !(1..=MAX_MOD_LEVEL).contains(&self.level) {
            return Err(format!("mod {}: level {} out of range", self.id, self.level));
        }
        if !self.slot.allowed_primaries().contains(&self.primary.kind) {
            return Err(format!(
                "mod {}: primary {} not allowed on {}",
                self.id, self.primary.kind, self.slot
            ));
        }
        if self.secondaries.len() > crate::consts::MAX_SECONDARIES {
            return Err(format!("mod {}: more than 4 secondaries", self.id));
        }
        Ok(())
    }
}

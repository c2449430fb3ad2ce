/// Fixed-point scale: every stat value is stored multiplied by this.
pub const FIXED_SCALE: i64 = 1_000_000;

/// Number of equip positions on a character.
pub const SLOT_COUNT: usize = 6;

/// Number of weighted character stats.
pub const STAT_COUNT: usize = 14;

/// Highest mod level. Set bonuses are only full when every mod in the group is here.
pub const MAX_MOD_LEVEL: u8 = 15;

/// Maximum secondary stats a mod can roll.
pub const MAX_SECONDARIES: usize = 4;

/// Calibration tier of a gold ("E") mod, the only tier that can be sliced to 6 dots.
pub const SLICEABLE_TIER: u8 = 5;

/// Default number of mods kept per (slot, set) bucket.
pub const DEFAULT_SHORTLIST_SIZE: usize = 3;

/// Default weight multipliers tried when chasing an unmet target-stat goal.
pub const DEFAULT_GOAL_LADDER: &str = "0.5,1,2,5,20";

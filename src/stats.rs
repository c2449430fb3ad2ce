use crate::consts::{FIXED_SCALE, STAT_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Index, Neg, Sub, SubAssign};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter, EnumString};

/// Scaled-integer stat value (`raw / FIXED_SCALE`).
///
/// Every sum and percentage product in the engine goes through this type so
/// that repeated additions never drift. `f64` only appears at the edges:
/// deserialized input and printed reports.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "f64", into = "f64")]
pub struct Fixed(i64);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(FIXED_SCALE);
    pub const MAX: Fixed = Fixed(i64::MAX);
    pub const MIN: Fixed = Fixed(i64::MIN);

    pub const fn from_raw(raw: i64) -> Self {
        Fixed(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    pub const fn from_int(v: i64) -> Self {
        Fixed(v.saturating_mul(FIXED_SCALE))
    }

    pub fn from_f64(v: f64) -> Self {
        if !v.is_finite() {
            return Fixed::ZERO;
        }
        // `as` saturates at the i64 bounds
        Fixed((v * FIXED_SCALE as f64).round() as i64)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / FIXED_SCALE as f64
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn abs(self) -> Self {
        Fixed(self.0.saturating_abs())
    }

    #[inline(always)]
    pub fn mul(self, rhs: Fixed) -> Fixed {
        clamp_i128(self.0 as i128 * rhs.0 as i128 / FIXED_SCALE as i128)
    }

    /// `None` when `rhs` is zero.
    #[inline(always)]
    pub fn checked_div(self, rhs: Fixed) -> Option<Fixed> {
        if rhs.0 == 0 {
            return None;
        }
        Some(clamp_i128(
            self.0 as i128 * FIXED_SCALE as i128 / rhs.0 as i128,
        ))
    }

    /// Treats `self` as a percentage and applies it to `base` (`base * self / 100`).
    #[inline(always)]
    pub fn percent_of(self, base: Fixed) -> Fixed {
        clamp_i128(base.0 as i128 * self.0 as i128 / (FIXED_SCALE as i128 * 100))
    }
}

#[inline(always)]
fn clamp_i128(v: i128) -> Fixed {
    Fixed(v.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
}

impl From<f64> for Fixed {
    fn from(v: f64) -> Self {
        Fixed::from_f64(v)
    }
}

impl From<Fixed> for f64 {
    fn from(v: Fixed) -> Self {
        v.to_f64()
    }
}

impl Add for Fixed {
    type Output = Fixed;
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Fixed) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Fixed) {
        *self = *self - rhs;
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    fn neg(self) -> Fixed {
        Fixed(self.0.saturating_neg())
    }
}

impl Sum for Fixed {
    fn sum<I: Iterator<Item = Fixed>>(iter: I) -> Fixed {
        iter.fold(Fixed::ZERO, |a, b| a + b)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_f64())
    }
}

/// The weighted character stats.
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
pub enum StatKind {
    Health,
    Protection,
    Speed,
    CriticalDamage,
    Potency,
    Tenacity,
    PhysicalDamage,
    SpecialDamage,
    PhysicalCritChance,
    SpecialCritChance,
    Armor,
    Resistance,
    Accuracy,
    CriticalAvoidance,
}

const _: () = assert!(StatKind::COUNT == STAT_COUNT);

/// Stats as they appear on a mod (primary, secondary) or a set bonus.
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
pub enum ModStatKind {
    Health,
    HealthPct,
    Protection,
    ProtectionPct,
    Offense,
    OffensePct,
    Defense,
    DefensePct,
    Speed,
    /// Only granted by the speed set.
    SpeedPct,
    CritChance,
    CritDamage,
    Potency,
    Tenacity,
    Accuracy,
    CritAvoidance,
}

impl ModStatKind {
    /// Adds `value` of this mod stat to `out`. Percent kinds scale the matching base stat.
    #[inline]
    pub fn contribute(self, value: Fixed, base: &StatVector, out: &mut StatVector) {
        use StatKind as S;
        match self {
            Self::Health => out.add_stat(S::Health, value),
            Self::HealthPct => out.add_stat(S::Health, value.percent_of(base[S::Health])),
            Self::Protection => out.add_stat(S::Protection, value),
            Self::ProtectionPct => {
                out.add_stat(S::Protection, value.percent_of(base[S::Protection]))
            }
            Self::Offense => {
                out.add_stat(S::PhysicalDamage, value);
                out.add_stat(S::SpecialDamage, value);
            }
            Self::OffensePct => {
                out.add_stat(
                    S::PhysicalDamage,
                    value.percent_of(base[S::PhysicalDamage]),
                );
                out.add_stat(S::SpecialDamage, value.percent_of(base[S::SpecialDamage]));
            }
            Self::Defense => {
                out.add_stat(S::Armor, value);
                out.add_stat(S::Resistance, value);
            }
            Self::DefensePct => {
                out.add_stat(S::Armor, value.percent_of(base[S::Armor]));
                out.add_stat(S::Resistance, value.percent_of(base[S::Resistance]));
            }
            Self::Speed => out.add_stat(S::Speed, value),
            Self::SpeedPct => out.add_stat(S::Speed, value.percent_of(base[S::Speed])),
            Self::CritChance => {
                out.add_stat(S::PhysicalCritChance, value);
                out.add_stat(S::SpecialCritChance, value);
            }
            Self::CritDamage => out.add_stat(S::CriticalDamage, value),
            Self::Potency => out.add_stat(S::Potency, value),
            Self::Tenacity => out.add_stat(S::Tenacity, value),
            Self::Accuracy => out.add_stat(S::Accuracy, value),
            Self::CritAvoidance => out.add_stat(S::CriticalAvoidance, value),
        }
    }
}

/// Dense per-`StatKind` table. Serialized as a `{stat: value}` map of the non-zero entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<StatKind, Fixed>",
    into = "BTreeMap<StatKind, Fixed>"
)]
pub struct StatVector([Fixed; STAT_COUNT]);

impl StatVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I: IntoIterator<Item = (StatKind, Fixed)>>(pairs: I) -> Self {
        let mut v = Self::default();
        for (kind, value) in pairs {
            v.add_stat(kind, value);
        }
        v
    }

    #[inline(always)]
    pub fn get(&self, kind: StatKind) -> Fixed {
        self.0[kind as usize]
    }

    #[inline(always)]
    pub fn set(&mut self, kind: StatKind, value: Fixed) {
        self.0[kind as usize] = value;
    }

    #[inline(always)]
    pub fn add_stat(&mut self, kind: StatKind, value: Fixed) {
        self.0[kind as usize] += value;
    }

    /// Σ self[k] × weights[k]
    #[inline]
    pub fn dot(&self, weights: &StatVector) -> Fixed {
        self.0
            .iter()
            .zip(weights.0.iter())
            .filter(|(_, w)| !w.is_zero())
            .map(|(v, w)| v.mul(*w))
            .sum()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| v.is_zero())
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKind, Fixed)> + '_ {
        StatKind::iter().map(move |k| (k, self.0[k as usize]))
    }

    /// Largest absolute entry.
    pub fn max_abs(&self) -> Fixed {
        self.0.iter().map(|v| v.abs()).max().unwrap_or(Fixed::ZERO)
    }
}

impl Index<StatKind> for StatVector {
    type Output = Fixed;
    fn index(&self, kind: StatKind) -> &Fixed {
        &self.0[kind as usize]
    }
}

impl AddAssign<&StatVector> for StatVector {
    fn add_assign(&mut self, rhs: &StatVector) {
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a += *b;
        }
    }
}

impl Add for StatVector {
    type Output = StatVector;
    fn add(mut self, rhs: StatVector) -> StatVector {
        self += &rhs;
        self
    }
}

impl From<BTreeMap<StatKind, Fixed>> for StatVector {
    fn from(map: BTreeMap<StatKind, Fixed>) -> Self {
        StatVector::from_pairs(map)
    }
}

impl From<StatVector> for BTreeMap<StatKind, Fixed> {
    fn from(v: StatVector) -> Self {
        v.iter().filter(|(_, value)| !value.is_zero()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_addition_does_not_drift() {
        let step = Fixed::from_f64(0.1);
        let total: Fixed = std::iter::repeat(step).take(1000).sum();
        assert_eq!(total, Fixed::from_int(100));
    }

    #[test]
    fn percent_of_base() {
        let pct = Fixed::from_f64(5.88);
        let base = Fixed::from_int(10_000);
        assert_eq!(pct.percent_of(base), Fixed::from_int(588));
    }

    #[test]
    fn division_by_zero_is_guarded() {
        assert_eq!(Fixed::ONE.checked_div(Fixed::ZERO), None);
        assert_eq!(
            Fixed::from_int(3).checked_div(Fixed::from_int(2)),
            Some(Fixed::from_f64(1.5))
        );
    }

    #[test]
    fn offense_feeds_both_damage_kinds() {
        let base = StatVector::new();
        let mut out = StatVector::new();
        ModStatKind::Offense.contribute(Fixed::from_int(40), &base, &mut out);
        assert_eq!(out[StatKind::PhysicalDamage], Fixed::from_int(40));
        assert_eq!(out[StatKind::SpecialDamage], Fixed::from_int(40));
    }

    #[test]
    fn add_stat_accumulates_alongside_vector_addition() {
        let mut v = StatVector::new();
        v.add_stat(StatKind::Speed, Fixed::from_int(3));
        v.add_stat(StatKind::Speed, Fixed::from_int(2));
        let sum = v + StatVector::from_pairs([(StatKind::Health, Fixed::ONE)]);
        assert_eq!(sum[StatKind::Speed], Fixed::from_int(5));
        assert_eq!(sum[StatKind::Health], Fixed::ONE);
    }

    #[test]
    fn weights_serialize_as_sparse_map() {
        let w = StatVector::from_pairs([(StatKind::Speed, Fixed::ONE)]);
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"speed":1.0}"#);
        let back: StatVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }
}

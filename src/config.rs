use crate::consts::{DEFAULT_GOAL_LADDER, DEFAULT_SHORTLIST_SIZE};
use crate::error::{MfResult, ModForgeError};
use crate::stats::Fixed;
use clap::{parser::ValueSource, ArgAction, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[command(flatten)]
    #[serde(default)]
    pub settings: OptimizerSettings,
    #[command(flatten)]
    #[serde(default)]
    pub search: SearchParams,
}

/// Global settings supplied by the caller alongside the roster.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Treat every target as `use_only_full_sets`.
    #[arg(long, default_value_t = false)]
    pub force_complete_sets: bool,

    /// Keep mods on characters that are not in the processing order.
    #[arg(long, default_value_t = false)]
    pub lock_unselected_characters: bool,

    /// Percent improvement required before a character's current loadout is replaced.
    #[arg(long, default_value_t = 0.0)]
    pub mod_change_threshold: f64,

    #[arg(long = "simulate-6e-mod-slice", default_value_t = false)]
    pub simulate_6e_mod_slice: bool,

    #[arg(long = "simulate-level-15-mods", default_value_t = false)]
    pub simulate_level_15_mods: bool,

    /// When false, restrictions are only reported, never searched for.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub optimize_with_primary_and_set_restrictions: bool,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            force_complete_sets: false,
            lock_unselected_characters: false,
            mod_change_threshold: 0.0,
            simulate_6e_mod_slice: false,
            simulate_level_15_mods: false,
            optimize_with_primary_and_set_restrictions: true,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Mods kept per (slot, set) bucket.
    #[arg(long, default_value_t = DEFAULT_SHORTLIST_SIZE)]
    pub shortlist_size: usize,

    /// Weight multipliers tried when chasing an unmet goal.
    #[arg(long, default_value = DEFAULT_GOAL_LADDER)]
    pub goal_ladder: String,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub parallel_scoring: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            shortlist_size: DEFAULT_SHORTLIST_SIZE,
            goal_ladder: DEFAULT_GOAL_LADDER.to_string(),
            parallel_scoring: true,
        }
    }
}

impl SearchParams {
    pub fn get_goal_ladder(&self) -> MfResult<Vec<Fixed>> {
        let mut steps = Vec::new();
        for part in self.goal_ladder.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let v: f64 = part.parse().map_err(|_| {
                ModForgeError::Config(format!("invalid goal ladder step '{}'", part))
            })?;
            if !(v > 0.0 && v.is_finite()) {
                return Err(ModForgeError::Config(format!(
                    "goal ladder steps must be positive, got {}",
                    v
                )));
            }
            steps.push(Fixed::from_f64(v));
        }
        Ok(steps)
    }

    pub fn validate(&self) -> MfResult<()> {
        if self.shortlist_size == 0 {
            return Err(ModForgeError::Config(
                "shortlist_size must be at least 1".to_string(),
            ));
        }
        self.get_goal_ladder().map(|_| ())
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> MfResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.search.validate()?;
        Ok(config)
    }

    /// Copies values the user typed on the command line over `self` (usually loaded from a file).
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(settings.force_complete_sets);
        update_if_present!(settings.lock_unselected_characters);
        update_if_present!(settings.mod_change_threshold);
        update_if_present!(settings.simulate_6e_mod_slice);
        update_if_present!(settings.simulate_level_15_mods);
        update_if_present!(settings.optimize_with_primary_and_set_restrictions);

        update_if_present!(search.shortlist_size);
        update_if_present!(search.goal_ladder);
        update_if_present!(search.parallel_scoring);
    }
}

use crate::reports;
use clap::Args;
use modforge::config::Config;
use modforge::error::{MfResult, ModForgeError};
use modforge::loader::{self, Profile};
use modforge::optimizer::ModPool;
use modforge::scorer::{self, GoalContext, Loadout};
use std::collections::HashMap;

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long)]
    pub profile: String,

    #[arg(long)]
    pub mods_csv: Option<String>,

    /// Character whose current loadout is evaluated.
    #[arg(short, long)]
    pub character: String,
}

pub fn run(args: ScoreArgs, config: Config) -> MfResult<()> {
    let mut profile = Profile::load_from_file(&args.profile)?;
    if let Some(path) = &args.mods_csv {
        profile.mods = loader::load_mods_csv(path)?;
    }

    let character = profile.character(&args.character).ok_or_else(|| {
        ModForgeError::Validation(format!("unknown character '{}'", args.character))
    })?;
    let target = character.target()?;

    let pool = ModPool::snapshot(&profile.mods, &config.settings)?;
    let equipped = pool.equipped_on(&character.id);
    let loadout: Loadout = equipped.map(|i| i.map(|i| pool.get(i)));

    let base_stats: HashMap<_, _> = profile
        .characters
        .iter()
        .map(|c| (c.id.clone(), c.base_stats))
        .collect();
    let committed = HashMap::new();
    let ctx = GoalContext {
        base_stats: &base_stats,
        committed: &committed,
    };

    let eval = scorer::score(
        &loadout,
        character,
        target,
        &ctx,
        config.settings.simulate_level_15_mods,
    )?;

    reports::print_loadout(&character.id, &loadout);
    reports::print_evaluation(character, &eval);
    Ok(())
}

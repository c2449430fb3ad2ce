use clap::Args;
use modforge::error::MfResult;
use modforge::synth::{self, SynthParams};
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(long, default_value_t = 8)]
    pub characters: usize,

    #[arg(long, default_value_t = 240)]
    pub mods: usize,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Where to write the profile JSON.
    #[arg(short, long)]
    pub output: String,
}

pub fn run(args: GenerateArgs) -> MfResult<()> {
    let params = SynthParams {
        characters: args.characters,
        mods: args.mods,
        ..SynthParams::default()
    };
    let profile = synth::generate_profile(&params, args.seed);
    profile.save_to_file(&args.output)?;
    info!(
        "🎲 Wrote {} characters and {} mods to {}",
        profile.characters.len(),
        profile.mods.len(),
        args.output
    );
    Ok(())
}

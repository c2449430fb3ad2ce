use crate::reports;
use clap::Args;
use modforge::api::{self, RunEvent};
use modforge::assignment::RunStatus;
use modforge::config::Config;
use modforge::error::MfResult;
use modforge::loader::{self, Profile};
use modforge::optimizer::RunRequest;
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub config: Config,

    /// Profile JSON with characters (and usually mods).
    #[arg(short, long)]
    pub profile: String,

    /// Read the mod pool from CSV instead of the profile.
    #[arg(long)]
    pub mods_csv: Option<String>,

    /// Comma separated character ids, highest priority first. Defaults to profile order.
    #[arg(long, value_delimiter = ',')]
    pub order: Vec<String>,

    /// Reuse the first N results from `--previous` unchanged.
    #[arg(long, requires = "previous")]
    pub resume_from: Option<usize>,

    /// Results JSON of an earlier run.
    #[arg(long)]
    pub previous: Option<String>,

    /// Write results JSON here.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Cancel after this many seconds; finished characters are kept.
    #[arg(short = 'T', long)]
    pub time: Option<u64>,
}

pub fn run(args: OptimizeArgs, config: Config) -> MfResult<()> {
    let mut profile = Profile::load_from_file(&args.profile)?;
    if let Some(path) = &args.mods_csv {
        info!("📂 Loading mods from: {}", path);
        profile.mods = loader::load_mods_csv(path)?;
    }

    let order = if args.order.is_empty() {
        profile.characters.iter().map(|c| c.id.clone()).collect()
    } else {
        args.order.clone()
    };

    let previous = match &args.previous {
        Some(path) => loader::load_results(path)?.results,
        None => Vec::new(),
    };

    let request = RunRequest::builder()
        .characters(profile.characters.clone())
        .mods(profile.mods.clone())
        .order(order)
        .config(config)
        .previous(previous)
        .build();
    let request = match args.resume_from {
        Some(k) => RunRequest {
            resume_from: Some(k),
            ..request
        },
        None => request,
    };

    let handle = api::spawn_optimization(request)?;
    let deadline = args.time.map(|t| Instant::now() + Duration::from_secs(t));
    let mut last_character = None;

    loop {
        match handle.events.recv_timeout(Duration::from_millis(200)) {
            Ok(RunEvent::Progress(p)) => {
                if last_character != Some(p.character_index) {
                    last_character = Some(p.character_index);
                    info!(
                        "➡️  [{}/{}] {}",
                        p.character_index + 1,
                        p.character_count,
                        p.character_id
                    );
                }
            }
            Ok(event) if event.is_terminal() => break,
            Ok(_) => {}
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            warn!("⏱️  Time limit reached, cancelling");
            handle.cancel();
        }
    }

    let result = handle.wait()?;
    if result.status == RunStatus::Cancelled {
        warn!(
            "Run cancelled: {} of {} characters finished",
            result.results.len(),
            profile.characters.len()
        );
    }

    reports::print_results(&result);
    reports::print_messages(&result);

    if let Some(path) = &args.output {
        loader::save_results(path, &result)?;
        info!("💾 Results written to {}", path);
    }
    Ok(())
}

use anyhow::Result;
use battle_sequencer::catalog::{load_manifest_dir, CatalogSet};
use battle_sequencer::resolver::{LogObserver, PlaybackResolver, PlaybackState};
use battle_sequencer::session::MemoryStore;
use battle_sequencer::token;
use battle_sequencer::{BattleConfig, Directive, PlatformEvent};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "battle-sequencer")]
#[command(about = "Simulate a battle playback session end-to-end", long_about = None)]
struct Args {
    /// Scenario theme
    #[arg(short, long, default_value = "arctic")]
    scenario: String,

    /// Player rank
    #[arg(short, long, default_value = "4")]
    rank: u8,

    /// Battle duration in seconds
    #[arg(short, long, default_value = "240")]
    duration: u32,

    /// Number of teams (2 or more switches to team mode)
    #[arg(short, long, default_value = "1")]
    teams: u8,

    /// Soundtrack-only battle without events
    #[arg(long)]
    no_events: bool,

    /// Fixed planning seed for a reproducible playlist
    #[arg(long)]
    seed: Option<u64>,

    /// Directory of additional scenario manifests (XML)
    #[arg(short, long)]
    manifests: Option<String>,

    /// Print the planned playlist without walking the callbacks
    #[arg(long)]
    plan_only: bool,

    /// Resume walking from an existing token instead of starting fresh
    #[arg(long)]
    resume: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load catalogs
    let mut catalogs = CatalogSet::builtin();
    if let Some(ref dir) = args.manifests {
        let dir = shellexpand::tilde(dir);
        let added = load_manifest_dir(&mut catalogs, PathBuf::from(dir.as_ref()).as_path())?;
        log::info!("Loaded {} scenario(s) from manifests", added);
    }
    let resolver = PlaybackResolver::new(catalogs, LogObserver);
    log::info!(
        "Scenarios available: {:?}",
        resolver.catalogs().scenario_names()
    );

    let mut rng = match args.seed {
        Some(seed) => {
            log::info!("Planning with fixed seed {}", seed);
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    };

    // Resume mode: re-enter an existing battle at its current segment
    if let Some(ref resume_token) = args.resume {
        log::info!("Resuming from supplied token");
        let resolution = resolver.resolve_resume(resume_token, 0);
        walk(&resolver, resolution.directive)?;
        return Ok(());
    }

    let mut config = BattleConfig::new(args.scenario, args.rank, args.duration).with_teams(args.teams);
    if args.no_events {
        config = config.without_events();
    }

    // Drive start through the session store, as the dialog layer would
    let mut store = MemoryStore::new();
    store.put_config("simulator", config.clone());

    log::info!("State: {:?}", PlaybackState::AwaitingStart);
    let resolution = resolver.start_for_user("simulator", &mut store, &mut rng)?;

    if args.plan_only {
        print_plan(&resolution.checkpoint)?;
        return Ok(());
    }

    log::info!("State: {:?}", resolution.state);
    let mut directive = resolution.directive;

    // Walk the platform callback cycle to completion
    loop {
        let token = match directive {
            Directive::Play { ref token, ref url, offset_ms, .. } => {
                println!("PLAY  {}  (offset {}ms)", url, offset_ms);
                token.clone()
            }
            Directive::Stop => {
                println!("STOP");
                break;
            }
        };

        let event = PlatformEvent::PlaybackNearlyFinished {
            token,
            offset_ms: 0,
        };
        directive = match resolver.handle_event("simulator", &event, &mut store)? {
            Some(next) => next,
            None => break,
        };
    }

    // A final stopped notification checkpoints the terminal position
    if let Some(record) = store.record("simulator") {
        log::info!(
            "Session checkpoint for {}: {:?}",
            record.user_id,
            record.token
        );
    }

    log::info!("Simulation complete");
    Ok(())
}

/// Walk a resumed battle to completion without the session store
fn walk<O: battle_sequencer::resolver::PlaybackObserver>(
    resolver: &PlaybackResolver<O>,
    mut directive: Directive,
) -> Result<()> {
    loop {
        match directive {
            Directive::Play { ref token, ref url, offset_ms, .. } => {
                println!("PLAY  {}  (offset {}ms)", url, offset_ms);
                let token = token.clone();
                directive = resolver.resolve_next(&token).directive;
            }
            Directive::Stop => {
                println!("STOP");
                return Ok(());
            }
        }
    }
}

/// Print the planned playlist encoded in a start token
fn print_plan(start_token: &str) -> Result<()> {
    let decoded = token::decode(start_token)?;
    println!(
        "Planned battle: rank {:02}, {} team(s), {} segments",
        decoded.meta.rank,
        decoded.meta.team_count,
        decoded.playlist.len()
    );
    for (position, segment) in decoded.playlist.segments().iter().enumerate() {
        println!("  {:02}  {:?}", position + 1, segment);
    }
    println!("Token ({} bytes): {}", start_token.len(), start_token);
    Ok(())
}

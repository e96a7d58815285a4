//! Arcade Gauntlet entry point
//!
//! Plays one headless session with the autopilot, advancing simulated time,
//! then prints the final snapshot (leaderboard included) as JSON.
//!
//! Usage: `arcade-gauntlet [settings.json]`

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use arcade_gauntlet::autopilot::choose_key;
use arcade_gauntlet::persistence::JsonFileStore;
use arcade_gauntlet::session::Phase;
use arcade_gauntlet::{ScoreClient, ScoreService, Session, Settings};

/// Simulated time between bot inputs (ms)
const STEP_MS: u64 = 50;
/// The bot gives up after this many inputs
const MAX_STEPS: u32 = 20_000;
/// How long to wait for the score service after the game ends
const SCORE_WAIT: Duration = Duration::from_millis(500);

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Arcade Gauntlet (headless) starting...");

    let mut settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_or_default(Path::new(&path)),
        None => Settings::default(),
    };
    settings.auto_advance = true;

    let store = JsonFileStore::new(&settings.scores_path);
    let client = match ScoreClient::spawn(ScoreService::new(store)) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to start score service: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut session = Session::new(settings, client);
    if let Err(e) = session.start("AUTOPILOT") {
        log::error!("Failed to start session: {}", e);
        return ExitCode::FAILURE;
    }

    let mut steps = 0;
    while session.phase() == Phase::Playing && steps < MAX_STEPS {
        if let Some(engine) = session.engine() {
            let key = choose_key(engine, session.controls_flipped());
            session.dispatch_input(key);
        }
        session.advance(STEP_MS);
        steps += 1;
    }

    if session.phase() == Phase::Playing {
        log::warn!("Autopilot ran out of steps in {:?} level {}", session.game(), session.level());
        if let Err(e) = session.give_up() {
            log::error!("Failed to end session: {}", e);
        }
    }

    // Submission is asynchronous; collect whatever the worker sends back
    session.poll_scores();
    let mut snapshot = session.snapshot();
    while let Some(view) = session.scores_mut().wait(SCORE_WAIT) {
        snapshot.leaderboard = view;
    }

    match snapshot.to_json() {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize snapshot: {}", e);
            ExitCode::FAILURE
        }
    }
}

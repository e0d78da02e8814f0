//! Neon Runner Headless Demo
//!
//! Plays one run with a simple scripted bot on a manual frame clock, records
//! the input, submits the result to the leaderboard, then replays the
//! recording and checks the state hash.
//!
//! Usage: `neon-runner [CONFIG_JSON] [SEED] [LEADERBOARD_DIR]`
//! An empty or `-` argument keeps the default.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use neon_runner::{
    VERSION,
    game::{
        config::{GameConfig, Viewport},
        events::GameEventData,
        input::PointerEvent,
        replay::{replay_run, InputRecording},
        runner::{Game, ManualScheduler},
        scene::SceneSnapshot,
    },
    leaderboard::{FileStore, Leaderboard, LeaderboardStore, MemoryStore, DEFAULT_CAPACITY},
};

/// Host frame interval (60 Hz display).
const FRAME_MS: f64 = 1000.0 / 60.0;

/// Give up after two minutes of play.
const MAX_FRAMES: usize = 60 * 120;

/// Host-side arguments.
struct Args {
    config: GameConfig,
    seed: u64,
    leaderboard_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Neon Runner Core v{}", VERSION);

    let args = parse_args()?;
    match args.leaderboard_dir.clone() {
        Some(dir) => demo_run(&args, FileStore::new(dir)),
        None => demo_run(&args, MemoryStore::new()),
    }
}

fn parse_args() -> Result<Args> {
    let mut argv = std::env::args().skip(1);
    let mut next = || argv.next().filter(|a| !a.is_empty() && a != "-");

    let config = match next() {
        Some(path) => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {path}"))?;
            GameConfig::from_json_str(&json).with_context(|| format!("Invalid config {path}"))?
        }
        None => GameConfig::default(),
    };
    let seed = match next() {
        Some(raw) => raw.parse().with_context(|| format!("Invalid seed {raw}"))?,
        None => 12345,
    };
    let leaderboard_dir = next().map(PathBuf::from);

    Ok(Args { config, seed, leaderboard_dir })
}

/// Play, record, score and verify one run.
fn demo_run(args: &Args, mut store: impl LeaderboardStore) -> Result<()> {
    info!("=== Starting Demo Run ===");
    info!("Seed: {}", args.seed);

    let viewport = Viewport::default();
    let mut game = Game::try_new(args.config.clone(), viewport, args.seed, ManualScheduler::new())
        .context("Invalid tuning table")?;
    let mut recording = InputRecording::new(args.seed, viewport);
    let mut bot = Bot::default();

    game.start();

    let mut now = 0.0;
    let mut total_events = 0;
    let mut final_score = None;

    for frame in 0..MAX_FRAMES {
        if let Some(scene) = game.scene() {
            for event in bot.decide(&scene, now) {
                game.pointer(event);
                recording.record_pointer(event);
            }
        }

        recording.record_frame(now);
        game.scheduler_mut().fire();
        let Some(output) = game.on_frame(now) else {
            break;
        };
        total_events += output.events.len();

        for event in &output.events {
            match &event.data {
                GameEventData::ChargeReleased { amount, hit } => {
                    info!("Frame {}: charge released at {:.2} ({})", event.frame, amount, if *hit { "SUPER DASH" } else { "miss" });
                }
                GameEventData::ChargeOverheated => {
                    info!("Frame {}: overheated", event.frame);
                }
                _ => {}
            }
        }

        if frame % 600 == 0 {
            info!("Frame {}: score {}, {} events so far", frame, output.score, total_events);
        }

        if let Some(score) = output.game_over {
            info!("Run ended at frame {} with score {}", frame, score);
            final_score = Some(score);
            break;
        }
        now += FRAME_MS;
    }

    let state = game.take_run().context("Game has no run")?;
    let hash = state.compute_hash();
    info!("=== Run Results ===");
    info!("Score: {}", state.score);
    info!("Final State Hash: {}", hex::encode(hash));
    info!("Total events: {}", total_events);

    // Leaderboard
    let mut board = Leaderboard::load(&store, DEFAULT_CAPACITY);
    match final_score {
        Some(score) => {
            board.submit(score, &mut store).context("Failed to save leaderboard")?;
        }
        None => warn!("Run still alive after {} frames, not submitted", MAX_FRAMES),
    }
    for (i, entry) in board.entries().iter().enumerate() {
        info!("#{}: {}m on {}", i + 1, entry.distance, entry.date.format("%Y-%m-%d %H:%M"));
    }

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let bytes = recording.to_bytes()?;
    info!("Recording: {} frames, {} bytes", recording.len(), bytes.len());
    let decoded = InputRecording::from_bytes(&bytes)?;
    let outcome = replay_run(&decoded, &args.config)?;
    info!("Replay State Hash: {}", hex::encode(outcome.hash));

    if hash == outcome.hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
        Ok(())
    } else {
        anyhow::bail!("DETERMINISM FAILURE: Hashes differ!")
    }
}

// =============================================================================
// BOT
// =============================================================================

/// Scripted player reading the scene like a human would.
///
/// Jumps near platform edges, holds on charge zones, and releases once the
/// meter enters the sweet spot.
#[derive(Default)]
struct Bot {
    holding_since: Option<f64>,
}

impl Bot {
    /// Give up on a hold that never started charging.
    const HOLD_PATIENCE_MS: f64 = 600.0;

    /// Jump this close to the edge of the current platform (px).
    const EDGE_MARGIN: f32 = 40.0;

    fn decide(&mut self, scene: &SceneSnapshot, now: f64) -> Vec<PointerEvent> {
        let player = scene.player;
        let (x, y) = (player.center_x(), player.y + player.height / 2.0);

        if let Some(since) = self.holding_since {
            let release = match &scene.charge_bar {
                Some(bar) => bar.in_sweet_spot,
                None => now - since > Self::HOLD_PATIENCE_MS,
            };
            if release {
                self.holding_since = None;
                return vec![PointerEvent::Up { x, time_ms: now }];
            }
            return Vec::new();
        }

        let feet = player.bottom();
        let standing_on = scene
            .platforms
            .iter()
            .find(|p| x >= p.rect.x && x <= p.rect.right() && (feet - p.rect.y).abs() < 2.0);
        let Some(platform) = standing_on else {
            return Vec::new();
        };

        let on_zone = platform
            .charge_zone
            .is_some_and(|zone| x >= zone.x && x <= zone.right());
        if on_zone {
            self.holding_since = Some(now);
            return vec![PointerEvent::Down { x, y, time_ms: now }];
        }

        if platform.rect.right() - player.right() < Self::EDGE_MARGIN {
            return vec![
                PointerEvent::Down { x, y, time_ms: now },
                PointerEvent::Up { x, time_ms: now },
            ];
        }
        Vec::new()
    }
}

//! Input Recording and Replay
//!
//! A run is fully determined by its base seed, the tuning table, the frame
//! timestamps, and the pointer events and viewport changes between frames.
//! Recording those and feeding them back through a headless [`Game`]
//! reproduces the run bit for bit, which [`RunState::compute_hash`] checks.

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::core::hash::StateHash;
use crate::game::config::{GameConfig, Viewport};
use crate::game::events::GameEvent;
use crate::game::input::PointerEvent;
use crate::game::runner::{Game, ManualScheduler};
use crate::game::state::RunState;

/// Format version written at the head of every recording.
pub const RECORDING_VERSION: u16 = 2;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Recording could not be encoded or decoded.
    #[error("Recording codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// Recording was written by an incompatible version.
    #[error("Unsupported recording version {found} (expected {expected})")]
    Version {
        /// Version this build reads
        expected: u16,
        /// Version found in the data
        found: u16,
    },

    /// Replay finished without a run to inspect.
    #[error("Replay produced no run")]
    NoRun,
}

/// Host input delivered before one frame callback.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Host time of the frame callback (ms)
    pub now_ms: f64,
    /// Viewport the host switched to since the previous frame
    pub viewport: Option<Viewport>,
    /// Pointer events received since the previous frame
    pub pointer_events: Vec<PointerEvent>,
}

/// Everything needed to reproduce the first run of a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputRecording {
    /// Format version
    pub version: u16,
    /// Base seed the game was created with
    pub base_seed: u64,
    /// Viewport at start
    pub viewport: Viewport,
    /// Frames in order
    pub frames: Vec<RecordedFrame>,
    #[serde(skip)]
    pending: Vec<PointerEvent>,
    #[serde(skip)]
    pending_viewport: Option<Viewport>,
}

impl InputRecording {
    /// Start an empty recording.
    pub fn new(base_seed: u64, viewport: Viewport) -> Self {
        Self {
            version: RECORDING_VERSION,
            base_seed,
            viewport,
            frames: Vec::new(),
            pending: Vec::new(),
            pending_viewport: None,
        }
    }

    /// Note a pointer event; it is attached to the next frame.
    pub fn record_pointer(&mut self, event: PointerEvent) {
        self.pending.push(event);
    }

    /// Note a viewport change; the last one before a frame wins.
    pub fn record_viewport(&mut self, viewport: Viewport) {
        self.pending_viewport = Some(viewport);
    }

    /// Close a frame at `now_ms`.
    pub fn record_frame(&mut self, now_ms: f64) {
        self.frames.push(RecordedFrame {
            now_ms,
            viewport: self.pending_viewport.take(),
            pointer_events: std::mem::take(&mut self.pending),
        });
    }

    /// Number of recorded frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// No frames recorded?
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ReplayError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode with bincode, rejecting other format versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReplayError> {
        let recording: InputRecording = bincode::deserialize(bytes)?;
        if recording.version != RECORDING_VERSION {
            return Err(ReplayError::Version {
                expected: RECORDING_VERSION,
                found: recording.version,
            });
        }
        Ok(recording)
    }
}

/// Outcome of a replay.
#[derive(Debug)]
pub struct ReplayOutcome {
    /// Run state after the last replayed frame
    pub state: RunState,
    /// Every event emitted, in order
    pub events: Vec<GameEvent>,
    /// Hash of `state`
    pub hash: StateHash,
}

/// Replay a recording from scratch.
///
/// Stops early at game over, exactly as the live loop does.
pub fn replay_run(recording: &InputRecording, config: &GameConfig) -> Result<ReplayOutcome, ReplayError> {
    let mut game = Game::new(
        config.clone(),
        recording.viewport,
        recording.base_seed,
        ManualScheduler::new(),
    );
    game.start();

    let mut events = Vec::new();
    for frame in &recording.frames {
        if let Some(viewport) = frame.viewport {
            game.set_viewport(viewport);
        }
        for event in &frame.pointer_events {
            game.pointer(*event);
        }
        game.scheduler_mut().fire();
        if let Some(output) = game.on_frame(frame.now_ms) {
            events.extend(output.events);
            if output.game_over.is_some() {
                break;
            }
        }
    }

    let state = game.take_run().ok_or(ReplayError::NoRun)?;
    let hash = state.compute_hash();
    debug!(frames = state.frame, events = events.len(), "replay finished");

    Ok(ReplayOutcome { state, events, hash })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Record a scripted session on a live game.
    fn record_session(seed: u64, frames: usize) -> (InputRecording, RunState) {
        let config = GameConfig::default();
        let viewport = Viewport::default();
        let mut game = Game::new(config, viewport, seed, ManualScheduler::new());
        let mut recording = InputRecording::new(seed, viewport);
        game.start();

        let mut now = 0.0;
        for i in 0..frames {
            let script = match i % 90 {
                30 => Some(PointerEvent::Down { x: 200.0, y: 300.0, time_ms: now }),
                33 => Some(PointerEvent::Up { x: 205.0, time_ms: now }),
                60 => Some(PointerEvent::Down { x: 200.0, y: 300.0, time_ms: now }),
                62 => Some(PointerEvent::Move { x: 280.0 }),
                64 => Some(PointerEvent::Up { x: 290.0, time_ms: now }),
                _ => None,
            };
            if let Some(event) = script {
                game.pointer(event);
                recording.record_pointer(event);
            }

            recording.record_frame(now);
            game.scheduler_mut().fire();
            let output = game.on_frame(now);
            if output.is_some_and(|o| o.game_over.is_some()) {
                break;
            }
            now += 1000.0 / 60.0;
        }

        let state = game.take_run().unwrap();
        (recording, state)
    }

    #[test]
    fn test_replay_reproduces_hash() {
        let (recording, live) = record_session(2024, 400);
        let outcome = replay_run(&recording, &GameConfig::default()).unwrap();

        assert_eq!(outcome.state.frame, live.frame);
        assert_eq!(outcome.hash, live.compute_hash());
    }

    #[test]
    fn test_replay_determinism() {
        let (recording, _) = record_session(99, 300);
        let a = replay_run(&recording, &GameConfig::default()).unwrap();
        let b = replay_run(&recording, &GameConfig::default()).unwrap();

        assert_eq!(a.hash, b.hash);
        assert_eq!(a.events, b.events);
    }

    #[test]
    fn test_bytes_round_trip_preserves_replay() {
        let (recording, _) = record_session(5, 200);
        let bytes = recording.to_bytes().unwrap();
        let decoded = InputRecording::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, recording);
        let config = GameConfig::default();
        assert_eq!(
            replay_run(&decoded, &config).unwrap().hash,
            replay_run(&recording, &config).unwrap().hash
        );
    }

    #[test]
    fn test_rejects_other_version() {
        let mut recording = InputRecording::new(1, Viewport::default());
        recording.version = 7;
        let bytes = recording.to_bytes().unwrap();
        assert!(matches!(
            InputRecording::from_bytes(&bytes),
            Err(ReplayError::Version { expected: RECORDING_VERSION, found: 7 })
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            InputRecording::from_bytes(&[1, 2, 3]),
            Err(ReplayError::Codec(_))
        ));
    }

    #[test]
    fn test_replay_follows_viewport_changes() {
        let config = GameConfig::default();
        let viewport = Viewport::default();
        let mut game = Game::new(config.clone(), viewport, 31, ManualScheduler::new());
        let mut recording = InputRecording::new(31, viewport);
        game.start();

        let mut now = 0.0;
        for i in 0..240 {
            let resize = match i {
                60 => Some(Viewport::new(1920.0, 1080.0)),
                150 => Some(Viewport::new(800.0, 600.0)),
                _ => None,
            };
            if let Some(v) = resize {
                game.set_viewport(v);
                recording.record_viewport(v);
            }

            recording.record_frame(now);
            game.scheduler_mut().fire();
            if game.on_frame(now).is_some_and(|o| o.game_over.is_some()) {
                break;
            }
            now += 1000.0 / 60.0;
        }
        let live = game.take_run().unwrap();

        assert_eq!(recording.frames[60].viewport, Some(Viewport::new(1920.0, 1080.0)));
        assert_eq!(recording.frames[61].viewport, None);

        let decoded = InputRecording::from_bytes(&recording.to_bytes().unwrap()).unwrap();
        let outcome = replay_run(&decoded, &config).unwrap();
        assert_eq!(outcome.state.viewport, live.viewport);
        assert_eq!(outcome.hash, live.compute_hash());
    }

    #[test]
    fn test_different_seed_diverges() {
        let (recording, _) = record_session(10, 120);
        let mut other = recording.clone();
        other.base_seed = 11;
        let config = GameConfig::default();
        assert_ne!(
            replay_run(&recording, &config).unwrap().hash,
            replay_run(&other, &config).unwrap().hash
        );
    }
}

//! Frame Orchestrator
//!
//! Owns the run, the tuning table and the host's frame clock. The host
//! forwards pointer events and frame callbacks; the game answers with a
//! [`FrameOutput`] per frame.
//!
//! ```text
//!            start()                       death
//!   Menu ─────────────► Playing ─────────────────► GameOver
//!    ▲                    │  ▲                        │
//!    │ return_to_menu()   │  └──────── start() ───────┤
//!    └────────────────────┴───────────────────────────┘
//! ```
//!
//! At most one frame request is outstanding at any time; it is released on
//! death, on menu return, on restart and on drop.

use std::collections::VecDeque;

use serde::{Serialize, Deserialize};
use tracing::{debug, info, instrument};

use crate::core::rng::derive_run_seed;
use crate::game::config::{ConfigError, GameConfig, Viewport};
use crate::game::events::GameEvent;
use crate::game::input::PointerEvent;
use crate::game::scene::SceneSnapshot;
use crate::game::state::{RunPhase, RunState};
use crate::game::tick::tick;

// =============================================================================
// FRAME SCHEDULING
// =============================================================================

/// Opaque token for a requested frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(pub u64);

/// The host's display-refresh clock.
pub trait FrameScheduler {
    /// Ask for one callback on the next refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a callback that has not fired yet.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Headless scheduler: requests queue up until the driver fires them.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: VecDeque<FrameHandle>,
    /// Total requests made
    pub requested: u64,
    /// Total cancellations made
    pub cancelled: u64,
}

impl ManualScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the oldest pending callback, if any.
    pub fn fire(&mut self) -> Option<FrameHandle> {
        self.pending.pop_front()
    }

    /// Requests not yet fired or cancelled.
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.requested += 1;
        self.pending.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(index) = self.pending.iter().position(|h| *h == handle) {
            self.pending.remove(index);
            self.cancelled += 1;
        }
    }
}

// =============================================================================
// GAME
// =============================================================================

/// What the host gets back from a frame.
#[derive(Clone, Debug, Serialize)]
pub struct FrameOutput {
    /// Scene to draw
    pub scene: SceneSnapshot,
    /// Current score
    pub score: u32,
    /// Events generated this frame
    pub events: Vec<GameEvent>,
    /// Final score, only on the frame the run ended
    pub game_over: Option<u32>,
}

/// The game: run lifecycle plus frame loop.
pub struct Game<S: FrameScheduler> {
    config: GameConfig,
    viewport: Viewport,
    base_seed: u64,
    runs_started: u32,
    run: Option<RunState>,
    last_frame_ms: Option<f64>,
    scheduler: S,
    frame_handle: Option<FrameHandle>,
}

impl<S: FrameScheduler> Game<S> {
    /// Create a game sitting on the menu after validating the tuning table.
    pub fn try_new(
        config: GameConfig,
        viewport: Viewport,
        base_seed: u64,
        scheduler: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config, viewport, base_seed, scheduler))
    }

    /// Create a game sitting on the menu.
    ///
    /// The tuning table is trusted as given; the generator clamps degenerate
    /// values, but [`Game::try_new`] rejects them up front.
    pub fn new(config: GameConfig, viewport: Viewport, base_seed: u64, scheduler: S) -> Self {
        Self {
            config,
            viewport,
            base_seed,
            runs_started: 0,
            run: None,
            last_frame_ms: None,
            scheduler,
            frame_handle: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RunPhase {
        self.run.as_ref().map_or(RunPhase::Menu, |run| run.phase)
    }

    /// Score of the current or just-ended run.
    pub fn score(&self) -> u32 {
        self.run.as_ref().map_or(0, |run| run.score)
    }

    /// The live run, if any.
    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    /// Take the run out of the game, leaving it on the menu.
    pub fn take_run(&mut self) -> Option<RunState> {
        self.release_frame();
        self.last_frame_ms = None;
        self.run.take()
    }

    /// Tuning table.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The frame clock.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// The frame clock, mutably (for headless drivers).
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Is a frame request outstanding?
    pub fn has_pending_frame(&self) -> bool {
        self.frame_handle.is_some()
    }

    /// Begin a new run from scratch, replacing any current one.
    #[instrument(skip(self), fields(run = self.runs_started))]
    pub fn start(&mut self) {
        self.release_frame();

        let seed = derive_run_seed(self.base_seed, self.runs_started);
        self.runs_started = self.runs_started.wrapping_add(1);
        self.run = Some(RunState::new(seed, self.viewport, &self.config));
        self.last_frame_ms = None;

        info!(seed, "run started");
        self.request_frame();
    }

    /// Abandon the run and go back to the menu.
    pub fn return_to_menu(&mut self) {
        self.release_frame();
        self.last_frame_ms = None;
        if self.run.take().is_some() {
            info!("returned to menu");
        }
    }

    /// Resize the play area. Applies to the live run immediately.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(run) = self.run.as_mut() {
            run.viewport = viewport;
        }
    }

    /// Forward a raw pointer event. Ignored unless Playing.
    pub fn pointer(&mut self, event: PointerEvent) {
        if let Some(run) = self.run.as_mut() {
            run.apply_pointer(event, &self.config);
        }
    }

    /// Pointer pressed.
    pub fn pointer_down(&mut self, x: f32, y: f32, time_ms: f64) {
        self.pointer(PointerEvent::Down { x, y, time_ms });
    }

    /// Pointer moved.
    pub fn pointer_move(&mut self, x: f32) {
        self.pointer(PointerEvent::Move { x });
    }

    /// Pointer released.
    pub fn pointer_up(&mut self, x: f32, time_ms: f64) {
        self.pointer(PointerEvent::Up { x, time_ms });
    }

    /// Pointer gesture interrupted.
    pub fn pointer_cancel(&mut self, time_ms: f64) {
        self.pointer(PointerEvent::Cancel { time_ms });
    }

    /// Scene for the current state without stepping.
    pub fn scene(&self) -> Option<SceneSnapshot> {
        self.run
            .as_ref()
            .map(|run| SceneSnapshot::capture(run, &self.config.charge))
    }

    /// Frame callback from the host clock.
    ///
    /// The first frame of a run steps with `dt = 0`. Returns `None` and
    /// schedules nothing when not Playing.
    pub fn on_frame(&mut self, now_ms: f64) -> Option<FrameOutput> {
        // The outstanding request has fired
        self.frame_handle = None;

        let run = match self.run.as_mut() {
            Some(run) if run.is_playing() => run,
            _ => return None,
        };

        let dt = match self.last_frame_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        let result = tick(run, dt, now_ms, &self.config);
        let output = FrameOutput {
            scene: SceneSnapshot::capture(run, &self.config.charge),
            score: run.score,
            events: result.events,
            game_over: result.game_over,
        };

        if output.game_over.is_none() {
            self.request_frame();
        } else {
            debug!(score = output.score, "frame loop stopped");
        }
        Some(output)
    }

    fn request_frame(&mut self) {
        self.release_frame();
        self.frame_handle = Some(self.scheduler.request_frame());
    }

    fn release_frame(&mut self) {
        if let Some(handle) = self.frame_handle.take() {
            self.scheduler.cancel_frame(handle);
        }
    }
}

impl<S: FrameScheduler> Drop for Game<S> {
    fn drop(&mut self) {
        self.release_frame();
    }
}

// =============================================================================
// TESTS
// =============================================================================

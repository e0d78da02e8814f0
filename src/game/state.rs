//! Run State Definitions
//!
//! Everything one run owns: the player, the level, the camera, scoring,
//! the live pointer session and the seeded RNG. A run is created on start,
//! mutated once per frame and discarded when the host returns to the menu.

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::rng::DeterministicRng;
use crate::game::camera::Camera;
use crate::game::collision::charge_zone_under;
use crate::game::config::{GameConfig, Viewport};
use crate::game::events::GameEvent;
use crate::game::input::{Gesture, HoldContext, InputState, PointerEvent};
use crate::game::platform::{Platform, generate_platforms, starting_platform};
use crate::game::player::{Movement, Player};

// =============================================================================
// RUN PHASE
// =============================================================================

/// Top-level phase as seen by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum RunPhase {
    /// No run, waiting on the menu
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Run ended, score frozen
    GameOver,
}

// =============================================================================
// RUN STATE
// =============================================================================

/// Complete state of a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunState {
    /// Seed of this run's RNG (for verification)
    pub seed: u64,

    /// Frames stepped so far
    pub frame: u32,

    /// Playing or GameOver
    pub phase: RunPhase,

    /// Visible area
    pub viewport: Viewport,

    /// The avatar
    pub player: Player,

    /// Level geometry, ascending x
    pub platforms: Vec<Platform>,

    /// Scroll position
    pub camera: Camera,

    /// Furthest x the player has reached
    pub max_distance: f32,

    /// `floor(max_distance / score_scale)`
    pub score: u32,

    /// Live pointer session
    pub input: InputState,

    /// Gestures waiting for the next step
    pub pending_gestures: Vec<Gesture>,

    /// Deterministic RNG state
    pub rng: DeterministicRng,

    /// Events generated since the last take (cleared by the caller)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl RunState {
    /// Build a fresh run: starting platform, player at spawn, level filled
    /// ahead of the camera.
    pub fn new(seed: u64, viewport: Viewport, config: &GameConfig) -> Self {
        let mut state = Self {
            seed,
            frame: 0,
            phase: RunPhase::Playing,
            viewport,
            player: Player::new(Player::SPAWN, &config.physics),
            platforms: vec![starting_platform(&config.generator)],
            camera: Camera::default(),
            max_distance: 0.0,
            score: 0,
            input: InputState::new(),
            pending_gestures: Vec::new(),
            rng: DeterministicRng::new(seed),
            pending_events: Vec::new(),
        };

        generate_platforms(
            &mut state.platforms,
            state.camera.x,
            state.score,
            state.player.current_speed,
            viewport,
            config,
            &mut state.rng,
        );
        state.push_event(GameEvent::run_started(0, seed));
        state
    }

    /// Is the run still live?
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == RunPhase::Playing
    }

    /// Has the run ended?
    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == RunPhase::GameOver
    }

    /// Feed a raw pointer event. Completed gestures are queued for the next
    /// step. Ignored once the run has ended.
    pub fn apply_pointer(&mut self, event: PointerEvent, config: &GameConfig) {
        if !self.is_playing() {
            return;
        }
        let charge = self.player.charge_amount();
        if let Some(gesture) = self.input.apply(event, charge, &config.input) {
            self.pending_gestures.push(gesture);
        }
    }

    /// Player-side half of the hold condition.
    pub fn hold_context(&self, config: &GameConfig) -> HoldContext {
        HoldContext {
            in_charge_zone: charge_zone_under(&self.player, &self.platforms, &config.charge).is_some(),
            movement_locked: self.player.is_locked(),
        }
    }

    /// Advance the distance high-water mark and the score.
    pub fn update_score(&mut self, config: &GameConfig) {
        if self.player.pos.x > self.max_distance {
            self.max_distance = self.player.pos.x;
            self.score = (self.max_distance / config.frame.score_scale).floor() as u32;
        }
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.frame, self.seed, |hasher| {
            let player = &self.player;
            hasher.update_vec2(player.pos);
            hasher.update_vec2(player.vel);
            hasher.update_bool(player.grounded);
            hasher.update_u8(player.tag() as u8);
            match player.movement {
                Movement::Running => {}
                Movement::Dashing { timer } | Movement::SuperDashing { timer } => {
                    hasher.update_f32(timer);
                }
                Movement::Charging { amount, direction, elapsed, sweet_spot } => {
                    hasher.update_f32(amount);
                    hasher.update_f32(direction);
                    hasher.update_f32(elapsed);
                    hasher.update_f32(sweet_spot.min);
                    hasher.update_f32(sweet_spot.max);
                }
                Movement::AutoLanding { start, target, landing_y, timer } => {
                    hasher.update_vec2(start);
                    hasher.update_vec2(target);
                    hasher.update_f32(landing_y);
                    hasher.update_f32(timer);
                }
            }
            hasher.update_f32(player.current_speed);

            hasher.update_u32(self.platforms.len() as u32);
            for platform in &self.platforms {
                hasher.update_rect(platform.rect());
                match platform.zone_rect() {
                    Some(zone) => {
                        hasher.update_bool(true);
                        hasher.update_rect(zone);
                    }
                    None => hasher.update_bool(false),
                }
            }

            hasher.update_f32(self.camera.x);
            hasher.update_f32(self.max_distance);
            hasher.update_u32(self.score);
            hasher.update_bool(self.is_game_over());

            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::GameEventData;

    #[test]
    fn test_new_run_layout() {
        let config = GameConfig::default();
        let viewport = Viewport::default();
        let mut state = RunState::new(42, viewport, &config);

        assert!(state.is_playing());
        assert_eq!(state.player.pos, Player::SPAWN);
        assert_eq!(state.platforms[0], starting_platform(&config.generator));
        assert!(state.platforms.len() > 1);
        let last = state.platforms.last().unwrap();
        assert!(last.right() >= viewport.width * config.generator.lookahead_screens);

        let events = state.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, GameEventData::RunStarted { seed: 42 });
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_run_state_determinism() {
        let config = GameConfig::default();
        let a = RunState::new(12345, Viewport::default(), &config);
        let b = RunState::new(12345, Viewport::default(), &config);
        let c = RunState::new(54321, Viewport::default(), &config);

        assert_eq!(a.platforms, b.platforms);
        assert_eq!(a.compute_hash(), b.compute_hash());
        assert_ne!(a.compute_hash(), c.compute_hash());
    }

    #[test]
    fn test_score_tracks_high_water_mark() {
        let config = GameConfig::default();
        let mut state = RunState::new(1, Viewport::default(), &config);

        state.player.pos.x = 450.0;
        state.update_score(&config);
        assert_eq!(state.score, 4);

        // Moving back never lowers it
        state.player.pos.x = 300.0;
        state.update_score(&config);
        assert_eq!(state.max_distance, 450.0);
        assert_eq!(state.score, 4);
    }

    #[test]
    fn test_pointer_ignored_after_game_over() {
        let config = GameConfig::default();
        let mut state = RunState::new(1, Viewport::default(), &config);

        state.apply_pointer(PointerEvent::Down { x: 0.0, y: 0.0, time_ms: 0.0 }, &config);
        state.apply_pointer(PointerEvent::Up { x: 0.0, time_ms: 50.0 }, &config);
        assert_eq!(state.pending_gestures, vec![Gesture::Tap]);

        state.phase = RunPhase::GameOver;
        state.apply_pointer(PointerEvent::Down { x: 0.0, y: 0.0, time_ms: 100.0 }, &config);
        assert!(!state.input.is_down);
    }
}

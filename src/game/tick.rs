//! Simulation Tick
//!
//! One frame of the run. Order within a frame:
//!
//! 1. recompute run speed from score
//! 2. apply gestures queued since the last frame
//! 3. enter / cancel a charge from the hold condition
//! 4. movement update by state (AutoLanding > SuperDashing > Charging > Dashing > Running)
//! 5. landing resolution (Running and Dashing only)
//! 6. trail, score, death check
//! 7. platform generation and culling
//! 8. camera follow
//!
//! Given the same run state, `dt` sequence and pointer stream, a tick is
//! deterministic: all randomness comes from the run's seeded RNG.

use tracing::{debug, info};
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;
use crate::game::collision::{check_death, landing_target, resolve_landing, DeathCause, Landing};
use crate::game::config::{ChargeConfig, GameConfig};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::Gesture;
use crate::game::platform::{cull_platforms, generate_platforms};
use crate::game::player::{Movement, StateTag, SweetSpot};
use crate::game::state::{RunPhase, RunState};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Final score, set only on the tick the run ended
    pub game_over: Option<u32>,
}

/// Run one frame.
///
/// `dt` is clamped to `[0, max_frame_dt]`. `now_ms` is the host clock used
/// for the hold delay. Does nothing unless the run is Playing.
pub fn tick(state: &mut RunState, dt: f32, now_ms: f64, config: &GameConfig) -> TickResult {
    let mut result = TickResult::default();

    match state.phase {
        RunPhase::Menu | RunPhase::GameOver => {
            result.events = state.take_events();
            return result;
        }
        RunPhase::Playing => {}
    }

    let dt = dt.clamp(0.0, config.frame.max_frame_dt);

    // 0. Advance frame counter
    state.frame += 1;

    // 1. Speed from score
    let score = state.score;
    state.player.update_speed(score, &config.physics);

    // 2. Gestures
    apply_gestures(state, config);

    // 3. Hold condition
    update_charge_entry(state, now_ms, config);

    // 4-5. Movement and landing
    update_movement(state, dt, config);

    // 6. Trail, score, death
    state.player.update_trail(dt, &config.physics);
    state.update_score(config);

    #[cfg(feature = "debug-tracing")]
    trace!(
        frame = state.frame,
        x = state.player.pos.x,
        y = state.player.pos.y,
        vx = state.player.vel.x,
        vy = state.player.vel.y,
        state = ?state.player.tag(),
        grounded = state.player.grounded,
        "step"
    );

    if let Some(cause) = check_death(&state.player, &state.camera, state.viewport, &config.physics) {
        end_run(state, cause, &mut result);
        result.events = state.take_events();
        return result;
    }

    // 7. Level
    generate_platforms(
        &mut state.platforms,
        state.camera.x,
        state.score,
        state.player.current_speed,
        state.viewport,
        config,
        &mut state.rng,
    );
    cull_platforms(&mut state.platforms, state.camera.x, &config.generator);

    // 8. Camera
    state
        .camera
        .update(state.player.pos.x, dt, state.viewport, &config.camera);

    result.events = state.take_events();
    result
}

/// Record a movement transition if the state tag changed.
fn record_transition(state: &mut RunState, before: StateTag) {
    let after = state.player.tag();
    if after != before {
        debug!(frame = state.frame, from = ?before, to = ?after, "movement state changed");
        state.push_event(GameEvent::state_changed(state.frame, before, after));
    }
}

/// Apply every gesture queued since the last tick, in arrival order.
fn apply_gestures(state: &mut RunState, config: &GameConfig) {
    let gestures = std::mem::take(&mut state.pending_gestures);
    for gesture in gestures {
        let before = state.player.tag();
        apply_gesture(state, gesture, config);
        record_transition(state, before);
    }
}

fn apply_gesture(state: &mut RunState, gesture: Gesture, config: &GameConfig) {
    let frame = state.frame;
    let physics = &config.physics;
    let player = &mut state.player;

    match gesture {
        Gesture::Tap => {
            if player.grounded && !player.is_locked() {
                player.vel.y = physics.jump_force;
                player.grounded = false;
                let position = player.pos;
                state.push_event(GameEvent::new(frame, GameEventData::Jumped { position }));
            }
        }
        Gesture::Swipe => {
            if player.movement == Movement::Running {
                player.movement = Movement::Dashing { timer: physics.dash_duration };
            }
        }
        Gesture::ReleaseCharge(amount) => {
            if let Movement::Charging { sweet_spot, .. } = player.movement {
                let hit = sweet_spot.contains(amount);
                if hit {
                    player.movement = Movement::SuperDashing { timer: physics.super_dash_duration };
                    player.grounded = false;
                } else {
                    player.movement = Movement::Running;
                }
                state.push_event(GameEvent::new(frame, GameEventData::ChargeReleased { amount, hit }));
            }
        }
        Gesture::NoOp => {}
    }
}

/// Draw a sweet spot of the configured width inside the placement band.
pub fn draw_sweet_spot(rng: &mut DeterministicRng, charge: &ChargeConfig) -> SweetSpot {
    let min = rng.next_range(
        ChargeConfig::SWEET_SPOT_FLOOR,
        ChargeConfig::SWEET_SPOT_CEIL - charge.sweet_spot_width,
    );
    SweetSpot { min, max: min + charge.sweet_spot_width }
}

/// Start a charge when the hold is newly asserted; cancel one whose hold
/// dropped without a release.
fn update_charge_entry(state: &mut RunState, now_ms: f64, config: &GameConfig) {
    let ctx = state.hold_context(config);
    let holding = state.input.is_holding(now_ms, ctx, &config.input);
    let before = state.player.tag();

    match state.player.movement {
        Movement::Charging { .. } if !holding => {
            state.player.movement = Movement::Running;
            state.push_event(GameEvent::new(state.frame, GameEventData::ChargeCancelled));
        }
        Movement::Running | Movement::Dashing { .. } if holding => {
            let sweet_spot = draw_sweet_spot(&mut state.rng, &config.charge);
            state.player.movement = Movement::Charging {
                amount: 0.0,
                direction: 1.0,
                elapsed: 0.0,
                sweet_spot,
            };
            state.player.vel = Vec2::ZERO;
            state.push_event(GameEvent::new(state.frame, GameEventData::ChargeStarted { sweet_spot }));
        }
        _ => {}
    }

    record_transition(state, before);
}

/// Per-state movement update followed by landing resolution.
fn update_movement(state: &mut RunState, dt: f32, config: &GameConfig) {
    let physics = &config.physics;
    let before = state.player.tag();
    let prev_bottom = state.player.bottom();
    let speed = state.player.current_speed;
    let mut free_movement = false;

    match state.player.movement {
        Movement::AutoLanding { start, target, landing_y, timer } => {
            let player = &mut state.player;
            let timer = timer + dt;
            let t = (timer / physics.auto_land_duration).clamp(0.0, 1.0);

            if t >= 1.0 {
                player.pos = target;
                player.vel = Vec2::ZERO;
                player.grounded = true;
                player.movement = Movement::Running;
            } else {
                let ease = 1.0 - (1.0 - t).powi(3);
                let next = start.lerp(target, ease);
                player.vel = if dt > 0.0 { (next - player.pos).scale(1.0 / dt) } else { Vec2::ZERO };
                player.pos = next;
                player.movement = Movement::AutoLanding { start, target, landing_y, timer };
            }
        }

        Movement::SuperDashing { timer } => {
            let player = &mut state.player;
            player.vel = Vec2::new(speed * physics.super_dash_speed_mult, physics.super_dash_speed_y);
            player.pos = player.pos + player.vel * dt;

            let timer = timer - dt;
            if timer > 0.0 {
                player.movement = Movement::SuperDashing { timer };
            } else {
                match landing_target(&state.platforms, player.pos.x, physics.auto_land_lookahead) {
                    Some(platform) => {
                        let target = Vec2::new(
                            platform.x + physics.auto_land_inset,
                            platform.y - player.height,
                        );
                        player.movement = Movement::AutoLanding {
                            start: player.pos,
                            target,
                            landing_y: platform.y,
                            timer: 0.0,
                        };
                        state.push_event(GameEvent::new(
                            state.frame,
                            GameEventData::AutoLandStarted { target },
                        ));
                    }
                    None => {
                        player.movement = Movement::Running;
                        player.vel.x = speed;
                    }
                }
            }
        }

        Movement::Charging { .. } => {
            state.player.vel = Vec2::ZERO;
            let elapsed = state.player.advance_charge(dt, &config.charge).unwrap_or(0.0);
            if elapsed >= config.charge.max_hold_time {
                info!(frame = state.frame, elapsed, "charge overheated");
                state.player.movement = Movement::Running;
                state.input.spend_hold();
                state.push_event(GameEvent::new(state.frame, GameEventData::ChargeOverheated));
            }
        }

        Movement::Dashing { timer } => {
            let player = &mut state.player;
            player.vel = Vec2::new(speed * physics.dash_speed_mult, 0.0);
            player.pos = player.pos + player.vel * dt;

            let timer = timer - dt;
            player.movement = if timer > 0.0 {
                Movement::Dashing { timer }
            } else {
                Movement::Running
            };
            free_movement = true;
        }

        Movement::Running => {
            let player = &mut state.player;
            player.vel.x = speed;
            player.vel.y += physics.gravity * dt;
            player.pos = player.pos + player.vel * dt;
            free_movement = true;
        }
    }

    if free_movement {
        let was_grounded = state.player.grounded;
        let landing = resolve_landing(&mut state.player, prev_bottom, &state.platforms, physics);
        if let Some(Landing { surface_y, dash_cancelled }) = landing {
            if !was_grounded {
                state.push_event(GameEvent::new(
                    state.frame,
                    GameEventData::Landed { surface_y, dash_cancelled },
                ));
            }
        }
    }

    record_transition(state, before);
}

/// Freeze the run and announce the final score.
fn end_run(state: &mut RunState, cause: DeathCause, result: &mut TickResult) {
    state.phase = RunPhase::GameOver;
    result.game_over = Some(state.score);

    info!(
        frame = state.frame,
        score = state.score,
        distance = state.max_distance,
        cause = ?cause,
        "run over"
    );
    state.push_event(GameEvent::game_over(state.frame, state.score, state.max_distance));
}

// =============================================================================
// TESTS
// =============================================================================

//! Player State
//!
//! The avatar's kinematics and its movement state. The five movement states
//! are one enum, so at most one can ever be active:
//!
//! ```text
//!            swipe                     timer
//! Running ─────────► Dashing ─────────────────► Running
//!    │  ▲                │ land (collision)         ▲
//!    │  └────────────────┘                          │
//!    │ hold (in zone)                                │ overheat / slide off
//!    ▼                 release in sweet spot        │
//! Charging ──────────────────────────► SuperDashing ─┤ no platform ahead
//!                                          │ timer   │
//!                                          ▼         │
//!                                     AutoLanding ───┘ touchdown
//! ```

use serde::{Serialize, Deserialize};

use crate::core::vec2::{Vec2, Rect};
use crate::game::config::{ChargeConfig, PhysicsConfig};

// =============================================================================
// MOVEMENT
// =============================================================================

/// Window of the charge meter that fires a super dash.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweetSpot {
    /// Lower bound (inclusive)
    pub min: f32,
    /// Upper bound (inclusive)
    pub max: f32,
}

impl SweetSpot {
    /// Does `amount` fall inside the window?
    #[inline]
    pub fn contains(&self, amount: f32) -> bool {
        amount >= self.min && amount <= self.max
    }
}

/// Mutually exclusive movement states with their payloads.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Movement {
    /// Auto-run under gravity.
    Running,
    /// Horizontal speed boost with gravity suspended.
    Dashing {
        /// Seconds left
        timer: f32,
    },
    /// Frozen in place while the meter oscillates.
    Charging {
        /// Meter value in `[0, 1]`
        amount: f32,
        /// +1 filling, -1 draining
        direction: f32,
        /// Seconds spent charging
        elapsed: f32,
        /// Window that fires the super dash
        sweet_spot: SweetSpot,
    },
    /// High-speed flight after a good release.
    SuperDashing {
        /// Seconds left
        timer: f32,
    },
    /// Eased flight onto a chosen platform.
    AutoLanding {
        /// Position when the landing began
        start: Vec2,
        /// Touchdown position (top-left of the player box)
        target: Vec2,
        /// Top surface of the target platform
        landing_y: f32,
        /// Seconds since the landing began
        timer: f32,
    },
}

impl Movement {
    /// Presentation tag for this state.
    pub fn tag(&self) -> StateTag {
        match self {
            Movement::Running => StateTag::Running,
            Movement::Dashing { .. } => StateTag::Dashing,
            Movement::Charging { .. } => StateTag::Charging,
            Movement::SuperDashing { .. } => StateTag::SuperDashing,
            Movement::AutoLanding { .. } => StateTag::AutoLanding,
        }
    }
}

/// Fieldless mirror of [`Movement`] for presentation and events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StateTag {
    /// Normal run
    Running = 0,
    /// Dash
    Dashing = 1,
    /// Charging the meter
    Charging = 2,
    /// Super dash flight
    SuperDashing = 3,
    /// Scripted landing
    AutoLanding = 4,
}

impl StateTag {
    /// Fill colour the presentation layer should use.
    pub fn color(self) -> &'static str {
        match self {
            StateTag::Running | StateTag::Charging => "#06b6d4",
            StateTag::Dashing => "#22d3ee",
            StateTag::SuperDashing | StateTag::AutoLanding => "#eab308",
        }
    }
}

// =============================================================================
// CHARGE METER
// =============================================================================

/// Advance a ping-pong meter by `delta` (already scaled by rate and time).
///
/// The meter travels a triangle wave over `[0, 1]`; any overshoot reflects
/// off the bound, however large `delta` is. Returns `(amount, direction)`.
pub fn ping_pong(amount: f32, direction: f32, delta: f32) -> (f32, f32) {
    // Unfold onto a phase in [0, 2): rising half [0, 1], falling half (1, 2)
    let phase = if direction >= 0.0 { amount } else { 2.0 - amount };
    let phase = (phase + delta.abs()).rem_euclid(2.0);
    if phase <= 1.0 {
        (phase, 1.0)
    } else {
        (2.0 - phase, -1.0)
    }
}

// =============================================================================
// TRAIL
// =============================================================================

/// One faded afterimage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrailEntry {
    /// Top-left corner
    pub pos: Vec2,
    /// Opacity in `(0, 1]`
    pub alpha: f32,
    /// State at the time the image was left
    pub tag: StateTag,
}

// =============================================================================
// PLAYER
// =============================================================================

/// The avatar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner, world space
    pub pos: Vec2,
    /// Velocity (px/s)
    pub vel: Vec2,
    /// Box width
    pub width: f32,
    /// Box height
    pub height: f32,
    /// Landed during the current step
    pub grounded: bool,
    /// Current movement state
    pub movement: Movement,
    /// Auto-run speed for the current score
    pub current_speed: f32,
    /// Afterimages, oldest first
    pub trail: Vec<TrailEntry>,
}

impl Player {
    /// Spawn position for a new run.
    pub const SPAWN: Vec2 = Vec2::new(100.0, 200.0);

    /// Create a player at `pos`, airborne and running.
    pub fn new(pos: Vec2, physics: &PhysicsConfig) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            width: physics.player_size,
            height: physics.player_size,
            grounded: false,
            movement: Movement::Running,
            current_speed: physics.min_speed,
            trail: Vec::new(),
        }
    }

    /// Bounding box.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    /// Feet.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height
    }

    /// Horizontal centre.
    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Current state tag.
    #[inline]
    pub fn tag(&self) -> StateTag {
        self.movement.tag()
    }

    /// Meter value when charging.
    pub fn charge_amount(&self) -> Option<f32> {
        match self.movement {
            Movement::Charging { amount, .. } => Some(amount),
            _ => None,
        }
    }

    /// Is the player charging?
    #[inline]
    pub fn is_charging(&self) -> bool {
        matches!(self.movement, Movement::Charging { .. })
    }

    /// SuperDashing or AutoLanding: no jumps, dashes, charges or collisions.
    #[inline]
    pub fn is_locked(&self) -> bool {
        matches!(
            self.movement,
            Movement::SuperDashing { .. } | Movement::AutoLanding { .. }
        )
    }

    /// Recompute the auto-run speed from the score.
    pub fn update_speed(&mut self, score: u32, physics: &PhysicsConfig) {
        self.current_speed =
            (physics.min_speed + score as f32 * physics.speed_scale).min(physics.max_speed);
    }

    /// Advance the charge meter and its hold clock.
    ///
    /// Returns the total time spent charging, or `None` outside Charging.
    pub fn advance_charge(&mut self, dt: f32, charge: &ChargeConfig) -> Option<f32> {
        match &mut self.movement {
            Movement::Charging { amount, direction, elapsed, .. } => {
                let (a, d) = ping_pong(*amount, *direction, dt / charge.cycle_duration);
                *amount = a;
                *direction = d;
                *elapsed += dt;
                Some(*elapsed)
            }
            _ => None,
        }
    }

    /// Leave an afterimage when moving, then fade all afterimages.
    ///
    /// Frames with no elapsed time add nothing, so a stalled clock cannot
    /// grow the trail.
    pub fn update_trail(&mut self, dt: f32, physics: &PhysicsConfig) {
        if dt <= 0.0 {
            return;
        }
        if self.vel.x > 0.0 || self.vel.y.abs() > 0.0 {
            self.trail.push(TrailEntry {
                pos: self.pos,
                alpha: 1.0,
                tag: self.tag(),
            });
        }
        let fade = dt * physics.trail_decay;
        for entry in &mut self.trail {
            entry.alpha -= fade;
        }
        self.trail.retain(|entry| entry.alpha > 0.0);
    }
}

// =============================================================================
// TESTS
// =============================================================================

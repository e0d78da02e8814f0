//! Pointer Sampling and Gesture Classification
//!
//! Turns one raw pointer stream into gesture intents:
//!
//! ```text
//! down ──► session open ──► move (current_x only) ──► up / cancel
//!              │                                          │
//!              └── held > HOLD_DELAY, still ──► hold      └──► classify_gesture()
//!                  (continuous, read every step)               ReleaseCharge > Swipe > Tap > NoOp
//! ```
//!
//! The sampler never touches player state. The player-side half of the hold
//! condition arrives as a [`HoldContext`].

use serde::{Serialize, Deserialize};
use crate::game::config::InputConfig;

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Raw pointer event from the host.
///
/// Timestamps are host milliseconds on the same clock as frame timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Finger / button pressed.
    Down {
        /// Screen x
        x: f32,
        /// Screen y
        y: f32,
        /// Host time (ms)
        time_ms: f64,
    },
    /// Pointer moved while pressed.
    Move {
        /// Screen x
        x: f32,
    },
    /// Finger / button released.
    Up {
        /// Screen x
        x: f32,
        /// Host time (ms)
        time_ms: f64,
    },
    /// Gesture interrupted by the platform (treated as a release in place).
    Cancel {
        /// Host time (ms)
        time_ms: f64,
    },
}

/// Classified intent of a completed pointer session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Gesture {
    /// Quick rightward drag: dash.
    Swipe,
    /// Quick press: jump.
    Tap,
    /// Release while charging, carrying the meter value at release.
    ReleaseCharge(f32),
    /// Ambiguous press that never reached a charge.
    NoOp,
}

/// Player-side facts the hold condition depends on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HoldContext {
    /// Grounded with the centre over a charge zone.
    pub in_charge_zone: bool,
    /// SuperDashing or AutoLanding.
    pub movement_locked: bool,
}

/// Classify a completed pointer session.
///
/// Priority: charge release, then swipe, then tap, else nothing.
/// `charge` is `Some(amount)` when the player was charging at release time.
pub fn classify_gesture(
    charge: Option<f32>,
    dx: f32,
    duration_ms: f64,
    config: &InputConfig,
) -> Gesture {
    if let Some(amount) = charge {
        Gesture::ReleaseCharge(amount)
    } else if dx >= config.swipe_min_dist {
        Gesture::Swipe
    } else if duration_ms < config.tap_max_time_ms {
        Gesture::Tap
    } else {
        Gesture::NoOp
    }
}

// =============================================================================
// INPUT STATE
// =============================================================================

/// The single live pointer session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    /// Is a session open?
    pub is_down: bool,
    /// Press position
    pub start_x: f32,
    /// Press position
    pub start_y: f32,
    /// Latest horizontal position
    pub current_x: f32,
    /// Press time (ms)
    pub down_time_ms: f64,
    /// Set when a charge overheated; no new charge until the pointer lifts.
    pub hold_spent: bool,
}

impl InputState {
    /// Create a closed session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session, replacing any open one.
    pub fn pointer_down(&mut self, x: f32, y: f32, time_ms: f64) {
        *self = Self {
            is_down: true,
            start_x: x,
            start_y: y,
            current_x: x,
            down_time_ms: time_ms,
            hold_spent: false,
        };
    }

    /// Track horizontal travel of the open session.
    pub fn pointer_move(&mut self, x: f32) {
        if self.is_down {
            self.current_x = x;
        }
    }

    /// Close the session and classify it.
    ///
    /// Returns `None` when no session was open.
    pub fn pointer_up(
        &mut self,
        x: f32,
        time_ms: f64,
        charge: Option<f32>,
        config: &InputConfig,
    ) -> Option<Gesture> {
        if !self.is_down {
            return None;
        }
        let dx = x - self.start_x;
        let duration = time_ms - self.down_time_ms;
        self.reset();
        Some(classify_gesture(charge, dx, duration, config))
    }

    /// Close the session at the last known position.
    pub fn pointer_cancel(
        &mut self,
        time_ms: f64,
        charge: Option<f32>,
        config: &InputConfig,
    ) -> Option<Gesture> {
        let x = self.current_x;
        self.pointer_up(x, time_ms, charge, config)
    }

    /// Apply a raw event. Returns the gesture when the event closed a session.
    pub fn apply(
        &mut self,
        event: PointerEvent,
        charge: Option<f32>,
        config: &InputConfig,
    ) -> Option<Gesture> {
        match event {
            PointerEvent::Down { x, y, time_ms } => {
                self.pointer_down(x, y, time_ms);
                None
            }
            PointerEvent::Move { x } => {
                self.pointer_move(x);
                None
            }
            PointerEvent::Up { x, time_ms } => self.pointer_up(x, time_ms, charge, config),
            PointerEvent::Cancel { time_ms } => self.pointer_cancel(time_ms, charge, config),
        }
    }

    /// Horizontal travel since the press.
    #[inline]
    pub fn displacement(&self) -> f32 {
        self.current_x - self.start_x
    }

    /// Is the hold condition asserted at `now_ms`?
    pub fn is_holding(&self, now_ms: f64, ctx: HoldContext, config: &InputConfig) -> bool {
        self.is_down
            && !self.hold_spent
            && now_ms - self.down_time_ms > config.hold_delay_ms
            && self.displacement().abs() < config.swipe_min_dist
            && ctx.in_charge_zone
            && !ctx.movement_locked
    }

    /// Block further charges until the pointer lifts.
    pub fn spend_hold(&mut self) {
        self.hold_spent = true;
    }

    /// Close the session without classifying.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const IN_ZONE: HoldContext = HoldContext { in_charge_zone: true, movement_locked: false };

    #[test]
    fn test_classify_priority() {
        let config = InputConfig::default();

        // Charge release wins over everything
        assert_eq!(
            classify_gesture(Some(0.5), 500.0, 10.0, &config),
            Gesture::ReleaseCharge(0.5)
        );
        // Swipe beats tap
        assert_eq!(classify_gesture(None, 60.0, 10.0, &config), Gesture::Swipe);
        // Short press is a tap
        assert_eq!(classify_gesture(None, 5.0, 199.0, &config), Gesture::Tap);
        // Long still press without charge is nothing
        assert_eq!(classify_gesture(None, 5.0, 200.0, &config), Gesture::NoOp);
        // Leftward drag is not a swipe
        assert_eq!(classify_gesture(None, -100.0, 500.0, &config), Gesture::NoOp);
    }

    #[test]
    fn test_session_lifecycle() {
        let config = InputConfig::default();
        let mut input = InputState::new();

        input.pointer_down(100.0, 200.0, 1000.0);
        assert!(input.is_down);
        input.pointer_move(130.0);
        assert_eq!(input.current_x, 130.0);
        assert_eq!(input.start_y, 200.0);

        let gesture = input.pointer_up(130.0, 1050.0, None, &config);
        assert_eq!(gesture, Some(Gesture::Tap));
        assert!(!input.is_down);

        // Second up without a session yields nothing
        assert_eq!(input.pointer_up(130.0, 1100.0, None, &config), None);
    }

    #[test]
    fn test_move_without_session_ignored() {
        let mut input = InputState::new();
        input.pointer_move(500.0);
        assert_eq!(input.current_x, 0.0);
    }

    #[test]
    fn test_swipe_uses_release_position() {
        let config = InputConfig::default();
        let mut input = InputState::new();
        input.pointer_down(100.0, 0.0, 0.0);
        // No move events; release far to the right
        let gesture = input.pointer_up(200.0, 300.0, None, &config);
        assert_eq!(gesture, Some(Gesture::Swipe));
    }

    #[test]
    fn test_cancel_uses_last_position() {
        let config = InputConfig::default();
        let mut input = InputState::new();
        input.pointer_down(100.0, 0.0, 0.0);
        input.pointer_move(180.0);
        let gesture = input.pointer_cancel(400.0, None, &config);
        assert_eq!(gesture, Some(Gesture::Swipe));
    }

    #[test]
    fn test_hold_requires_delay_and_stillness() {
        let config = InputConfig::default();
        let mut input = InputState::new();
        input.pointer_down(100.0, 0.0, 0.0);

        assert!(!input.is_holding(100.0, IN_ZONE, &config));
        assert!(!input.is_holding(120.0, IN_ZONE, &config));
        assert!(input.is_holding(121.0, IN_ZONE, &config));

        input.pointer_move(170.0);
        assert!(!input.is_holding(500.0, IN_ZONE, &config));

        // Small jitter is still a hold
        input.pointer_move(90.0);
        assert!(input.is_holding(500.0, IN_ZONE, &config));
    }

    #[test]
    fn test_hold_requires_zone_and_free_movement() {
        let config = InputConfig::default();
        let mut input = InputState::new();
        input.pointer_down(0.0, 0.0, 0.0);

        let outside = HoldContext { in_charge_zone: false, movement_locked: false };
        assert!(!input.is_holding(1000.0, outside, &config));

        let locked = HoldContext { in_charge_zone: true, movement_locked: true };
        assert!(!input.is_holding(1000.0, locked, &config));
    }

    #[test]
    fn test_spent_hold_clears_on_next_press() {
        let config = InputConfig::default();
        let mut input = InputState::new();
        input.pointer_down(0.0, 0.0, 0.0);
        input.spend_hold();
        assert!(!input.is_holding(1000.0, IN_ZONE, &config));

        input.pointer_up(0.0, 1000.0, None, &config);
        input.pointer_down(0.0, 0.0, 2000.0);
        assert!(input.is_holding(2200.0, IN_ZONE, &config));
    }

    #[test]
    fn test_apply_dispatch() {
        let config = InputConfig::default();
        let mut input = InputState::new();
        assert_eq!(
            input.apply(PointerEvent::Down { x: 0.0, y: 0.0, time_ms: 0.0 }, None, &config),
            None
        );
        assert_eq!(input.apply(PointerEvent::Move { x: 10.0 }, None, &config), None);
        assert_eq!(
            input.apply(PointerEvent::Up { x: 10.0, time_ms: 400.0 }, Some(0.8), &config),
            Some(Gesture::ReleaseCharge(0.8))
        );
    }
}

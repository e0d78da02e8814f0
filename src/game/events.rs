//! Game Events
//!
//! Events generated during simulation, for the host and for replay checks.
//! Events are stamped with the frame they occurred on and kept in emission
//! order.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::player::{StateTag, SweetSpot};

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A new run began
    RunStarted {
        /// Seed of this run's generator
        seed: u64,
    },

    /// Player jumped
    Jumped {
        /// Position at take-off
        position: Vec2,
    },

    /// Player touched down on a platform after being airborne
    Landed {
        /// Top surface landed on
        surface_y: f32,
        /// The landing cut a dash short
        dash_cancelled: bool,
    },

    /// Hold condition asserted and the meter started
    ChargeStarted {
        /// Window drawn for this charge
        sweet_spot: SweetSpot,
    },

    /// Charge released by the player
    ChargeReleased {
        /// Meter value at release
        amount: f32,
        /// Release landed in the sweet spot
        hit: bool,
    },

    /// Charge held for the max hold time and force-cancelled
    ChargeOverheated,

    /// Hold dropped without a release
    ChargeCancelled,

    /// Scripted landing began
    AutoLandStarted {
        /// Touchdown position
        target: Vec2,
    },

    /// Movement state changed
    StateChanged {
        /// State before
        from: StateTag,
        /// State after
        to: StateTag,
    },

    /// Run ended
    GameOver {
        /// Final score
        score: u32,
        /// Furthest x reached
        distance: f32,
    },
}

/// A game event with timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Frame when event occurred
    pub frame: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(frame: u32, data: GameEventData) -> Self {
        Self { frame, data }
    }

    /// Create run started event.
    pub fn run_started(frame: u32, seed: u64) -> Self {
        Self::new(frame, GameEventData::RunStarted { seed })
    }

    /// Create state changed event.
    pub fn state_changed(frame: u32, from: StateTag, to: StateTag) -> Self {
        Self::new(frame, GameEventData::StateChanged { from, to })
    }

    /// Create game over event.
    pub fn game_over(frame: u32, score: u32, distance: f32) -> Self {
        Self::new(frame, GameEventData::GameOver { score, distance })
    }

    /// Is this the end-of-run event?
    pub fn is_game_over(&self) -> bool {
        matches!(self.data, GameEventData::GameOver { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_over_detection() {
        assert!(GameEvent::game_over(10, 5, 512.0).is_game_over());
        assert!(!GameEvent::run_started(0, 1).is_game_over());
        assert!(!GameEvent::new(3, GameEventData::ChargeOverheated).is_game_over());
    }

    #[test]
    fn test_events_serialize() {
        let event = GameEvent::state_changed(4, StateTag::Running, StateTag::Dashing);
        let json = serde_json::to_string(&event).unwrap();
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}

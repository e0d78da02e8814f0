//! Camera / Scroll Controller
//!
//! Horizontal follow with exponential smoothing. The camera only ever moves
//! forward.

use serde::{Serialize, Deserialize};

use crate::game::config::{CameraConfig, Viewport};

/// Horizontal camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World x of the viewport's left edge
    pub x: f32,
}

impl Camera {
    /// Camera at `x`.
    pub const fn new(x: f32) -> Self {
        Self { x }
    }

    /// Where the camera wants to be for a player at `player_x`.
    #[inline]
    pub fn target_for(player_x: f32, viewport: Viewport, config: &CameraConfig) -> f32 {
        player_x - viewport.width * config.lead_fraction
    }

    /// Ease toward the target. Targets behind the camera are ignored.
    pub fn update(&mut self, player_x: f32, dt: f32, viewport: Viewport, config: &CameraConfig) {
        let target = Self::target_for(player_x, viewport, config);
        if target > self.x {
            self.x += (target - self.x) * (dt * config.smoothing).min(1.0);
        }
    }
}

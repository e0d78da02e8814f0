//! Scene Snapshot
//!
//! Declarative description of one frame for the host to draw. Rectangles are
//! in screen space (camera already subtracted). Serializes to JSON so a web
//! host can consume it directly.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Rect;
use crate::game::config::{ChargeConfig, Viewport};
use crate::game::player::{Movement, StateTag, SweetSpot};
use crate::game::state::RunState;

/// Remaining hold time below which the host should warn of an overheat (s).
pub const OVERHEAT_WARNING_SECS: f32 = 1.0;

/// A platform as drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformView {
    /// Platform body
    pub rect: Rect,
    /// Charge zone on the top surface
    pub charge_zone: Option<Rect>,
}

/// One afterimage as drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrailView {
    /// Player-sized box
    pub rect: Rect,
    /// Opacity
    pub alpha: f32,
    /// Colour of the state that left it
    pub color: &'static str,
}

/// Charge meter, present only while charging.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChargeBar {
    /// Meter value in `[0, 1]`
    pub fill: f32,
    /// Window that fires a super dash
    pub sweet_spot: SweetSpot,
    /// Is the meter inside the window right now?
    pub in_sweet_spot: bool,
    /// Seconds until overheat
    pub time_remaining: f32,
    /// Less than [`OVERHEAT_WARNING_SECS`] left
    pub overheat_imminent: bool,
}

impl ChargeBar {
    /// Build the bar for a movement state. `None` unless charging.
    pub fn from_movement(movement: &Movement, charge: &ChargeConfig) -> Option<Self> {
        match *movement {
            Movement::Charging { amount, elapsed, sweet_spot, .. } => {
                let time_remaining = (charge.max_hold_time - elapsed).max(0.0);
                Some(Self {
                    fill: amount,
                    sweet_spot,
                    in_sweet_spot: sweet_spot.contains(amount),
                    time_remaining,
                    overheat_imminent: time_remaining < OVERHEAT_WARNING_SECS,
                })
            }
            _ => None,
        }
    }
}

/// Everything the host needs to draw a frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneSnapshot {
    /// World x of the left edge
    pub camera_x: f32,
    /// Visible area
    pub viewport: Viewport,
    /// Platforms at least partly on screen
    pub platforms: Vec<PlatformView>,
    /// Player box
    pub player: Rect,
    /// Player state
    pub player_state: StateTag,
    /// Player fill colour
    pub player_color: &'static str,
    /// Afterimages, oldest first
    pub trail: Vec<TrailView>,
    /// Charge meter
    pub charge_bar: Option<ChargeBar>,
    /// Current score
    pub score: u32,
}

impl SceneSnapshot {
    /// Capture the current frame of a run.
    pub fn capture(state: &RunState, charge: &ChargeConfig) -> Self {
        let camera_x = state.camera.x;
        let viewport = state.viewport;
        let player = &state.player;

        let platforms = state
            .platforms
            .iter()
            .map(|p| PlatformView {
                rect: p.rect().to_screen(camera_x),
                charge_zone: p.zone_rect().map(|z| z.to_screen(camera_x)),
            })
            .filter(|view| view.rect.right() > 0.0 && view.rect.x < viewport.width)
            .collect();

        let trail = player
            .trail
            .iter()
            .map(|entry| TrailView {
                rect: Rect::new(entry.pos.x, entry.pos.y, player.width, player.height)
                    .to_screen(camera_x),
                alpha: entry.alpha,
                color: entry.tag.color(),
            })
            .collect();

        Self {
            camera_x,
            viewport,
            platforms,
            player: player.rect().to_screen(camera_x),
            player_state: player.tag(),
            player_color: player.tag().color(),
            trail,
            charge_bar: ChargeBar::from_movement(&player.movement, charge),
            score: state.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::GameConfig;

    #[test]
    fn test_capture_screen_space() {
        let config = GameConfig::default();
        let mut state = RunState::new(4, Viewport::default(), &config);
        state.camera.x = 50.0;

        let scene = SceneSnapshot::capture(&state, &config.charge);
        assert_eq!(scene.camera_x, 50.0);
        assert_eq!(scene.player.x, 50.0);
        assert_eq!(scene.player_state, StateTag::Running);
        assert_eq!(scene.player_color, StateTag::Running.color());
        assert!(scene.charge_bar.is_none());

        // Starting platform and its zone, shifted by the camera
        let first = scene.platforms[0];
        assert_eq!(first.rect.x, -50.0);
        assert_eq!(first.charge_zone.unwrap().x, 350.0);

        // Only on-screen platforms are listed
        for view in &scene.platforms {
            assert!(view.rect.right() > 0.0 && view.rect.x < 1280.0);
        }
    }

    #[test]
    fn test_charge_bar() {
        let charge = ChargeConfig::default();
        let spot = SweetSpot { min: 0.3, max: 0.45 };

        let bar = ChargeBar::from_movement(
            &Movement::Charging { amount: 0.4, direction: 1.0, elapsed: 1.0, sweet_spot: spot },
            &charge,
        )
        .unwrap();
        assert!(bar.in_sweet_spot);
        assert_eq!(bar.time_remaining, 2.0);
        assert!(!bar.overheat_imminent);

        let bar = ChargeBar::from_movement(
            &Movement::Charging { amount: 0.9, direction: -1.0, elapsed: 2.5, sweet_spot: spot },
            &charge,
        )
        .unwrap();
        assert!(!bar.in_sweet_spot);
        assert!(bar.overheat_imminent);

        assert!(ChargeBar::from_movement(&Movement::Running, &charge).is_none());
    }

    #[test]
    fn test_scene_serializes_to_json() {
        let config = GameConfig::default();
        let state = RunState::new(4, Viewport::default(), &config);
        let json = serde_json::to_value(SceneSnapshot::capture(&state, &config.charge)).unwrap();
        assert_eq!(json["score"], 0);
        assert_eq!(json["player_state"], "Running");
        assert!(json["platforms"].is_array());
    }
}

//! Collision Detection
//!
//! Player-vs-platform landing, charge-zone detection and death checks.
//! Platforms are only solid from above; sides and undersides pass through.

use crate::core::vec2::Rect;
use crate::game::camera::Camera;
use crate::game::config::{ChargeConfig, PhysicsConfig, Viewport};
use crate::game::platform::Platform;
use crate::game::player::{Movement, Player};

/// Result of a landing resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landing {
    /// Top surface the player now stands on
    pub surface_y: f32,
    /// A dash was cut short by the landing
    pub dash_cancelled: bool,
}

/// Can a player whose bottom was at `prev_bottom` land on `platform`?
///
/// Requires the post-integration box to overlap, the player to be moving
/// down (or level), and the previous bottom to have been no deeper than
/// `landing_tolerance` below the top surface.
#[inline]
pub fn can_land_on(
    player_rect: Rect,
    vel_y: f32,
    prev_bottom: f32,
    platform: &Platform,
    tolerance: f32,
) -> bool {
    vel_y >= 0.0
        && player_rect.overlaps(&platform.rect())
        && prev_bottom <= platform.y + tolerance
}

/// Resolve downward collisions for a Running or Dashing player.
///
/// Resets `grounded`, then snaps onto the first qualifying platform.
/// Other movement states are left untouched.
pub fn resolve_landing(
    player: &mut Player,
    prev_bottom: f32,
    platforms: &[Platform],
    physics: &PhysicsConfig,
) -> Option<Landing> {
    if !matches!(player.movement, Movement::Running | Movement::Dashing { .. }) {
        return None;
    }
    player.grounded = false;

    let rect = player.rect();
    let platform = platforms.iter().find(|p| {
        can_land_on(rect, player.vel.y, prev_bottom, p, physics.landing_tolerance)
    })?;

    player.pos.y = platform.y - player.height;
    player.vel.y = 0.0;
    player.grounded = true;

    let dash_cancelled = matches!(player.movement, Movement::Dashing { .. });
    if dash_cancelled {
        player.movement = Movement::Running;
    }

    Some(Landing {
        surface_y: platform.y,
        dash_cancelled,
    })
}

/// Index of the charge zone the player is standing in, if any.
///
/// Only a grounded player can stand in a zone.
pub fn charge_zone_under(player: &Player, platforms: &[Platform], charge: &ChargeConfig) -> Option<usize> {
    if !player.grounded {
        return None;
    }
    let center_x = player.center_x();
    let bottom = player.bottom();
    platforms
        .iter()
        .position(|p| p.zone_contains(center_x, bottom, charge.zone_snap_distance))
}

/// Nearest platform starting more than `lookahead` ahead of `x`.
///
/// Platforms are kept in ascending `x`, but the minimum is taken explicitly
/// so the result never depends on that.
pub fn landing_target(platforms: &[Platform], x: f32, lookahead: f32) -> Option<&Platform> {
    platforms
        .iter()
        .filter(|p| p.x > x + lookahead)
        .min_by(|a, b| a.x.total_cmp(&b.x))
}

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathCause {
    /// Fell below the viewport
    Fell,
    /// Scrolled off the left edge
    LeftBehind,
}

/// Check both death conditions.
pub fn check_death(
    player: &Player,
    camera: &Camera,
    viewport: Viewport,
    physics: &PhysicsConfig,
) -> Option<DeathCause> {
    if player.pos.y > viewport.height + physics.death_margin {
        Some(DeathCause::Fell)
    } else if player.pos.x + player.width < camera.x {
        Some(DeathCause::LeftBehind)
    } else {
        None
    }
}

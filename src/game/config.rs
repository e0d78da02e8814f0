//! Tuning Configuration
//!
//! Every gameplay constant lives in [`GameConfig`]. `Default` is the shipped
//! tuning table; hosts may override any subset from JSON.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON could not be parsed.
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value must be strictly positive.
    #[error("{0} must be positive")]
    NotPositive(&'static str),

    /// A value must lie in a range.
    #[error("{name} must be in {range}, got {value}")]
    OutOfRange {
        /// Field name
        name: &'static str,
        /// Human-readable range
        range: &'static str,
        /// Offending value
        value: f32,
    },

    /// Minimum above maximum.
    #[error("{min_name} ({min}) exceeds {max_name} ({max})")]
    Inverted {
        /// Lower bound field
        min_name: &'static str,
        /// Lower bound value
        min: f32,
        /// Upper bound field
        max_name: &'static str,
        /// Upper bound value
        max: f32,
    },
}

// =============================================================================
// VIEWPORT
// =============================================================================

/// Visible play area in pixels, supplied by the host.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Create a viewport.
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

/// Player kinematics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration (px/s^2)
    pub gravity: f32,
    /// Vertical velocity applied on jump (negative is up)
    pub jump_force: f32,
    /// Auto-run speed at score 0 (px/s)
    pub min_speed: f32,
    /// Auto-run speed cap (px/s)
    pub max_speed: f32,
    /// Speed gained per point of score
    pub speed_scale: f32,
    /// Dash speed as a multiple of the run speed
    pub dash_speed_mult: f32,
    /// Dash length (s)
    pub dash_duration: f32,
    /// Super dash speed as a multiple of the run speed
    pub super_dash_speed_mult: f32,
    /// Fixed vertical velocity during a super dash (negative climbs)
    pub super_dash_speed_y: f32,
    /// Super dash length (s)
    pub super_dash_duration: f32,
    /// Auto-landing interpolation length (s)
    pub auto_land_duration: f32,
    /// Landing targets must start this far ahead of the player (px)
    pub auto_land_lookahead: f32,
    /// Touchdown point inset from the target's leading edge (px)
    pub auto_land_inset: f32,
    /// Player box side (px)
    pub player_size: f32,
    /// How far below a platform top the previous bottom may be and still land (px)
    pub landing_tolerance: f32,
    /// Distance below the viewport that kills (px)
    pub death_margin: f32,
    /// Trail alpha lost per second
    pub trail_decay: f32,
}

impl PhysicsConfig {
    /// Time from jump to returning to the same height (s).
    #[inline]
    pub fn jump_airtime(&self) -> f32 {
        2.0 * self.jump_force.abs() / self.gravity
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 2000.0,
            jump_force: -800.0,
            min_speed: 350.0,
            max_speed: 700.0,
            speed_scale: 0.5,
            dash_speed_mult: 2.5,
            dash_duration: 0.2,
            super_dash_speed_mult: 4.0,
            super_dash_speed_y: -600.0,
            super_dash_duration: 0.4,
            auto_land_duration: 0.3,
            auto_land_lookahead: 20.0,
            auto_land_inset: 30.0,
            player_size: 30.0,
            landing_tolerance: 10.0,
            death_margin: 100.0,
            trail_decay: 4.0,
        }
    }
}

/// Gesture thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Longest press that still counts as a tap (ms)
    pub tap_max_time_ms: f64,
    /// Press length before a still finger counts as a hold (ms)
    pub hold_delay_ms: f64,
    /// Horizontal travel that makes a swipe (px)
    pub swipe_min_dist: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            tap_max_time_ms: 200.0,
            hold_delay_ms: 120.0,
            swipe_min_dist: 60.0,
        }
    }
}

/// Charge-and-release timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeConfig {
    /// Time for the meter to sweep 0 to 1 (s)
    pub cycle_duration: f32,
    /// Width of the sweet spot on the meter
    pub sweet_spot_width: f32,
    /// Charge held this long overheats (s)
    pub max_hold_time: f32,
    /// Vertical slack between player bottom and zone top (px)
    pub zone_snap_distance: f32,
}

impl ChargeConfig {
    /// Sweet spots are placed inside `[SWEET_SPOT_FLOOR, SWEET_SPOT_CEIL]`.
    pub const SWEET_SPOT_FLOOR: f32 = 0.1;
    /// Upper bound of sweet-spot placement.
    pub const SWEET_SPOT_CEIL: f32 = 0.9;
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            cycle_duration: 0.6,
            sweet_spot_width: 0.15,
            max_hold_time: 3.0,
            zone_snap_distance: 12.0,
        }
    }
}

/// Procedural platform generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Platform thickness (px)
    pub platform_height: f32,
    /// Platform width at difficulty 0 (px)
    pub start_platform_width: f32,
    /// Platform width at difficulty 1 (px)
    pub min_platform_width: f32,
    /// Minimum gap at difficulty 0 (px)
    pub start_gap: f32,
    /// Minimum gap added at difficulty 1 (px)
    pub gap_growth: f32,
    /// Fraction of the jump reach a gap may use, in (0, 1)
    pub max_gap_safety_margin: f32,
    /// Base vertical step bound (px)
    pub base_y_step: f32,
    /// Vertical step bound added at difficulty 1 (px)
    pub y_step_growth: f32,
    /// Highest platform top as a fraction of viewport height
    pub min_y_fraction: f32,
    /// Lowest platform top as a fraction of viewport height
    pub max_y_fraction: f32,
    /// Probability that a new platform carries a charge zone
    pub charge_zone_chance: f32,
    /// Preferred charge zone width (px)
    pub charge_zone_width: f32,
    /// Charge zones never exceed this fraction of their platform
    pub charge_zone_max_fraction: f32,
    /// Generate until this many viewport widths ahead of the camera
    pub lookahead_screens: f32,
    /// Drop platforms whose right edge is this far behind the camera (px)
    pub cull_distance: f32,
    /// Score at which difficulty saturates
    pub difficulty_score: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            platform_height: 30.0,
            start_platform_width: 400.0,
            min_platform_width: 200.0,
            start_gap: 80.0,
            gap_growth: 50.0,
            max_gap_safety_margin: 0.8,
            base_y_step: 100.0,
            y_step_growth: 100.0,
            min_y_fraction: 0.3,
            max_y_fraction: 0.8,
            charge_zone_chance: 0.6,
            charge_zone_width: 180.0,
            charge_zone_max_fraction: 0.75,
            lookahead_screens: 2.0,
            cull_distance: 200.0,
            difficulty_score: 500.0,
        }
    }
}

/// Camera follow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Player is kept this fraction of the viewport from the left edge
    pub lead_fraction: f32,
    /// Exponential smoothing rate (1/s)
    pub smoothing: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            lead_fraction: 0.2,
            smoothing: 10.0,
        }
    }
}

// =============================================================================
// GAME CONFIG
// =============================================================================

/// Complete tuning table for a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Player kinematics
    pub physics: PhysicsConfig,
    /// Gesture thresholds
    pub input: InputConfig,
    /// Charge mechanic
    pub charge: ChargeConfig,
    /// Level generation
    pub generator: GeneratorConfig,
    /// Camera follow
    pub camera: CameraConfig,
    /// Frame clock
    pub frame: FrameConfig,
}

/// Frame clock and scoring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Longest simulated step (s)
    pub max_frame_dt: f32,
    /// World pixels per point of score ("meters")
    pub score_scale: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_dt: 0.1,
            score_scale: 100.0,
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive(name))
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, range: "[0, inf)", value })
    }
}

fn in_range(
    name: &'static str,
    range: &'static str,
    value: f32,
    ok: bool,
) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, range, value })
    }
}

fn ordered(
    min_name: &'static str,
    min: f32,
    max_name: &'static str,
    max: f32,
) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::Inverted { min_name, min, max_name, max })
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON tuning table and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value the simulation divides by or clamps with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        positive("physics.gravity", p.gravity)?;
        in_range("physics.jump_force", "(-inf, 0)", p.jump_force, p.jump_force < 0.0)?;
        positive("physics.min_speed", p.min_speed)?;
        ordered("physics.min_speed", p.min_speed, "physics.max_speed", p.max_speed)?;
        in_range("physics.speed_scale", "[0, inf)", p.speed_scale, p.speed_scale >= 0.0)?;
        positive("physics.dash_speed_mult", p.dash_speed_mult)?;
        positive("physics.dash_duration", p.dash_duration)?;
        positive("physics.super_dash_speed_mult", p.super_dash_speed_mult)?;
        positive("physics.super_dash_duration", p.super_dash_duration)?;
        positive("physics.auto_land_duration", p.auto_land_duration)?;
        positive("physics.player_size", p.player_size)?;
        positive("physics.trail_decay", p.trail_decay)?;
        non_negative("physics.landing_tolerance", p.landing_tolerance)?;
        non_negative("physics.death_margin", p.death_margin)?;

        let i = &self.input;
        positive("input.tap_max_time_ms", i.tap_max_time_ms as f32)?;
        positive("input.hold_delay_ms", i.hold_delay_ms as f32)?;
        positive("input.swipe_min_dist", i.swipe_min_dist)?;

        let c = &self.charge;
        positive("charge.cycle_duration", c.cycle_duration)?;
        positive("charge.max_hold_time", c.max_hold_time)?;
        let span = ChargeConfig::SWEET_SPOT_CEIL - ChargeConfig::SWEET_SPOT_FLOOR;
        in_range(
            "charge.sweet_spot_width",
            "(0, 0.8]",
            c.sweet_spot_width,
            c.sweet_spot_width > 0.0 && c.sweet_spot_width <= span,
        )?;

        let g = &self.generator;
        positive("generator.platform_height", g.platform_height)?;
        positive("generator.min_platform_width", g.min_platform_width)?;
        ordered(
            "generator.min_platform_width",
            g.min_platform_width,
            "generator.start_platform_width",
            g.start_platform_width,
        )?;
        in_range(
            "generator.max_gap_safety_margin",
            "(0, 1)",
            g.max_gap_safety_margin,
            g.max_gap_safety_margin > 0.0 && g.max_gap_safety_margin < 1.0,
        )?;
        in_range(
            "generator.charge_zone_chance",
            "[0, 1]",
            g.charge_zone_chance,
            (0.0..=1.0).contains(&g.charge_zone_chance),
        )?;
        in_range(
            "generator.charge_zone_max_fraction",
            "(0, 1)",
            g.charge_zone_max_fraction,
            g.charge_zone_max_fraction > 0.0 && g.charge_zone_max_fraction < 1.0,
        )?;
        ordered(
            "generator.min_y_fraction",
            g.min_y_fraction,
            "generator.max_y_fraction",
            g.max_y_fraction,
        )?;
        non_negative("generator.start_gap", g.start_gap)?;
        non_negative("generator.gap_growth", g.gap_growth)?;
        non_negative("generator.base_y_step", g.base_y_step)?;
        non_negative("generator.y_step_growth", g.y_step_growth)?;
        non_negative("generator.cull_distance", g.cull_distance)?;
        positive("generator.lookahead_screens", g.lookahead_screens)?;
        positive("generator.difficulty_score", g.difficulty_score)?;

        positive("camera.smoothing", self.camera.smoothing)?;
        positive("frame.max_frame_dt", self.frame.max_frame_dt)?;
        positive("frame.score_scale", self.frame.score_scale)?;

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

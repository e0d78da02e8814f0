//! Procedural Platform Generation
//!
//! Level geometry ahead of the camera. Platforms are appended in ascending
//! `x` and never mutated afterwards; they are only culled once they fall
//! far enough behind the camera.
//!
//! ## Reachability
//!
//! Every gap is bounded by what a jump covers at the player's *current*
//! speed: `gap <= current_speed * jump_airtime * max_gap_safety_margin`.
//! When difficulty pushes the minimum gap past that bound, the minimum is
//! clamped down rather than letting the random range invert.

use std::cmp::Ordering;

use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::core::rng::DeterministicRng;
use crate::core::vec2::Rect;
use crate::game::config::{GameConfig, GeneratorConfig, PhysicsConfig, Viewport};

// =============================================================================
// PLATFORM
// =============================================================================

/// Horizontal sub-span of a platform top where charging is legal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChargeZone {
    /// Distance from the platform's left edge
    pub offset: f32,
    /// Zone width
    pub width: f32,
}

/// A solid platform. Top surface at `y`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Left edge
    pub x: f32,
    /// Top surface
    pub y: f32,
    /// Width
    pub width: f32,
    /// Thickness
    pub height: f32,
    /// Optional charge zone on the top surface
    pub charge_zone: Option<ChargeZone>,
}

impl Platform {
    /// Bounding rectangle.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Trailing (right) edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// World rectangle of the charge zone, full platform thickness.
    pub fn zone_rect(&self) -> Option<Rect> {
        self.charge_zone
            .map(|zone| Rect::new(self.x + zone.offset, self.y, zone.width, self.height))
    }

    /// Is a player standing with centre `center_x` and feet at `bottom`
    /// inside this platform's charge zone?
    pub fn zone_contains(&self, center_x: f32, bottom: f32, snap_distance: f32) -> bool {
        match self.charge_zone {
            Some(zone) => {
                let zx = self.x + zone.offset;
                center_x >= zx
                    && center_x <= zx + zone.width
                    && (bottom - self.y).abs() < snap_distance
            }
            None => false,
        }
    }
}

// =============================================================================
// DIFFICULTY
// =============================================================================

/// Difficulty factor in `[0, 1]` for a score.
#[inline]
pub fn difficulty(score: u32, config: &GeneratorConfig) -> f32 {
    (score as f32 / config.difficulty_score).min(1.0)
}

/// Widest gap a jump at `current_speed` is guaranteed to clear.
#[inline]
pub fn max_reachable_gap(current_speed: f32, physics: &PhysicsConfig, config: &GeneratorConfig) -> f32 {
    current_speed * physics.jump_airtime() * config.max_gap_safety_margin
}

/// Gap range `(min, max)` for a difficulty and speed. Never inverted.
pub fn gap_bounds(
    diff: f32,
    current_speed: f32,
    physics: &PhysicsConfig,
    config: &GeneratorConfig,
) -> (f32, f32) {
    let max_gap = max_reachable_gap(current_speed, physics, config).max(0.0);
    let min_gap = (config.start_gap + diff * config.gap_growth).max(0.0).min(max_gap);
    (min_gap, max_gap)
}

/// Platform width for a difficulty.
#[inline]
pub fn platform_width(diff: f32, config: &GeneratorConfig) -> f32 {
    config.start_platform_width
        - diff * (config.start_platform_width - config.min_platform_width)
}

// =============================================================================
// GENERATION
// =============================================================================

/// Narrowest platform the generator emits, whatever the tuning says (px).
pub const MIN_GENERATED_WIDTH: f32 = 1.0;

/// The fixed platform every run starts on.
pub fn starting_platform(config: &GeneratorConfig) -> Platform {
    Platform {
        x: 0.0,
        y: 400.0,
        width: 1000.0,
        height: config.platform_height,
        charge_zone: Some(ChargeZone { offset: 400.0, width: 200.0 }),
    }
}

/// Roll the platform that follows `last`.
pub fn next_platform(
    last: &Platform,
    score: u32,
    current_speed: f32,
    viewport: Viewport,
    config: &GameConfig,
    rng: &mut DeterministicRng,
) -> Platform {
    let g = &config.generator;
    let diff = difficulty(score, g);

    let width = platform_width(diff, g).max(MIN_GENERATED_WIDTH);
    let (min_gap, max_gap) = gap_bounds(diff, current_speed, &config.physics, g);
    let gap = rng.next_range(min_gap, max_gap);

    let max_y_change = (g.base_y_step + diff * g.y_step_growth).max(0.0);
    let min_y = viewport.height * g.min_y_fraction;
    let max_y = (viewport.height * g.max_y_fraction).max(min_y);
    let y = (last.y + rng.next_range(-max_y_change, max_y_change)).clamp(min_y, max_y);

    let charge_zone = if rng.chance(g.charge_zone_chance) {
        let zone_width = g.charge_zone_width.min(width * g.charge_zone_max_fraction);
        let offset = rng.next_range(0.0, width - zone_width);
        Some(ChargeZone { offset, width: zone_width })
    } else {
        None
    };

    Platform {
        x: last.right() + gap,
        y,
        width,
        height: g.platform_height,
        charge_zone,
    }
}

/// Append platforms until the last one ends at least `lookahead_screens`
/// viewport widths ahead of the camera. Returns how many were added.
pub fn generate_platforms(
    platforms: &mut Vec<Platform>,
    camera_x: f32,
    score: u32,
    current_speed: f32,
    viewport: Viewport,
    config: &GameConfig,
    rng: &mut DeterministicRng,
) -> usize {
    let horizon = camera_x + viewport.width * config.generator.lookahead_screens;
    let mut added = 0;

    while let Some(last) = platforms.last().copied() {
        if last.right() >= horizon {
            break;
        }
        let platform = next_platform(&last, score, current_speed, viewport, config, rng);
        if platform.right().partial_cmp(&last.right()) != Some(Ordering::Greater) {
            warn!(x = platform.x, last_right = last.right(), "generator made no progress, stopping");
            break;
        }
        debug!(
            x = platform.x,
            y = platform.y,
            width = platform.width,
            gap = platform.x - last.right(),
            zone = platform.charge_zone.is_some(),
            "platform generated"
        );
        platforms.push(platform);
        added += 1;
    }

    added
}

/// Drop platforms whose trailing edge is more than `cull_distance` behind
/// the camera. Returns how many were removed.
pub fn cull_platforms(platforms: &mut Vec<Platform>, camera_x: f32, config: &GeneratorConfig) -> usize {
    let before = platforms.len();
    platforms.retain(|p| p.right() > camera_x - config.cull_distance.max(0.0));
    before - platforms.len()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn world(seed: u64) -> (Vec<Platform>, GameConfig, DeterministicRng) {
        let config = GameConfig::default();
        let platforms = vec![starting_platform(&config.generator)];
        (platforms, config, DeterministicRng::new(seed))
    }

    #[test]
    fn test_difficulty_saturates() {
        let g = GeneratorConfig::default();
        assert_eq!(difficulty(0, &g), 0.0);
        assert_eq!(difficulty(250, &g), 0.5);
        assert_eq!(difficulty(500, &g), 1.0);
        assert_eq!(difficulty(10_000, &g), 1.0);
    }

    #[test]
    fn test_width_shrinks_with_difficulty() {
        let g = GeneratorConfig::default();
        assert_eq!(platform_width(0.0, &g), g.start_platform_width);
        assert_eq!(platform_width(1.0, &g), g.min_platform_width);
        assert!(platform_width(0.5, &g) < g.start_platform_width);
    }

    #[test]
    fn test_gap_bounds_clamp_never_inverts() {
        let physics = PhysicsConfig::default();
        let g = GeneratorConfig::default();

        // Crawling speed: reach is below the configured minimum gap
        let (min, max) = gap_bounds(1.0, 50.0, &physics, &g);
        assert!(min <= max);
        assert_eq!(max, max_reachable_gap(50.0, &physics, &g));

        // Zero speed collapses the range to zero
        assert_eq!(gap_bounds(1.0, 0.0, &physics, &g), (0.0, 0.0));
    }

    #[test]
    fn test_generation_fills_lookahead() {
        let (mut platforms, config, mut rng) = world(7);
        let viewport = Viewport::default();

        let added = generate_platforms(&mut platforms, 0.0, 0, 350.0, viewport, &config, &mut rng);
        assert!(added > 0);

        let last = platforms.last().unwrap();
        assert!(last.right() >= viewport.width * config.generator.lookahead_screens);

        // Ascending x, no overlap between neighbours
        for pair in platforms.windows(2) {
            assert!(pair[1].x > pair[0].right());
        }

        // Nothing to add when already covered
        assert_eq!(
            generate_platforms(&mut platforms, 0.0, 0, 350.0, viewport, &config, &mut rng),
            0
        );
    }

    #[test]
    fn test_generation_deterministic() {
        let (mut a, config, mut rng_a) = world(99);
        let (mut b, _, mut rng_b) = world(99);
        let viewport = Viewport::default();

        generate_platforms(&mut a, 0.0, 120, 410.0, viewport, &config, &mut rng_a);
        generate_platforms(&mut b, 0.0, 120, 410.0, viewport, &config, &mut rng_b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cull_behind_camera() {
        let (mut platforms, config, mut rng) = world(3);
        let viewport = Viewport::default();
        generate_platforms(&mut platforms, 0.0, 0, 350.0, viewport, &config, &mut rng);
        let count = platforms.len();

        // Starting platform ends at 1000; camera at 1199 keeps it (1000 > 999)
        assert_eq!(cull_platforms(&mut platforms, 1199.0, &config.generator), 0);
        // Camera at 1201 drops it (1000 <= 1001)
        assert_eq!(cull_platforms(&mut platforms, 1201.0, &config.generator), 1);
        assert_eq!(platforms.len(), count - 1);
    }

    #[test]
    fn test_gap_bounds_never_negative() {
        let physics = PhysicsConfig::default();
        let g = GeneratorConfig {
            start_gap: -5000.0,
            gap_growth: -100.0,
            ..GeneratorConfig::default()
        };
        let (min, max) = gap_bounds(0.0, 350.0, &physics, &g);
        assert_eq!(min, 0.0);
        assert!(max > 0.0);
    }

    #[test]
    fn test_degenerate_tuning_still_moves_forward() {
        // Unvalidated tuning: backwards gaps, negative widths, inverted band
        let mut config = GameConfig::default();
        config.generator.start_gap = -5000.0;
        config.generator.start_platform_width = -50.0;
        config.generator.min_platform_width = -100.0;
        config.generator.base_y_step = -30.0;
        config.generator.min_y_fraction = 0.9;
        config.generator.max_y_fraction = 0.1;
        config.generator.cull_distance = -200.0;
        let viewport = Viewport::default();
        let mut platforms = vec![starting_platform(&config.generator)];
        let mut rng = DeterministicRng::new(17);

        let added = generate_platforms(&mut platforms, 0.0, 0, 350.0, viewport, &config, &mut rng);
        assert!(added > 0);
        for pair in platforms.windows(2) {
            assert!(pair[1].x >= pair[0].right());
            assert!(pair[1].width >= MIN_GENERATED_WIDTH);
        }
        assert!(platforms.last().unwrap().right() >= viewport.width * config.generator.lookahead_screens);

        // The platform under a camera at its left edge survives a negative cull distance
        assert_eq!(cull_platforms(&mut platforms, 0.0, &config.generator), 0);
    }

    #[test]
    fn test_zone_contains() {
        let platform = starting_platform(&GeneratorConfig::default());
        // Zone spans x in [400, 600], top at 400
        assert!(platform.zone_contains(500.0, 400.0, 12.0));
        assert!(platform.zone_contains(400.0, 395.0, 12.0));
        assert!(!platform.zone_contains(399.0, 400.0, 12.0));
        assert!(!platform.zone_contains(500.0, 380.0, 12.0));

        let bare = Platform { charge_zone: None, ..platform };
        assert!(!bare.zone_contains(500.0, 400.0, 12.0));
    }

    proptest! {
        #[test]
        fn prop_gaps_always_reachable(
            seed in any::<u64>(),
            score in 0u32..2000,
            speed in 50.0f32..1200.0,
        ) {
            let (mut platforms, config, mut rng) = world(seed);
            let viewport = Viewport::default();
            generate_platforms(&mut platforms, 0.0, score, speed, viewport, &config, &mut rng);

            let bound = max_reachable_gap(speed, &config.physics, &config.generator);
            for pair in platforms.windows(2) {
                let gap = pair[1].x - pair[0].right();
                prop_assert!(gap >= 0.0);
                prop_assert!(gap <= bound + 1e-3, "gap {} exceeds {}", gap, bound);
            }
        }

        #[test]
        fn prop_platforms_stay_in_band(seed in any::<u64>(), score in 0u32..2000) {
            let (mut platforms, config, mut rng) = world(seed);
            let viewport = Viewport::default();
            generate_platforms(&mut platforms, 0.0, score, 500.0, viewport, &config, &mut rng);

            let min_y = viewport.height * config.generator.min_y_fraction;
            let max_y = viewport.height * config.generator.max_y_fraction;
            for p in platforms.iter().skip(1) {
                prop_assert!(p.y >= min_y && p.y <= max_y);
                if let Some(zone) = p.charge_zone {
                    prop_assert!(zone.width < p.width);
                    prop_assert!(zone.offset >= 0.0);
                    prop_assert!(zone.offset + zone.width <= p.width + 1e-3);
                }
            }
        }
    }
}

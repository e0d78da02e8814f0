//! # Neon Runner Core
//!
//! Deterministic simulation core for Neon Runner, a single-player endless
//! runner. The host feeds pointer events and frame callbacks; the core hands
//! back a scene to draw, the score and a game-over signal.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    NEON RUNNER CORE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── vec2.rs     - 2D vector and rectangle                   │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Run simulation (deterministic)            │
//! │  ├── config.rs   - Tuning table and viewport                 │
//! │  ├── input.rs    - Pointer sessions and gestures             │
//! │  ├── platform.rs - Procedural platform generation            │
//! │  ├── player.rs   - Movement states and charge meter          │
//! │  ├── collision.rs- Landing and death checks                  │
//! │  ├── camera.rs   - Scrolling camera                          │
//! │  ├── tick.rs     - Per-frame simulation step                 │
//! │  ├── scene.rs    - Render snapshot for the host              │
//! │  ├── runner.rs   - Run lifecycle and frame scheduling        │
//! │  └── replay.rs   - Input recording and replay                │
//! │                                                              │
//! │  leaderboard.rs  - Top-N best distances (host-side storage)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Given the same base seed, tuning table, frame timestamps, pointer events
//! and viewport changes, a run produces the same state hash:
//! - All randomness from seeded Xorshift128+
//! - No system time inside the simulation (the host passes timestamps)
//! - Platforms kept in a `Vec` in ascending x, iterated in order
//!
//! Physics is `f32`, so hashes are only comparable on the same target.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod leaderboard;

// Re-export commonly used types
pub use core::vec2::{Vec2, Rect};
pub use core::rng::DeterministicRng;
pub use game::config::{GameConfig, Viewport};
pub use game::input::PointerEvent;
pub use game::runner::{Game, FrameScheduler, ManualScheduler, FrameOutput};
pub use game::scene::SceneSnapshot;
pub use game::state::{RunState, RunPhase};
pub use leaderboard::{Leaderboard, LeaderboardStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

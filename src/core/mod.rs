//! Core deterministic primitives.
//!
//! Geometry, seeded randomness and state hashing shared by every
//! simulation module.

pub mod vec2;
pub mod rng;
pub mod hash;

// Re-export core types
pub use vec2::{Vec2, Rect};
pub use rng::{DeterministicRng, derive_run_seed};
pub use hash::{StateHash, StateHasher, compute_state_hash};

//! Game Logic Module
//!
//! All run simulation code. Deterministic for a given seed and input stream.
//!
//! ## Module Structure
//!
//! - `config`: Tuning table and viewport
//! - `input`: Pointer capture and gesture classification
//! - `platform`: Platforms, charge zones, procedural generation
//! - `player`: Player body, movement states, charge meter, trail
//! - `collision`: Landing, charge zone lookup, death checks
//! - `camera`: Scrolling camera
//! - `events`: Game events for replay/verification
//! - `state`: Run state
//! - `tick`: Per-frame simulation step
//! - `scene`: Render snapshot for the host
//! - `runner`: Game lifecycle and frame scheduling
//! - `replay`: Input recording and replay

pub mod config;
pub mod input;
pub mod platform;
pub mod player;
pub mod collision;
pub mod camera;
pub mod events;
pub mod state;
pub mod tick;
pub mod scene;
pub mod runner;
pub mod replay;

// Re-export key types
pub use config::{GameConfig, ConfigError, Viewport};
pub use input::{PointerEvent, Gesture, InputState};
pub use platform::{Platform, ChargeZone};
pub use player::{Player, Movement, StateTag, SweetSpot};
pub use camera::Camera;
pub use events::{GameEvent, GameEventData};
pub use state::{RunState, RunPhase};
pub use tick::{tick, TickResult};
pub use scene::{SceneSnapshot, ChargeBar};
pub use runner::{Game, FrameScheduler, ManualScheduler, FrameHandle, FrameOutput};
pub use replay::{InputRecording, ReplayError, replay_run};

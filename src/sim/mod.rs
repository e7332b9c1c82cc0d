//! Game simulation module
//!
//! All gameplay logic lives here. This module must stay platform-free:
//! - Time comes in as host milliseconds, never read from a global clock
//! - Seeded RNG only
//! - Rendering and layout only through the `platform` traits

pub mod difficulty;
pub mod mode;
pub mod placement;
pub mod session;
pub mod target;

pub use difficulty::{DifficultyParams, SPAWN_SEGMENTS, SpawnSegment, evaluate, spawn_delay, target_size};
pub use mode::ModeParams;
pub use placement::generate_placement;
pub use session::{GameEvent, Session, SessionPhase};
pub use target::{PendingTimer, SpawnOutcome, SpawnReason, Target};

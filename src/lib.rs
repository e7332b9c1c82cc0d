//! Catch the Fugitive - A browser reaction/aim trainer
//!
//! Core modules:
//! - `sim`: Target controller, difficulty curve and the session game loop
//! - `platform`: Browser/native host interfaces (play field, target view, storage)
//! - `settings`: Player preferences persisted to local key/value storage

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{GameMode, GameSettings, Language, SettingsStore, TargetSpeedMode};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Gap kept between the target and every edge of the play field
    pub const TARGET_MARGIN: f32 = 5.0;
    /// Minimum distance between two consecutive placements
    pub const MIN_PLACEMENT_DISTANCE: f32 = 15.0;
    /// Placement samples tried before accepting the last one unconditionally
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 100;

    /// Spawn delay bounds (ms) enforced by the settings layer
    pub const MIN_SPAWN_DELAY_MS: u32 = 150;
    pub const MAX_SPAWN_DELAY_MS: u32 = 3000;

    /// Target size slider bounds (px)
    pub const MIN_TARGET_SIZE: f32 = 20.0;
    pub const MAX_TARGET_SIZE: f32 = 100.0;

    /// Countdown resolution (ms per displayed second)
    pub const COUNTDOWN_INTERVAL_MS: f64 = 1000.0;

    /// Default round length for timed modes (seconds)
    pub const DEFAULT_GAME_TIME_SECS: u32 = 30;

    /// Laid-out size of the browser play-field container (px)
    pub const PLAY_FIELD_WIDTH: f32 = 800.0;
    pub const PLAY_FIELD_HEIGHT: f32 = 500.0;
}

/// Usable placement area for a square target of `size` inside a container.
///
/// Both axes are reduced by the target itself and the margin on each side.
#[inline]
pub fn usable_area(container: Vec2, size: f32) -> Vec2 {
    container - Vec2::splat(size + 2.0 * consts::TARGET_MARGIN)
}

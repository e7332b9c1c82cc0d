//! Per-mode session parameters

use super::difficulty::{self, DifficultyParams};
use crate::consts::{
    DEFAULT_GAME_TIME_SECS, MAX_SPAWN_DELAY_MS, MAX_TARGET_SIZE, MIN_SPAWN_DELAY_MS, MIN_TARGET_SIZE,
};
use crate::settings::{GameMode, GameSettings, TargetSpeedMode};

/// Classic: relaxed timed round
const CLASSIC_WINDOW_MS: u32 = 1000;
const CLASSIC_TARGET_SIZE: f32 = 50.0;

/// Hardcore: short window, small target
const HARDCORE_WINDOW_MS: u32 = 400;
const HARDCORE_TARGET_SIZE: f32 = 30.0;

/// Resolved parameters for one session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeParams {
    /// Round length; `None` means no time limit
    pub game_time_secs: Option<u32>,
    pub visibility_window_ms: u32,
    pub target_size: f32,
    /// Follow the difficulty curve as the score grows
    pub adaptive: bool,
}

impl ModeParams {
    pub fn resolve(settings: &GameSettings) -> Self {
        match settings.game_mode {
            GameMode::Classic => Self {
                game_time_secs: Some(DEFAULT_GAME_TIME_SECS),
                visibility_window_ms: CLASSIC_WINDOW_MS,
                target_size: CLASSIC_TARGET_SIZE,
                adaptive: false,
            },
            GameMode::Infinite => {
                let start = difficulty::evaluate(0);
                Self {
                    game_time_secs: None,
                    visibility_window_ms: start.spawn_delay_ms,
                    target_size: start.target_size,
                    adaptive: true,
                }
            }
            GameMode::Hardcore => Self {
                game_time_secs: Some(DEFAULT_GAME_TIME_SECS),
                visibility_window_ms: HARDCORE_WINDOW_MS,
                target_size: HARDCORE_TARGET_SIZE,
                adaptive: false,
            },
            GameMode::Custom => Self {
                game_time_secs: (settings.game_time > 0).then_some(settings.game_time),
                visibility_window_ms: settings
                    .spawn_delay
                    .clamp(MIN_SPAWN_DELAY_MS, MAX_SPAWN_DELAY_MS),
                target_size: settings.target_size.clamp(MIN_TARGET_SIZE, MAX_TARGET_SIZE),
                adaptive: settings.target_speed_mode == TargetSpeedMode::Accelerating,
            },
        }
    }

    /// Parameters to apply after reaching `score`.
    ///
    /// Adaptive modes take the curve value but never get easier than the
    /// configured base.
    pub fn for_score(&self, score: u32) -> DifficultyParams {
        let base = DifficultyParams {
            spawn_delay_ms: self.visibility_window_ms,
            target_size: self.target_size,
        };
        if !self.adaptive {
            return base;
        }
        let curve = difficulty::evaluate(score);
        DifficultyParams {
            spawn_delay_ms: curve.spawn_delay_ms.min(base.spawn_delay_ms),
            target_size: curve.target_size.min(base.target_size),
        }
    }
}

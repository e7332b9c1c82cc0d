//! Game settings and preferences
//!
//! Persisted as camelCase JSON under a single key in local key/value storage.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::consts::{DEFAULT_GAME_TIME_SECS, MAX_SPAWN_DELAY_MS, MIN_SPAWN_DELAY_MS};
use crate::platform::{KeyValueStore, MemoryStore};

/// Difficulty mode picked from the mode selection menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Classic,
    Infinite,
    Hardcore,
    Custom,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Classic,
        GameMode::Infinite,
        GameMode::Hardcore,
        GameMode::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Infinite => "infinite",
            GameMode::Hardcore => "hardcore",
            GameMode::Custom => "custom",
        }
    }
}

/// Whether the custom mode keeps its spawn delay or follows the difficulty curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetSpeedMode {
    #[default]
    Fixed,
    Accelerating,
}

/// UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Uk,
    #[default]
    En,
}

/// Errors raised while decoding stored settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(&'static str),
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    /// Round length in seconds (0 = unlimited)
    pub game_time: u32,
    pub target_speed_mode: TargetSpeedMode,
    /// Visibility window in ms - smaller is faster
    #[serde(deserialize_with = "whole_ms")]
    pub spawn_delay: u32,
    /// Target edge length in px
    pub target_size: f32,

    // === Audio ===
    /// 0 - 100
    pub sound_volume: u8,
    /// 0 - 100
    pub music_volume: u8,
    pub is_sound_enabled: bool,
    pub is_music_enabled: bool,

    pub language: Language,
    pub game_mode: GameMode,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            game_time: DEFAULT_GAME_TIME_SECS,
            target_speed_mode: TargetSpeedMode::Fixed,
            spawn_delay: 500,
            target_size: 50.0,
            sound_volume: 50,
            music_volume: 50,
            is_sound_enabled: true,
            is_music_enabled: true,
            language: Language::En,
            game_mode: GameMode::Classic,
        }
    }
}

impl GameSettings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "game-settings";

    /// Decode stored JSON: migrate legacy fields, clamp, then validate
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut value: Value = serde_json::from_str(json)?;
        migrate_target_speed(&mut value);

        let mut settings: GameSettings = serde_json::from_value(value)?;
        settings.spawn_delay = settings.spawn_delay.max(MIN_SPAWN_DELAY_MS);
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(MIN_SPAWN_DELAY_MS..=MAX_SPAWN_DELAY_MS).contains(&self.spawn_delay) {
            return Err(SettingsError::Invalid("spawnDelay out of range"));
        }
        if !(self.target_size > 0.0) {
            return Err(SettingsError::Invalid("targetSize must be positive"));
        }
        if self.sound_volume > 100 || self.music_volume > 100 {
            return Err(SettingsError::Invalid("volume above 100"));
        }
        Ok(())
    }
}

/// Millisecond values may have been stored with a fractional part
fn whole_ms<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let ms = f64::deserialize(deserializer)?;
    if !ms.is_finite() || ms < 0.0 {
        return Err(serde::de::Error::custom(format!("invalid duration {}", ms)));
    }
    Ok(ms.round().min(u32::MAX as f64) as u32)
}

/// Older saves stored a target speed in px/s instead of a spawn delay.
/// speed 200 -> 1000 ms, speed 50 -> 4000 ms (clamped to 3000).
fn migrate_target_speed(value: &mut Value) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };
    if obj.contains_key("spawnDelay") || !obj.contains_key("targetSpeed") {
        return;
    }
    let speed = obj.remove("targetSpeed").and_then(|v| v.as_f64());
    if let Some(speed) = speed {
        let delay = (200.0 / speed * 1000.0)
            .clamp(MIN_SPAWN_DELAY_MS as f64, MAX_SPAWN_DELAY_MS as f64)
            .round() as u32;
        log::info!("Migrated legacy targetSpeed {} to spawnDelay {}", speed, delay);
        obj.insert("spawnDelay".to_string(), Value::from(delay));
    }
}

/// Handle returned by [`SettingsStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Listener = Box<dyn FnMut(&GameSettings)>;

/// Current settings plus their backing storage and change listeners
pub struct SettingsStore {
    settings: GameSettings,
    storage: Box<dyn KeyValueStore>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u32,
}

impl SettingsStore {
    /// Load settings from storage, falling back to defaults
    pub fn load_from(storage: Box<dyn KeyValueStore>) -> Self {
        let settings = match storage.get_item(GameSettings::STORAGE_KEY) {
            Some(json) => match GameSettings::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    settings
                }
                Err(e) => {
                    log::warn!("Discarding stored settings: {}", e);
                    GameSettings::default()
                }
            },
            None => {
                log::info!("Using default settings");
                GameSettings::default()
            }
        };

        Self {
            settings,
            storage,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Settings backed by LocalStorage
    #[cfg(target_arch = "wasm32")]
    pub fn browser() -> Self {
        Self::load_from(Box::new(crate::platform::web::LocalStorage::new()))
    }

    /// Settings that live only for this process
    pub fn in_memory() -> Self {
        Self::load_from(Box::new(MemoryStore::new()))
    }

    pub fn get(&self) -> &GameSettings {
        &self.settings
    }

    /// Apply a change, clamp, persist and notify listeners
    pub fn update(&mut self, change: impl FnOnce(&mut GameSettings)) {
        change(&mut self.settings);
        self.settings.spawn_delay = self.settings.spawn_delay.max(MIN_SPAWN_DELAY_MS);
        self.save();
        self.notify();
    }

    /// Restore defaults, persist and notify listeners
    pub fn reset(&mut self) {
        self.settings = GameSettings::default();
        self.save();
        self.notify();
    }

    /// Register a change listener; called in registration order
    pub fn subscribe(&mut self, listener: impl FnMut(&GameSettings) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(sub, _)| *sub != id);
    }

    fn save(&mut self) {
        match serde_json::to_string(&self.settings) {
            Ok(json) => {
                if !self.storage.set_item(GameSettings::STORAGE_KEY, &json) {
                    log::error!("Error saving settings");
                }
            }
            Err(e) => log::error!("Error encoding settings: {}", e),
        }
    }

    fn notify(&mut self) {
        let snapshot = self.settings.clone();
        for (_, listener) in self.listeners.iter_mut() {
            listener(&snapshot);
        }
    }
}

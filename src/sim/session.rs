//! Session game loop
//!
//! Owns score, countdown and streaks for one round and drives the target.
//! All entry points take the host clock in ms and run to completion.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::mode::ModeParams;
use super::target::{SpawnReason, Target};
use crate::consts::COUNTDOWN_INTERVAL_MS;
use crate::platform::{PlayField, TargetView};
use crate::settings::{GameMode, GameSettings};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// In a menu, target inactive
    Ready,
    /// Round running
    Playing,
    /// Countdown reached zero
    GameOver,
}

/// Things that happened during a call, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Target clicked while visible
    Hit { score: u32 },
    /// Target expired unclicked
    Expired,
    /// One second of round time elapsed
    Countdown { time_left: u32 },
    /// Round over
    GameOver { score: u32 },
}

/// One round of play
pub struct Session {
    target: Target,
    mode: GameMode,
    params: ModeParams,
    phase: SessionPhase,
    score: u32,
    misses: u32,
    streak: u32,
    best_streak: u32,
    time_left: Option<u32>,
    next_countdown_ms: Option<f64>,
    /// Expiries reported by the target since the last tick
    expired: Rc<Cell<u32>>,
    /// Events raised outside `tick`, delivered by the next one
    queued: Vec<GameEvent>,
}

impl Session {
    pub fn new(mut target: Target, settings: &GameSettings) -> Self {
        let expired = Rc::new(Cell::new(0));
        let sink = expired.clone();
        target.on_expiry_notify(move || sink.set(sink.get() + 1));

        let params = ModeParams::resolve(settings);
        Self {
            target,
            mode: settings.game_mode,
            params,
            phase: SessionPhase::Ready,
            score: 0,
            misses: 0,
            streak: 0,
            best_streak: 0,
            time_left: params.game_time_secs,
            next_countdown_ms: None,
            expired,
            queued: Vec::new(),
        }
    }

    /// Build the target from host interfaces and wrap it in a session
    pub fn with_host(
        field: Box<dyn PlayField>,
        view: Box<dyn TargetView>,
        settings: &GameSettings,
        seed: u64,
    ) -> Self {
        let params = ModeParams::resolve(settings);
        let target = Target::new(
            field,
            view,
            params.target_size,
            params.visibility_window_ms,
            seed,
        );
        Self::new(target, settings)
    }

    /// Begin a fresh round with the current settings
    pub fn start(&mut self, settings: &GameSettings, now_ms: f64) {
        self.mode = settings.game_mode;
        self.params = ModeParams::resolve(settings);
        self.score = 0;
        self.misses = 0;
        self.streak = 0;
        self.best_streak = 0;
        self.expired.set(0);
        self.queued.clear();
        self.time_left = self.params.game_time_secs;
        self.next_countdown_ms = self
            .params
            .game_time_secs
            .map(|_| now_ms + COUNTDOWN_INTERVAL_MS);

        self.target.deactivate();
        self.target.resize(self.params.target_size);
        self.target
            .set_visibility_window(self.params.visibility_window_ms);
        self.target.activate();
        self.target.respawn(SpawnReason::Initial, now_ms);
        self.phase = SessionPhase::Playing;

        log::info!(
            "Session started: {} mode, window {} ms, size {}, time {:?}",
            self.mode.as_str(),
            self.params.visibility_window_ms,
            self.params.target_size,
            self.time_left
        );
    }

    /// Handle a click on the target element.
    ///
    /// The visibility timer is cancelled before anything reads visibility so
    /// an expiry can never race the hit. Returns the new score on a hit.
    pub fn click(&mut self, now_ms: f64) -> Option<u32> {
        self.target.cancel_timer();
        if self.phase != SessionPhase::Playing || !self.target.is_currently_visible() {
            return None;
        }

        self.score += 1;
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);

        if self.params.adaptive {
            let next = self.params.for_score(self.score);
            self.target.resize(next.target_size);
            self.target.set_visibility_window(next.spawn_delay_ms);
        }
        self.target.spawn_immediate(now_ms);
        self.queued.push(GameEvent::Hit { score: self.score });
        Some(self.score)
    }

    /// Handle a click at a point in container coordinates (pointer hosts).
    ///
    /// Clicks outside the target are ignored and leave its timer running.
    pub fn click_at(&mut self, point: Vec2, now_ms: f64) -> Option<u32> {
        if !self.target.contains(point) {
            return None;
        }
        self.click(now_ms)
    }

    /// Advance the countdown and the target timer to `now_ms`
    pub fn tick(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.queued);
        if self.phase != SessionPhase::Playing {
            return events;
        }

        while let (Some(due), Some(left)) = (self.next_countdown_ms, self.time_left) {
            if now_ms < due {
                break;
            }
            let left = left.saturating_sub(1);
            self.time_left = Some(left);
            self.next_countdown_ms = Some(due + COUNTDOWN_INTERVAL_MS);
            events.push(GameEvent::Countdown { time_left: left });
            if left == 0 {
                self.finish();
                events.push(GameEvent::GameOver { score: self.score });
                return events;
            }
        }

        self.target.poll(now_ms);
        for _ in 0..self.expired.replace(0) {
            self.misses += 1;
            self.streak = 0;
            events.push(GameEvent::Expired);
        }

        if self.target.needs_placement() {
            self.target.respawn(SpawnReason::Retry, now_ms);
        }

        events
    }

    /// Leave the round (back to menu)
    pub fn end(&mut self) {
        self.target.deactivate();
        self.next_countdown_ms = None;
        self.queued.clear();
        self.phase = SessionPhase::Ready;
        log::info!("Session ended with score {}", self.score);
    }

    /// Pick up live settings changes for the running mode.
    ///
    /// Mode switches take effect on the next `start`.
    pub fn apply_settings(&mut self, settings: &GameSettings) {
        if settings.game_mode != self.mode {
            return;
        }
        self.params = ModeParams::resolve(settings);
        let current = self.params.for_score(self.score);
        self.target.resize(current.target_size);
        self.target.set_visibility_window(current.spawn_delay_ms);
    }

    fn finish(&mut self) {
        self.target.deactivate();
        self.next_countdown_ms = None;
        self.phase = SessionPhase::GameOver;
        log::info!(
            "Time's up! score {}, misses {}, best streak {}",
            self.score,
            self.misses,
            self.best_streak
        );
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Seconds left; `None` for untimed modes
    pub fn time_left(&self) -> Option<u32> {
        self.time_left
    }

    /// Hits over hits plus expiries (0.0 before any attempt)
    pub fn accuracy(&self) -> f32 {
        let attempts = self.score + self.misses;
        if attempts == 0 {
            0.0
        } else {
            self.score as f32 / attempts as f32
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Target access for hosts that register their own observers
    pub fn target_mut(&mut self) -> &mut Target {
        &mut self.target
    }
}

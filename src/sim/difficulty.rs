//! Adaptive difficulty for the infinite mode
//!
//! Score drives the spawn delay through a staircase of segments; the delay in
//! turn drives the target size. Both functions are pure.

use serde::{Deserialize, Serialize};

/// One stretch of the spawn delay staircase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnSegment {
    /// Score where this segment starts
    pub low: u32,
    /// Last score (inclusive) handled by this segment
    pub high: u32,
    /// Points needed for each delay step
    pub score_step: u32,
    /// Delay removed per step (ms)
    pub delay_step_ms: u32,
    /// Delay at `low` (ms)
    pub start_delay_ms: u32,
    /// Delay never drops below this within the segment (ms)
    pub floor_ms: u32,
}

impl SpawnSegment {
    const fn new(
        low: u32,
        high: u32,
        score_step: u32,
        delay_step_ms: u32,
        start_delay_ms: u32,
        floor_ms: u32,
    ) -> Self {
        Self {
            low,
            high,
            score_step,
            delay_step_ms,
            start_delay_ms,
            floor_ms,
        }
    }

    /// Delay for a score inside this segment
    pub fn delay_at(&self, score: u32) -> u32 {
        let steps = (score - self.low) / self.score_step;
        self.start_delay_ms
            .saturating_sub(steps.saturating_mul(self.delay_step_ms))
            .max(self.floor_ms)
    }
}

/// Segments in ascending score order. Steps get finer as the score grows.
pub const SPAWN_SEGMENTS: [SpawnSegment; 6] = [
    SpawnSegment::new(0, 100, 10, 50, 3000, 2500),
    SpawnSegment::new(100, 300, 20, 50, 2500, 2000),
    SpawnSegment::new(300, 600, 30, 50, 2000, 1500),
    SpawnSegment::new(600, 1000, 40, 50, 1500, 1000),
    SpawnSegment::new(1000, 2120, 40, 25, 1000, 300),
    SpawnSegment::new(2120, 3620, 50, 5, 300, 150),
];

/// Delay once the score is past the last segment (ms)
pub const FINAL_DELAY_MS: u32 = 150;

/// Spawn delay in ms for a cumulative score
pub fn spawn_delay(score: u32) -> u32 {
    SPAWN_SEGMENTS
        .iter()
        .find(|segment| score <= segment.high)
        .map(|segment| segment.delay_at(score))
        .unwrap_or(FINAL_DELAY_MS)
}

/// Target edge length for a spawn delay
pub fn target_size(delay_ms: u32) -> f32 {
    let delay = delay_ms as f32;
    if delay_ms >= 500 {
        (100.0 - (3000.0 - delay) * 70.0 / 2500.0).max(30.0)
    } else if delay_ms >= 300 {
        (30.0 - (500.0 - delay) * 5.0 / 200.0).max(25.0)
    } else if delay_ms >= 150 {
        (25.0 - (300.0 - delay) * 5.0 / 150.0).max(20.0)
    } else {
        20.0
    }
}

/// Parameters pushed into the target after a scoring click
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    pub spawn_delay_ms: u32,
    pub target_size: f32,
}

/// Evaluate both curves for a score
pub fn evaluate(score: u32) -> DifficultyParams {
    let spawn_delay_ms = spawn_delay(score);
    DifficultyParams {
        spawn_delay_ms,
        target_size: target_size(spawn_delay_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_spawn_delay_boundaries() {
        assert_eq!(spawn_delay(0), 3000);
        assert_eq!(spawn_delay(100), 2500);
        assert_eq!(spawn_delay(300), 2000);
        assert_eq!(spawn_delay(600), 1500);
        assert_eq!(spawn_delay(1000), 1000);
        assert_eq!(spawn_delay(2120), 300);
        assert_eq!(spawn_delay(3620), 150);
        assert_eq!(spawn_delay(5000), 150);
    }

    #[test]
    fn test_spawn_delay_inside_segments() {
        assert_eq!(spawn_delay(9), 3000);
        assert_eq!(spawn_delay(10), 2950);
        assert_eq!(spawn_delay(99), 2550);
        assert_eq!(spawn_delay(101), 2500);
        assert_eq!(spawn_delay(120), 2450);
        assert_eq!(spawn_delay(1040), 975);
        assert_eq!(spawn_delay(2170), 295);
        assert_eq!(spawn_delay(3621), FINAL_DELAY_MS);
    }

    #[test]
    fn test_segments_are_contiguous() {
        for pair in SPAWN_SEGMENTS.windows(2) {
            assert_eq!(pair[0].high, pair[1].low);
            assert_eq!(pair[0].delay_at(pair[0].high), pair[1].start_delay_ms);
        }
    }

    #[test]
    fn test_target_size_boundaries() {
        assert_eq!(target_size(3000), 100.0);
        assert_eq!(target_size(500), 30.0);
        assert_eq!(target_size(300), 25.0);
        assert_eq!(target_size(150), 20.0);
        assert_eq!(target_size(100), 20.0);
    }

    #[test]
    fn test_target_size_interpolates() {
        assert!((target_size(1750) - 65.0).abs() < 1e-4);
        assert!((target_size(400) - 27.5).abs() < 1e-4);
        assert!((target_size(225) - 22.5).abs() < 1e-4);
    }

    #[test]
    fn test_evaluate_pairs_curves() {
        let params = evaluate(0);
        assert_eq!(params.spawn_delay_ms, 3000);
        assert_eq!(params.target_size, 100.0);

        let params = evaluate(3620);
        assert_eq!(params.spawn_delay_ms, 150);
        assert_eq!(params.target_size, 20.0);
    }

    proptest! {
        #[test]
        fn prop_spawn_delay_non_increasing(a in 0u32..10_000, b in 0u32..10_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(spawn_delay(hi) <= spawn_delay(lo));
        }

        #[test]
        fn prop_target_size_tracks_delay(score in 0u32..10_000) {
            let params = evaluate(score);
            prop_assert!(params.target_size >= 20.0 && params.target_size <= 100.0);
            prop_assert!(params.spawn_delay_ms >= FINAL_DELAY_MS);
        }
    }
}

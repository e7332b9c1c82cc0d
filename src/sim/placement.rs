//! Random target placement with a minimum hop distance

use glam::Vec2;
use rand::Rng;

use crate::consts::{MAX_PLACEMENT_ATTEMPTS, MIN_PLACEMENT_DISTANCE, TARGET_MARGIN};
use crate::usable_area;

/// Pick a top-left position for a target of `size` inside `container`.
///
/// Candidates are sampled uniformly in `[margin, margin + W] x [margin, margin + H]`
/// where `W, H` is the usable area. The first candidate at least
/// `MIN_PLACEMENT_DISTANCE` away from `last` wins; after `MAX_PLACEMENT_ATTEMPTS`
/// misses the last sample is accepted anyway.
///
/// Returns `None` when the container has no usable area yet.
pub fn generate_placement<R: Rng + ?Sized>(
    rng: &mut R,
    container: Vec2,
    size: f32,
    last: Option<Vec2>,
) -> Option<Vec2> {
    let usable = usable_area(container, size);
    if usable.x <= 0.0 || usable.y <= 0.0 {
        return None;
    }

    let mut candidate = sample(rng, usable);
    let Some(last) = last else {
        return Some(candidate);
    };

    for attempt in 1..=MAX_PLACEMENT_ATTEMPTS {
        if candidate.distance(last) >= MIN_PLACEMENT_DISTANCE {
            return Some(candidate);
        }
        if attempt < MAX_PLACEMENT_ATTEMPTS {
            candidate = sample(rng, usable);
        }
    }

    log::trace!("Placement budget exhausted, accepting {:?}", candidate);
    Some(candidate)
}

#[inline]
fn sample<R: Rng + ?Sized>(rng: &mut R, usable: Vec2) -> Vec2 {
    Vec2::new(
        TARGET_MARGIN + rng.random::<f32>() * usable.x,
        TARGET_MARGIN + rng.random::<f32>() * usable.y,
    )
}

//! Target controller
//!
//! Owns the single clickable target: where it is, whether it can be hit, and
//! the visibility timer that moves it on when the player is too slow.
//!
//! Timers are deadlines on the host clock (ms). The host advances time through
//! [`Target::poll`]; there is never more than one pending deadline.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::placement::generate_placement;
use crate::platform::{PlayField, TargetView};

/// Why a placement is happening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnReason {
    /// First placement of a session
    Initial,
    /// Player clicked the visible target
    Hit,
    /// Visibility timer ran out
    Expired,
    /// An earlier placement was deferred
    Retry,
}

/// Result of a spawn request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnOutcome {
    /// Target moved and is visible with a fresh timer
    Placed(Vec2),
    /// Container not laid out yet; target stays hidden until the caller retries
    Deferred,
    /// No active game, nothing happened
    Inactive,
}

/// Outstanding visibility deadline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingTimer {
    pub token: u64,
    pub deadline_ms: f64,
}

type ExpiryObserver = Box<dyn FnMut()>;

/// The clickable target
pub struct Target {
    field: Box<dyn PlayField>,
    view: Box<dyn TargetView>,
    rng: Pcg32,
    position: Vec2,
    size: f32,
    visibility_window_ms: u32,
    visible: bool,
    last_position: Option<Vec2>,
    game_active: bool,
    pending: Option<PendingTimer>,
    next_token: u64,
    expiry_observers: Vec<ExpiryObserver>,
}

impl Target {
    /// Create an inactive, hidden target bound to a play field.
    ///
    /// `size` must be positive and `visibility_window_ms` already clamped by
    /// the settings layer.
    pub fn new(
        field: Box<dyn PlayField>,
        mut view: Box<dyn TargetView>,
        size: f32,
        visibility_window_ms: u32,
        seed: u64,
    ) -> Self {
        debug_assert!(size > 0.0, "target size must be positive");
        view.set_size(size);
        view.set_visible(false);
        Self {
            field,
            view,
            rng: Pcg32::seed_from_u64(seed),
            position: Vec2::ZERO,
            size,
            visibility_window_ms,
            visible: false,
            last_position: None,
            game_active: false,
            pending: None,
            next_token: 1,
            expiry_observers: Vec::new(),
        }
    }

    /// Allow spawns and timers. Does not spawn by itself.
    pub fn activate(&mut self) {
        self.game_active = true;
    }

    /// Stop the session: cancel the timer, hide, forget the last position
    pub fn deactivate(&mut self) {
        self.game_active = false;
        self.cancel_timer();
        self.hide();
        self.last_position = None;
    }

    /// New edge length, used by the next placement and shown immediately
    pub fn resize(&mut self, size: f32) {
        if !(size > 0.0) {
            log::warn!("Ignoring non-positive target size {}", size);
            return;
        }
        self.size = size;
        self.view.set_size(size);
    }

    /// Window for timers armed from now on; a running timer keeps its deadline
    pub fn set_visibility_window(&mut self, window_ms: u32) {
        self.visibility_window_ms = window_ms;
    }

    /// Respawn after a scoring click
    pub fn spawn_immediate(&mut self, now_ms: f64) -> SpawnOutcome {
        self.respawn(SpawnReason::Hit, now_ms)
    }

    /// Respawn after the visibility timer ran out
    pub fn spawn_on_expiry(&mut self, now_ms: f64) -> SpawnOutcome {
        self.respawn(SpawnReason::Expired, now_ms)
    }

    /// Cancel, hide, place, show and re-arm in one step.
    ///
    /// No-op while inactive. If the container has no usable area the target
    /// is left hidden without a timer; see [`Target::needs_placement`].
    pub fn respawn(&mut self, reason: SpawnReason, now_ms: f64) -> SpawnOutcome {
        if !self.game_active {
            return SpawnOutcome::Inactive;
        }

        self.cancel_timer();
        self.hide();

        let container = self.field.size();
        let Some(pos) = generate_placement(&mut self.rng, container, self.size, self.last_position)
        else {
            log::trace!("Placement deferred, container {:?} not ready", container);
            return SpawnOutcome::Deferred;
        };

        self.position = pos;
        self.last_position = Some(pos);
        self.view.set_position(pos);
        self.visible = true;
        self.view.set_visible(true);
        self.arm(now_ms);

        log::debug!(
            "Target placed at ({:.1}, {:.1}) [{:?}], expires in {} ms",
            pos.x,
            pos.y,
            reason,
            self.visibility_window_ms
        );
        SpawnOutcome::Placed(pos)
    }

    /// Drop the pending timer, if any
    pub fn cancel_timer(&mut self) {
        self.pending = None;
    }

    /// Whether a click right now should score
    pub fn is_currently_visible(&self) -> bool {
        self.visible
    }

    /// Register a callback fired each time the target expires unclicked
    pub fn on_expiry_notify(&mut self, callback: impl FnMut() + 'static) {
        self.expiry_observers.push(Box::new(callback));
    }

    /// Advance to `now_ms`. Returns true if the timer expired, in which case
    /// observers have been notified and the target respawned.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if !self.game_active {
            return false;
        }
        match self.pending {
            Some(timer) if now_ms >= timer.deadline_ms => {
                self.pending = None;
                self.hide();
                log::debug!("Target expired (timer {})", timer.token);
                for observer in self.expiry_observers.iter_mut() {
                    observer();
                }
                self.spawn_on_expiry(now_ms);
                true
            }
            _ => false,
        }
    }

    /// Active but hidden with nothing scheduled: a deferred placement is waiting
    pub fn needs_placement(&self) -> bool {
        self.game_active && !self.visible && self.pending.is_none()
    }

    pub fn is_active(&self) -> bool {
        self.game_active
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn last_position(&self) -> Option<Vec2> {
        self.last_position
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn visibility_window_ms(&self) -> u32 {
        self.visibility_window_ms
    }

    pub fn has_pending_timer(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_timer(&self) -> Option<PendingTimer> {
        self.pending
    }

    /// Axis-aligned hit test in container coordinates
    pub fn contains(&self, point: Vec2) -> bool {
        let rel = point - self.position;
        rel.x >= 0.0 && rel.y >= 0.0 && rel.x <= self.size && rel.y <= self.size
    }

    fn arm(&mut self, now_ms: f64) {
        let token = self.next_token;
        self.next_token += 1;
        self.pending = Some(PendingTimer {
            token,
            deadline_ms: now_ms + self.visibility_window_ms as f64,
        });
    }

    fn hide(&mut self) {
        if self.visible {
            self.visible = false;
            self.view.set_visible(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MIN_PLACEMENT_DISTANCE;
    use crate::platform::{FixedField, NullView, RecordingView};
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn target_in(width: f32, height: f32) -> Target {
        Target::new(
            Box::new(FixedField::new(width, height)),
            Box::new(NullView),
            50.0,
            1000,
            7,
        )
    }

    #[test]
    fn test_inactive_target_ignores_spawns() {
        let mut target = target_in(400.0, 400.0);
        assert_eq!(target.spawn_immediate(0.0), SpawnOutcome::Inactive);
        assert!(!target.has_pending_timer());
        assert!(!target.is_currently_visible());
        assert!(!target.poll(10_000.0));
    }

    #[test]
    fn test_activate_does_not_spawn() {
        let mut target = target_in(400.0, 400.0);
        target.activate();
        assert!(!target.is_currently_visible());
        assert!(target.needs_placement());
    }

    #[test]
    fn test_spawn_arms_single_timer() {
        let mut target = target_in(400.0, 400.0);
        target.activate();
        assert!(matches!(
            target.respawn(SpawnReason::Initial, 0.0),
            SpawnOutcome::Placed(_)
        ));
        let first = target.pending_timer().unwrap();
        assert_eq!(first.deadline_ms, 1000.0);
        assert!(target.is_currently_visible());

        target.spawn_immediate(300.0);
        let second = target.pending_timer().unwrap();
        assert_ne!(first.token, second.token);
        assert_eq!(second.deadline_ms, 1300.0);
    }

    #[test]
    fn test_consecutive_spawns_keep_distance() {
        let mut target = target_in(400.0, 400.0);
        target.activate();
        target.spawn_immediate(0.0);
        for i in 0..200 {
            let prev = target.position();
            let SpawnOutcome::Placed(pos) = target.spawn_immediate(i as f64) else {
                panic!("expected placement");
            };
            assert!(pos.distance(prev) >= MIN_PLACEMENT_DISTANCE);
        }
    }

    #[test]
    fn test_expiry_fires_once_and_respawns() {
        let mut target = target_in(400.0, 400.0);
        let expired = Rc::new(Cell::new(0));
        let counter = expired.clone();
        target.on_expiry_notify(move || counter.set(counter.get() + 1));

        target.activate();
        target.spawn_immediate(0.0);
        let before = target.position();

        assert!(!target.poll(999.0));
        assert!(target.poll(1000.0));
        assert_eq!(expired.get(), 1);
        assert!(target.is_currently_visible());
        assert_ne!(target.position(), before);
        assert_eq!(target.pending_timer().unwrap().deadline_ms, 2000.0);

        // Same instant again: the new timer is not due yet
        assert!(!target.poll(1000.0));
        assert_eq!(expired.get(), 1);
    }

    #[test]
    fn test_cancel_is_idempotent_and_blocks_expiry() {
        let mut target = target_in(400.0, 400.0);
        target.activate();
        target.spawn_immediate(0.0);
        target.cancel_timer();
        target.cancel_timer();
        assert!(!target.has_pending_timer());
        assert!(!target.poll(5000.0));
    }

    #[test]
    fn test_visibility_window_not_retroactive() {
        let mut target = target_in(400.0, 400.0);
        target.activate();
        target.spawn_immediate(0.0);
        target.set_visibility_window(250);
        assert_eq!(target.pending_timer().unwrap().deadline_ms, 1000.0);
        assert!(!target.poll(500.0));
        assert!(target.poll(1000.0));
        assert_eq!(target.pending_timer().unwrap().deadline_ms, 1250.0);
    }

    #[test]
    fn test_resize_updates_view_immediately() {
        let view = RecordingView::new();
        let mut target = Target::new(
            Box::new(FixedField::new(400.0, 400.0)),
            Box::new(view.clone()),
            50.0,
            1000,
            3,
        );
        assert_eq!(view.snapshot().size, 50.0);
        target.resize(30.0);
        assert_eq!(view.snapshot().size, 30.0);
        assert_eq!(target.size(), 30.0);

        target.resize(0.0);
        target.resize(-4.0);
        assert_eq!(target.size(), 30.0);
    }

    #[test]
    fn test_view_tracks_visibility_and_position() {
        let view = RecordingView::new();
        let mut target = Target::new(
            Box::new(FixedField::new(400.0, 400.0)),
            Box::new(view.clone()),
            50.0,
            1000,
            3,
        );
        target.activate();
        target.spawn_immediate(0.0);
        let state = view.snapshot();
        assert!(state.visible);
        assert_eq!(state.position, target.position());

        target.deactivate();
        assert!(!view.snapshot().visible);
    }

    #[test]
    fn test_deactivate_clears_history() {
        let mut target = target_in(400.0, 400.0);
        target.activate();
        target.spawn_immediate(0.0);
        assert!(target.last_position().is_some());

        target.deactivate();
        assert!(target.last_position().is_none());
        assert!(!target.has_pending_timer());
        assert!(!target.is_currently_visible());
        assert_eq!(target.spawn_immediate(10.0), SpawnOutcome::Inactive);

        target.activate();
        assert!(matches!(
            target.respawn(SpawnReason::Initial, 20.0),
            SpawnOutcome::Placed(_)
        ));
    }

    #[test]
    fn test_first_spawn_after_reset_ignores_old_position() {
        // In a 2x2 usable area every placement is closer than the minimum
        // distance, so only a cleared history is accepted on the first sample.
        let container = Vec2::new(62.0, 62.0);
        let mut mirror = Pcg32::seed_from_u64(11);
        let mut target = Target::new(
            Box::new(FixedField::new(container.x, container.y)),
            Box::new(NullView),
            50.0,
            1000,
            11,
        );
        target.activate();
        let SpawnOutcome::Placed(first) = target.spawn_immediate(0.0) else {
            panic!("expected placement");
        };
        assert_eq!(Some(first), generate_placement(&mut mirror, container, 50.0, None));

        target.deactivate();
        target.activate();
        let SpawnOutcome::Placed(second) = target.spawn_immediate(0.0) else {
            panic!("expected placement");
        };
        assert_eq!(Some(second), generate_placement(&mut mirror, container, 50.0, None));
        assert!(second.distance(first) < MIN_PLACEMENT_DISTANCE);
    }

    #[test]
    fn test_deferred_placement_until_container_ready() {
        let field = FixedField::new(0.0, 0.0);
        let mut target = Target::new(Box::new(field.clone()), Box::new(NullView), 50.0, 1000, 5);
        target.activate();
        assert_eq!(target.spawn_immediate(0.0), SpawnOutcome::Deferred);
        assert!(target.needs_placement());
        assert!(!target.has_pending_timer());
        assert!(target.last_position().is_none());

        field.resize(400.0, 400.0);
        assert!(matches!(target.spawn_immediate(16.0), SpawnOutcome::Placed(_)));
        assert!(!target.needs_placement());
    }

    #[test]
    fn test_contains_hit_region() {
        let mut target = target_in(400.0, 400.0);
        target.activate();
        target.spawn_immediate(0.0);
        let pos = target.position();
        assert!(target.contains(pos + Vec2::splat(25.0)));
        assert!(!target.contains(pos - Vec2::splat(1.0)));
        assert!(!target.contains(pos + Vec2::splat(51.0)));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Hit,
        Cancel,
        Advance(u16),
        Toggle,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Hit),
            Just(Op::Cancel),
            (0u16..1500).prop_map(Op::Advance),
            Just(Op::Toggle),
        ]
    }

    proptest! {
        #[test]
        fn prop_visible_target_always_timed(ops in proptest::collection::vec(op_strategy(), 1..60)) {
            let mut target = target_in(500.0, 400.0);
            target.activate();
            target.respawn(SpawnReason::Initial, 0.0);
            let mut now = 0.0;
            for op in ops {
                match op {
                    Op::Hit => {
                        target.cancel_timer();
                        if target.is_currently_visible() {
                            target.spawn_immediate(now);
                        }
                    }
                    Op::Cancel => {
                        target.cancel_timer();
                        target.spawn_immediate(now);
                    }
                    Op::Advance(ms) => {
                        now += ms as f64;
                        target.poll(now);
                    }
                    Op::Toggle => {
                        if target.is_active() {
                            target.deactivate();
                        } else {
                            target.activate();
                            target.respawn(SpawnReason::Initial, now);
                        }
                    }
                }
                if target.is_currently_visible() {
                    prop_assert!(target.has_pending_timer());
                }
                if let Some(timer) = target.pending_timer() {
                    prop_assert!(timer.deadline_ms > now || !target.is_active());
                }
            }
        }
    }
}

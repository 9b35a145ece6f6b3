//! Per-tick recompute scheduling.

use crate::options::RecomputePolicy;

/// Allows at most one Voronoi dispatch per frame tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameGate {
    has_run: bool,
}

impl FrameGate {
    /// Reopen the gate. Called unconditionally at the start of every tick.
    pub fn open(&mut self) {
        self.has_run = false;
    }

    /// Close the gate if it is open. Returns whether the caller may
    /// dispatch.
    pub fn try_run(&mut self) -> bool {
        !std::mem::replace(&mut self.has_run, true)
    }

    /// Whether a dispatch already ran this tick.
    #[must_use]
    pub fn has_run(&self) -> bool {
        self.has_run
    }
}

/// Gate state, as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// No dispatch yet this tick.
    Idle,
    /// Dispatched; further requests this tick are ignored.
    Dispatched,
}

/// Decides, per tick, whether the Voronoi result must be recomputed.
///
/// Requests come from site-change notifications (one per moved anchor) and
/// from invalidations (startup, resize, site count change). The first
/// request of a tick wins the gate; every later one is dropped until the
/// next [`begin_tick`](Self::begin_tick). With
/// [`RecomputePolicy::EveryTick`] the end of the update phase requests a
/// dispatch even when nothing moved.
#[derive(Debug, Clone)]
pub struct FrameOrchestrator {
    gate: FrameGate,
    policy: RecomputePolicy,
    invalidated: bool,
    dispatches: u64,
}

impl FrameOrchestrator {
    /// Starts invalidated so the first tick computes an initial result.
    #[must_use]
    pub fn new(policy: RecomputePolicy) -> Self {
        Self {
            gate: FrameGate::default(),
            policy,
            invalidated: true,
            dispatches: 0,
        }
    }

    /// Start a tick: the gate goes back to [`FrameState::Idle`].
    pub fn begin_tick(&mut self) {
        self.gate.open();
    }

    /// A site moved. Returns `true` if the caller should upload and
    /// dispatch now.
    pub fn notify_site_changed(&mut self) -> bool {
        self.request()
    }

    /// Force a recompute on the next opportunity, even without site
    /// movement.
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    /// End of the update phase. Returns `true` if a dispatch is still owed
    /// this tick (pending invalidation, or the every-tick policy).
    pub fn finish_update(&mut self) -> bool {
        let owed = self.invalidated || self.policy == RecomputePolicy::EveryTick;
        owed && self.request()
    }

    fn request(&mut self) -> bool {
        if !self.gate.try_run() {
            return false;
        }
        self.invalidated = false;
        self.dispatches += 1;
        true
    }

    /// Current gate state.
    #[must_use]
    pub fn state(&self) -> FrameState {
        if self.gate.has_run() {
            FrameState::Dispatched
        } else {
            FrameState::Idle
        }
    }

    /// Dispatches granted so far.
    #[must_use]
    pub fn dispatch_count(&self) -> u64 {
        self.dispatches
    }

    /// Switch recompute policy.
    pub fn set_policy(&mut self, policy: RecomputePolicy) {
        self.policy = policy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settled(policy: RecomputePolicy) -> FrameOrchestrator {
        let mut frames = FrameOrchestrator::new(policy);
        frames.begin_tick();
        assert!(frames.finish_update());
        frames
    }

    #[test]
    fn gate_allows_one_run_until_reopened() {
        let mut gate = FrameGate::default();
        assert!(gate.try_run());
        assert!(!gate.try_run());
        assert!(gate.has_run());
        gate.open();
        assert!(gate.try_run());
    }

    #[test]
    fn many_notifications_in_one_tick_dispatch_once() {
        let mut frames = settled(RecomputePolicy::OnChange);
        frames.begin_tick();
        let granted = (0..5).filter(|_| frames.notify_site_changed()).count();
        assert_eq!(granted, 1);
        assert!(!frames.finish_update());
        assert_eq!(frames.state(), FrameState::Dispatched);
        assert_eq!(frames.dispatch_count(), 2);
    }

    #[test]
    fn gate_reopens_on_the_next_tick() {
        let mut frames = settled(RecomputePolicy::OnChange);
        frames.begin_tick();
        assert!(frames.notify_site_changed());
        frames.begin_tick();
        assert_eq!(frames.state(), FrameState::Idle);
        assert!(frames.notify_site_changed());
    }

    #[test]
    fn quiet_ticks_do_not_dispatch_on_change() {
        let mut frames = settled(RecomputePolicy::OnChange);
        for _ in 0..3 {
            frames.begin_tick();
            assert!(!frames.finish_update());
        }
        assert_eq!(frames.dispatch_count(), 1);
    }

    #[test]
    fn every_tick_policy_dispatches_without_notifications() {
        let mut frames = settled(RecomputePolicy::EveryTick);
        for _ in 0..3 {
            frames.begin_tick();
            assert!(frames.finish_update());
        }
        assert_eq!(frames.dispatch_count(), 4);
    }

    #[test]
    fn invalidation_is_served_once() {
        let mut frames = settled(RecomputePolicy::OnChange);
        frames.invalidate();
        frames.begin_tick();
        assert!(frames.finish_update());
        frames.begin_tick();
        assert!(!frames.finish_update());
    }

    #[test]
    fn a_notification_also_serves_a_pending_invalidation() {
        let mut frames = settled(RecomputePolicy::OnChange);
        frames.invalidate();
        frames.begin_tick();
        assert!(frames.notify_site_changed());
        assert!(!frames.finish_update());
        frames.begin_tick();
        assert!(!frames.finish_update());
    }
}

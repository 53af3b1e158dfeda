// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::time::Instant;

use crate::math::angle::normalize_deg;
use crate::wheel::state::SpinSnapshot;

use super::animation::SettleAnimation;

#[derive(Debug, Clone, Copy)]
struct ActiveSettle {
    epoch: u64,
    animation: SettleAnimation,
    started: Instant,
}

/// Client-side view of the wheel.
///
/// Follows the free-spin angle from snapshots and, once a settle plan
/// shows up, animates it from the moment it was first observed.
#[derive(Debug, Clone, Default)]
pub struct WheelView {
    angle: f64,
    settle: Option<ActiveSettle>,
}

impl WheelView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in the latest snapshot, observed at `now`.
    pub fn observe(&mut self, snapshot: &SpinSnapshot, now: Instant) {
        match snapshot.settle {
            Some(animation) => {
                let known = self
                    .settle
                    .is_some_and(|s| s.epoch == snapshot.epoch && s.animation == animation);
                if !known {
                    self.settle = Some(ActiveSettle {
                        epoch: snapshot.epoch,
                        animation,
                        started: now,
                    });
                }
            }
            None => {
                self.settle = None;
                self.angle = snapshot.rotation_deg;
            }
        }
    }

    /// Unbounded angle to draw at `now`.
    pub fn angle_at(&self, now: Instant) -> f64 {
        match self.settle {
            Some(s) => s
                .animation
                .angle_at(now.saturating_duration_since(s.started)),
            None => self.angle,
        }
    }

    /// Angle as drawn, in `[0, 360)`.
    pub fn visual_angle(&self, now: Instant) -> f64 {
        normalize_deg(self.angle_at(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::reward::RewardOutcome;
    use crate::wheel::controller::{ScriptedRandom, SpinEvent, SpinMachine, SpinMachineConfig};

    fn settled_machine() -> (SpinMachine, SpinSnapshot) {
        let mut sm = SpinMachine::with_random(
            SpinMachineConfig::default(),
            Box::new(ScriptedRandom::new(vec![0.3, 0.7])),
        );
        sm.process_event(SpinEvent::StartRequested);
        for _ in 0..9 {
            sm.tick();
        }
        let spinning = sm.snapshot();
        sm.process_event(SpinEvent::ResultArrived {
            epoch: 1,
            outcome: RewardOutcome::new(500, 500),
        });
        sm.process_event(SpinEvent::StopRequested);
        (sm, spinning)
    }

    #[test]
    fn test_settle_starts_where_free_spin_stopped() {
        let (sm, spinning) = settled_machine();
        let start = Instant::now();
        let mut view = WheelView::new();

        view.observe(&spinning, start);
        let last_free = view.angle_at(start);
        assert_eq!(last_free, 9.0 * 26.0);

        view.observe(&sm.snapshot(), start);
        assert_eq!(view.angle_at(start), last_free);
        assert!(view.angle_at(start + Duration::from_millis(100)) > last_free);

        let end = start + Duration::from_millis(2200);
        assert_eq!(view.angle_at(end), sm.angle());
        assert_eq!(view.angle_at(end + Duration::from_secs(1)), sm.angle());
    }

    #[test]
    fn test_settle_never_runs_backwards() {
        let (sm, spinning) = settled_machine();
        let start = Instant::now();
        let mut view = WheelView::new();
        view.observe(&spinning, start);
        let snapshot = sm.snapshot();
        view.observe(&snapshot, start);

        let mut last = view.angle_at(start);
        for ms in (0..=2400).step_by(16) {
            let now = start + Duration::from_millis(ms);
            // repeated snapshots of the same settle must not restart it
            view.observe(&snapshot, now);
            let angle = view.angle_at(now);
            assert!(angle + 1e-9 >= last);
            last = angle;
        }
    }

    #[test]
    fn test_acknowledge_keeps_resting_angle() {
        let (mut sm, _) = settled_machine();
        let start = Instant::now();
        let mut view = WheelView::new();
        view.observe(&sm.snapshot(), start);
        let end = start + Duration::from_secs(3);
        let resting = view.angle_at(end);

        sm.process_event(SpinEvent::SettleDone { epoch: 1 });
        view.observe(&sm.snapshot(), end);
        assert_eq!(view.angle_at(end), resting);

        sm.process_event(SpinEvent::Acknowledged);
        view.observe(&sm.snapshot(), end);
        assert_eq!(view.angle_at(end), resting);
        assert!(view.visual_angle(end) < 360.0);
    }
}

// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::easing::Easing;

/// Fixed-duration transition from one wheel angle to another.
///
/// This is the hand-off to whatever animation primitive the front end
/// has: start angle, end angle, duration and timing curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettleAnimation {
    pub from_deg: f64,
    pub to_deg: f64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl SettleAnimation {
    pub fn new(from_deg: f64, to_deg: f64, duration: Duration, easing: Easing) -> Self {
        Self {
            from_deg,
            to_deg,
            duration_ms: duration.as_millis() as u64,
            easing,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Linear progress in `[0, 1]` after `elapsed`.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration().as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration()
    }

    /// Wheel angle after `elapsed`.
    pub fn angle_at(&self, elapsed: Duration) -> f64 {
        if self.is_finished(elapsed) {
            return self.to_deg;
        }
        let eased = self.easing.sample(self.progress(elapsed));
        self.from_deg + (self.to_deg - self.from_deg) * eased
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_endpoints() {
        let anim = SettleAnimation::new(100.0, 1450.0, Duration::from_millis(2200), Easing::settle());
        assert_eq!(anim.angle_at(Duration::ZERO), 100.0);
        assert_eq!(anim.angle_at(Duration::from_millis(2200)), 1450.0);
        assert_eq!(anim.angle_at(Duration::from_secs(10)), 1450.0);
        assert!(anim.is_finished(Duration::from_millis(2200)));
        assert!(!anim.is_finished(Duration::from_millis(2199)));
    }

    #[test]
    fn test_zero_duration_jumps_to_end() {
        let anim = SettleAnimation::new(0.0, 90.0, Duration::ZERO, Easing::Linear);
        assert_eq!(anim.angle_at(Duration::ZERO), 90.0);
    }

    #[test]
    fn test_forward_only() {
        let anim = SettleAnimation::new(10.0, 1200.0, Duration::from_millis(1800), Easing::settle());
        let mut last = anim.from_deg;
        for ms in (0..=1800).step_by(16) {
            let angle = anim.angle_at(Duration::from_millis(ms));
            assert!(angle + 1e-9 >= last);
            last = angle;
        }
    }
}

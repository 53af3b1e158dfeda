// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Free-spin rotation driver.
//!
//! The driver only knows an angle and whether it is running. Frame timing
//! belongs to whoever owns it: the spin task calls [`RotationDriver::tick`]
//! on every frame of its clock while the driver reports running.

/// Default angular step per display frame.
pub const DEFAULT_SPEED_PER_FRAME: f64 = 26.0;

#[derive(Debug, Clone)]
pub struct RotationDriver {
    angle: f64,
    step_deg: f64,
    running: bool,
}

impl Default for RotationDriver {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_PER_FRAME)
    }
}

impl RotationDriver {
    pub fn new(step_deg: f64) -> Self {
        Self {
            angle: 0.0,
            step_deg,
            running: false,
        }
    }

    /// Begin rotating. Returns false when already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Stop rotating. Returns false when not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Advance one frame. Returns the new angle, or None while stopped.
    pub fn tick(&mut self) -> Option<f64> {
        if !self.running {
            return None;
        }
        self.angle += self.step_deg;
        Some(self.angle)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Unbounded accumulated angle.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Move the wheel forward to where a settle ends. Never moves it back.
    pub fn park_at(&mut self, angle: f64) {
        if angle > self.angle {
            self.angle = angle;
        }
    }
}

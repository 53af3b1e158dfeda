// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Spin event notification system.
//!
//! Typed callbacks for the screen around the wheel: phase changes, the
//! transient status line, the start of the settle, and the once-per-spin
//! completion that shows the reward.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::reward::RewardOutcome;
use crate::wheel::state::SpinPhase;

use super::machine::SpinEffect;
use super::trajectory::SettleTrajectory;

/// Unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Trait for components that want to receive spin events.
///
/// All methods have default no-op implementations, so listeners can
/// selectively override only the events they care about.
pub trait SpinListener: Send + Sync {
    /// Called when the session phase changes.
    fn on_phase_change(&self, _old: SpinPhase, _new: SpinPhase) {}

    /// Called when the transient status line changes.
    fn on_status_change(&self, _status: Option<&str>) {}

    /// Called when the wheel leaves free spin and starts settling.
    fn on_settle_start(&self, _trajectory: &SettleTrajectory) {}

    /// Called once per successful spin, after the settle finishes.
    fn on_spin_complete(&self, _outcome: &RewardOutcome) {}

    /// Called when a spin is abandoned because the reward request failed.
    fn on_spin_failed(&self, _message: &str) {}
}

/// Manages registered listeners and dispatches events.
#[derive(Default)]
pub struct SpinEventEmitter {
    listeners: Vec<(ListenerId, Arc<dyn SpinListener>)>,
}

impl SpinEventEmitter {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener. Returns an ID for unregistering it.
    pub fn register(&mut self, listener: Arc<dyn SpinListener>) -> ListenerId {
        let id = ListenerId::new();
        self.listeners.push((id, listener));
        id
    }

    pub fn unregister(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Forward the notification side of a machine effect.
    pub fn dispatch(&self, effect: &SpinEffect) {
        match effect {
            SpinEffect::PhaseChanged { from, to } => self.notify_phase_change(*from, *to),
            SpinEffect::StatusChanged(status) => self.notify_status_change(status.as_deref()),
            SpinEffect::BeginSettle { trajectory, .. } => self.notify_settle_start(trajectory),
            SpinEffect::Completed(outcome) => self.notify_spin_complete(outcome),
            SpinEffect::Failed(message) => self.notify_spin_failed(message),
            SpinEffect::RequestReward { .. } => {}
        }
    }

    pub fn notify_phase_change(&self, old: SpinPhase, new: SpinPhase) {
        for (_, listener) in &self.listeners {
            listener.on_phase_change(old, new);
        }
    }

    pub fn notify_status_change(&self, status: Option<&str>) {
        for (_, listener) in &self.listeners {
            listener.on_status_change(status);
        }
    }

    pub fn notify_settle_start(&self, trajectory: &SettleTrajectory) {
        for (_, listener) in &self.listeners {
            listener.on_settle_start(trajectory);
        }
    }

    pub fn notify_spin_complete(&self, outcome: &RewardOutcome) {
        for (_, listener) in &self.listeners {
            listener.on_spin_complete(outcome);
        }
    }

    pub fn notify_spin_failed(&self, message: &str) {
        for (_, listener) in &self.listeners {
            listener.on_spin_failed(message);
        }
    }
}

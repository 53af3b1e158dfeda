// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Spin controller components.
//!
//! The rotation driver, the session state machine with its settle
//! trajectory, injectable randomness, and listener notifications.

pub mod driver;
pub mod events;
pub mod machine;
pub mod random;
pub mod trajectory;

pub use driver::{RotationDriver, DEFAULT_SPEED_PER_FRAME};
pub use events::{ListenerId, SpinEventEmitter, SpinListener};
pub use machine::{
    SpinEffect, SpinEvent, SpinMachine, SpinMachineConfig, SpinSession, RESOLVING_STATUS,
};
pub use random::{RandomSource, ScriptedRandom, StdRandom};
pub use trajectory::{draw_jitter, plan_settle, SettleParams, SettleTrajectory};

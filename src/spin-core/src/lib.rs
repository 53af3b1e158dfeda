// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod catalog;
pub mod math;
pub mod presentation;
pub mod reward;
pub mod wheel;

pub type DynResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub use catalog::{RewardCatalog, Segment};
pub use reward::{RewardError, RewardOutcome, RewardSource};
pub use wheel::command::SpinCommand;
pub use wheel::handle::SpinHandle;
pub use wheel::request::SpinRequest;
pub use wheel::response::{SpinError, SpinResult};
pub use wheel::state::{SpinPhase, SpinSnapshot};
pub use wheel::task::{run_spin_task, spawn_spin_task, SpinTaskConfig};

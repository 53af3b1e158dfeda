// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use tokio::sync::oneshot;

use crate::{SpinCommand, SpinResult, SpinSnapshot};

/// Request sent to the spin task.
#[derive(Debug)]
pub struct SpinRequest {
    pub cmd: SpinCommand,
    pub respond_to: oneshot::Sender<SpinResult<SpinSnapshot>>,
}

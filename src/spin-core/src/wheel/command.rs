// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

/// Command handled by the spin task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinCommand {
    GetSnapshot,
    Start,
    Stop,
    Acknowledge,
}

// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::Serialize;

/// Error type returned by spin requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpinError(pub String);

pub type SpinResult<T> = Result<T, SpinError>;

impl SpinError {
    /// The spin task has shut down.
    pub fn unavailable() -> Self {
        SpinError("spin task unavailable".to_string())
    }
}

impl std::fmt::Display for SpinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for SpinError {}

impl From<String> for SpinError {
    fn from(value: String) -> Self {
        SpinError(value)
    }
}

impl From<&str> for SpinError {
    fn from(value: &str) -> Self {
        SpinError(value.to_string())
    }
}

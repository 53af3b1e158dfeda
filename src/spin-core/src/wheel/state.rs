// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::presentation::SettleAnimation;

/// Top-level phase of a spin session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinPhase {
    #[default]
    Idle,
    Spinning,
    /// Momentary: the wheel is leaving free spin for the settle.
    Stopping,
    Settling,
}

impl SpinPhase {
    /// A spin is underway and a new one may not start.
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for SpinPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Spinning => "Spinning",
            Self::Stopping => "Stopping",
            Self::Settling => "Settling",
        };
        f.pad(name)
    }
}

/// Read-only view published after every transition and frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpinSnapshot {
    /// Spin attempt this snapshot belongs to.
    pub epoch: u64,
    pub phase: SpinPhase,
    /// Unbounded wheel angle. During a settle this is already the final
    /// angle; follow `settle` to animate towards it.
    pub rotation_deg: f64,
    pub is_settling: bool,
    pub pending_stop: bool,
    pub status_text: Option<String>,
    pub error_text: Option<String>,
    pub result_value: Option<u32>,
    /// Player total reported alongside the result.
    pub total_points: Option<u64>,
    pub settle: Option<SettleAnimation>,
}

impl SpinSnapshot {
    /// Settled and waiting for the player to dismiss the result.
    pub fn has_result_ready(&self) -> bool {
        self.phase == SpinPhase::Idle && self.result_value.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SpinPhase::Settling).unwrap(),
            "\"settling\""
        );
    }

    #[test]
    fn test_in_progress() {
        assert!(!SpinPhase::Idle.is_in_progress());
        assert!(SpinPhase::Spinning.is_in_progress());
        assert!(SpinPhase::Stopping.is_in_progress());
        assert!(SpinPhase::Settling.is_in_progress());
    }
}

// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Reward request collaborator.
//!
//! The spin engine never decides the reward itself. It asks a
//! [`RewardSource`] exactly once per spin and reconciles the wheel with
//! whatever comes back.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod http;
pub mod simulated;

pub use http::HttpRewardClient;
pub use simulated::SimulatedRewardSource;

/// Message shown when the failure carries nothing more specific.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong, please try again";

/// Alias to reduce type complexity in RewardSource.
pub type RewardFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RewardOutcome, RewardError>> + Send + 'a>>;

/// Result of one reward request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spin_id: Option<Uuid>,
    pub points_gained: u32,
    pub total_points_after: u64,
}

impl RewardOutcome {
    pub fn new(points_gained: u32, total_points_after: u64) -> Self {
        Self {
            spin_id: None,
            points_gained,
            total_points_after,
        }
    }
}

/// Failure of a reward request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RewardError {
    #[error("reward request failed: {0}")]
    Transport(String),

    #[error("reward request rejected with status {status}")]
    Rejected { status: u16, message: Option<String> },

    #[error("reward request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid reward response: {0}")]
    InvalidResponse(String),
}

impl RewardError {
    /// Text suitable for showing to the player.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::Timeout(_) => "The server took too long to respond, please try again".to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Something that can decide the reward for a spin.
pub trait RewardSource: Send + Sync {
    fn request_reward<'a>(&'a self, player_id: Uuid) -> RewardFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = RewardError::Rejected {
            status: 429,
            message: Some("Daily spin limit reached".to_string()),
        };
        assert_eq!(err.user_message(), "Daily spin limit reached");
    }

    #[test]
    fn test_user_message_falls_back() {
        let blank = RewardError::Rejected {
            status: 500,
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(
            RewardError::Transport("connection refused".to_string()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert!(RewardError::Timeout(Duration::from_secs(5))
            .user_message()
            .contains("too long"));
    }

    #[test]
    fn test_outcome_parses_without_spin_id() {
        let outcome: RewardOutcome =
            serde_json::from_str(r#"{"points_gained":500,"total_points_after":1500}"#).unwrap();
        assert_eq!(outcome, RewardOutcome::new(500, 1500));
    }
}

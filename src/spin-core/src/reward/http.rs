// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! HTTP reward client for the game backend (`POST /game/spin`).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{RewardError, RewardFuture, RewardOutcome, RewardSource};

#[derive(Debug, Serialize)]
struct SpinRequestBody {
    player_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Reward source backed by the game REST API.
#[derive(Debug, Clone)]
pub struct HttpRewardClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpRewardClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RewardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RewardError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: spin_endpoint(base_url),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn spin(&self, player_id: Uuid) -> Result<RewardOutcome, RewardError> {
        debug!("POST {} for player {}", self.endpoint, player_id);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SpinRequestBody { player_id })
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_transport(e))?;
        if !status.is_success() {
            let message = error_message(&body);
            warn!("Spin request rejected: {} {:?}", status, message);
            return Err(RewardError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        parse_outcome(&body)
    }

    fn map_transport(&self, err: reqwest::Error) -> RewardError {
        if err.is_timeout() {
            RewardError::Timeout(self.timeout)
        } else {
            RewardError::Transport(err.to_string())
        }
    }
}

impl RewardSource for HttpRewardClient {
    fn request_reward<'a>(&'a self, player_id: Uuid) -> RewardFuture<'a> {
        Box::pin(self.spin(player_id))
    }
}

fn spin_endpoint(base_url: &str) -> String {
    format!("{}/game/spin", base_url.trim_end_matches('/'))
}

/// Parse a successful spin response body.
fn parse_outcome(body: &str) -> Result<RewardOutcome, RewardError> {
    serde_json::from_str::<RewardOutcome>(body)
        .map_err(|e| RewardError::InvalidResponse(e.to_string()))
}

/// Pull the human-readable message out of an error body, if any.
fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.message.or(parsed.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        assert_eq!(
            spin_endpoint("http://localhost:3001"),
            "http://localhost:3001/game/spin"
        );
        assert_eq!(
            spin_endpoint("http://localhost:3001/api/"),
            "http://localhost:3001/api/game/spin"
        );
    }

    #[test]
    fn test_parse_outcome() {
        let body = r#"{
            "spin_id": "6f1c2b4e-8a44-4a53-9d1e-0f6c5d3e2a10",
            "points_gained": 1000,
            "total_points_after": 4300
        }"#;
        let outcome = parse_outcome(body).unwrap();
        assert_eq!(outcome.points_gained, 1000);
        assert_eq!(outcome.total_points_after, 4300);
        assert!(outcome.spin_id.is_some());
    }

    #[test]
    fn test_parse_outcome_rejects_negative_points() {
        let err = parse_outcome(r#"{"points_gained":-5,"total_points_after":0}"#).unwrap_err();
        assert!(matches!(err, RewardError::InvalidResponse(_)));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"code":"DAILY_LIMIT_EXCEEDED","message":"Daily spin limit reached","remaining_spins":0}"#),
            Some("Daily spin limit reached".to_string())
        );
        assert_eq!(
            error_message(r#"{"code":"PLAYER_NOT_FOUND"}"#),
            Some("PLAYER_NOT_FOUND".to_string())
        );
        assert_eq!(error_message("<html>bad gateway</html>"), None);
    }
}

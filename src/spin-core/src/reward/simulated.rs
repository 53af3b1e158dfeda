// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Offline reward source drawing uniformly from the wheel's own values.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use uuid::Uuid;

use super::{RewardError, RewardFuture, RewardOutcome, RewardSource};
use crate::catalog::RewardCatalog;

/// Reward source with artificial latency and failures, for playing
/// without a backend.
pub struct SimulatedRewardSource {
    values: Vec<u32>,
    min_latency: Duration,
    max_latency: Duration,
    failure_rate: f64,
    rng: Mutex<StdRng>,
    total_points: AtomicU64,
}

impl SimulatedRewardSource {
    /// Every catalog value is equally likely, zero-point wedges included.
    pub fn from_catalog(
        catalog: &RewardCatalog,
        min_latency: Duration,
        max_latency: Duration,
        failure_rate: f64,
    ) -> Result<Self, String> {
        if catalog.is_empty() {
            return Err("catalog must have at least one segment".to_string());
        }
        if min_latency > max_latency {
            return Err("min latency must not exceed max latency".to_string());
        }
        if !(0.0..=1.0).contains(&failure_rate) {
            return Err("failure rate must be within 0.0..=1.0".to_string());
        }
        Ok(Self {
            values: catalog.points().collect(),
            min_latency,
            max_latency,
            failure_rate,
            rng: Mutex::new(StdRng::from_entropy()),
            total_points: AtomicU64::new(0),
        })
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn with_starting_points(self, points: u64) -> Self {
        self.total_points.store(points, Ordering::Relaxed);
        self
    }

    /// Draw latency and outcome up front so no lock is held across the wait.
    fn draw(&self) -> (Duration, Option<u32>) {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let latency = if self.max_latency > self.min_latency {
            rng.gen_range(self.min_latency..=self.max_latency)
        } else {
            self.min_latency
        };
        if rng.gen::<f64>() < self.failure_rate {
            return (latency, None);
        }
        let pick = rng.gen_range(0..self.values.len());
        (latency, self.values.get(pick).copied())
    }

    async fn spin(&self, player_id: Uuid) -> Result<RewardOutcome, RewardError> {
        let (latency, points) = self.draw();
        debug!(
            "Simulated spin for {} resolves in {:?} ({:?})",
            player_id, latency, points
        );
        tokio::time::sleep(latency).await;
        let Some(points) = points else {
            return Err(RewardError::Transport("simulated network failure".to_string()));
        };
        let total = self
            .total_points
            .fetch_add(u64::from(points), Ordering::Relaxed)
            + u64::from(points);
        Ok(RewardOutcome {
            spin_id: Some(Uuid::new_v4()),
            points_gained: points,
            total_points_after: total,
        })
    }
}

impl RewardSource for SimulatedRewardSource {
    fn request_reward<'a>(&'a self, player_id: Uuid) -> RewardFuture<'a> {
        Box::pin(self.spin(player_id))
    }
}

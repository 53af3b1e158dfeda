// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Spin session state machine.
//!
//! All reconciliation between the free-spinning wheel, the player's stop
//! gesture and the asynchronously arriving reward happens here, as pure
//! synchronous transitions. The owner feeds [`SpinEvent`]s in and carries
//! out the returned [`SpinEffect`]s (issue the request, arm the settle
//! timer, notify listeners).

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::catalog::RewardCatalog;
use crate::presentation::{Easing, SettleAnimation};
use crate::reward::RewardOutcome;
use crate::wheel::state::{SpinPhase, SpinSnapshot};

use super::driver::{RotationDriver, DEFAULT_SPEED_PER_FRAME};
use super::random::{RandomSource, StdRandom};
use super::trajectory::{plan_settle, SettleParams, SettleTrajectory};

/// Status shown while a stop waits for the reward to arrive.
pub const RESOLVING_STATUS: &str = "Resolving result…";

/// Events that can trigger transitions in the spin session.
#[derive(Debug, Clone)]
pub enum SpinEvent {
    /// Player pressed spin
    StartRequested,
    /// Player pressed stop
    StopRequested,
    /// Reward request for `epoch` succeeded
    ResultArrived { epoch: u64, outcome: RewardOutcome },
    /// Reward request for `epoch` failed
    RequestFailed { epoch: u64, message: String },
    /// Settle timer for `epoch` elapsed
    SettleDone { epoch: u64 },
    /// Player dismissed the result, or the session is abandoned
    Acknowledged,
}

impl SpinEvent {
    /// Spin attempt an asynchronous outcome belongs to.
    pub fn epoch(&self) -> Option<u64> {
        match self {
            Self::ResultArrived { epoch, .. }
            | Self::RequestFailed { epoch, .. }
            | Self::SettleDone { epoch } => Some(*epoch),
            Self::StartRequested | Self::StopRequested | Self::Acknowledged => None,
        }
    }
}

/// Work the machine's owner must carry out after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum SpinEffect {
    PhaseChanged { from: SpinPhase, to: SpinPhase },
    StatusChanged(Option<String>),
    /// Issue the reward request for this spin.
    RequestReward { epoch: u64 },
    /// Stop the free-spin loop and run the settle animation.
    BeginSettle {
        epoch: u64,
        trajectory: SettleTrajectory,
        animation: SettleAnimation,
    },
    /// Settle finished; the reward can be shown.
    Completed(RewardOutcome),
    /// The spin was abandoned with this user-facing message.
    Failed(String),
}

/// How a result and a stop request combine while spinning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconcile {
    /// Neither arrived: keep spinning.
    Waiting,
    /// Stop came first: keep spinning, tell the player we are resolving.
    StopPending,
    /// Result came first: keep spinning until the player stops.
    ResultHeld,
    /// Both present: settle now.
    Settle,
}

impl Reconcile {
    fn from_flags(result_received: bool, stop_requested: bool) -> Self {
        match (result_received, stop_requested) {
            (false, false) => Self::Waiting,
            (false, true) => Self::StopPending,
            (true, false) => Self::ResultHeld,
            (true, true) => Self::Settle,
        }
    }
}

/// Static configuration of the machine.
#[derive(Debug, Clone)]
pub struct SpinMachineConfig {
    pub catalog: RewardCatalog,
    pub speed_per_frame: f64,
    pub settle: SettleParams,
    pub settle_duration: Duration,
    pub easing: Easing,
}

impl Default for SpinMachineConfig {
    fn default() -> Self {
        Self {
            catalog: RewardCatalog::standard(),
            speed_per_frame: DEFAULT_SPEED_PER_FRAME,
            settle: SettleParams::default(),
            settle_duration: Duration::from_millis(2200),
            easing: Easing::settle(),
        }
    }
}

/// Data of the one live spin session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpinSession {
    pub phase: SpinPhase,
    pub pending_stop: bool,
    pub result: Option<RewardOutcome>,
    pub status_text: Option<String>,
    pub error_text: Option<String>,
    pub settle: Option<SettleAnimation>,
}

/// The spin state machine. Owns the session and the rotation driver so
/// the driver runs exactly while the phase is `Spinning`.
pub struct SpinMachine {
    config: SpinMachineConfig,
    session: SpinSession,
    driver: RotationDriver,
    random: Box<dyn RandomSource>,
    epoch: u64,
    transition_count: u64,
    last_transition: Option<Instant>,
}

impl Default for SpinMachine {
    fn default() -> Self {
        Self::new(SpinMachineConfig::default())
    }
}

impl SpinMachine {
    pub fn new(config: SpinMachineConfig) -> Self {
        Self::with_random(config, Box::new(StdRandom::from_entropy()))
    }

    /// Create a machine drawing settle jitter from `random`.
    pub fn with_random(config: SpinMachineConfig, random: Box<dyn RandomSource>) -> Self {
        let driver = RotationDriver::new(config.speed_per_frame);
        Self {
            config,
            session: SpinSession::default(),
            driver,
            random,
            epoch: 0,
            transition_count: 0,
            last_transition: None,
        }
    }

    pub fn config(&self) -> &SpinMachineConfig {
        &self.config
    }

    pub fn session(&self) -> &SpinSession {
        &self.session
    }

    pub fn phase(&self) -> SpinPhase {
        self.session.phase
    }

    /// Current spin attempt. Advanced on every start and acknowledge.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn angle(&self) -> f64 {
        self.driver.angle()
    }

    pub fn is_rotating(&self) -> bool {
        self.driver.is_running()
    }

    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    pub fn time_in_state(&self) -> Option<Duration> {
        self.last_transition.map(|t| t.elapsed())
    }

    /// Advance the free spin by one frame.
    pub fn tick(&mut self) -> Option<f64> {
        if self.session.phase != SpinPhase::Spinning {
            return None;
        }
        self.driver.tick()
    }

    pub fn snapshot(&self) -> SpinSnapshot {
        SpinSnapshot {
            epoch: self.epoch,
            phase: self.session.phase,
            rotation_deg: self.driver.angle(),
            is_settling: self.session.phase == SpinPhase::Settling,
            pending_stop: self.session.pending_stop,
            status_text: self.session.status_text.clone(),
            error_text: self.session.error_text.clone(),
            result_value: self.session.result.as_ref().map(|r| r.points_gained),
            total_points: self.session.result.as_ref().map(|r| r.total_points_after),
            settle: self.session.settle,
        }
    }

    /// Process an event and return the effects of any transition.
    /// An empty list means the event was ignored.
    pub fn process_event(&mut self, event: SpinEvent) -> Vec<SpinEffect> {
        match event {
            SpinEvent::StartRequested => self.start(),
            SpinEvent::StopRequested => self.request_stop(),
            SpinEvent::ResultArrived { epoch, outcome } => self.accept_result(epoch, outcome),
            SpinEvent::RequestFailed { epoch, message } => self.fail(epoch, message),
            SpinEvent::SettleDone { epoch } => self.finish_settle(epoch),
            SpinEvent::Acknowledged => self.reset(),
        }
    }

    fn start(&mut self) -> Vec<SpinEffect> {
        if self.session.phase.is_in_progress() {
            debug!("Start ignored: spin already {}", self.session.phase);
            return Vec::new();
        }

        let mut effects = Vec::new();
        if self.session.status_text.is_some() {
            effects.push(SpinEffect::StatusChanged(None));
        }
        self.epoch += 1;
        self.session = SpinSession::default();
        self.driver.start();
        effects.push(self.set_phase(SpinPhase::Spinning));
        effects.push(SpinEffect::RequestReward { epoch: self.epoch });
        info!("Spin {} started", self.epoch);
        effects
    }

    fn request_stop(&mut self) -> Vec<SpinEffect> {
        if self.session.phase != SpinPhase::Spinning {
            debug!("Stop ignored in {}", self.session.phase);
            return Vec::new();
        }
        if self.session.pending_stop {
            return Vec::new();
        }
        self.session.pending_stop = true;
        self.reconcile()
    }

    fn accept_result(&mut self, epoch: u64, outcome: RewardOutcome) -> Vec<SpinEffect> {
        if epoch != self.epoch {
            debug!(
                "Discarding stale result for spin {} (current {})",
                epoch, self.epoch
            );
            return Vec::new();
        }
        if self.session.phase != SpinPhase::Spinning || self.session.result.is_some() {
            debug!("Duplicate result for spin {} ignored", epoch);
            return Vec::new();
        }
        info!(
            "Spin {} resolved: {} points",
            epoch, outcome.points_gained
        );
        if !self.config.catalog.contains(outcome.points_gained) {
            warn!(
                "{} points is not on the wheel; landing on the fallback wedge",
                outcome.points_gained
            );
        }
        self.session.result = Some(outcome);
        self.reconcile()
    }

    fn reconcile(&mut self) -> Vec<SpinEffect> {
        let state =
            Reconcile::from_flags(self.session.result.is_some(), self.session.pending_stop);
        match state {
            Reconcile::Waiting | Reconcile::ResultHeld => Vec::new(),
            Reconcile::StopPending => {
                debug!("Stop requested before result; waiting");
                self.session.status_text = Some(RESOLVING_STATUS.to_string());
                vec![SpinEffect::StatusChanged(self.session.status_text.clone())]
            }
            Reconcile::Settle => self.begin_settle(),
        }
    }

    fn begin_settle(&mut self) -> Vec<SpinEffect> {
        let Some(points) = self.session.result.as_ref().map(|r| r.points_gained) else {
            return Vec::new();
        };
        let mut effects = vec![self.set_phase(SpinPhase::Stopping)];

        self.driver.stop();
        let start = self.driver.angle();
        let trajectory = plan_settle(
            &self.config.catalog,
            points,
            start,
            &self.config.settle,
            self.random.as_mut(),
        );
        self.driver.park_at(trajectory.final_angle);
        let animation = SettleAnimation::new(
            start,
            trajectory.final_angle,
            self.config.settle_duration,
            self.config.easing,
        );

        self.session.pending_stop = false;
        self.session.settle = Some(animation);
        if self.session.status_text.take().is_some() {
            effects.push(SpinEffect::StatusChanged(None));
        }
        effects.push(self.set_phase(SpinPhase::Settling));
        debug!(
            "Settling spin {} from {:.1} to {:.1} (target {:.1})",
            self.epoch, start, trajectory.final_angle, trajectory.target_angle
        );
        effects.push(SpinEffect::BeginSettle {
            epoch: self.epoch,
            trajectory,
            animation,
        });
        effects
    }

    fn finish_settle(&mut self, epoch: u64) -> Vec<SpinEffect> {
        if epoch != self.epoch || self.session.phase != SpinPhase::Settling {
            debug!("Stale settle completion for spin {} ignored", epoch);
            return Vec::new();
        }
        let Some(outcome) = self.session.result.clone() else {
            return Vec::new();
        };
        info!("Spin {} settled on {} points", epoch, outcome.points_gained);
        vec![
            self.set_phase(SpinPhase::Idle),
            SpinEffect::Completed(outcome),
        ]
    }

    fn fail(&mut self, epoch: u64, message: String) -> Vec<SpinEffect> {
        if epoch != self.epoch || self.session.phase != SpinPhase::Spinning {
            debug!("Stale failure for spin {} ignored", epoch);
            return Vec::new();
        }
        if self.session.result.is_some() {
            debug!("Failure after result for spin {} ignored", epoch);
            return Vec::new();
        }
        warn!("Spin {} failed: {}", epoch, message);
        self.driver.stop();
        let mut effects = Vec::new();
        if self.session.status_text.is_some() {
            effects.push(SpinEffect::StatusChanged(None));
        }
        self.session = SpinSession {
            phase: self.session.phase,
            error_text: Some(message.clone()),
            ..SpinSession::default()
        };
        effects.push(self.set_phase(SpinPhase::Idle));
        effects.push(SpinEffect::Failed(message));
        effects
    }

    fn reset(&mut self) -> Vec<SpinEffect> {
        let was = self.session.clone();
        self.driver.stop();
        self.epoch += 1;
        self.session = SpinSession {
            phase: was.phase,
            ..SpinSession::default()
        };
        debug!("Session reset (now epoch {})", self.epoch);

        let mut effects = Vec::new();
        if was.status_text.is_some() {
            effects.push(SpinEffect::StatusChanged(None));
        }
        if was.phase != SpinPhase::Idle {
            effects.push(self.set_phase(SpinPhase::Idle));
        }
        effects
    }

    fn set_phase(&mut self, phase: SpinPhase) -> SpinEffect {
        let from = self.session.phase;
        self.session.phase = phase;
        self.transition_count += 1;
        self.last_transition = Some(Instant::now());
        SpinEffect::PhaseChanged { from, to: phase }
    }
}

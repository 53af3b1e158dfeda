// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Spin task: the single owner of the spin session.
//!
//! Frame ticks, player commands, reward outcomes and the settle timer are
//! all serialized through one `select!` loop into the state machine, so
//! no state is shared and no locks are taken.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior, Sleep};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::reward::{RewardError, RewardSource};
use crate::wheel::command::SpinCommand;
use crate::wheel::controller::{SpinEffect, SpinEvent, SpinEventEmitter, SpinMachine};
use crate::wheel::handle::SpinHandle;
use crate::wheel::request::SpinRequest;
use crate::wheel::state::SpinSnapshot;

const SPIN_TASK_CHANNEL_BUFFER: usize = 32;
const OUTCOME_CHANNEL_BUFFER: usize = 4;

/// Configuration for the spin task.
#[derive(Debug, Clone)]
pub struct SpinTaskConfig {
    /// Player the rewards are requested for.
    pub player_id: Uuid,
    /// Display frame period of the free spin.
    pub frame_interval: Duration,
    /// Longest wait for the reward before the spin is abandoned.
    pub request_timeout: Duration,
}

impl Default for SpinTaskConfig {
    fn default() -> Self {
        Self {
            player_id: Uuid::nil(),
            frame_interval: Duration::from_millis(16),
            request_timeout: Duration::from_secs(10),
        }
    }
}

struct SettleTimer {
    epoch: u64,
    sleep: Pin<Box<Sleep>>,
}

struct SpinTask {
    config: SpinTaskConfig,
    machine: SpinMachine,
    source: Arc<dyn RewardSource>,
    emitter: SpinEventEmitter,
    state_tx: watch::Sender<SpinSnapshot>,
    outcome_tx: mpsc::Sender<SpinEvent>,
    frames: Interval,
    settle_timer: Option<SettleTimer>,
    in_flight: Option<JoinHandle<()>>,
}

/// Spawn the spin task and return a handle to it.
pub fn spawn_spin_task(
    config: SpinTaskConfig,
    machine: SpinMachine,
    source: Arc<dyn RewardSource>,
    emitter: SpinEventEmitter,
) -> (SpinHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(SPIN_TASK_CHANNEL_BUFFER);
    let (state_tx, state_rx) = watch::channel(machine.snapshot());
    let join = tokio::spawn(run_spin_task(config, machine, source, emitter, rx, state_tx));
    (SpinHandle::new(tx, state_rx), join)
}

/// Run the spin task until every command sender is dropped.
pub async fn run_spin_task(
    config: SpinTaskConfig,
    machine: SpinMachine,
    source: Arc<dyn RewardSource>,
    emitter: SpinEventEmitter,
    mut rx: mpsc::Receiver<SpinRequest>,
    state_tx: watch::Sender<SpinSnapshot>,
) {
    let (outcome_tx, mut outcome_rx) = mpsc::channel(OUTCOME_CHANNEL_BUFFER);
    let mut frames = time::interval(config.frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        "Spin task ready (frame {:?}, request timeout {:?})",
        config.frame_interval, config.request_timeout
    );
    let mut task = SpinTask {
        config,
        machine,
        source,
        emitter,
        state_tx,
        outcome_tx,
        frames,
        settle_timer: None,
        in_flight: None,
    };
    task.publish();

    loop {
        tokio::select! {
            _ = task.frames.tick(), if task.machine.is_rotating() => {
                if task.machine.tick().is_some() {
                    task.publish();
                }
            }

            Some(event) = outcome_rx.recv() => {
                task.on_outcome(event);
            }

            epoch = wait_settle(&mut task.settle_timer) => {
                task.settle_timer = None;
                task.handle(SpinEvent::SettleDone { epoch });
            }

            maybe_req = rx.recv() => {
                let Some(SpinRequest { cmd, respond_to }) = maybe_req else { break; };
                task.on_command(cmd);
                let _ = respond_to.send(Ok(task.machine.snapshot()));
            }
        }
    }

    task.cancel_request();
    info!(
        "spin_task shutting down (channel closed) after {} transitions",
        task.machine.transition_count()
    );
}

/// Resolves with the epoch when the armed settle timer fires; never
/// resolves while no settle is running.
async fn wait_settle(timer: &mut Option<SettleTimer>) -> u64 {
    match timer {
        Some(timer) => {
            timer.sleep.as_mut().await;
            timer.epoch
        }
        None => std::future::pending().await,
    }
}

impl SpinTask {
    fn on_command(&mut self, cmd: SpinCommand) {
        debug!(
            "Spin command {:?} in {} (for {:?})",
            cmd,
            self.machine.phase(),
            self.machine.time_in_state().unwrap_or_default()
        );
        let event = match cmd {
            SpinCommand::GetSnapshot => return,
            SpinCommand::Start => SpinEvent::StartRequested,
            SpinCommand::Stop => SpinEvent::StopRequested,
            SpinCommand::Acknowledge => {
                self.cancel_request();
                self.settle_timer = None;
                SpinEvent::Acknowledged
            }
        };
        self.handle(event);
    }

    fn on_outcome(&mut self, event: SpinEvent) {
        // only the current spin's outcome ends the tracked request
        if event.epoch() == Some(self.machine.epoch()) {
            self.in_flight = None;
        } else {
            debug!("Outcome for earlier spin {:?} arrived late", event.epoch());
        }
        self.handle(event);
    }

    fn handle(&mut self, event: SpinEvent) {
        let effects = self.machine.process_event(event);
        if effects.is_empty() {
            return;
        }
        for effect in &effects {
            self.emitter.dispatch(effect);
            match effect {
                SpinEffect::RequestReward { epoch } => {
                    // first frame one period after the start, not immediately
                    self.frames.reset();
                    self.issue_request(*epoch);
                }
                SpinEffect::BeginSettle {
                    epoch, animation, ..
                } => {
                    self.settle_timer = Some(SettleTimer {
                        epoch: *epoch,
                        sleep: Box::pin(time::sleep(animation.duration())),
                    });
                }
                _ => {}
            }
        }
        self.publish();
    }

    /// Ask the reward source once for `epoch`; the outcome comes back
    /// through the outcome channel tagged with the same epoch.
    fn issue_request(&mut self, epoch: u64) {
        self.cancel_request();
        let source = Arc::clone(&self.source);
        let outcome_tx = self.outcome_tx.clone();
        let player_id = self.config.player_id;
        let timeout = self.config.request_timeout;

        self.in_flight = Some(tokio::spawn(async move {
            let started = Instant::now();
            let event = match time::timeout(timeout, source.request_reward(player_id)).await {
                Ok(Ok(outcome)) => {
                    debug!(
                        "Reward for spin {} arrived after {:?}",
                        epoch,
                        started.elapsed()
                    );
                    SpinEvent::ResultArrived { epoch, outcome }
                }
                Ok(Err(e)) => {
                    warn!("Reward request for spin {} failed: {}", epoch, e);
                    SpinEvent::RequestFailed {
                        epoch,
                        message: e.user_message(),
                    }
                }
                Err(_) => {
                    let e = RewardError::Timeout(timeout);
                    warn!("Reward request for spin {}: {}", epoch, e);
                    SpinEvent::RequestFailed {
                        epoch,
                        message: e.user_message(),
                    }
                }
            };
            let _ = outcome_tx.send(event).await;
        }));
    }

    fn cancel_request(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                debug!("Cancelling in-flight reward request");
                handle.abort();
            }
        }
    }

    fn publish(&self) {
        let _ = self.state_tx.send(self.machine.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::reward::{RewardFuture, RewardOutcome, GENERIC_FAILURE_MESSAGE};
    use crate::wheel::controller::{ScriptedRandom, SpinListener, SpinMachineConfig};
    use crate::wheel::state::SpinPhase;

    type Reply = Result<RewardOutcome, RewardError>;

    /// Reward source that answers only when the test says so.
    struct ManualSource {
        replies: tokio::sync::Mutex<mpsc::Receiver<Reply>>,
        calls: AtomicUsize,
    }

    impl ManualSource {
        fn new() -> (Arc<Self>, mpsc::Sender<Reply>) {
            let (tx, rx) = mpsc::channel(4);
            let source = Arc::new(Self {
                replies: tokio::sync::Mutex::new(rx),
                calls: AtomicUsize::new(0),
            });
            (source, tx)
        }
    }

    impl RewardSource for ManualSource {
        fn request_reward<'a>(&'a self, _player_id: Uuid) -> RewardFuture<'a> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let mut replies = self.replies.lock().await;
                match replies.recv().await {
                    Some(reply) => reply,
                    None => Err(RewardError::Transport("closed".to_string())),
                }
            })
        }
    }

    #[derive(Default)]
    struct CompletionCounter {
        completed: AtomicUsize,
        failed: AtomicUsize,
    }

    impl SpinListener for CompletionCounter {
        fn on_spin_complete(&self, _outcome: &RewardOutcome) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }

        fn on_spin_failed(&self, _message: &str) {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn spawn(
        source: Arc<ManualSource>,
        request_timeout: Duration,
    ) -> (SpinHandle, Arc<CompletionCounter>) {
        let counter = Arc::new(CompletionCounter::default());
        let mut emitter = SpinEventEmitter::new();
        emitter.register(counter.clone());
        let machine = SpinMachine::with_random(
            SpinMachineConfig::default(),
            Box::new(ScriptedRandom::new(vec![0.0, 0.9])),
        );
        let config = SpinTaskConfig {
            player_id: Uuid::new_v4(),
            frame_interval: Duration::from_millis(16),
            request_timeout,
        };
        let (handle, _join) = spawn_spin_task(config, machine, source, emitter);
        (handle, counter)
    }

    async fn wait_for(
        handle: &SpinHandle,
        pred: impl Fn(&SpinSnapshot) -> bool,
    ) -> SpinSnapshot {
        let mut rx = handle.subscribe();
        time::timeout(Duration::from_secs(60), async {
            loop {
                {
                    let snap = rx.borrow_and_update();
                    if pred(&snap) {
                        return snap.clone();
                    }
                }
                rx.changed().await.expect("spin task alive");
            }
        })
        .await
        .expect("condition not reached")
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_result_settles_automatically() {
        let (source, replies) = ManualSource::new();
        let (handle, counter) = spawn(source.clone(), Duration::from_secs(10));

        let snap = handle.start_spin().await.unwrap();
        assert_eq!(snap.phase, SpinPhase::Spinning);

        let snap = handle.stop_spin().await.unwrap();
        assert_eq!(snap.phase, SpinPhase::Spinning);
        assert!(snap.pending_stop);
        assert!(snap.status_text.is_some());

        // wheel keeps moving while the result is outstanding
        let before = handle.latest().rotation_deg;
        time::sleep(Duration::from_millis(200)).await;
        let during = handle.latest();
        assert!(during.rotation_deg > before);
        assert_eq!(during.phase, SpinPhase::Spinning);

        replies.send(Ok(RewardOutcome::new(1000, 1000))).await.unwrap();
        let settling = wait_for(&handle, |s| s.phase == SpinPhase::Settling).await;
        let anim = settling.settle.unwrap();
        assert!(anim.to_deg >= anim.from_deg);
        assert_eq!(settling.result_value, Some(1000));

        let done = wait_for(&handle, |s| s.has_result_ready()).await;
        assert_eq!(done.result_value, Some(1000));
        assert_eq!(done.total_points, Some(1000));
        assert_eq!(counter.completed.load(Ordering::SeqCst), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let reset = handle.acknowledge_result().await.unwrap();
        assert_eq!(reset.phase, SpinPhase::Idle);
        assert_eq!(reset.result_value, None);
        assert_eq!(reset.rotation_deg, anim.to_deg);
    }

    #[tokio::test(start_paused = true)]
    async fn result_before_stop_waits_for_player() {
        let (source, replies) = ManualSource::new();
        let (handle, counter) = spawn(source, Duration::from_secs(10));

        handle.start_spin().await.unwrap();
        replies.send(Ok(RewardOutcome::new(500, 800))).await.unwrap();
        let held = wait_for(&handle, |s| s.result_value.is_some()).await;
        assert_eq!(held.phase, SpinPhase::Spinning);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(handle.latest().phase, SpinPhase::Spinning);

        let snap = handle.stop_spin().await.unwrap();
        assert_eq!(snap.phase, SpinPhase::Settling);
        assert!(!snap.pending_stop);

        wait_for(&handle, |s| s.has_result_ready()).await;
        assert_eq!(counter.completed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_spinning_requests_once() {
        let (source, _replies) = ManualSource::new();
        let (handle, _) = spawn(source.clone(), Duration::from_secs(10));

        let first = handle.start_spin().await.unwrap();
        let second = handle.start_spin().await.unwrap();
        assert_eq!(first.epoch, second.epoch);
        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn request_failure_resets_to_idle() {
        let (source, replies) = ManualSource::new();
        let (handle, counter) = spawn(source, Duration::from_secs(10));

        handle.start_spin().await.unwrap();
        handle.stop_spin().await.unwrap();
        replies
            .send(Err(RewardError::Transport("connection reset".to_string())))
            .await
            .unwrap();

        let failed = wait_for(&handle, |s| s.error_text.is_some()).await;
        assert_eq!(failed.phase, SpinPhase::Idle);
        assert_eq!(failed.result_value, None);
        assert!(!failed.pending_stop);
        assert_eq!(failed.error_text.as_deref(), Some(GENERIC_FAILURE_MESSAGE));
        assert_eq!(counter.failed.load(Ordering::SeqCst), 1);
        assert_eq!(counter.completed.load(Ordering::SeqCst), 0);

        // rotation stopped with the failure
        let angle = handle.latest().rotation_deg;
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(handle.latest().rotation_deg, angle);
    }

    #[tokio::test(start_paused = true)]
    async fn request_timeout_is_a_failure() {
        let (source, _replies) = ManualSource::new();
        let (handle, _) = spawn(source, Duration::from_secs(2));

        handle.start_spin().await.unwrap();
        let failed = wait_for(&handle, |s| s.error_text.is_some()).await;
        assert_eq!(failed.phase, SpinPhase::Idle);
        assert!(failed.error_text.unwrap().contains("too long"));
    }

    #[tokio::test(start_paused = true)]
    async fn acknowledge_discards_outstanding_request() {
        let (source, replies) = ManualSource::new();
        let (handle, counter) = spawn(source, Duration::from_secs(10));

        handle.start_spin().await.unwrap();
        let reset = handle.acknowledge_result().await.unwrap();
        assert_eq!(reset.phase, SpinPhase::Idle);

        replies.send(Ok(RewardOutcome::new(3000, 3000))).await.unwrap();
        time::sleep(Duration::from_secs(5)).await;

        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.phase, SpinPhase::Idle);
        assert_eq!(snap.result_value, None);
        assert_eq!(counter.completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_without_start_is_noop() {
        let (source, _replies) = ManualSource::new();
        let (handle, _) = spawn(source.clone(), Duration::from_secs(10));

        let before = handle.snapshot().await.unwrap();
        let after = handle.stop_spin().await.unwrap();
        assert_eq!(before, after);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    fn bare_task(source: Arc<ManualSource>) -> SpinTask {
        let machine = SpinMachine::with_random(
            SpinMachineConfig::default(),
            Box::new(ScriptedRandom::new(vec![0.0, 0.9])),
        );
        let (state_tx, _state_rx) = watch::channel(machine.snapshot());
        let (outcome_tx, _outcome_rx) = mpsc::channel(OUTCOME_CHANNEL_BUFFER);
        SpinTask {
            config: SpinTaskConfig::default(),
            machine,
            source,
            emitter: SpinEventEmitter::new(),
            state_tx,
            outcome_tx,
            frames: time::interval(Duration::from_millis(16)),
            settle_timer: None,
            in_flight: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn late_outcome_keeps_current_request_abortable() {
        let (source, _replies) = ManualSource::new();
        let mut task = bare_task(source);

        task.on_command(SpinCommand::Start);
        task.on_command(SpinCommand::Acknowledge);
        task.on_command(SpinCommand::Start);
        assert_eq!(task.machine.epoch(), 3);

        task.on_outcome(SpinEvent::ResultArrived {
            epoch: 1,
            outcome: RewardOutcome::new(300, 300),
        });
        assert_eq!(task.machine.session().result, None);
        let request = task
            .in_flight
            .as_ref()
            .map(|h| h.abort_handle())
            .expect("current request still tracked");

        task.on_command(SpinCommand::Acknowledge);
        time::sleep(Duration::from_millis(1)).await;
        assert!(request.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn current_outcome_releases_request() {
        let (source, _replies) = ManualSource::new();
        let mut task = bare_task(source);

        task.on_command(SpinCommand::Start);
        assert!(task.in_flight.is_some());
        task.on_outcome(SpinEvent::ResultArrived {
            epoch: task.machine.epoch(),
            outcome: RewardOutcome::new(500, 500),
        });
        assert!(task.in_flight.is_none());
        assert_eq!(task.machine.snapshot().result_value, Some(500));
    }

    #[tokio::test(start_paused = true)]
    async fn handle_reports_closed_task() {
        let (tx, rx) = mpsc::channel(1);
        let (_state_tx, state_rx) = watch::channel(SpinSnapshot::default());
        drop(rx);
        let handle = SpinHandle::new(tx, state_rx);
        assert!(handle.start_spin().await.is_err());
    }
}

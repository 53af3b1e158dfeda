// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Thin handle giving a front end access to the spin task and its state.

use tokio::sync::{mpsc, oneshot, watch};

use crate::wheel::command::SpinCommand;
use crate::wheel::request::SpinRequest;
use crate::wheel::response::{SpinError, SpinResult};
use crate::wheel::state::SpinSnapshot;

/// Cloneable handle to a running spin task.
#[derive(Debug, Clone)]
pub struct SpinHandle {
    /// Send commands to the spin task.
    tx: mpsc::Sender<SpinRequest>,
    /// Latest snapshot, updated after every transition and frame.
    state_rx: watch::Receiver<SpinSnapshot>,
}

impl SpinHandle {
    pub fn new(tx: mpsc::Sender<SpinRequest>, state_rx: watch::Receiver<SpinSnapshot>) -> Self {
        Self { tx, state_rx }
    }

    pub async fn start_spin(&self) -> SpinResult<SpinSnapshot> {
        self.send(SpinCommand::Start).await
    }

    pub async fn stop_spin(&self) -> SpinResult<SpinSnapshot> {
        self.send(SpinCommand::Stop).await
    }

    /// Dismiss the result and reset the session.
    pub async fn acknowledge_result(&self) -> SpinResult<SpinSnapshot> {
        self.send(SpinCommand::Acknowledge).await
    }

    /// Snapshot taken by the task itself, ordered after earlier commands.
    pub async fn snapshot(&self) -> SpinResult<SpinSnapshot> {
        self.send(SpinCommand::GetSnapshot).await
    }

    /// Most recently published snapshot, without a round trip.
    pub fn latest(&self) -> SpinSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Receiver for every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SpinSnapshot> {
        self.state_rx.clone()
    }

    async fn send(&self, cmd: SpinCommand) -> SpinResult<SpinSnapshot> {
        let (respond_to, rx) = oneshot::channel();
        self.tx
            .send(SpinRequest { cmd, respond_to })
            .await
            .map_err(|_| SpinError::unavailable())?;
        rx.await.map_err(|_| SpinError::unavailable())?
    }
}

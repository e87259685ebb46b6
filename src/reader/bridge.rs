// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! UI-side reader bridge.
//!
//! Applies hub messages to a [`ReaderState`] and publishes it on a `watch`
//! channel. Also asks the hub for the reader status right away and then on
//! a fixed interval, in case an attach/detach notification was missed.

use super::ipc::{IpcMessage, IpcRenderer, ReaderRequest};
use super::state::{CardPresence, ReaderInput, ReaderState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct ReaderBridge {
    state: Arc<watch::Sender<ReaderState>>,
    task: JoinHandle<()>,
}

impl ReaderBridge {
    /// Start the bridge on the current runtime.
    pub fn spawn(ipc: IpcRenderer, poll_interval: Duration) -> Self {
        let state = Arc::new(watch::Sender::new(ReaderState::default()));
        let task = tokio::spawn(run(
            ipc.messages,
            ipc.requests,
            state.clone(),
            poll_interval,
        ));
        Self { state, task }
    }

    pub fn state(&self) -> ReaderState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReaderState> {
        self.state.subscribe()
    }

    /// Forget the current card, e.g. once it has been handled.
    pub fn reset_card(&self) {
        self.state.send_if_modified(|state| {
            let had_card = state.card != CardPresence::Absent;
            state.card = CardPresence::Absent;
            had_card
        });
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop polling and listening, and reset the published state.
    pub fn dispose(self) {
        drop(self);
    }
}

impl Drop for ReaderBridge {
    fn drop(&mut self) {
        self.task.abort();
        self.state.send_replace(ReaderState::default());
    }
}

async fn run(
    mut messages: mpsc::UnboundedReceiver<IpcMessage>,
    requests: mpsc::UnboundedSender<ReaderRequest>,
    state: Arc<watch::Sender<ReaderState>>,
    poll_interval: Duration,
) {
    let mut poll = tokio::time::interval(poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // The first tick fires immediately.
            _ = poll.tick() => {
                if requests.send(ReaderRequest::CheckReader).is_err() {
                    tracing::warn!("Reader hub gone, stopping bridge");
                    break;
                }
            }
            message = messages.recv() => match message {
                Some(message) => {
                    let input = ReaderInput::from(message);
                    state.send_if_modified(|s| s.apply(input));
                }
                None => {
                    tracing::warn!("Reader message stream closed, stopping bridge");
                    break;
                }
            },
        }
    }
    state.send_replace(ReaderState::default());
}

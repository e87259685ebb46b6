// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reader connectivity and card presence state machine.

use super::ipc::IpcMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    #[default]
    Disconnected,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CardPresence {
    #[default]
    Absent,
    Present(String),
}

/// Inputs driving the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderInput {
    Attached,
    Detached,
    CardDetected(String),
    CardRemoved,
}

impl From<IpcMessage> for ReaderInput {
    fn from(message: IpcMessage) -> Self {
        match message {
            IpcMessage::ReaderStatus(true) => ReaderInput::Attached,
            IpcMessage::ReaderStatus(false) => ReaderInput::Detached,
            IpcMessage::CardDetected(uid) => ReaderInput::CardDetected(uid),
            IpcMessage::CardRemoved => ReaderInput::CardRemoved,
        }
    }
}

/// Invariant: `card` is `Absent` whenever `connectivity` is `Disconnected`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReaderState {
    pub connectivity: Connectivity,
    pub card: CardPresence,
}

impl ReaderState {
    pub fn is_connected(&self) -> bool {
        self.connectivity == Connectivity::Connected
    }

    pub fn card_uid(&self) -> Option<&str> {
        match &self.card {
            CardPresence::Present(uid) => Some(uid),
            CardPresence::Absent => None,
        }
    }

    /// Apply one input. Returns whether the state changed.
    pub fn apply(&mut self, input: ReaderInput) -> bool {
        let next = match input {
            ReaderInput::Attached => ReaderState {
                connectivity: Connectivity::Connected,
                card: self.card.clone(),
            },
            ReaderInput::Detached => ReaderState::default(),
            ReaderInput::CardDetected(uid) => {
                if !self.is_connected() {
                    tracing::debug!("Ignoring card without a connected reader");
                    return false;
                }
                ReaderState {
                    connectivity: Connectivity::Connected,
                    card: CardPresence::Present(uid),
                }
            }
            ReaderInput::CardRemoved => ReaderState {
                connectivity: self.connectivity,
                card: CardPresence::Absent,
            },
        };

        if next == *self {
            return false;
        }
        *self = next;
        true
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Message surface between the reader process side and the UI side.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Hub → UI notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload")]
pub enum IpcMessage {
    /// Whether at least one reader is attached
    #[serde(rename = "nfc:reader-status")]
    ReaderStatus(bool),
    /// UID of the card put on a reader
    #[serde(rename = "nfc:card-detected")]
    CardDetected(String),
    #[serde(rename = "nfc:card-removed")]
    CardRemoved,
}

/// UI → hub requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReaderRequest {
    #[serde(rename = "nfc:check-reader")]
    CheckReader,
}

/// Hub end of the channel pair.
pub struct IpcMain {
    pub messages: mpsc::UnboundedSender<IpcMessage>,
    pub requests: mpsc::UnboundedReceiver<ReaderRequest>,
}

/// UI end of the channel pair.
pub struct IpcRenderer {
    pub messages: mpsc::UnboundedReceiver<IpcMessage>,
    pub requests: mpsc::UnboundedSender<ReaderRequest>,
}

/// Create a connected pair of IPC ends.
pub fn channel() -> (IpcMain, IpcRenderer) {
    let (msg_tx, msg_rx) = mpsc::unbounded_channel();
    let (req_tx, req_rx) = mpsc::unbounded_channel();
    (
        IpcMain {
            messages: msg_tx,
            requests: req_rx,
        },
        IpcRenderer {
            messages: msg_rx,
            requests: req_tx,
        },
    )
}

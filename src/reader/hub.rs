// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Driver-side reader hub.
//!
//! Tracks attached readers by name and forwards card activity to the UI.
//! The only command accepted back is a reader status check.

use super::ipc::{IpcMain, IpcMessage, ReaderRequest};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Events emitted by the reader driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    ReaderAttached { reader: String },
    ReaderDetached { reader: String },
    /// The reader's session ended (unplugged mid-operation, driver reset)
    ReaderEnded { reader: String },
    CardPresent { reader: String, uid: String },
    CardOff { reader: String },
    ReaderError { reader: String, message: String },
    /// Driver-wide failure; no reader can be trusted
    Error { message: String },
}

pub struct ReaderHub {
    readers: HashSet<String>,
    outbox: mpsc::UnboundedSender<IpcMessage>,
}

impl ReaderHub {
    pub fn new(outbox: mpsc::UnboundedSender<IpcMessage>) -> Self {
        Self {
            readers: HashSet::new(),
            outbox,
        }
    }

    pub fn has_reader(&self) -> bool {
        !self.readers.is_empty()
    }

    pub fn handle_driver(&mut self, event: DriverEvent) {
        match event {
            DriverEvent::ReaderAttached { reader } => {
                tracing::info!(reader = %reader, "Reader attached");
                self.readers.insert(reader);
                self.send(IpcMessage::ReaderStatus(true));
            }
            DriverEvent::ReaderDetached { reader } | DriverEvent::ReaderEnded { reader } => {
                tracing::info!(reader = %reader, "Reader detached");
                self.readers.remove(&reader);
                self.send(IpcMessage::ReaderStatus(self.has_reader()));
            }
            DriverEvent::CardPresent { reader, uid } => {
                tracing::debug!(reader = %reader, uid = %uid, "Card detected");
                self.send(IpcMessage::CardDetected(uid));
            }
            DriverEvent::CardOff { reader } => {
                tracing::debug!(reader = %reader, "Card removed");
                self.send(IpcMessage::CardRemoved);
            }
            DriverEvent::ReaderError { reader, message } => {
                tracing::error!(reader = %reader, error = %message, "Reader error");
            }
            DriverEvent::Error { message } => {
                tracing::error!(error = %message, "Reader driver error");
                self.send(IpcMessage::ReaderStatus(false));
            }
        }
    }

    pub fn handle_request(&mut self, request: ReaderRequest) {
        match request {
            ReaderRequest::CheckReader => self.send(IpcMessage::ReaderStatus(self.has_reader())),
        }
    }

    fn send(&self, message: IpcMessage) {
        // The UI side may already be gone during shutdown.
        if self.outbox.send(message).is_err() {
            tracing::debug!("Reader message dropped, no UI listening");
        }
    }

    /// Run until the driver stream ends.
    pub async fn run(
        mut self,
        mut driver: mpsc::Receiver<DriverEvent>,
        mut requests: mpsc::UnboundedReceiver<ReaderRequest>,
    ) {
        let mut requests_open = true;
        loop {
            tokio::select! {
                event = driver.recv() => match event {
                    Some(event) => self.handle_driver(event),
                    None => break,
                },
                request = requests.recv(), if requests_open => match request {
                    Some(request) => self.handle_request(request),
                    None => requests_open = false,
                },
            }
        }
        tracing::debug!("Reader hub stopped");
    }

    /// Spawn a hub on the current runtime.
    pub fn spawn(driver: mpsc::Receiver<DriverEvent>, ipc: IpcMain) -> JoinHandle<()> {
        let hub = ReaderHub::new(ipc.messages);
        tokio::spawn(hub.run(driver, ipc.requests))
    }
}

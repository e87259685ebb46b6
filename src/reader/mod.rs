// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! NFC reader bridge.
//!
//! ```text
//! driver ──DriverEvent──▶ ReaderHub ──IpcMessage──▶ ReaderBridge ──watch──▶ UI
//!                            ▲                           │
//!                            └──────ReaderRequest────────┘ (status poll)
//! ```
//!
//! The hub runs next to the driver and knows which readers are attached.
//! The bridge runs next to the UI and owns the reader/card state machine.

pub mod bridge;
pub mod hub;
pub mod ipc;
pub mod state;

pub use bridge::ReaderBridge;
pub use hub::{DriverEvent, ReaderHub};
pub use ipc::{IpcMain, IpcMessage, IpcRenderer, ReaderRequest};
pub use state::{CardPresence, Connectivity, ReaderInput, ReaderState};

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Wire a hub and a bridge together around a driver event stream.
pub fn start(
    driver: mpsc::Receiver<DriverEvent>,
    poll_interval: Duration,
) -> (JoinHandle<()>, ReaderBridge) {
    let (main, renderer) = ipc::channel();
    let hub = ReaderHub::spawn(driver, main);
    let bridge = ReaderBridge::spawn(renderer, poll_interval);
    (hub, bridge)
}

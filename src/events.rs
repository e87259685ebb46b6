// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process change notifications backed by a `tokio::sync::broadcast` channel.
//!
//! Cache mutations and session changes publish a [`ChangeEvent`]; UI state
//! subscribes through [`ChangeNotifier::subscribe`] and tears down by
//! dropping (or calling [`Subscription::unsubscribe`] on) the handle.

use tokio::sync::broadcast;

/// Cached data domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Garages,
    Users,
    Tasks,
    Analytics,
    Company,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Garages,
        Domain::Users,
        Domain::Tasks,
        Domain::Analytics,
        Domain::Company,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Garages => "garages",
            Domain::Users => "users",
            Domain::Tasks => "tasks",
            Domain::Analytics => "analytics",
            Domain::Company => "company",
        }
    }
}

/// A state change visible to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    CacheUpdated(Domain),
    CacheCleared(Domain),
    SessionStarted,
    SessionCleared,
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out notifier shared by every cache and the token store.
#[derive(Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: ChangeEvent) {
        tracing::trace!(?event, "Publishing change");
        // Only fails when nobody is subscribed.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A live subscription to [`ChangeEvent`]s.
pub struct Subscription {
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Wait for the next event.
    ///
    /// Returns `None` once the notifier is gone. A subscriber that fell
    /// behind skips the dropped events and keeps receiving.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Change subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-published event, without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

//! Broadcast fan-out for alert notifications
//!
//! Thin wrapper over `tokio::sync::broadcast`. Publishing never blocks: a
//! subscriber that falls behind loses the oldest messages (`Lagged`) and its
//! own dispatch loop deals with that; the publisher does not care.

use tokio::sync::broadcast;
use tracing::debug;

use super::AlertNotification;

pub struct AlertBus {
    sender: broadcast::Sender<AlertNotification>,
}

impl AlertBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertNotification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish to all current subscribers. Returns how many were reachable;
    /// zero subscribers is normal and not an error.
    pub fn publish(&self, notification: AlertNotification) -> usize {
        match self.sender.send(notification) {
            Ok(n) => n,
            Err(_) => {
                debug!("alert published with no subscribers attached");
                0
            }
        }
    }
}

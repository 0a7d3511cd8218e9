//! Broadcast fan-out for user notifications
//!
//! Every subscriber sees every notification and filters by recipient itself.
//! Delivery is best effort: with no subscribers, or with a subscriber that
//! lags behind the channel capacity, messages are dropped.

use dingbridge_core::NotificationChannel;
use dingbridge_domain::NotificationMessage;
use tokio::sync::broadcast;
use tracing::{debug, trace};

const DEFAULT_CAPACITY: usize = 64;

/// One delivered notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub event: String,
    pub message: NotificationMessage,
}

/// [`NotificationChannel`] over a tokio broadcast channel
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every notification sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationChannel for NotificationBus {
    fn send(&self, recipient: &str, event: &str, message: NotificationMessage) {
        let notification =
            Notification { recipient: recipient.to_string(), event: event.to_string(), message };
        match self.sender.send(notification) {
            Ok(receivers) => trace!(recipient, event, receivers, "notification delivered"),
            Err(_) => debug!(recipient, event, "notification dropped, no subscribers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_without_subscribers_is_a_no_op() {
        let bus = NotificationBus::new();
        bus.send("admin", "simple_notification", NotificationMessage::info("t", "m"));
    }

    #[test]
    fn subscribers_receive_in_order() {
        let bus = NotificationBus::new();
        let mut receiver = bus.subscribe();

        bus.send("admin", "simple_notification", NotificationMessage::info("Sync Start......", "a"));
        bus.send("admin", "simple_notification", NotificationMessage::warning("Sync End......", "b"));

        let first = receiver.try_recv().unwrap();
        let second = receiver.try_recv().unwrap();
        assert_eq!(first.message.title, "Sync Start......");
        assert!(!first.message.warning);
        assert!(second.message.warning);
        assert_eq!(second.recipient, "admin");
    }

    #[test]
    fn late_subscriber_misses_earlier_messages() {
        let bus = NotificationBus::new();
        bus.send("admin", "simple_notification", NotificationMessage::info("early", ""));

        let mut receiver = bus.subscribe();
        assert!(receiver.try_recv().is_err());
    }
}

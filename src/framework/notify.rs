//! Transient user-facing notifications (toasts).
//!
//! Writes announce success and failure. List reads never notify: their failures are shown
//! inline from the slice state. Validation failures are not announced either, they belong
//! to the form that caused them.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub resource: &'static str,
    pub message: String,
}

/// Broadcast hub for notifications. Sending without subscribers is a no-op.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn success(&self, resource: &'static str, message: impl Into<String>) {
        self.publish(Notification {
            level: NotificationLevel::Success,
            resource,
            message: message.into(),
        });
    }

    /// Announces a failed write, unless the error is meant for inline display.
    pub fn failure(&self, resource: &'static str, error: &ApiError) {
        if let Some(message) = error.toast_message() {
            self.publish(Notification {
                level: NotificationLevel::Error,
                resource,
                message,
            });
        }
    }

    fn publish(&self, notification: Notification) {
        debug!(resource = notification.resource, level = ?notification.level, "Notify");
        let _ = self.sender.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validation_is_not_toasted() {
        let notifier = Notifier::new(8);
        let mut rx = notifier.subscribe();

        notifier.failure("brand", &ApiError::validation([("name", "required")]));
        notifier.failure("brand", &ApiError::server(400, "Brand in use"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.level, NotificationLevel::Error);
        assert_eq!(received.message, "Brand in use");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_subscribers() {
        Notifier::default().success("brand", "Saved");
    }
}

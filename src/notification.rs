//! Decode diagnostics.
//!
//! Structural problems abort a decode with a [`crate::error::DwgError`].
//! Everything else worth reporting (records kept opaque, size mismatches,
//! skipped map entries) is reported as a [`Notification`]. The reader stores
//! every notification on the resulting document and, when the caller supplies
//! a [`NotificationSink`], forwards each one to it in decode order. The sink
//! also receives everything produced before a decode fails.

use std::fmt;

/// Severity level of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// A record kind is recognized but its fields are not decoded.
    NotImplemented,
    /// A record was dropped because the configuration excludes it.
    NotSupported,
    /// Non-fatal inconsistency (size mismatch, handle mismatch, skipped entry).
    Warning,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotImplemented => write!(f, "NotImplemented"),
            Self::NotSupported => write!(f, "NotSupported"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

/// A single notification produced during a decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// The severity / category.
    pub notification_type: NotificationType,
    /// A human-readable description of the issue.
    pub message: String,
}

impl Notification {
    /// Create a new notification.
    pub fn new(notification_type: NotificationType, message: impl Into<String>) -> Self {
        Self {
            notification_type,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationType::Warning, message)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(NotificationType::NotImplemented, message)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.notification_type, self.message)
    }
}

/// Receiver for notifications as they are produced.
///
/// Implemented by [`NotificationCollection`], by [`LogSink`] and by any
/// `&mut` reference to a sink.
pub trait NotificationSink {
    fn notify(&mut self, notification: &Notification);
}

impl<T: NotificationSink + ?Sized> NotificationSink for &mut T {
    fn notify(&mut self, notification: &Notification) {
        (**self).notify(notification);
    }
}

/// Sink that forwards notifications to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&mut self, notification: &Notification) {
        match notification.notification_type {
            NotificationType::Warning => log::warn!("{}", notification.message),
            NotificationType::NotImplemented | NotificationType::NotSupported => {
                log::debug!("{notification}")
            }
        }
    }
}

/// Collects notifications during a decode.
#[derive(Debug, Clone, Default)]
pub struct NotificationCollection {
    items: Vec<Notification>,
}

impl NotificationCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Record a notification.
    pub fn push(&mut self, notification: Notification) {
        self.items.push(notification);
    }

    /// Check if there are any notifications.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of notifications.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over all notifications.
    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.items.iter()
    }

    /// Get all notifications of a specific type.
    pub fn of_type(&self, nt: NotificationType) -> Vec<&Notification> {
        self.items.iter().filter(|n| n.notification_type == nt).collect()
    }

    /// Check whether any notification of the given type exists.
    pub fn has_type(&self, nt: NotificationType) -> bool {
        self.items.iter().any(|n| n.notification_type == nt)
    }

    /// Consume the collection into a `Vec`.
    pub fn into_vec(self) -> Vec<Notification> {
        self.items
    }
}

impl NotificationSink for NotificationCollection {
    fn notify(&mut self, notification: &Notification) {
        self.items.push(notification.clone());
    }
}

impl IntoIterator for NotificationCollection {
    type Item = Notification;
    type IntoIter = std::vec::IntoIter<Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a NotificationCollection {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

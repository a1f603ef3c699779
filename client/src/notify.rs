//! User-facing notifications (toasts)

use std::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Default,
    Success,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: Variant::Success,
            ..Self::new(title, description)
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: Variant::Destructive,
            ..Self::new(title, description)
        }
    }
}

/// Where notifications go; the UI shell supplies its own
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, n: Notification) {
        match n.variant {
            Variant::Destructive => warn!(title = %n.title, "{}", n.description),
            _ => info!(title = %n.title, "{}", n.description),
        }
    }
}

/// Collects notifications in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything collected so far
    pub fn take(&self) -> Vec<Notification> {
        match self.seen.lock() {
            Ok(mut seen) => std::mem::take(&mut *seen),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn take_titles(&self) -> Vec<String> {
        self.take().into_iter().map(|n| n.title).collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        match self.seen.lock() {
            Ok(mut seen) => seen.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_drains() {
        let notifier = MemoryNotifier::new();
        notifier.notify(Notification::success("Sync complete", "All your data is now up to date"));
        notifier.notify(Notification::destructive("You're offline", "Can't sync data while offline"));

        let seen = notifier.take();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].variant, Variant::Success);
        assert_eq!(seen[1].variant, Variant::Destructive);
        assert!(notifier.take().is_empty());
    }
}

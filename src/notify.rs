//! ユーザー通知（トースト相当）

use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, title: title.into(), description: description.into() }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, title: title.into(), description: description.into() }
    }
}

pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// 端末に表示
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                println!("✔ {} {}", notification.title, notification.description)
            }
            NotificationKind::Error => {
                eprintln!("✖ {}: {}", notification.title, notification.description)
            }
        }
    }
}

/// 受け取った通知を記録するだけ（テスト・非対話実行用）
#[derive(Default)]
pub struct RecordingNotifier {
    received: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<Notification> {
        self.received.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received.borrow_mut().push(notification);
    }
}

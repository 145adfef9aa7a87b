//! Transient notifications: one success slot and one error slot.
//!
//! Success notices expire after a fixed delay. Expiry is evaluated when the
//! channel is read, so nothing mutates the channel in the background.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raised_at: Utc::now(),
        }
    }
}

/// What the notification area shows right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Notifications {
    pub success: Option<Notice>,
    pub error: Option<Notice>,
}

impl Notifications {
    pub fn success_message(&self) -> Option<&str> {
        self.success.as_ref().map(|n| n.message.as_str())
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|n| n.message.as_str())
    }
}

#[derive(Debug)]
pub struct NotificationChannel {
    success: Option<(Notice, Instant)>,
    error: Option<Notice>,
    success_ttl: Duration,
}

impl NotificationChannel {
    pub fn new(success_ttl: Duration) -> Self {
        Self {
            success: None,
            error: None,
            success_ttl,
        }
    }

    /// Replaces the current success notice and clears any error.
    pub fn success(&mut self, message: impl Into<String>) {
        self.error = None;
        self.success = Some((Notice::new(message), Instant::now() + self.success_ttl));
    }

    /// Replaces the current error notice; it stays until dismissed or replaced.
    pub fn error(&mut self, message: impl Into<String>) {
        self.error = Some(Notice::new(message));
    }

    pub fn dismiss_success(&mut self) {
        self.success = None;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn dismiss_all(&mut self) {
        self.success = None;
        self.error = None;
    }

    pub fn current(&self) -> Notifications {
        let now = Instant::now();
        Notifications {
            success: self
                .success
                .as_ref()
                .filter(|(_, expires_at)| now < *expires_at)
                .map(|(notice, _)| notice.clone()),
            error: self.error.clone(),
        }
    }
}

//! Transient on-screen messages with an expiry time.

use std::time::{Duration, Instant};

/// How long a notice stays visible unless a caller chooses otherwise.
pub const NOTICE_LIFETIME: Duration = Duration::from_secs(1);

/// A message shown until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    text: String,
    expires_at: Instant,
}

impl Notice {
    /// Create a notice visible for `lifetime` from `now`.
    pub fn new(text: impl Into<String>, now: Instant, lifetime: Duration) -> Notice {
        Notice {
            text: text.into(),
            expires_at: now + lifetime,
        }
    }

    /// The message text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Return `true` once the notice should no longer be shown.
    #[inline]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Holds at most one notice; a newer notice replaces the current one.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn new() -> NoticeBoard {
        NoticeBoard::default()
    }

    /// Show `text` for [`NOTICE_LIFETIME`].
    pub fn post(&mut self, text: impl Into<String>, now: Instant) {
        self.post_for(text, now, NOTICE_LIFETIME);
    }

    /// Show `text` for `lifetime`.
    pub fn post_for(&mut self, text: impl Into<String>, now: Instant, lifetime: Duration) {
        self.current = Some(Notice::new(text, now, lifetime));
    }

    /// The notice visible at `now`, dropping it if it has expired.
    pub fn current(&mut self, now: Instant) -> Option<&Notice> {
        if self.current.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.current = None;
        }
        self.current.as_ref()
    }

    /// Remove the current notice immediately.
    pub fn clear(&mut self) {
        self.current = None;
    }
}

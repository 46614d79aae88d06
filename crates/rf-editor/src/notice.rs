//! User-facing notices raised by remote operations.

use std::fmt;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(m) | Notice::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Pending notices, oldest first.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    pending: Mutex<Vec<Notice>>,
}

impl NoticeQueue {
    pub fn push(&self, notice: Notice) {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).push(notice);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Notice::Info(message.into()));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Notice::Error(message.into()));
    }

    /// Take every pending notice.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

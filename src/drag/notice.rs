use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// User-visible feedback sink
pub trait Notifier {
    fn notify(&mut self, message: &str, kind: NoticeKind);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub at: DateTime<Local>,
}

/// Bounded, newest-last notification history
#[derive(Debug, Clone)]
pub struct NoticeLog {
    notices: VecDeque<Notice>,
    limit: usize,
}

impl NoticeLog {
    pub fn new(limit: usize) -> Self {
        NoticeLog {
            notices: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    /// Messages of the given kind, oldest first
    pub fn messages(&self, kind: NoticeKind) -> Vec<&str> {
        self.notices
            .iter()
            .filter(|n| n.kind == kind)
            .map(|n| n.message.as_str())
            .collect()
    }
}

impl Default for NoticeLog {
    fn default() -> Self {
        NoticeLog::new(50)
    }
}

impl Notifier for NoticeLog {
    fn notify(&mut self, message: &str, kind: NoticeKind) {
        if self.notices.len() == self.limit {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            message: message.to_string(),
            kind,
            at: Local::now(),
        });
    }
}

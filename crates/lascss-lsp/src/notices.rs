// ABOUTME: Remembers which user-facing problems were already reported to the client
// ABOUTME: Keeps repeated completion failures from flooding the editor with messages

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct NoticeBoard {
    reported: HashSet<String>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time `cause_key` is seen.
    pub fn first_report(&mut self, cause_key: impl Into<String>) -> bool {
        self.reported.insert(cause_key.into())
    }

    pub fn clear(&mut self) {
        self.reported.clear();
    }

    pub fn len(&self) -> usize {
        self.reported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reported.is_empty()
    }
}

//! The host text surface the controller commits into.

use tsuzuri_session::ContextSource;

/// A text field owned by the host application.
///
/// `left_context` (from [`ContextSource`]) returns the committed text left
/// of the insertion point, at most `max_count` characters.
pub trait TextClient: ContextSource {
    fn insert_text(&mut self, text: &str);
    /// Delete `count` characters left of the insertion point.
    fn delete_backward(&mut self, count: usize);
}

/// An in-memory text field with the insertion point at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTextClient {
    text: String,
}

impl MemoryTextClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        MemoryTextClient { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

impl ContextSource for MemoryTextClient {
    fn left_context(&self, max_count: usize) -> Option<String> {
        let len = self.text.chars().count();
        Some(self.text.chars().skip(len.saturating_sub(max_count)).collect())
    }
}

impl TextClient for MemoryTextClient {
    fn insert_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn delete_backward(&mut self, count: usize) {
        for _ in 0..count {
            if self.text.pop().is_none() {
                break;
            }
        }
    }
}

// Chat window state
//
// One ChatWindow per open conversation: its input box, its scroll position,
// and the messages the connection layer has delivered to it. Windows are
// created and destroyed by the feed/application layer; the registry and the
// focus router only observe, order, and activate them.

use chrono::{DateTime, Utc};

/// Identifier for a chat window, assigned by whoever opens the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

/// A single delivered chat message
#[derive(Debug, Clone)]
pub struct Message {
    pub timestamp: DateTime<Utc>,
    pub from: String,
    /// Message body as an HTML-ish fragment (bare URLs already anchored)
    pub body: String,
}

/// The input capture element owned by a window
///
/// Exactly one input box is focused at a time; the router redirects content
/// keys here and the shell feeds the actual characters in.
#[derive(Debug, Default)]
pub struct InputBox {
    buffer: String,
    focused: bool,
}

impl InputBox {
    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn insert(&mut self, c: char) {
        self.buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Drain the drafted line. Returns None when only whitespace was typed.
    pub fn take_line(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.buffer);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Scroll position affordance for a window's message list
///
/// Auto-follow keeps the latest message visible; scrolling up hands control
/// to the user, scrolling back to the bottom re-enables following.
#[derive(Debug)]
pub struct ScrollState {
    offset: usize,
    total: usize,
    viewport: usize,
    auto_follow: bool,
}

impl ScrollState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            total: 0,
            viewport: 0,
            auto_follow: true,
        }
    }

    /// Record current content and viewport sizes. Called each render frame;
    /// snaps to the bottom while auto-following, clamps otherwise.
    pub fn update_dimensions(&mut self, total: usize, viewport: usize) {
        self.total = total;
        self.viewport = viewport;
        if self.auto_follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub fn scroll_up(&mut self) {
        if self.offset > 0 {
            self.offset -= 1;
            self.auto_follow = false;
        }
    }

    pub fn scroll_down(&mut self) {
        if self.offset < self.max_offset() {
            self.offset += 1;
        }
        if self.offset >= self.max_offset() {
            self.auto_follow = true;
        }
    }

    pub fn page_up(&mut self) {
        let page = self.viewport.max(1);
        self.offset = self.offset.saturating_sub(page);
        self.auto_follow = false;
    }

    pub fn page_down(&mut self) {
        let page = self.viewport.max(1);
        self.offset = (self.offset + page).min(self.max_offset());
        if self.offset >= self.max_offset() {
            self.auto_follow = true;
        }
    }

    /// Re-anchor to the newest content and resume following
    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.auto_follow = true;
    }

    pub fn is_following(&self) -> bool {
        self.auto_follow
    }

    /// Visible slice of the content as (start, end) indices
    pub fn visible_range(&self) -> (usize, usize) {
        let start = self.offset;
        let end = (self.offset + self.viewport).min(self.total);
        (start, end)
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

/// One open conversation surface
#[derive(Debug)]
pub struct ChatWindow {
    pub id: WindowId,
    pub title: String,
    /// Topic fragment shown above the message list
    pub topic: String,
    pub input: InputBox,
    pub scroll: ScrollState,
    pub messages: Vec<Message>,
    /// Activation sequence number for most-recently-active ordering.
    /// Zero means never activated; maintained by the registry.
    pub(crate) last_active: u64,
}

impl ChatWindow {
    pub fn new(id: WindowId, title: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            topic: topic.into(),
            input: InputBox::default(),
            scroll: ScrollState::new(),
            messages: Vec::new(),
            last_active: 0,
        }
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }
}

use crate::common::Message;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Lazy-load window over a chatroom's history.
///
/// Shows the newest `current_page * page_size` messages. The oldest visible
/// message acts as the sentinel: when it scrolls into view the window grows
/// by one page, until the whole history is shown.
#[derive(Debug, Clone)]
pub struct MessageWindow {
    page_size: usize,
    current_page: usize,
    has_more: bool,
    loading: bool,
    chat_id: Option<String>,
}

impl Default for MessageWindow {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl MessageWindow {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            has_more: true,
            loading: false,
            chat_id: None,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    fn capacity(&self) -> usize {
        self.current_page.saturating_mul(self.page_size)
    }

    /// Points the window at `chat_id`. Switching rooms starts over at page 1.
    pub fn open(&mut self, chat_id: &str) {
        if self.chat_id.as_deref() == Some(chat_id) {
            return;
        }
        self.chat_id = Some(chat_id.to_string());
        self.current_page = 1;
        self.has_more = true;
        self.loading = false;
    }

    /// The tail of `messages` currently on screen, oldest first.
    pub fn visible<'a>(&self, messages: &'a [Message]) -> &'a [Message] {
        let start = messages.len().saturating_sub(self.capacity());
        &messages[start..]
    }

    /// Index into [`visible`](Self::visible) of the message the observer watches.
    pub fn sentinel_index(&self) -> Option<usize> {
        self.has_more.then_some(0)
    }

    /// Whether the "loading more messages" banner belongs above the list.
    pub fn show_loading_banner(&self, total: usize) -> bool {
        self.has_more && total > self.page_size
    }

    fn begin_loading(&mut self) -> bool {
        if !self.has_more || self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    fn end_loading(&mut self, total: usize) -> bool {
        let grew = total > self.capacity();
        if grew {
            self.current_page += 1;
        }
        self.has_more = total > self.capacity();
        self.loading = false;
        grew
    }

    /// The sentinel scrolled into view. Returns whether the window grew.
    ///
    /// Ignored while a load is pending or once the history is exhausted.
    pub fn on_sentinel_visible(&mut self, total: usize) -> bool {
        self.begin_loading() && self.end_loading(total)
    }

    /// Re-arms the sentinel when new messages pushed older ones out of the window.
    pub fn sync(&mut self, total: usize) {
        if total > self.capacity() {
            self.has_more = true;
        }
    }
}

use std::collections::VecDeque;

use super::pagination::MessageWindow;

const MAX_NOTICES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// Thông báo ngắn cho người dùng (tương đương toast).
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Trạng thái cục bộ của UI, không được lưu xuống store.
pub struct AppState {
    pub window: MessageWindow,
    /// Assistant replies requested but not yet applied
    pub pending_replies: usize,
    notices: VecDeque<Notice>,
}

impl AppState {
    pub fn new(page_size: usize) -> Self {
        Self {
            window: MessageWindow::new(page_size),
            pending_replies: 0,
            notices: VecDeque::new(),
        }
    }

    pub fn is_typing(&self) -> bool {
        self.pending_replies > 0
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push_back(Notice {
            level,
            message: message.into(),
        });

        // Giữ tối đa 100 thông báo
        if self.notices.len() > MAX_NOTICES {
            self.notices.pop_front();
        }
    }

    /// Drains queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }
}

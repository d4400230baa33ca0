use crate::common::types::NewMessage;

/// Sự kiện từ các tác vụ nền (AI reply) gửi về session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    ReplyReady { chat_id: String, draft: NewMessage },
    ReplyFailed { chat_id: String, reason: String },
}

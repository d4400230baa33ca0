use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Placeholder preview khi tin nhắn chỉ có ảnh.
pub const IMAGE_PREVIEW: &str = "Image sent";

/// Một cuộc hội thoại trên dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chatroom {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub last_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn label(self) -> &'static str {
        match self {
            Sender::User => "you",
            Sender::Ai => "ai",
        }
    }
}

/// Ảnh đính kèm, `url` là data URL base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub url: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// Domain model đại diện một tin nhắn đã lưu trong một chatroom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAttachment>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Text shown in the dashboard preview for this message.
    pub fn preview(&self) -> &str {
        self.content
            .as_deref()
            .filter(|content| !content.is_empty())
            .unwrap_or(IMAGE_PREVIEW)
    }

    /// True when the message has neither text nor an image.
    pub fn is_blank(&self) -> bool {
        self.content.as_deref().is_none_or(str::is_empty) && self.image.is_none()
    }
}

/// A message before the repository has assigned it an id and timestamp.
///
/// Always carries content, an image, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    sender: Sender,
    content: Option<String>,
    image: Option<ImageAttachment>,
}

impl NewMessage {
    pub fn new(
        sender: Sender,
        content: Option<String>,
        image: Option<ImageAttachment>,
    ) -> Result<Self, ChatError> {
        let content = content.filter(|text| !text.trim().is_empty());
        if content.is_none() && image.is_none() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(Self {
            sender,
            content,
            image,
        })
    }

    pub fn text(sender: Sender, content: impl Into<String>) -> Result<Self, ChatError> {
        Self::new(sender, Some(content.into()), None)
    }

    pub fn image(sender: Sender, image: ImageAttachment) -> Self {
        Self {
            sender,
            content: None,
            image: Some(image),
        }
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub(crate) fn into_message(
        self,
        id: String,
        chat_id: String,
        timestamp: DateTime<Utc>,
    ) -> Message {
        Message {
            id,
            chat_id,
            sender: self.sender,
            content: self.content,
            image: self.image,
            timestamp,
        }
    }
}

/// Người dùng sau khi xác thực OTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub phone_number: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Mã vùng điện thoại dùng ở form đăng nhập.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub name: String,
    pub dial_code: String,
    pub flag: String,
}

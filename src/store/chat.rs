use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::common::{Chatroom, Message, NewMessage};
use crate::error::ChatError;
use crate::storage::Persisted;

/// Persisted slice of the chat store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDocument {
    #[serde(default)]
    pub chatrooms: Vec<Chatroom>,
    #[serde(default)]
    pub messages: HashMap<String, Vec<Message>>,
}

/// Owns every chatroom and its messages.
///
/// Chatrooms are kept most-recent-first. Each chatroom id always has a
/// message list, possibly empty, and the two are removed together.
#[derive(Debug, Default)]
pub struct ChatRepository {
    chatrooms: Vec<Chatroom>,
    messages: HashMap<String, Vec<Message>>,
    revision: u64,
}

impl ChatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_chatroom(&mut self, title: &str) -> Result<Chatroom, ChatError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ChatError::InvalidTitle);
        }

        let chatroom = Chatroom {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            created_at: Utc::now(),
            last_message: None,
        };
        self.chatrooms.insert(0, chatroom.clone());
        self.messages.insert(chatroom.id.clone(), Vec::new());
        self.revision += 1;

        log::info!("Created chatroom {} ({})", chatroom.id, chatroom.title);
        Ok(chatroom)
    }

    pub fn delete_chatroom(&mut self, id: &str) -> Result<Chatroom, ChatError> {
        let index = self
            .chatrooms
            .iter()
            .position(|chat| chat.id == id)
            .ok_or_else(|| ChatError::ChatroomNotFound(id.to_string()))?;

        let chatroom = self.chatrooms.remove(index);
        let dropped = self.messages.remove(id).map_or(0, |list| list.len());
        self.revision += 1;

        log::info!("Deleted chatroom {id} with {dropped} messages");
        Ok(chatroom)
    }

    pub fn append_message(
        &mut self,
        chat_id: &str,
        draft: NewMessage,
    ) -> Result<Message, ChatError> {
        let chatroom = self
            .chatrooms
            .iter_mut()
            .find(|chat| chat.id == chat_id)
            .ok_or_else(|| ChatError::ChatroomNotFound(chat_id.to_string()))?;

        let message =
            draft.into_message(Uuid::new_v4().to_string(), chat_id.to_string(), Utc::now());
        chatroom.last_message = Some(message.preview().to_string());
        self.messages
            .entry(chat_id.to_string())
            .or_default()
            .push(message.clone());
        self.revision += 1;

        Ok(message)
    }

    /// Messages of a chatroom in append order; empty for unknown ids.
    pub fn list_messages(&self, chat_id: &str) -> &[Message] {
        self.messages.get(chat_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn message_count(&self, chat_id: &str) -> usize {
        self.list_messages(chat_id).len()
    }

    pub fn find_chatroom(&self, id: &str) -> Option<&Chatroom> {
        self.chatrooms.iter().find(|chat| chat.id == id)
    }

    pub fn chatrooms(&self) -> &[Chatroom] {
        &self.chatrooms
    }

    /// Case-insensitive title filter. A missing or empty query returns everything.
    pub fn search(&self, query: Option<&str>) -> Vec<&Chatroom> {
        let needle = match query {
            Some(query) if !query.is_empty() => query.to_lowercase(),
            _ => return self.chatrooms.iter().collect(),
        };

        self.chatrooms
            .iter()
            .filter(|chat| chat.title.to_lowercase().contains(&needle))
            .collect()
    }
}

impl Persisted for ChatRepository {
    const KEY: &'static str = "chat-storage";
    type Document = ChatDocument;

    fn snapshot(&self) -> ChatDocument {
        ChatDocument {
            chatrooms: self.chatrooms.clone(),
            messages: self.messages.clone(),
        }
    }

    fn restore(&mut self, document: ChatDocument) {
        let ChatDocument {
            chatrooms,
            mut messages,
        } = document;

        let mut seen = HashSet::with_capacity(chatrooms.len());
        let chatrooms: Vec<Chatroom> = chatrooms
            .into_iter()
            .filter(|chat| {
                let first = seen.insert(chat.id.clone());
                if !first {
                    log::warn!("Dropped duplicate chatroom {}", chat.id);
                }
                first
            })
            .collect();

        let mut restored = HashMap::with_capacity(chatrooms.len());
        for chat in &chatrooms {
            let mut list = messages.remove(&chat.id).unwrap_or_else(|| {
                log::warn!("Chatroom {} had no message list; starting it empty", chat.id);
                Vec::new()
            });
            let before = list.len();
            list.retain(|message| message.chat_id == chat.id);
            if list.len() != before {
                log::warn!(
                    "Dropped {} messages filed under chatroom {} that belong elsewhere",
                    before - list.len(),
                    chat.id
                );
            }
            let before = list.len();
            list.retain(|message| !message.is_blank());
            if list.len() != before {
                log::warn!(
                    "Dropped {} messages without content or image in chatroom {}",
                    before - list.len(),
                    chat.id
                );
            }
            restored.insert(chat.id.clone(), list);
        }

        for orphan in messages.keys() {
            log::warn!("Dropped message list for unknown chatroom {orphan}");
        }

        self.chatrooms = chatrooms;
        self.messages = restored;
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{IMAGE_PREVIEW, ImageAttachment, Sender};

    fn text(content: &str) -> NewMessage {
        NewMessage::text(Sender::User, content).unwrap()
    }

    fn image() -> ImageAttachment {
        ImageAttachment {
            url: "data:image/png;base64,AA==".to_string(),
            name: "pic.png".to_string(),
            size: 1,
            mime_type: "image/png".to_string(),
        }
    }

    #[test]
    fn create_inserts_most_recent_first_with_empty_history() {
        let mut repo = ChatRepository::new();
        let first = repo.create_chatroom("First").unwrap();
        let second = repo.create_chatroom("  Second  ").unwrap();

        assert_eq!(second.title, "Second");
        assert_eq!(second.last_message, None);
        let ids: Vec<_> = repo.chatrooms().iter().map(|chat| chat.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
        assert!(repo.list_messages(&first.id).is_empty());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut repo = ChatRepository::new();
        assert_eq!(repo.create_chatroom("   "), Err(ChatError::InvalidTitle));
        assert!(repo.chatrooms().is_empty());
    }

    #[test]
    fn delete_removes_chatroom_and_messages_only() {
        let mut repo = ChatRepository::new();
        let keep = repo.create_chatroom("keep").unwrap();
        let gone = repo.create_chatroom("gone").unwrap();
        repo.append_message(&keep.id, text("stay")).unwrap();
        repo.append_message(&gone.id, text("bye")).unwrap();

        repo.delete_chatroom(&gone.id).unwrap();

        assert!(repo.find_chatroom(&gone.id).is_none());
        assert!(repo.list_messages(&gone.id).is_empty());
        assert!(!repo.snapshot().messages.contains_key(&gone.id));
        assert_eq!(repo.list_messages(&keep.id).len(), 1);
        assert_eq!(
            repo.find_chatroom(&keep.id).unwrap().last_message.as_deref(),
            Some("stay")
        );
    }

    #[test]
    fn delete_unknown_id_signals_not_found() {
        let mut repo = ChatRepository::new();
        repo.create_chatroom("one").unwrap();
        let revision = repo.revision();

        assert_eq!(
            repo.delete_chatroom("nope"),
            Err(ChatError::ChatroomNotFound("nope".to_string()))
        );
        assert_eq!(repo.chatrooms().len(), 1);
        assert_eq!(repo.revision(), revision);
    }

    #[test]
    fn messages_keep_append_order() {
        let mut repo = ChatRepository::new();
        let chat = repo.create_chatroom("order").unwrap();
        for i in 0..30 {
            repo.append_message(&chat.id, text(&format!("m{i}"))).unwrap();
        }

        let contents: Vec<_> = repo
            .list_messages(&chat.id)
            .iter()
            .map(|message| message.content.clone().unwrap())
            .collect();
        let expected: Vec<_> = (0..30).map(|i| format!("m{i}")).collect();
        assert_eq!(contents, expected);
        assert!(repo.list_messages(&chat.id).iter().all(|m| m.chat_id == chat.id));
    }

    #[test]
    fn append_updates_last_message_preview() {
        let mut repo = ChatRepository::new();
        let chat = repo.create_chatroom("preview").unwrap();

        repo.append_message(&chat.id, text("hello")).unwrap();
        assert_eq!(
            repo.find_chatroom(&chat.id).unwrap().last_message.as_deref(),
            Some("hello")
        );

        repo.append_message(&chat.id, NewMessage::image(Sender::User, image()))
            .unwrap();
        assert_eq!(
            repo.find_chatroom(&chat.id).unwrap().last_message.as_deref(),
            Some(IMAGE_PREVIEW)
        );
    }

    #[test]
    fn append_to_unknown_chat_mutates_nothing() {
        let mut repo = ChatRepository::new();
        let chat = repo.create_chatroom("untouched").unwrap();
        repo.append_message(&chat.id, text("before")).unwrap();
        let before = repo.snapshot();

        let result = repo.append_message("missing", text("lost"));

        assert_eq!(result, Err(ChatError::ChatroomNotFound("missing".to_string())));
        assert_eq!(repo.snapshot(), before);
    }

    #[test]
    fn search_is_case_insensitive_and_keeps_order() {
        let mut repo = ChatRepository::new();
        repo.create_chatroom("abcdef").unwrap();
        repo.create_chatroom("Weekend").unwrap();
        repo.create_chatroom("xyzABC").unwrap();

        let all: Vec<_> = repo.chatrooms().iter().collect();
        assert_eq!(repo.search(None), all);
        assert_eq!(repo.search(Some("")), all);

        let titles: Vec<_> = repo
            .search(Some("ABC"))
            .into_iter()
            .map(|chat| chat.title.as_str())
            .collect();
        assert_eq!(titles, vec!["xyzABC", "abcdef"]);
    }

    #[test]
    fn restore_repairs_inconsistent_documents() {
        let mut source = ChatRepository::new();
        let a = source.create_chatroom("a").unwrap();
        let b = source.create_chatroom("b").unwrap();
        source.append_message(&a.id, text("in a")).unwrap();

        let mut document = source.snapshot();
        document.messages.remove(&b.id);
        document.messages.insert("ghost".to_string(), Vec::new());
        let stray = document.messages[&a.id][0].clone();
        document
            .messages
            .get_mut(&a.id)
            .unwrap()
            .push(Message {
                chat_id: "elsewhere".to_string(),
                ..stray
            });

        let mut restored = ChatRepository::new();
        restored.restore(document);

        assert_eq!(restored.list_messages(&a.id).len(), 1);
        assert!(restored.list_messages(&b.id).is_empty());
        assert!(restored.snapshot().messages.contains_key(&b.id));
        assert!(!restored.snapshot().messages.contains_key("ghost"));
    }

    #[test]
    fn restore_drops_blank_messages_and_duplicate_chatrooms() {
        let mut source = ChatRepository::new();
        let a = source.create_chatroom("a").unwrap();
        source.append_message(&a.id, text("kept")).unwrap();

        let mut document = source.snapshot();
        let kept = document.messages[&a.id][0].clone();
        let list = document.messages.get_mut(&a.id).unwrap();
        list.push(Message {
            id: "no-body".to_string(),
            content: None,
            ..kept.clone()
        });
        list.push(Message {
            id: "empty-text".to_string(),
            content: Some(String::new()),
            ..kept.clone()
        });
        list.push(Message {
            id: "empty-text-image".to_string(),
            content: Some(String::new()),
            image: Some(image()),
            ..kept
        });
        let mut twin = document.chatrooms[0].clone();
        twin.title = "twin".to_string();
        document.chatrooms.push(twin);

        let mut restored = ChatRepository::new();
        restored.restore(document);

        let ids: Vec<_> = restored
            .list_messages(&a.id)
            .iter()
            .map(|message| message.id.as_str())
            .collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[1], "empty-text-image");
        assert_eq!(restored.list_messages(&a.id)[1].preview(), IMAGE_PREVIEW);
        assert_eq!(restored.chatrooms().len(), 1);
        assert_eq!(restored.chatrooms()[0].title, "a");

        restored.delete_chatroom(&a.id).unwrap();
        assert!(restored.chatrooms().is_empty());
        assert!(restored.snapshot().messages.is_empty());
    }
}

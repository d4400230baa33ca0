use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::common::{
    Chatroom, IMAGE_PREVIEW, Message, NewMessage, Sender, SessionCommand, SessionEvent, UserRecord,
};
use crate::error::{AppError, ChatError};
use crate::network::ChatApi;
use crate::storage::{KeyValueStore, Persistence};
use crate::store::{AuthStore, ChatRepository, Preferences};
use crate::validation::{validate_message, validate_otp, validate_phone, validate_title};

use super::components::chat_area;
use super::state::{AppState, NoticeLevel};

const EVENT_BUFFER: usize = 100;

/// The client: stores, their persistence, the remote services and view state.
///
/// Store mutations go through here so every one of them is followed by a
/// persistence sync.
pub struct ChatApp<S, A> {
    state: AppState,
    chats: ChatRepository,
    auth: AuthStore,
    preferences: Preferences,
    persistence: Persistence<S>,
    api: A,
    event_sender: mpsc::Sender<SessionEvent>,
    event_receiver: mpsc::Receiver<SessionEvent>,
}

impl<S: KeyValueStore, A: ChatApi> ChatApp<S, A> {
    pub fn new(mut persistence: Persistence<S>, api: A, page_size: usize) -> Self {
        let mut chats = ChatRepository::new();
        let mut auth = AuthStore::new();
        let mut preferences = Preferences::new();

        persistence.hydrate(&mut auth);
        persistence.hydrate(&mut chats);
        persistence.hydrate(&mut preferences);
        auth.initialize();
        persistence.sync(&auth);

        log::info!(
            "Chat client started with {} chatrooms (authenticated: {})",
            chats.chatrooms().len(),
            auth.is_authenticated()
        );

        let (event_sender, event_receiver) = mpsc::channel(EVENT_BUFFER);
        Self {
            state: AppState::new(page_size),
            chats,
            auth,
            preferences,
            persistence,
            api,
            event_sender,
            event_receiver,
        }
    }

    pub fn chats(&self) -> &ChatRepository {
        &self.chats
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    // ========== Auth ==========

    /// Validates the number and sends a code to it. Returns the full number.
    pub async fn request_code(
        &mut self,
        country_code: &str,
        phone_number: &str,
    ) -> Result<String, AppError> {
        let phone = validate_phone(country_code, phone_number)?;
        self.api.send_verification_code(&phone).await?;
        self.state.notify(NoticeLevel::Success, "OTP sent successfully");
        Ok(phone)
    }

    pub async fn verify_code(&mut self, phone: &str, code: &str) -> Result<UserRecord, AppError> {
        let code = validate_otp(code)?;
        let user = self.api.verify_code(phone, &code).await?;
        self.auth.login(user.clone());
        self.persistence.sync(&self.auth);
        self.state.notify(NoticeLevel::Success, "Login successful!");
        Ok(user)
    }

    pub fn logout(&mut self) {
        self.auth.logout();
        self.persistence.sync(&self.auth);
        self.state.notify(NoticeLevel::Success, "Logged out successfully");
    }

    pub fn current_user(&self) -> Result<&UserRecord, AppError> {
        self.auth.user().ok_or(AppError::NotAuthenticated)
    }

    // ========== Dashboard ==========

    pub fn create_chatroom(&mut self, title: &str) -> Result<Chatroom, AppError> {
        self.current_user()?;
        let title = validate_title(title)?;
        let chatroom = self.chats.create_chatroom(&title)?;
        self.persistence.sync(&self.chats);
        self.state.notify(NoticeLevel::Success, "Chatroom created successfully!");
        Ok(chatroom)
    }

    pub fn delete_chatroom(&mut self, chat_id: &str) -> Result<Chatroom, AppError> {
        self.current_user()?;
        let chatroom = self.chats.delete_chatroom(chat_id)?;
        self.persistence.sync(&self.chats);
        self.state.notify(NoticeLevel::Success, "Chatroom deleted successfully!");
        Ok(chatroom)
    }

    pub fn search(&self, query: Option<&str>) -> Vec<&Chatroom> {
        self.chats.search(query)
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        let dark = self.preferences.toggle_dark_mode();
        self.persistence.sync(&self.preferences);
        dark
    }

    // ========== Chatroom view ==========

    /// Shows `chat_id` in the message window.
    pub fn open_chat(&mut self, chat_id: &str) -> Result<&Chatroom, AppError> {
        self.current_user()?;
        if self.chats.find_chatroom(chat_id).is_none() {
            self.state.notify(NoticeLevel::Error, "Chatroom not found");
            return Err(ChatError::ChatroomNotFound(chat_id.to_string()).into());
        }

        self.state.window.open(chat_id);
        self.state.window.sync(self.chats.message_count(chat_id));
        self.chats
            .find_chatroom(chat_id)
            .ok_or_else(|| ChatError::ChatroomNotFound(chat_id.to_string()).into())
    }

    pub fn open_chat_id(&self) -> Option<&str> {
        self.state.window.chat_id()
    }

    pub fn visible_messages(&self) -> &[Message] {
        match self.state.window.chat_id() {
            Some(chat_id) => self.state.window.visible(self.chats.list_messages(chat_id)),
            None => &[],
        }
    }

    /// The oldest visible message scrolled into view.
    pub fn load_older(&mut self) -> bool {
        let Some(chat_id) = self.state.window.chat_id() else {
            return false;
        };
        let total = self.chats.message_count(chat_id);
        self.state.window.on_sentinel_visible(total)
    }

    /// Builds the user's draft, uploading the image first when there is one.
    pub async fn compose(
        &self,
        text: Option<&str>,
        image: Option<&Path>,
    ) -> Result<NewMessage, AppError> {
        let text = text.filter(|text| !text.trim().is_empty());
        if let Some(text) = text {
            validate_message(text)?;
        }
        let attachment = match image {
            Some(path) => Some(self.api.upload_attachment(path).await?),
            None => None,
        };
        Ok(NewMessage::new(
            Sender::User,
            text.map(str::to_string),
            attachment,
        )?)
    }

    /// Appends the user's message, then asks for a reply in the background.
    pub fn send(&mut self, chat_id: &str, draft: NewMessage) -> Result<Message, AppError> {
        self.current_user()?;
        let prompt = draft.content().unwrap_or(IMAGE_PREVIEW).to_string();
        let message = self.chats.append_message(chat_id, draft)?;
        self.persistence.sync(&self.chats);
        self.sync_window(chat_id);
        self.spawn_reply(&prompt, chat_id);
        Ok(message)
    }

    fn sync_window(&mut self, chat_id: &str) {
        if self.state.window.chat_id() == Some(chat_id) {
            self.state.window.sync(self.chats.message_count(chat_id));
        }
    }

    fn spawn_reply(&mut self, prompt: &str, chat_id: &str) {
        let reply = self.api.request_assistant_reply(prompt, chat_id);
        let sender = self.event_sender.clone();
        let chat_id = chat_id.to_string();
        self.state.pending_replies += 1;

        tokio::spawn(async move {
            let event = match reply.await {
                Ok(draft) => SessionEvent::ReplyReady { chat_id, draft },
                Err(err) => SessionEvent::ReplyFailed {
                    chat_id,
                    reason: err.to_string(),
                },
            };
            if let Err(err) = sender.send(event).await {
                log::warn!("Session closed before assistant reply arrived: {err}");
            }
        });
    }

    /// Applies one background event. Returns the appended reply, if any.
    pub fn apply_event(&mut self, event: SessionEvent) -> Option<Message> {
        self.state.pending_replies = self.state.pending_replies.saturating_sub(1);
        match event {
            SessionEvent::ReplyReady { chat_id, draft } => {
                match self.chats.append_message(&chat_id, draft) {
                    Ok(message) => {
                        self.persistence.sync(&self.chats);
                        self.sync_window(&chat_id);
                        Some(message)
                    }
                    Err(err) => {
                        log::warn!("Ignoring assistant reply: {err}");
                        None
                    }
                }
            }
            SessionEvent::ReplyFailed { chat_id, reason } => {
                log::error!("Error getting AI response for chat {chat_id}: {reason}");
                self.state.notify(NoticeLevel::Error, "Failed to get AI response");
                None
            }
        }
    }

    /// Applies whatever replies have already arrived, without waiting.
    pub fn handle_session_events(&mut self) -> Vec<Message> {
        let mut applied = Vec::new();
        while let Ok(event) = self.event_receiver.try_recv() {
            applied.extend(self.apply_event(event));
        }
        applied
    }

    /// Waits until every requested reply has arrived or failed.
    pub async fn wait_for_replies(&mut self) -> Vec<Message> {
        let mut applied = Vec::new();
        while self.state.pending_replies > 0 {
            match self.event_receiver.recv().await {
                Some(event) => applied.extend(self.apply_event(event)),
                None => break,
            }
        }
        applied
    }

    pub fn render_chat(&self) -> String {
        let messages = self
            .state
            .window
            .chat_id()
            .map(|chat_id| self.chats.list_messages(chat_id))
            .unwrap_or(&[]);
        chat_area::render(&self.state.window, messages, self.state.is_typing())
    }

    /// Prints and clears queued notices; errors go to stderr.
    pub fn print_notices(&mut self) {
        for notice in self.state.take_notices() {
            match notice.level {
                NoticeLevel::Error => eprintln!("! {}", notice.message),
                _ => println!("* {}", notice.message),
            }
        }
    }

    async fn handle_command(&mut self, chat_id: &str, command: SessionCommand) -> bool {
        let result = match command {
            SessionCommand::Quit => return false,
            SessionCommand::LoadOlder => {
                if self.load_older() {
                    println!("{}", self.render_chat());
                } else {
                    self.state.notify(NoticeLevel::Info, "No older messages");
                }
                return true;
            }
            SessionCommand::SendText(text) => self.compose(Some(&text), None).await,
            SessionCommand::SendImage { path, caption } => {
                self.compose(caption.as_deref(), Some(&path)).await
            }
        };

        match result.and_then(|draft| self.send(chat_id, draft)) {
            Ok(_) => println!("{}", self.render_chat()),
            Err(err) => self.state.notify(NoticeLevel::Error, err.to_string()),
        }
        true
    }

    /// Interactive chatroom: reads commands from stdin while replies arrive.
    pub async fn run_session(&mut self, chat_id: &str) -> Result<(), AppError> {
        let title = self.open_chat(chat_id)?.title.clone();
        println!("== {title} ({} messages) ==", self.chats.message_count(chat_id));
        println!("{}", self.render_chat());
        println!("(type a message, /image <path> [caption], /more, /quit)");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            if !self.handle_session_events().is_empty() {
                println!("{}", self.render_chat());
            }
            self.print_notices();
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    if let Some(command) = SessionCommand::parse(&line) {
                        if !self.handle_command(chat_id, command).await {
                            break;
                        }
                    }
                }
                event = self.event_receiver.recv() => {
                    if let Some(event) = event {
                        if self.apply_event(event).is_some() {
                            println!("{}", self.render_chat());
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Writes every store regardless of flush policy.
    pub fn shutdown(&mut self) {
        self.persistence.flush(&self.auth);
        self.persistence.flush(&self.chats);
        self.persistence.flush(&self.preferences);
        log::info!("Chat client state flushed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::network::SimulatedApi;
    use crate::storage::{FlushPolicy, MemoryStore, PersistentStore};

    fn app() -> ChatApp<MemoryStore, SimulatedApi> {
        let persistence = Persistence::new(
            PersistentStore::new(MemoryStore::new(), "test:"),
            FlushPolicy::EveryMutation,
        );
        ChatApp::new(persistence, SimulatedApi::new(ApiConfig::instant()), 20)
    }

    #[tokio::test]
    async fn chat_operations_require_login() {
        let mut app = app();
        assert!(matches!(
            app.create_chatroom("Trip planning"),
            Err(AppError::NotAuthenticated)
        ));

        let phone = app.request_code("+1", "5551234567").await.unwrap();
        app.verify_code(&phone, "123456").await.unwrap();
        assert!(app.create_chatroom("Trip planning").is_ok());
    }

    #[tokio::test]
    async fn wrong_code_keeps_user_logged_out() {
        let mut app = app();
        let phone = app.request_code("+1", "5551234567").await.unwrap();
        assert!(matches!(
            app.verify_code(&phone, "12345").await,
            Err(AppError::Validation(_))
        ));
        assert!(!app.auth().is_authenticated());
    }

    #[tokio::test]
    async fn reply_for_deleted_chatroom_is_dropped() {
        let mut app = app();
        let phone = app.request_code("+1", "5551234567").await.unwrap();
        app.verify_code(&phone, "123456").await.unwrap();
        let chat = app.create_chatroom("short lived").unwrap();

        let draft = app.compose(Some("anyone there?"), None).await.unwrap();
        app.send(&chat.id, draft).unwrap();
        app.delete_chatroom(&chat.id).unwrap();

        assert!(app.wait_for_replies().await.is_empty());
        assert!(!app.state().is_typing());
        assert!(app.chats().chatrooms().is_empty());
    }

    #[tokio::test]
    async fn loading_past_the_oldest_message_leaves_an_info_notice() {
        let mut app = app();
        let phone = app.request_code("+1", "5551234567").await.unwrap();
        app.verify_code(&phone, "123456").await.unwrap();
        let chat = app.create_chatroom("quiet").unwrap();
        app.open_chat(&chat.id).unwrap();
        app.state_mut().take_notices();

        assert!(app.handle_command(&chat.id, SessionCommand::LoadOlder).await);
        assert!(!app.load_older());

        let notices = app.state_mut().take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Info);
        assert_eq!(notices[0].message, "No older messages");
    }
}

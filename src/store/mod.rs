pub mod auth;
pub mod chat;
pub mod preferences;

pub use auth::{AuthDocument, AuthStore};
pub use chat::{ChatDocument, ChatRepository};
pub use preferences::{Preferences, UiDocument};

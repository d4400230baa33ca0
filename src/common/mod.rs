pub mod commands;
pub mod events;
pub mod types;

pub use commands::SessionCommand;
pub use events::SessionEvent;
pub use types::{
    Chatroom, Country, IMAGE_PREVIEW, ImageAttachment, Message, NewMessage, Sender, UserRecord,
};

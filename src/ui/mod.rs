pub mod app;
pub mod components;
pub mod pagination;
pub mod state;

pub use app::ChatApp;
pub use pagination::MessageWindow;
pub use state::{AppState, Notice, NoticeLevel};

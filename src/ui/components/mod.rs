pub mod chat_area;
pub mod sidebar;

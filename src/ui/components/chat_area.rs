use crate::common::Message;
use crate::ui::pagination::MessageWindow;

fn render_message(message: &Message) -> String {
    let time = message.timestamp.format("%H:%M");
    let mut parts = Vec::new();
    if let Some(image) = &message.image {
        parts.push(format!("[image: {} ({:.1} KB)]", image.name, image.size as f64 / 1024.0));
    }
    if let Some(content) = &message.content {
        parts.push(content.clone());
    }

    format!("[{time}] {:>4}: {}", message.sender.label(), parts.join(" "))
}

/// Renders the visible window of a chatroom, oldest message first.
pub fn render(window: &MessageWindow, messages: &[Message], typing: bool) -> String {
    let visible = window.visible(messages);
    let mut lines = Vec::with_capacity(visible.len() + 2);

    if window.show_loading_banner(messages.len()) {
        lines.push(format!(
            "--- {} older messages, type /more to load ---",
            messages.len() - visible.len()
        ));
    }
    if visible.is_empty() {
        lines.push("No messages yet. Say hello!".to_string());
    }
    lines.extend(visible.iter().map(render_message));
    if typing {
        lines.push("  ai is typing...".to_string());
    }

    lines.join("\n")
}

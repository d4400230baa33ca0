use crate::common::Chatroom;

const PREVIEW_CHARS: usize = 40;

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

/// Dashboard list of chatrooms, one line per room.
pub fn render(chatrooms: &[&Chatroom], query: Option<&str>) -> String {
    if chatrooms.is_empty() {
        return match query {
            Some(query) if !query.is_empty() => format!("No chatrooms match \"{query}\""),
            _ => "No chatrooms yet. Create one with `new <title>`.".to_string(),
        };
    }

    chatrooms
        .iter()
        .map(|chat| {
            let preview = chat
                .last_message
                .as_deref()
                .map(|text| shorten(text, PREVIEW_CHARS))
                .unwrap_or_else(|| "No messages yet".to_string());
            format!(
                "{}  {:<50}  {}  ({})",
                chat.id,
                chat.title,
                preview,
                chat.created_at.format("%Y-%m-%d")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn long_previews_are_shortened() {
        let chat = Chatroom {
            id: "c1".to_string(),
            title: "Trip".to_string(),
            created_at: Utc::now(),
            last_message: Some("x".repeat(80)),
        };
        let line = render(&[&chat], None);
        assert!(line.contains(&format!("{}...", "x".repeat(37))));
        assert!(!line.contains(&"x".repeat(41)));
    }

    #[test]
    fn empty_list_mentions_query() {
        assert_eq!(render(&[], Some("abc")), "No chatrooms match \"abc\"");
    }
}

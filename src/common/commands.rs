use std::path::PathBuf;

/// Lệnh người dùng gõ trong một chatroom tương tác.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    SendText(String),
    SendImage {
        path: PathBuf,
        caption: Option<String>,
    },
    /// Tin nhắn cũ nhất đang hiển thị lọt vào khung nhìn (cuộn lên đầu)
    LoadOlder,
    Quit,
}

impl SessionCommand {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match line.split_once(' ') {
            Some(("/image", rest)) => {
                let rest = rest.trim();
                let (path, caption) = match rest.split_once(' ') {
                    Some((path, caption)) if !caption.trim().is_empty() => {
                        (path, Some(caption.trim().to_string()))
                    }
                    _ => (rest, None),
                };
                Some(SessionCommand::SendImage {
                    path: PathBuf::from(path),
                    caption,
                })
            }
            _ => match line {
                "/more" => Some(SessionCommand::LoadOlder),
                "/quit" | "/exit" => Some(SessionCommand::Quit),
                text => Some(SessionCommand::SendText(text.to_string())),
            },
        }
    }
}

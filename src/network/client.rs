use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use super::ChatApi;
use super::countries::fetch_countries;
use crate::common::{Country, ImageAttachment, NewMessage, Sender, UserRecord};
use crate::config::ApiConfig;
use crate::error::ApiError;

pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;

const CANNED_REPLIES: [&str; 10] = [
    "That's an interesting question! Let me think about that...",
    "I understand what you're asking. Here's what I can tell you...",
    "Great question! Based on my knowledge, I would say...",
    "I'm processing your request. Here's my response...",
    "That's a complex topic. Let me break it down for you...",
    "I appreciate you asking that. Here's my perspective...",
    "That's a good point. Let me elaborate on that...",
    "I see what you mean. Here's what I think about that...",
    "Interesting perspective! Here's my take on it...",
    "That's a thoughtful question. Let me address that...",
];

/// Stand-in for the OTP, assistant and upload backends.
#[derive(Debug, Clone)]
pub struct SimulatedApi {
    config: ApiConfig,
    http: reqwest::Client,
}

impl SimulatedApi {
    pub fn new(config: ApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                log::warn!("Failed to build HTTP client ({err}); using defaults");
                reqwest::Client::new()
            });
        Self { config, http }
    }

    fn latency(&self) -> Duration {
        Duration::from_millis(self.config.latency_ms)
    }

    /// Base reply delay plus up to `reply_jitter_ms` of random jitter.
    fn reply_delay(&self) -> Duration {
        let jitter = if self.config.reply_jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.config.reply_jitter_ms)
        };
        Duration::from_millis(self.config.reply_delay_ms.saturating_add(jitter))
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

fn is_six_digits(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

/// MIME type guessed from the file extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("txt" | "md") => "text/plain",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

impl ChatApi for SimulatedApi {
    fn send_verification_code(
        &self,
        phone_number: &str,
    ) -> BoxFuture<'static, Result<(), ApiError>> {
        let delay = self.latency();
        let phone_number = phone_number.to_string();
        async move {
            pause(delay).await;
            log::info!("OTP sent to {phone_number}");
            Ok(())
        }
        .boxed()
    }

    fn verify_code(
        &self,
        phone_number: &str,
        code: &str,
    ) -> BoxFuture<'static, Result<UserRecord, ApiError>> {
        let delay = self.latency();
        let phone_number = phone_number.to_string();
        let code = code.to_string();
        async move {
            pause(delay).await;
            if !is_six_digits(&code) {
                return Err(ApiError::InvalidCode);
            }

            let digits: Vec<char> = phone_number.chars().collect();
            let last_four: String = digits[digits.len().saturating_sub(4)..].iter().collect();
            Ok(UserRecord {
                id: Uuid::new_v4().to_string(),
                name: format!("User {last_four}"),
                phone_number,
                created_at: Utc::now(),
            })
        }
        .boxed()
    }

    fn request_assistant_reply(
        &self,
        user_text: &str,
        chat_id: &str,
    ) -> BoxFuture<'static, Result<NewMessage, ApiError>> {
        let reply = CANNED_REPLIES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(CANNED_REPLIES[0]);
        let delay = self.reply_delay();
        log::debug!(
            "Assistant reply for chat {chat_id} ({} chars in) due in {delay:?}",
            user_text.len()
        );

        async move {
            pause(delay).await;
            NewMessage::text(Sender::Ai, reply).map_err(|_| ApiError::EmptyReply)
        }
        .boxed()
    }

    fn upload_attachment(
        &self,
        path: &Path,
    ) -> BoxFuture<'static, Result<ImageAttachment, ApiError>> {
        let delay = self.latency();
        let path = path.to_path_buf();
        async move {
            let mime_type = mime_type_for(&path);
            if !mime_type.starts_with("image/") {
                return Err(ApiError::UnsupportedAttachment(mime_type.to_string()));
            }

            let size = tokio::fs::metadata(&path).await?.len();
            if size > MAX_ATTACHMENT_BYTES {
                return Err(ApiError::AttachmentTooLarge { size });
            }

            pause(delay).await;
            let bytes = tokio::fs::read(&path).await?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            Ok(ImageAttachment {
                url: format!("data:{mime_type};base64,{}", STANDARD.encode(&bytes)),
                name,
                size,
                mime_type: mime_type.to_string(),
            })
        }
        .boxed()
    }

    fn fetch_country_dialing_codes(&self) -> BoxFuture<'static, Vec<Country>> {
        let http = self.http.clone();
        let url = self.config.countries_url.clone();
        async move { fetch_countries(&http, &url).await }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_types_follow_extension() {
        assert_eq!(mime_type_for(Path::new("a/b/photo.JPG")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("notes.txt")), "text/plain");
        assert_eq!(mime_type_for(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn otp_must_be_six_digits() {
        assert!(is_six_digits("123456"));
        assert!(!is_six_digits("12345"));
        assert!(!is_six_digits("12345a"));
    }

    #[test]
    fn reply_delay_saturates_on_extreme_config() {
        let api = SimulatedApi::new(ApiConfig {
            reply_delay_ms: u64::MAX,
            reply_jitter_ms: u64::MAX,
            ..ApiConfig::instant()
        });
        assert_eq!(api.reply_delay(), Duration::from_millis(u64::MAX));

        let api = SimulatedApi::new(ApiConfig {
            reply_delay_ms: 100,
            reply_jitter_ms: 50,
            ..ApiConfig::instant()
        });
        let delay = api.reply_delay();
        assert!(delay >= Duration::from_millis(100));
        assert!(delay <= Duration::from_millis(150));
    }
}

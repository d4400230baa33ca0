pub mod client;
pub mod countries;

pub use client::SimulatedApi;
pub use countries::{fallback_countries, fetch_countries};

use futures::future::BoxFuture;
use std::path::Path;

use crate::common::{Country, ImageAttachment, NewMessage, UserRecord};
use crate::error::ApiError;

/// Remote services the chat client depends on. All of them are simulated.
///
/// Futures own their inputs so callers can spawn them.
pub trait ChatApi: Send + Sync {
    fn send_verification_code(
        &self,
        phone_number: &str,
    ) -> BoxFuture<'static, Result<(), ApiError>>;

    fn verify_code(
        &self,
        phone_number: &str,
        code: &str,
    ) -> BoxFuture<'static, Result<UserRecord, ApiError>>;

    /// Reply drafted by the assistant, always with `Sender::Ai`.
    fn request_assistant_reply(
        &self,
        user_text: &str,
        chat_id: &str,
    ) -> BoxFuture<'static, Result<NewMessage, ApiError>>;

    fn upload_attachment(
        &self,
        path: &Path,
    ) -> BoxFuture<'static, Result<ImageAttachment, ApiError>>;

    /// Never fails: falls back to a static list.
    fn fetch_country_dialing_codes(&self) -> BoxFuture<'static, Vec<Country>>;
}

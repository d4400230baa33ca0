//! Terminal chat client with phone/OTP login, a dashboard of chatrooms and a
//! simulated AI responder.
//!
//! ## Modules
//!
//! - [`common`] – domain types, session commands and events
//! - [`store`] – chat repository, auth and preference stores
//! - [`storage`] – key-value backends and the persistence adapter
//! - [`ui`] – message window (lazy history), view state, terminal rendering
//! - [`network`] – simulated OTP, assistant, upload and country services
//! - [`validation`] – form checks
//! - [`config`] – JSON config file

pub mod common;
pub mod config;
pub mod error;
pub mod network;
pub mod storage;
pub mod store;
pub mod ui;
pub mod validation;

pub use error::{ApiError, AppError, ChatError, StorageError, ValidationError};

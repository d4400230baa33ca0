//! Form checks run before anything reaches the stores.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ValidationError;

pub const MAX_TITLE_CHARS: usize = 50;
pub const MAX_MESSAGE_CHARS: usize = 1000;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

fn strip_spaces(value: &str) -> String {
    WHITESPACE.replace_all(value, "").into_owned()
}

/// Returns the full number, dial code prefixed, e.g. `+15551234567`.
pub fn validate_phone(country_code: &str, phone_number: &str) -> Result<String, ValidationError> {
    let country_code = country_code.trim();
    if country_code.is_empty() {
        return Err(ValidationError::new("countryCode", "Country code is required"));
    }

    let phone = strip_spaces(phone_number);
    if phone.is_empty() {
        return Err(ValidationError::new("phoneNumber", "Phone number is required"));
    }
    if !DIGITS.is_match(&phone) {
        return Err(ValidationError::new(
            "phoneNumber",
            "Phone number must contain only digits",
        ));
    }
    if phone.len() < 10 {
        return Err(ValidationError::new(
            "phoneNumber",
            "Phone number must be at least 10 digits",
        ));
    }
    if phone.len() > 15 {
        return Err(ValidationError::new(
            "phoneNumber",
            "Phone number must be less than 15 digits",
        ));
    }

    Ok(format!("{country_code}{phone}"))
}

pub fn validate_otp(code: &str) -> Result<String, ValidationError> {
    let code = strip_spaces(code);
    if code.is_empty() {
        return Err(ValidationError::new("otp", "OTP is required"));
    }
    if !DIGITS.is_match(&code) {
        return Err(ValidationError::new("otp", "OTP must contain only digits"));
    }
    if code.len() != 6 {
        return Err(ValidationError::new("otp", "OTP must be exactly 6 digits"));
    }
    Ok(code)
}

pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::new("title", "Chat title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::new(
            "title",
            "Chat title must be less than 50 characters",
        ));
    }
    Ok(title.to_string())
}

pub fn validate_message(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::new("content", "Message cannot be empty"));
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ValidationError::new(
            "content",
            "Message must be less than 1000 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_numbers() {
        assert_eq!(
            validate_phone("+1", "555 123 4567").unwrap(),
            "+15551234567"
        );
        assert_eq!(validate_phone("", "5551234567").unwrap_err().field, "countryCode");
        assert_eq!(
            validate_phone("+1", "555-123-4567").unwrap_err().message,
            "Phone number must contain only digits"
        );
        assert_eq!(
            validate_phone("+1", "12345").unwrap_err().message,
            "Phone number must be at least 10 digits"
        );
        assert!(validate_phone("+1", "1234567890123456").is_err());
    }

    #[test]
    fn otp_codes() {
        assert_eq!(validate_otp("123 456").unwrap(), "123456");
        assert!(validate_otp("12345").is_err());
        assert!(validate_otp("abcdef").is_err());
        assert!(validate_otp("").is_err());
    }

    #[test]
    fn titles_and_messages() {
        assert_eq!(validate_title("  Trip planning ").unwrap(), "Trip planning");
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(51)).is_err());
        assert!(validate_title(&"x".repeat(50)).is_ok());

        assert!(validate_message("hi").is_ok());
        assert!(validate_message(" ").is_err());
        assert!(validate_message(&"y".repeat(1001)).is_err());
    }
}

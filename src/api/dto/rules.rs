//! Custom field rules shared by request DTOs.

use std::borrow::Cow;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use validator::ValidationError;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Accepts an RFC 3339 timestamp or a plain `YYYY-MM-DD` date, which is
/// read as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<jiff::Timestamp> {
    let raw = raw.trim();
    raw.parse::<jiff::Timestamp>().ok().or_else(|| {
        raw.parse::<Date>()
            .ok()
            .and_then(|date| date.to_zoned(TimeZone::UTC).ok())
            .map(|zoned| zoned.timestamp())
    })
}

pub fn validate_timestamp(raw: &str) -> Result<(), ValidationError> {
    match parse_timestamp(raw) {
        Some(_) => Ok(()),
        None => Err(invalid("timestamp", "Must be a valid date")),
    }
}

/// At least one lowercase letter, one uppercase letter and one digit.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let lower = password.chars().any(|c| c.is_ascii_lowercase());
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());

    if lower && upper && digit {
        Ok(())
    } else {
        Err(invalid(
            "password_strength",
            "Password must contain at least one lowercase letter, one uppercase letter, and one number",
        ))
    }
}

/// Three-letter ISO 4217 style code, e.g. `USD`.
pub fn validate_currency(code: &str) -> Result<(), ValidationError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(invalid("currency", "Currency must be a 3-letter code"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected: jiff::Timestamp = "2025-03-01T00:00:00Z".parse().unwrap();
        assert_eq!(parse_timestamp("2025-03-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp(" 2025-03-01 "), Some(expected));
        assert_eq!(
            parse_timestamp("2025-03-01T02:00:00+02:00"),
            Some(expected)
        );
        assert_eq!(parse_timestamp("last week"), None);
        assert_eq!(parse_timestamp("2025-02-30"), None);
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("Secret123").is_ok());
        assert!(validate_password_strength("secret123").is_err());
        assert!(validate_password_strength("SECRET123").is_err());
        assert!(validate_password_strength("SecretPass").is_err());
    }

    #[test]
    fn test_currency() {
        assert!(validate_currency("EUR").is_ok());
        assert!(validate_currency("usd").is_ok());
        assert!(validate_currency("EURO").is_err());
        assert!(validate_currency("U5D").is_err());
    }
}

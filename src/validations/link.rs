use std::borrow::Cow;

use url::Url;
use validator::ValidationError;

pub const INVALID_URL: &str = "invalid_url";
pub const INVALID_KEY_FORMAT: &str = "invalid_key_format";
pub const KEY_TOO_LONG: &str = "key_too_long";

fn error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates that a URL string is absolute and uses http/https.
///
/// The string is checked as given; callers trim it first.
pub fn validate_url(url_str: &str) -> Result<(), ValidationError> {
    if url_str.is_empty() {
        return Err(error(INVALID_URL, "URL must not be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(error(
                    INVALID_URL,
                    format!("URL scheme must be http or https, got '{}'", url.scheme()),
                ));
            }

            if url.host().is_none() {
                return Err(error(INVALID_URL, "URL must have a host"));
            }

            Ok(())
        }
        Err(e) => Err(error(INVALID_URL, format!("Invalid URL format: {}", e))),
    }
}

/// Path segments owned by other routes; `/{key}` can never reach these.
pub const RESERVED_KEYS: [&str; 3] = ["api", "health", "l"];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Validates a caller-chosen key: ASCII letters and digits only, at most
/// `max_len` characters.
pub fn validate_custom_key(key: &str, max_len: usize) -> Result<(), ValidationError> {
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(error(
            INVALID_KEY_FORMAT,
            "Custom key may only contain letters and digits",
        ));
    }

    if key.len() > max_len {
        return Err(error(
            KEY_TOO_LONG,
            format!("Custom key is too long (max {} characters)", max_len),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        // Valid URLs
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/path?query=value").is_ok());
        assert!(validate_url("HTTPS://EXAMPLE.COM/Upper").is_ok());

        // Invalid URLs
        assert!(validate_url("").is_err());
        assert!(validate_url("not-a-url").is_err());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("javascript:alert(1)").is_err());
        assert!(validate_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn url_errors_carry_their_code() {
        let err = validate_url("ftp://x.com").unwrap_err();
        assert_eq!(err.code, INVALID_URL);
    }

    #[test]
    fn test_validate_custom_key() {
        assert!(validate_custom_key("mykey", 12).is_ok());
        assert!(validate_custom_key("MyKey123", 12).is_ok());
        assert!(validate_custom_key(&"a".repeat(12), 12).is_ok());

        assert_eq!(validate_custom_key("", 12).unwrap_err().code, INVALID_KEY_FORMAT);
        assert_eq!(validate_custom_key("bad key!", 12).unwrap_err().code, INVALID_KEY_FORMAT);
        assert_eq!(validate_custom_key("with-dash", 12).unwrap_err().code, INVALID_KEY_FORMAT);
        assert_eq!(validate_custom_key("ünïcode", 12).unwrap_err().code, INVALID_KEY_FORMAT);
        assert_eq!(validate_custom_key(&"a".repeat(13), 12).unwrap_err().code, KEY_TOO_LONG);
    }

    #[test]
    fn format_is_checked_before_length() {
        let long_and_bad = format!("{}!", "a".repeat(20));
        assert_eq!(
            validate_custom_key(&long_and_bad, 12).unwrap_err().code,
            INVALID_KEY_FORMAT
        );
    }

    #[test]
    fn route_names_are_reserved() {
        assert!(is_reserved_key("health"));
        assert!(is_reserved_key("api"));
        assert!(is_reserved_key("l"));
        assert!(!is_reserved_key("Health"));
        assert!(!is_reserved_key("abc123"));
    }
}

/// Identifier validation - rejects malformed login identifiers before they
/// reach storage
/// Features:
/// 1. DoS protection: length limits on attacker-supplied identifiers
/// 2. Format validation: identifiers are email-shaped
/// 3. Data theft protection: null bytes and control characters rejected

use lazy_static::lazy_static;
use regex::Regex;

const MAX_IDENTIFIER_LENGTH: usize = 254; // RFC 5321
const MIN_IDENTIFIER_LENGTH: usize = 5;
const MAX_LOCAL_PART_LENGTH: usize = 64;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref IDENTIFIER_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates a login identifier (email-shaped username).
///
/// Returns the trimmed identifier on success. Callers in the denial path
/// must not surface the precise reason; the distinction is for logs only.
pub fn is_valid_identifier(identifier: &str) -> Result<String, IdentifierError> {
    let trimmed = identifier.trim();

    if trimmed.is_empty() {
        return Err(IdentifierError::Empty);
    }

    // Length validation - prevent DoS with extremely long inputs
    if trimmed.len() < MIN_IDENTIFIER_LENGTH {
        return Err(IdentifierError::TooShort(MIN_IDENTIFIER_LENGTH));
    }

    if trimmed.len() > MAX_IDENTIFIER_LENGTH {
        return Err(IdentifierError::TooLong(MAX_IDENTIFIER_LENGTH));
    }

    if has_suspicious_patterns(trimmed) {
        return Err(IdentifierError::SuspiciousContent);
    }

    if !IDENTIFIER_REGEX.is_match(trimmed) {
        return Err(IdentifierError::InvalidFormat);
    }

    Ok(trimmed.to_string())
}

/// Detects patterns that a well-formed identifier never contains
fn has_suspicious_patterns(identifier: &str) -> bool {
    // Null bytes and control characters
    if identifier.chars().any(|c| c.is_control()) {
        return true;
    }

    // Exactly one @ separator
    if identifier.matches('@').count() != 1 {
        return true;
    }

    // Oversized local part (before @)
    if let Some(at_pos) = identifier.find('@') {
        if identifier[..at_pos].len() > MAX_LOCAL_PART_LENGTH {
            return true;
        }
    }

    false
}

#[derive(Debug, PartialEq, Eq)]
pub enum IdentifierError {
    Empty,
    TooShort(usize),
    TooLong(usize),
    InvalidFormat,
    SuspiciousContent,
}

impl std::fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierError::Empty => write!(f, "identifier is empty"),
            IdentifierError::TooShort(min) => {
                write!(f, "identifier is too short (minimum {} characters)", min)
            }
            IdentifierError::TooLong(max) => {
                write!(f, "identifier is too long (maximum {} characters)", max)
            }
            IdentifierError::InvalidFormat => write!(f, "identifier has invalid format"),
            IdentifierError::SuspiciousContent => {
                write!(f, "identifier contains suspicious content")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(is_valid_identifier("user@example.com").is_ok());
        assert!(is_valid_identifier("test.email@domain.co.uk").is_ok());
        assert!(is_valid_identifier("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(
            is_valid_identifier("  user@example.com  ").unwrap(),
            "user@example.com"
        );
    }

    #[test]
    fn test_invalid_format() {
        assert!(is_valid_identifier("invalid").is_err());
        assert!(is_valid_identifier("user@").is_err());
        assert!(is_valid_identifier("@example.com").is_err());
        assert!(is_valid_identifier("user@@example.com").is_err());
    }

    #[test]
    fn test_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(is_valid_identifier(&too_long).is_err());

        assert!(is_valid_identifier("a@b").is_err()); // too short
        assert!(is_valid_identifier("").is_err());
    }

    #[test]
    fn test_oversized_local_part() {
        let oversized = format!("{}@example.com", "a".repeat(65));
        assert_eq!(
            is_valid_identifier(&oversized),
            Err(IdentifierError::SuspiciousContent)
        );
    }

    #[test]
    fn test_control_characters() {
        assert!(is_valid_identifier("user\0@example.com").is_err());
        assert!(is_valid_identifier("user\n@example.com").is_err());
    }
}

//! Maps a numeric student identifier onto a synthetic provider account.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Fixed domain suffix appended to every student number to form a login name.
pub const LOGIN_DOMAIN: &str = "@student.local";

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5,}$").expect("identifier pattern"));

/// Login credentials derived from a student number.
///
/// The password is deliberately the identifier itself; the account is a
/// synthetic one that exists only so the external provider can own auth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Please enter your student number.")]
    Empty,
    #[error("The student number must be digits only, at least 5 of them.")]
    Malformed,
}

/// Validate a raw identifier and derive the account credentials for it.
///
/// The input is trimmed first; anything that is not at least five digits is
/// rejected before any network call happens.
pub fn credentials_for(identifier: &str) -> Result<Credentials, IdentifierError> {
    let id = identifier.trim();
    if id.is_empty() {
        return Err(IdentifierError::Empty);
    }
    if !IDENTIFIER_RE.is_match(id) {
        return Err(IdentifierError::Malformed);
    }
    Ok(Credentials {
        email: format!("{id}{LOGIN_DOMAIN}"),
        password: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_identifier_to_login_and_password() {
        let creds = credentials_for("1234567890").unwrap();
        assert_eq!(creds.email, "1234567890@student.local");
        assert_eq!(creds.password, "1234567890");
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let creds = credentials_for("  12345 ").unwrap();
        assert_eq!(creds.email, "12345@student.local");
        assert_eq!(creds.password, "12345");
    }

    #[test]
    fn test_rejects_empty_input() {
        assert_eq!(credentials_for("   "), Err(IdentifierError::Empty));
    }

    #[test]
    fn test_rejects_short_input() {
        assert_eq!(credentials_for("1234"), Err(IdentifierError::Malformed));
    }

    #[test]
    fn test_rejects_non_digit_input() {
        assert_eq!(credentials_for("12a45"), Err(IdentifierError::Malformed));
        assert_eq!(credentials_for("12345x"), Err(IdentifierError::Malformed));
    }
}

use thiserror::Error;

/// Shortest username (after trimming) that is allowed to reach the network.
pub const MIN_USERNAME_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Username is required")]
    TooShort,
}

/// A username that passed validation and may be sent to GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCommand {
    pub username: String,
}

/// Validates the raw contents of the username field.
pub fn validate_username(input: &str) -> Result<SearchCommand, ValidationError> {
    let username = input.trim();

    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::TooShort);
    }

    Ok(SearchCommand {
        username: username.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_single_character_input() {
        for input in ["", "a", "   ", " a ", "\tb\n"] {
            assert_eq!(validate_username(input), Err(ValidationError::TooShort), "{input:?}");
        }
    }

    #[test]
    fn rejection_message_matches_field_text() {
        assert_eq!(ValidationError::TooShort.to_string(), "Username is required");
    }

    #[test]
    fn accepts_two_characters_and_trims() {
        let command = validate_username("  torvalds ").unwrap();
        assert_eq!(command.username, "torvalds");

        assert_eq!(validate_username("ab").unwrap().username, "ab");
    }

    #[test]
    fn counts_characters_not_bytes() {
        // one scalar value, two bytes
        assert!(validate_username("é").is_err());
        assert!(validate_username("éé").is_ok());
    }
}

//! Client-side input validation.
//!
//! These checks run before any request is sent; a failure never reaches the
//! network.

use thiserror::Error;

/// Maximum length of a username or login identifier
pub const MAX_IDENTIFIER_CHARS: usize = 20;

/// Allowed password length range (inclusive)
pub const PASSWORD_CHARS: std::ops::RangeInclusive<usize> = 8..=16;

/// Maximum chat message length accepted by the server
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Username must not be empty")]
    EmptyIdentifier,

    #[error("Username must be at most {max} characters")]
    IdentifierTooLong { max: usize },

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },

    #[error("Password may only contain letters and digits")]
    PasswordCharset,

    #[error("Password and confirmation do not match")]
    PasswordMismatch,

    #[error("New password must differ from the current one")]
    PasswordUnchanged,

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("Message must be at most {max} characters")]
    MessageTooLong { max: usize },

    #[error("Search query must not be empty")]
    EmptyQuery,

    #[error("Room must not be empty")]
    EmptyRoom,
}

/// Validate a login identifier (username or user id).
pub fn validate_identifier(identifier: &str) -> Result<(), ValidationError> {
    if identifier.is_empty() {
        return Err(ValidationError::EmptyIdentifier);
    }
    if identifier.chars().count() > MAX_IDENTIFIER_CHARS {
        return Err(ValidationError::IdentifierTooLong {
            max: MAX_IDENTIFIER_CHARS,
        });
    }
    Ok(())
}

/// Validate a password.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    if !PASSWORD_CHARS.contains(&password.chars().count()) {
        return Err(ValidationError::PasswordLength {
            min: *PASSWORD_CHARS.start(),
            max: *PASSWORD_CHARS.end(),
        });
    }
    if !password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::PasswordCharset);
    }
    Ok(())
}

/// Validate the login form.
pub fn validate_login(identifier: &str, password: &str) -> Result<(), ValidationError> {
    validate_identifier(identifier)?;
    validate_password(password)
}

/// Validate the registration form.
pub fn validate_registration(
    username: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    validate_identifier(username)?;
    validate_password(password)?;
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Validate a new username and return it trimmed.
pub fn validate_new_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();
    validate_identifier(trimmed)?;
    Ok(trimmed.to_string())
}

/// Validate a password change; the current password is only checked for presence.
pub fn validate_password_change(
    current_password: &str,
    new_password: &str,
) -> Result<(), ValidationError> {
    if current_password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    validate_password(new_password)?;
    if current_password == new_password {
        return Err(ValidationError::PasswordUnchanged);
    }
    Ok(())
}

/// Validate a chat message and return the trimmed body to send.
pub fn validate_message_body(body: &str) -> Result<String, ValidationError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    if trimmed.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ValidationError::MessageTooLong {
            max: MAX_MESSAGE_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// Validate a search query and return it trimmed.
pub fn validate_query(query: &str) -> Result<String, ValidationError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(trimmed.to_string())
}

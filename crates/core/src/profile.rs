//! Account and customer-profile field validation.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Minimum password length accepted at registration and password change.
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum full-name length (characters).
pub const MAX_NAME_LENGTH: usize = 120;
/// Maximum phone number length (characters).
pub const MAX_PHONE_LENGTH: usize = 30;
/// Maximum bio length (characters).
pub const MAX_BIO_LENGTH: usize = 2_000;

/// Validate an email address and return it trimmed and lowercased.
pub fn normalize_email(email: &str) -> Result<String, CoreError> {
    let normalized = email.trim().to_ascii_lowercase();
    if !normalized.validate_email() {
        return Err(CoreError::Validation(format!(
            "'{}' is not a valid email address",
            email.trim()
        )));
    }
    Ok(normalized)
}

/// Validate that a password meets the minimum length.
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

/// Validate optional profile fields. Absent fields are not checked.
pub fn validate_profile(
    full_name: Option<&str>,
    phone: Option<&str>,
    bio: Option<&str>,
) -> Result<(), CoreError> {
    if let Some(name) = full_name {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("Name must not be empty".into()));
        }
        check_len("Name", name, MAX_NAME_LENGTH)?;
    }
    if let Some(phone) = phone {
        check_len("Phone", phone, MAX_PHONE_LENGTH)?;
        let valid = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
        if !valid {
            return Err(CoreError::Validation(format!(
                "Phone '{phone}' contains invalid characters"
            )));
        }
    }
    if let Some(bio) = bio {
        check_len("Bio", bio, MAX_BIO_LENGTH)?;
    }
    Ok(())
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {max} characters"
        )));
    }
    Ok(())
}

//! Registration input checks.

use lazy_static::lazy_static;
use regex::Regex;

use crate::db::NewUser;

lazy_static! {
    /// Loose `local@domain.tld` shape check; deliverability is not our concern
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[^\s@]+@[^\s@]+\.[^\s@]+$"
    ).unwrap();
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Check every field of a registration, collecting all failures.
pub fn validate_new_user(user: &NewUser) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if let Err(e) = validate_email(&user.email) {
        errors.push(FieldError::new("email", e));
    }
    if user.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if user.surname.trim().is_empty() {
        errors.push(FieldError::new("surname", "Surname is required"));
    }
    if user.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if user.password != user.repeat_password {
        errors.push(FieldError::new("repeat_password", "Passwords do not match"));
    }

    errors
}

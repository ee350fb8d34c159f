//! Request parameter rules.

use thiserror::Error;
use validator::ValidateEmail;

/// A request parameter broke a rule. `rule` is a stable code such as
/// `login-required` or `password-format`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {rule}")]
pub struct ValidationError {
    pub field: &'static str,
    pub rule: &'static str,
}

impl ValidationError {
    pub fn new(field: &'static str, rule: &'static str) -> Self {
        Self { field, rule }
    }
}

/// 5..20 characters, starting with a letter, then letters, digits, `-` or `_`.
pub fn is_simple_login(login: &str) -> bool {
    let length = login.chars().count();
    if !(5..=20).contains(&length) {
        return false;
    }
    let mut chars = login.chars();
    if !chars.next().is_some_and(char::is_alphabetic) {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

pub fn is_email(value: &str) -> bool {
    value.validate_email()
}

/// A simple login or an email address.
pub fn is_valid_login(login: &str) -> bool {
    is_simple_login(login) || is_email(login)
}

/// 5..50 characters with at least one lowercase, uppercase, digit and other character.
pub fn is_valid_password(password: &str) -> bool {
    let length = password.chars().count();
    if !(5..=50).contains(&length) {
        return false;
    }
    let (mut lower, mut upper, mut digit, mut other) = (false, false, false, false);
    for c in password.chars() {
        if c.is_lowercase() {
            lower = true;
        } else if c.is_uppercase() {
            upper = true;
        } else if c.is_numeric() {
            digit = true;
        } else {
            other = true;
        }
    }
    lower && upper && digit && other
}

pub fn validate_login(login: &str) -> Result<(), ValidationError> {
    if login.is_empty() {
        return Err(ValidationError::new("login", "login-required"));
    }
    if !is_valid_login(login) {
        return Err(ValidationError::new("login", "login-format"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new("password", "password-required"));
    }
    if !is_valid_password(password) {
        return Err(ValidationError::new("password", "password-format"));
    }
    Ok(())
}

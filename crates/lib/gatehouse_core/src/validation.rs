//! Input validation and generated display names.

use std::sync::LazyLock;

use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;

use crate::auth::AuthError;

/// Prefix of generated anonymous display names.
const ANONYMOUS_PREFIX: &str = "Anonymous-";

/// Length of the random suffix of anonymous display names.
const ANONYMOUS_SUFFIX_LEN: usize = 10;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$").expect("valid email regex")
});

static ANONYMOUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Anonymous-[A-Za-z0-9]{10}$").expect("valid anonymous-name regex")
});

/// Trim and lower-case an email.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check a normalized email against the accepted pattern.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(AuthError::ValidationError(format!("invalid email: {email}")))
    }
}

/// Normalize and validate in one step.
pub fn parse_email(email: &str) -> Result<String, AuthError> {
    let normalized = normalize_email(email);
    validate_email(&normalized)?;
    Ok(normalized)
}

pub fn validate_password(password: &str, min_len: usize) -> Result<(), AuthError> {
    if password.chars().count() < min_len {
        return Err(AuthError::ValidationError(format!(
            "Password must be at least {min_len} characters"
        )));
    }
    Ok(())
}

/// Generate a display name for users that did not provide one.
pub fn generate_anonymous_name() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ANONYMOUS_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{ANONYMOUS_PREFIX}{suffix}")
}

pub fn is_anonymous_name(name: &str) -> bool {
    ANONYMOUS_RE.is_match(name)
}

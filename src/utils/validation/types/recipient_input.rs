//! The user an identity verification link is issued to.
//!
//! A recipient is a username, which ends up in the session and in the
//! verification email, plus the address the link is mailed to.

use ammonia::is_html;
use anyhow::{bail, Context, Result};
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use validator::{ValidateEmail, ValidateNonControlCharacter};

use crate::utils::validation::{MAX_EMAIL_LENGTH, MAX_USERNAME_LENGTH};

/// A validated username and email address pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecipientInput {
    username: String,
    email: String,
}

impl RecipientInput {
    /// Validates both parts. The username is trimmed and NFKC-normalized,
    /// the email is trimmed and lowercased.
    pub fn new(username: &str, email: &str) -> Result<Self> {
        let username = Self::validate_username(username).context("Invalid username")?;
        let email = Self::validate_email(email).context("Invalid email")?;

        Ok(Self { username, email })
    }

    fn validate_username(raw: &str) -> Result<String> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            bail!("Username cannot be empty");
        }

        if trimmed.chars().count() > MAX_USERNAME_LENGTH {
            bail!("Username exceeds maximum length of {} characters", MAX_USERNAME_LENGTH);
        }

        if !trimmed.validate_non_control_character() {
            bail!("Username contains invalid control characters");
        }

        if is_html(trimmed) {
            bail!("Username cannot contain HTML");
        }

        Ok(trimmed.nfkc().collect())
    }

    fn validate_email(raw: &str) -> Result<String> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            bail!("Email address cannot be empty");
        }

        if trimmed.len() > MAX_EMAIL_LENGTH {
            bail!("Email address exceeds maximum length of {} characters", MAX_EMAIL_LENGTH);
        }

        if !trimmed.validate_email() {
            bail!("Invalid email format");
        }

        Ok(trimmed.to_lowercase())
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Display for RecipientInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.username, self.email)
    }
}

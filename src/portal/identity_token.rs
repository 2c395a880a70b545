//! Extraction of the values the portal receives in its query string.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use url::form_urlencoded;

use crate::consts::{IDENTITY_TOKEN_PARAM, REDIRECTION_URL_PARAM};

const MAX_TOKEN_LENGTH: usize = 512;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._~-]+$").expect("token pattern is valid"));

/// Opaque single-use token binding a registration link to the identity
/// verification that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityToken(String);

impl IdentityToken {
    /// Returns `None` for empty, oversized or malformed values.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.len() > MAX_TOKEN_LENGTH || !TOKEN_PATTERN.is_match(trimmed) {
            return None;
        }

        Some(IdentityToken(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Reads the identity token from a query string such as `?token=abc`.
pub fn extract_identity_token(query: &str) -> Option<IdentityToken> {
    query_param(query, IDENTITY_TOKEN_PARAM).and_then(|raw| IdentityToken::parse(&raw))
}

/// Reads the optional post-logout target. Still untrusted.
pub fn extract_redirection_url(query: &str) -> Option<String> {
    query_param(query, REDIRECTION_URL_PARAM)
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

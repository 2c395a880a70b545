//! A post-logout redirection target that is safe to send the browser to.

use anyhow::{bail, Context, Result};
use std::fmt;
use url::Url;

use crate::utils::validation::MAX_REDIRECTION_LENGTH;

/// A target URL served over HTTPS from the protected domain or one of its subdomains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectionInput {
    url: Url,
}

impl RedirectionInput {
    /// Validates `raw` against `protected_domain`.
    pub fn new(raw: &str, protected_domain: &str) -> Result<Self> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            bail!("Redirection target cannot be empty");
        }

        if trimmed.len() > MAX_REDIRECTION_LENGTH {
            bail!("Redirection target exceeds maximum length of {} characters", MAX_REDIRECTION_LENGTH);
        }

        let url = Url::parse(trimmed).context("Redirection target is not an absolute URL")?;

        if url.scheme() != "https" {
            bail!("Redirection target must use https");
        }

        if !url.username().is_empty() || url.password().is_some() {
            bail!("Redirection target cannot carry credentials");
        }

        let host = url.host_str().context("Redirection target has no host")?;
        if !is_within_domain(host, protected_domain) {
            bail!("Redirection target {} is outside of the protected domain", host);
        }

        Ok(Self { url })
    }
}

fn is_within_domain(host: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches('.').to_lowercase();
    if domain.is_empty() {
        return false;
    }

    host == domain || host.ends_with(&format!(".{}", domain))
}

impl fmt::Display for RedirectionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

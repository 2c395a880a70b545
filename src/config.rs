//! Configuration lue depuis l'environnement (et un éventuel fichier `.env`).

use std::{env, path::PathBuf, str::FromStr, time::Duration};
use anyhow::{Context, Result};
use url::Url;
use crate::consts;

/// Configuration de la partie vérificatrice.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Origin of the portal. Doubles as the U2F appId.
    pub portal_url: Url,
    /// Post-logout targets must live on this domain or one of its subdomains.
    pub protected_domain: String,
    pub identity_token_ttl: Duration,
    pub secure_cookies: bool,
    pub devices_db_path: Option<PathBuf>,
    pub emails_db_path: Option<PathBuf>,
}

/// Réglages des parcours côté portail.
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub ceremony_timeout: Duration,
    pub settle_delay: Duration,
    pub first_factor_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: consts::HTTP_HOST.to_string(),
            port: consts::HTTP_PORT,
            portal_url: Url::parse(consts::PORTAL_URL).expect("default portal URL is valid"),
            protected_domain: consts::PROTECTED_DOMAIN.to_string(),
            identity_token_ttl: consts::IDENTITY_TOKEN_TTL,
            secure_cookies: false,
            devices_db_path: None,
            emails_db_path: None,
        }
    }
}

impl Default for FlowSettings {
    fn default() -> Self {
        FlowSettings {
            ceremony_timeout: consts::CEREMONY_TIMEOUT,
            settle_delay: consts::SIGN_OUT_SETTLE_DELAY,
            first_factor_path: consts::FIRST_FACTOR_PATH.to_string(),
        }
    }
}

impl Config {
    /// Charge la configuration depuis les variables d'environnement.
    /// Les valeurs absentes retombent sur les constantes de `consts`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let defaults = Config::default();

        let portal_url = match env::var("PORTAL_URL") {
            Ok(raw) => Url::parse(&raw).context("PORTAL_URL is not a valid URL")?,
            Err(_) => defaults.portal_url,
        };

        Ok(Config {
            host: env::var("PORTAL_HOST").unwrap_or(defaults.host),
            port: parse_var("PORTAL_PORT")?.unwrap_or(defaults.port),
            portal_url,
            protected_domain: env::var("PROTECTED_DOMAIN").unwrap_or(defaults.protected_domain),
            identity_token_ttl: parse_var("IDENTITY_TOKEN_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.identity_token_ttl),
            secure_cookies: parse_var("SECURE_COOKIES")?.unwrap_or(defaults.secure_cookies),
            devices_db_path: Some(
                env::var("DEVICES_DB_PATH").unwrap_or_else(|_| consts::DEVICES_DB_PATH.to_string()).into(),
            ),
            emails_db_path: Some(
                env::var("EMAILS_DB_PATH").unwrap_or_else(|_| consts::EMAILS_DB_PATH.to_string()).into(),
            ),
        })
    }

    /// Adresse d'écoute au format `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The appId handed out with every challenge: the portal origin without a trailing slash.
    pub fn app_id(&self) -> String {
        self.portal_url.origin().ascii_serialization()
    }
}

impl FlowSettings {
    /// Lit `CEREMONY_TIMEOUT_SECS` et `SIGN_OUT_SETTLE_MS`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let defaults = FlowSettings::default();

        Ok(FlowSettings {
            ceremony_timeout: parse_var("CEREMONY_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.ceremony_timeout),
            settle_delay: parse_var("SIGN_OUT_SETTLE_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.settle_delay),
            first_factor_path: defaults.first_factor_path,
        })
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: {}", name, raw)),
        Err(_) => Ok(None),
    }
}

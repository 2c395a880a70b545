//! Gestion des fonctionnalités liées aux emails: création et envoi simulé
//! des liens de vérification d'identité.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use log::info;
use once_cell::sync::Lazy;
use serde_json::json;
use std::time::Duration;
use url::Url;
use crate::consts::{IDENTITY_TOKEN_PARAM, REGISTER_SECURITY_KEY_PATH};
use crate::database;

const IDENTITY_VERIFICATION_TEMPLATE: &str = "identity_verification";

// Les emails sont en texte brut: pas d'échappement HTML.
static HBS: Lazy<Handlebars> = Lazy::new(|| {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(handlebars::no_escape);
    hbs.register_template_string(
        IDENTITY_VERIFICATION_TEMPLATE,
        include_str!("../templates/identity_verification.hbs"),
    )
    .expect("Could not register identity verification template");
    hbs
});

/// Envoie un email simulé en ajoutant ses détails à la base de données.
pub fn send_mail(to: &str, subject: &str, body: &str) -> Result<()> {
    info!("Sending an email");
    database::email::add(to, subject, body)?;
    Ok(())
}

/// Construit le lien d'enregistrement d'une clé de sécurité.
pub fn registration_link(portal_url: &Url, token: &str) -> Result<Url> {
    let mut link = portal_url
        .join(REGISTER_SECURITY_KEY_PATH)
        .context("Failed to build registration link")?;
    link.query_pairs_mut().append_pair(IDENTITY_TOKEN_PARAM, token);
    Ok(link)
}

/// Envoie le lien de vérification d'identité à l'utilisateur.
pub fn send_identity_verification(to: &str, username: &str, link: &Url, ttl: Duration) -> Result<()> {
    let body = HBS
        .render(
            IDENTITY_VERIFICATION_TEMPLATE,
            &json!({
                "username": username,
                "link": link.as_str(),
                "ttl_minutes": (ttl.as_secs() / 60).max(1),
            }),
        )
        .context("Failed to render identity verification email")?;

    send_mail(to, "Register your security key", &body)
}

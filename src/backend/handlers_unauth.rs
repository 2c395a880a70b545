//! Routes accessibles sans session identifiée: démarrage de la vérification
//! d'identité et déconnexion.

use axum::{
    extract::Json,
    http::StatusCode,
    Extension,
};
use log::{error, info, warn};
use std::sync::Arc;
use tower_sessions::Session;
use crate::backend::middlewares::USERNAME_KEY;
use crate::config::Config;
use crate::database::token;
use crate::email::{registration_link, send_identity_verification};
use crate::models::{IdentityStartBody, SignOutBody, SignOutResult};
use crate::utils::error_messages::{IDENTITY_ERROR, LOGOUT_ERROR};
use crate::utils::validation::{RecipientInput, RedirectionInput};

/// Démarre l'enregistrement d'une clé: attache l'utilisateur à la session et
/// lui envoie un lien contenant un jeton à usage unique.
pub async fn identity_start(
    Extension(config): Extension<Arc<Config>>,
    session: Session,
    Json(payload): Json<IdentityStartBody>,
) -> axum::response::Result<StatusCode> {
    let recipient = RecipientInput::new(&payload.username, &payload.email)
        .map_err(|_| (StatusCode::BAD_REQUEST, IDENTITY_ERROR))?;

    // Nouvel identifiant de session pour éviter la fixation de session
    session.cycle_id().await.map_err(|e| {
        error!("Failed to cycle session id: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, IDENTITY_ERROR)
    })?;
    session
        .insert(USERNAME_KEY, recipient.username())
        .await
        .map_err(|e| {
            error!("Failed to store session user: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, IDENTITY_ERROR)
        })?;

    let token = token::generate(recipient.username(), config.identity_token_ttl)
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, IDENTITY_ERROR))?;
    let link = registration_link(&config.portal_url, &token)
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, IDENTITY_ERROR))?;

    if let Err(e) = send_identity_verification(
        recipient.email(),
        recipient.username(),
        &link,
        config.identity_token_ttl,
    ) {
        error!("Failed to send identity verification email: {}", e);
        return Err((StatusCode::INTERNAL_SERVER_ERROR, IDENTITY_ERROR).into());
    }

    info!("Identity verification started for {}", recipient);
    Ok(StatusCode::OK)
}

/// Détruit la session et indique si la cible de redirection est sûre.
pub async fn logout(
    Extension(config): Extension<Arc<Config>>,
    session: Session,
    Json(payload): Json<SignOutBody>,
) -> axum::response::Result<Json<SignOutResult>> {
    session.flush().await.map_err(|e| {
        error!("Failed to destroy session: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, LOGOUT_ERROR)
    })?;

    let safe_target_url = match payload.target_url.as_deref() {
        Some(target) => match RedirectionInput::new(target, &config.protected_domain) {
            Ok(target) => {
                info!("Logout will redirect to {}", target);
                true
            }
            Err(e) => {
                warn!("Unsafe redirection target {:?}: {:#}", target, e);
                false
            }
        },
        None => false,
    };

    Ok(Json(SignOutResult { safe_target_url }))
}

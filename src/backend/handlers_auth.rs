//! Routes réservées à la session qui a démarré la vérification d'identité:
//! les deux étapes de l'enregistrement U2F.

use axum::{
    extract::Json,
    http::StatusCode,
    Extension,
};
use log::{error, info, warn};
use std::sync::Arc;
use crate::backend::middlewares::SessionUser;
use crate::config::Config;
use crate::database::{device, token};
use crate::models::{AuthenticatorResponse, IdentityFinishBody, RegistrationChallengeSet};
use crate::utils::error_messages::{FORBIDDEN_ERROR, IDENTITY_ERROR, REGISTRATION_ERROR};
use crate::utils::u2f::{complete_registration, encode_websafe, PendingRegistration};

/// Clé de session contenant l'enregistrement en attente.
const PENDING_REGISTRATION_KEY: &str = "pending_registration";

/// Étape 1: échange le jeton d'identité contre un défi d'enregistrement.
pub async fn identity_finish(
    Extension(config): Extension<Arc<Config>>,
    SessionUser { username, session }: SessionUser,
    Json(payload): Json<IdentityFinishBody>,
) -> axum::response::Result<Json<RegistrationChallengeSet>> {
    let owner = token::consume(payload.token.trim()).map_err(|e| {
        warn!("Identity token refused for {}: {}", username, e);
        (StatusCode::UNAUTHORIZED, IDENTITY_ERROR)
    })?;

    if owner != username {
        warn!("Identity token of {} presented by the session of {}", owner, username);
        return Err((StatusCode::FORBIDDEN, FORBIDDEN_ERROR).into());
    }

    // Un nouveau défi remplace tout défi précédent de la session.
    let pending = PendingRegistration::issue(&username, &config.app_id());
    session
        .insert(PENDING_REGISTRATION_KEY, &pending)
        .await
        .map_err(|e| {
            error!("Failed to store pending registration: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, REGISTRATION_ERROR)
        })?;

    Ok(Json(pending.challenge_set()))
}

/// Étape 2: vérifie la réponse de la clé et enregistre l'appareil.
pub async fn register(
    SessionUser { username, session }: SessionUser,
    Json(response): Json<AuthenticatorResponse>,
) -> axum::response::Result<StatusCode> {
    // Le défi est retiré quel que soit le résultat: il ne sert qu'une fois.
    let pending = session
        .remove::<PendingRegistration>(PENDING_REGISTRATION_KEY)
        .await
        .map_err(|e| {
            error!("Failed to read pending registration: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, REGISTRATION_ERROR)
        })?
        .filter(|pending| pending.username == username)
        .ok_or_else(|| {
            warn!("No pending registration for {}", username);
            (StatusCode::FORBIDDEN, FORBIDDEN_ERROR)
        })?;

    let registered = complete_registration(&response, &pending).map_err(|e| {
        warn!("Security key registration refused for {}: {}", username, e);
        if e.is_binding_failure() {
            (StatusCode::FORBIDDEN, FORBIDDEN_ERROR)
        } else {
            (StatusCode::BAD_REQUEST, REGISTRATION_ERROR)
        }
    })?;

    device::set(
        &username,
        device::Device {
            key_handle: encode_websafe(&registered.key_handle),
            public_key: encode_websafe(&registered.public_key),
            app_id: pending.app_id,
        },
    )
    .map_err(|e| {
        error!("Failed to save security key of {}: {}", username, e);
        (StatusCode::INTERNAL_SERVER_ERROR, REGISTRATION_ERROR)
    })?;

    info!("Security key registered for {}", username);
    Ok(StatusCode::OK)
}

//! Extracteur de l'utilisateur attaché à la session.
//! Rejette les requêtes dont la session n'a pas démarré de vérification d'identité.

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use log::warn;
use tower_sessions::Session;
use crate::utils::error_messages::FORBIDDEN_ERROR;

/// Clé de session contenant le nom de l'utilisateur.
pub const USERNAME_KEY: &str = "username";

/// Utilisateur de la session courante
pub struct SessionUser {
    pub username: String,
    pub session: Session,
}

#[async_trait::async_trait]
impl <S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>().cloned() {
            if let Ok(Some(username)) = session.get::<String>(USERNAME_KEY).await {
                return Ok(SessionUser { username, session });
            }
        }

        // Une autre session (autre appareil ou navigateur) que celle qui a
        // démarré la vérification.
        warn!("Request without an identified session");
        Err((StatusCode::FORBIDDEN, FORBIDDEN_ERROR))
    }
}

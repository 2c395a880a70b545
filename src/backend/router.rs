//! Configuration des routes de la partie vérificatrice.
//! Définit les routes accessibles avec ou sans session identifiée et configure les middlewares.

use std::sync::Arc;
use axum::{Extension, Router, routing::post};
use tower_sessions::{SessionManagerLayer, MemoryStore};
use tower_http::cors::{Any, CorsLayer};
use tower::ServiceBuilder;
use crate::backend::handlers_auth::{identity_finish, register};
use crate::backend::handlers_unauth::{identity_start, logout};
use crate::config::Config;
use crate::consts::{IDENTITY_FINISH_ENDPOINT, IDENTITY_START_ENDPOINT, LOGOUT_ENDPOINT, REGISTER_ENDPOINT};

/// Initialisation du routeur principal et des middlewares
pub fn get_router(config: Arc<Config>) -> Router {
    // Configuration des sessions en mémoire
    let store = MemoryStore::default();
    let session_manager = SessionManagerLayer::new(store)
        .with_http_only(true)
        .with_secure(config.secure_cookies);

    let service = ServiceBuilder::new()
        .layer(Extension(config))
        .layer(session_manager);

    let router = Router::new()
        .merge(unauth_routes())
        .merge(auth_routes())
        .layer(service);

    // Configuration CORS pour permettre les requêtes de n'importe quelle origine (en mode debug uniquement)
    if cfg!(debug_assertions) {
        let cors = CorsLayer::new()
            .allow_methods(tower_http::cors::AllowMethods::any())
            .allow_origin(Any);
        router.layer(cors)
    } else {
        router
    }
}

/// Routes accessibles sans session identifiée
fn unauth_routes() -> Router {
    Router::new()
        .route(IDENTITY_START_ENDPOINT, post(identity_start)) // Envoi du lien d'enregistrement
        .route(LOGOUT_ENDPOINT, post(logout)) // Déconnexion
}

/// Routes nécessitant la session qui a démarré la vérification
fn auth_routes() -> Router {
    Router::new()
        .route(IDENTITY_FINISH_ENDPOINT, post(identity_finish)) // Étape 1: défi d'enregistrement
        .route(REGISTER_ENDPOINT, post(register)) // Étape 2: réponse de la clé
}

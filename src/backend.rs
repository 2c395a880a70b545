//! Module principal de la partie vérificatrice.
//! Contient les gestionnaires des routes, le routeur et l'extracteur de session.
pub mod handlers_auth;
pub mod handlers_unauth;
mod middlewares;
pub mod router;

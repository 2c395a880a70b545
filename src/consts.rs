//! Définition des constantes globales pour l'application.

use std::time::Duration;

pub const HTTP_PORT: u16 = 9091; // Port par défaut du serveur HTTP.
pub const HTTP_HOST: &str = "0.0.0.0"; // Adresse d'écoute par défaut.
pub const PORTAL_URL: &str = "http://localhost:9091"; // Origine du portail, utilisée comme appId U2F.
pub const PROTECTED_DOMAIN: &str = "localhost"; // Domaine accepté pour les redirections après déconnexion.
pub const DEVICES_DB_PATH: &str = "./data/devices.yaml"; // Base de données des clés enregistrées.
pub const EMAILS_DB_PATH: &str = "./data/emails.yaml"; // Boîte d'envoi des emails simulés.

/// Durée de validité d'un jeton de vérification d'identité.
pub const IDENTITY_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);
/// Délai accordé à la clé de sécurité pour répondre au défi.
pub const CEREMONY_TIMEOUT: Duration = Duration::from_secs(60);
/// Délai entre la déconnexion et la navigation finale.
pub const SIGN_OUT_SETTLE_DELAY: Duration = Duration::from_millis(2000);

pub const U2F_VERSION: &str = "U2F_V2"; // Seule version de protocole émise.
pub const CHALLENGE_LENGTH: usize = 32; // Taille d'un défi en octets.

// Routes du portail
pub const FIRST_FACTOR_PATH: &str = "/";
pub const REGISTER_SECURITY_KEY_PATH: &str = "/security-key/register";

// Paramètres de requête
pub const IDENTITY_TOKEN_PARAM: &str = "token";
pub const REDIRECTION_URL_PARAM: &str = "rd";

// Points d'accès de la partie vérificatrice
pub const IDENTITY_START_ENDPOINT: &str = "/api/secondfactor/u2f/identity/start";
pub const IDENTITY_FINISH_ENDPOINT: &str = "/api/secondfactor/u2f/identity/finish";
pub const REGISTER_ENDPOINT: &str = "/api/secondfactor/u2f/register";
pub const LOGOUT_ENDPOINT: &str = "/api/logout";

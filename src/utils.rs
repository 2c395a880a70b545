//! Outils partagés: messages d'erreur, protocole U2F et validation des entrées.
pub mod error_messages;
pub mod u2f;
pub mod validation;

//! U2F enrollment handling for the verifying party.
//! Issues challenges, checks that an authenticator response is bound to the
//! challenge and origin of the session that asked for it, and extracts the
//! key material to store.
//!
//! The attestation signature is not verified here.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::consts::{CHALLENGE_LENGTH, U2F_VERSION};
use crate::models::{AuthenticatorResponse, ClientData, RegisterRequest, RegistrationChallengeSet};

/// `typ` of the client data produced by an enrollment.
pub const ENROLLMENT_TYPE: &str = "navigator.id.finishEnrollment";

const RESERVED_BYTE: u8 = 0x05;
const PUBLIC_KEY_LENGTH: usize = 65;
const UNCOMPRESSED_POINT: u8 = 0x04;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum U2fError {
    #[error("malformed {0}")]
    Malformed(&'static str),
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(String),
    #[error("unexpected client data type {0}")]
    UnexpectedType(String),
    #[error("challenge does not match the pending registration")]
    ChallengeMismatch,
    #[error("origin {0} does not match the application id")]
    OriginMismatch(String),
}

impl U2fError {
    /// Whether the response was well formed but bound to another ceremony.
    pub fn is_binding_failure(&self) -> bool {
        matches!(self, U2fError::ChallengeMismatch | U2fError::OriginMismatch(_))
    }
}

/// Registration state kept in the session between step 1 and step 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub username: String,
    pub app_id: String,
    pub challenge: String,
}

impl PendingRegistration {
    /// Creates a fresh single-use challenge for `username`.
    pub fn issue(username: &str, app_id: &str) -> Self {
        let mut bytes = [0u8; CHALLENGE_LENGTH];
        OsRng.fill_bytes(&mut bytes);

        PendingRegistration {
            username: username.to_string(),
            app_id: app_id.to_string(),
            challenge: URL_SAFE_NO_PAD.encode(bytes),
        }
    }

    pub fn challenge_set(&self) -> RegistrationChallengeSet {
        RegistrationChallengeSet {
            app_id: self.app_id.clone(),
            register_requests: vec![RegisterRequest {
                challenge: self.challenge.clone(),
                version: U2F_VERSION.to_string(),
            }],
        }
    }
}

/// Key material extracted from the registration data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredDevice {
    pub key_handle: Vec<u8>,
    pub public_key: Vec<u8>,
}

/// Checks `response` against the pending registration and returns the key to store.
pub fn complete_registration(
    response: &AuthenticatorResponse,
    pending: &PendingRegistration,
) -> Result<RegisteredDevice, U2fError> {
    if response.version != U2F_VERSION {
        return Err(U2fError::UnsupportedVersion(response.version.clone()));
    }

    let client_data = decode_client_data(&response.client_data)?;

    if client_data.typ != ENROLLMENT_TYPE {
        return Err(U2fError::UnexpectedType(client_data.typ));
    }

    if client_data.challenge != pending.challenge {
        return Err(U2fError::ChallengeMismatch);
    }

    if client_data.origin.trim_end_matches('/') != pending.app_id {
        return Err(U2fError::OriginMismatch(client_data.origin));
    }

    parse_registration_data(&response.registration_data)
}

/// Decodes websafe base64, with or without padding.
pub fn decode_websafe(raw: &str, what: &'static str) -> Result<Vec<u8>, U2fError> {
    URL_SAFE_NO_PAD
        .decode(raw.trim_end_matches('='))
        .map_err(|_| U2fError::Malformed(what))
}

pub fn encode_websafe(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn decode_client_data(raw: &str) -> Result<ClientData, U2fError> {
    let bytes = decode_websafe(raw, "client data")?;
    serde_json::from_slice(&bytes).map_err(|_| U2fError::Malformed("client data"))
}

/// Layout: reserved byte, uncompressed P-256 point, key handle length, key
/// handle, then the attestation certificate and signature.
fn parse_registration_data(raw: &str) -> Result<RegisteredDevice, U2fError> {
    let bytes = decode_websafe(raw, "registration data")?;

    let (&reserved, rest) = bytes
        .split_first()
        .ok_or(U2fError::Malformed("registration data"))?;
    if reserved != RESERVED_BYTE || rest.len() < PUBLIC_KEY_LENGTH + 1 {
        return Err(U2fError::Malformed("registration data"));
    }

    let (public_key, rest) = rest.split_at(PUBLIC_KEY_LENGTH);
    if public_key[0] != UNCOMPRESSED_POINT {
        return Err(U2fError::Malformed("public key"));
    }

    let (&handle_length, rest) = rest
        .split_first()
        .ok_or(U2fError::Malformed("registration data"))?;
    let handle_length = handle_length as usize;

    // Something must follow the handle: certificate and signature.
    if handle_length == 0 || rest.len() <= handle_length {
        return Err(U2fError::Malformed("key handle"));
    }

    Ok(RegisteredDevice {
        key_handle: rest[..handle_length].to_vec(),
        public_key: public_key.to_vec(),
    })
}

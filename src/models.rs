//! Wire types exchanged between the portal and the verifying party.

use serde::{Deserialize, Serialize};

/// One challenge of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub challenge: String,
    pub version: String,
}

/// Answer to step 1: the challenges the authenticator may answer for `app_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationChallengeSet {
    pub app_id: String,
    pub register_requests: Vec<RegisterRequest>,
}

/// A key already known to the verifying party. The authenticator refuses to
/// register a second time when it holds one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredKey {
    pub version: String,
    pub key_handle: String,
    pub app_id: String,
}

/// Signed answer of the authenticator to exactly one challenge.
///
/// Both data fields are websafe base64 without padding. The portal never
/// looks inside; it hands the value to step 2 untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorResponse {
    pub registration_data: String,
    pub client_data: String,
    pub version: String,
}

/// Step 1 request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityFinishBody {
    pub token: String,
}

/// Identity verification start request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityStartBody {
    pub username: String,
    pub email: String,
}

/// Logout request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOutBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

/// Logout answer. `safe_target_url` is true only when the supplied target
/// belongs to the protected domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOutResult {
    #[serde(rename = "safeTargetURL")]
    pub safe_target_url: bool,
}

/// Client data signed by the authenticator during enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientData {
    pub typ: String,
    pub challenge: String,
    pub origin: String,
}

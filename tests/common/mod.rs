//! Fakes shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use authportal::config::FlowSettings;
use authportal::models::{
    AuthenticatorResponse, RegisterRequest, RegisteredKey, RegistrationChallengeSet, SignOutResult,
};
use authportal::portal::{
    Authenticator, AuthenticatorError, CeremonyRequest, FlowError, FlowResult, IdentityToken, Navigation,
    Navigator, Notifications, PortalContext, VerifyingParty,
};
use authportal::utils::u2f::{encode_websafe, ENROLLMENT_TYPE};

pub const APP_ID: &str = "https://example.com";

/// Verifying party answering from a script and counting calls.
#[derive(Default)]
pub struct FakeVerifier {
    pub step1_error: Option<fn() -> FlowError>,
    pub step2_error: Option<fn() -> FlowError>,
    /// Never answer step 1 or step 2.
    pub step1_hangs: bool,
    pub step2_hangs: bool,
    /// `None` makes the sign-out call fail.
    pub sign_out_result: Option<SignOutResult>,
    pub step1_calls: AtomicUsize,
    pub step2_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    pub tokens: Mutex<Vec<String>>,
    pub finalized: Mutex<Vec<AuthenticatorResponse>>,
    pub sign_out_targets: Mutex<Vec<Option<String>>>,
}

#[async_trait]
impl VerifyingParty for FakeVerifier {
    async fn fetch_challenge(&self, token: &IdentityToken) -> FlowResult<RegistrationChallengeSet> {
        self.step1_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(token.to_string());

        if self.step1_hangs {
            return std::future::pending().await;
        }

        if let Some(error) = self.step1_error {
            return Err(error());
        }

        Ok(RegistrationChallengeSet {
            app_id: APP_ID.to_string(),
            register_requests: vec![RegisterRequest {
                challenge: "c1".to_string(),
                version: "U2F_V2".to_string(),
            }],
        })
    }

    async fn finalize(&self, response: &AuthenticatorResponse) -> FlowResult<()> {
        self.step2_calls.fetch_add(1, Ordering::SeqCst);
        self.finalized.lock().unwrap().push(response.clone());

        if self.step2_hangs {
            return std::future::pending().await;
        }

        match self.step2_error {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }

    async fn sign_out(&self, redirection_url: Option<&str>) -> FlowResult<SignOutResult> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.sign_out_targets
            .lock()
            .unwrap()
            .push(redirection_url.map(str::to_string));

        self.sign_out_result
            .ok_or(FlowError::Rejected(http::StatusCode::INTERNAL_SERVER_ERROR))
    }
}

pub enum Touch {
    Answer,
    Hang,
    Fail(AuthenticatorError),
}

/// Authenticator answering the first challenge with a marker of that challenge.
pub struct FakeAuthenticator {
    pub touch: Touch,
    pub calls: AtomicUsize,
}

impl FakeAuthenticator {
    pub fn new(touch: Touch) -> Arc<Self> {
        Arc::new(FakeAuthenticator { touch, calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl Authenticator for FakeAuthenticator {
    async fn register(
        &self,
        requests: &[CeremonyRequest],
        _registered_keys: &[RegisteredKey],
        _timeout: Duration,
    ) -> Result<AuthenticatorResponse, AuthenticatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.touch {
            Touch::Answer => Ok(AuthenticatorResponse {
                registration_data: "registration".to_string(),
                client_data: format!("bound-to:{}", requests[0].challenge),
                version: requests[0].version.clone(),
            }),
            Touch::Hang => std::future::pending().await,
            Touch::Fail(error) => Err(*error),
        }
    }
}

/// Software token producing well formed U2F enrollment responses.
pub struct SoftToken {
    pub key_handle: Vec<u8>,
}

#[async_trait]
impl Authenticator for SoftToken {
    async fn register(
        &self,
        requests: &[CeremonyRequest],
        _registered_keys: &[RegisteredKey],
        _timeout: Duration,
    ) -> Result<AuthenticatorResponse, AuthenticatorError> {
        let request = requests.first().ok_or(AuthenticatorError::BadRequest)?;

        let client_data = json!({
            "typ": ENROLLMENT_TYPE,
            "challenge": request.challenge,
            "origin": request.app_id,
        });

        let mut registration_data = vec![0x05, 0x04];
        registration_data.extend_from_slice(&[0x11; 64]);
        registration_data.push(self.key_handle.len() as u8);
        registration_data.extend_from_slice(&self.key_handle);
        registration_data.extend_from_slice(b"attestation-certificate-and-signature");

        Ok(AuthenticatorResponse {
            registration_data: encode_websafe(&registration_data),
            client_data: encode_websafe(client_data.to_string().as_bytes()),
            version: request.version.clone(),
        })
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub visited: Mutex<Vec<Navigation>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, to: Navigation) {
        self.visited.lock().unwrap().push(to);
    }
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<Navigation> {
        self.visited.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct RecordingNotifications {
    pub errors: Mutex<Vec<String>>,
}

impl Notifications for RecordingNotifications {
    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

impl RecordingNotifications {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

pub struct Harness {
    pub context: PortalContext,
    pub navigator: Arc<RecordingNavigator>,
    pub notifications: Arc<RecordingNotifications>,
}

pub fn harness(verifier: Arc<dyn VerifyingParty>, settings: FlowSettings) -> Harness {
    let navigator = Arc::new(RecordingNavigator::default());
    let notifications = Arc::new(RecordingNotifications::default());

    Harness {
        context: PortalContext {
            verifier,
            navigator: navigator.clone(),
            notifications: notifications.clone(),
            settings,
        },
        navigator,
        notifications,
    }
}

/// Like [`harness`], with flow settings read from the environment.
pub fn harness_from_env(verifier: Arc<dyn VerifyingParty>) -> Harness {
    let navigator = Arc::new(RecordingNavigator::default());
    let notifications = Arc::new(RecordingNotifications::default());

    Harness {
        context: PortalContext::from_env(verifier, navigator.clone(), notifications.clone()).unwrap(),
        navigator,
        notifications,
    }
}

pub fn first_factor() -> Navigation {
    Navigation::Internal("/".to_string())
}

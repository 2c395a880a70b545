//! Drives the user-present ceremony on the security key.

use async_trait::async_trait;
use log::{debug, info};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::models::{AuthenticatorResponse, RegisterRequest, RegisteredKey};
use crate::portal::error::{AuthenticatorError, FlowError, FlowResult};

/// A request as handed to the authenticator, carrying the application id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CeremonyRequest {
    pub app_id: String,
    pub challenge: String,
    pub version: String,
}

/// The platform capability talking to the hardware. All `requests` belong
/// to the same registration; the authenticator answers one of them.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn register(
        &self,
        requests: &[CeremonyRequest],
        registered_keys: &[RegisteredKey],
        timeout: Duration,
    ) -> Result<AuthenticatorResponse, AuthenticatorError>;
}

/// Presents challenges to an [`Authenticator`], bounded by a timeout and
/// by the liveness of the calling flow.
pub struct CeremonyDriver<'a> {
    authenticator: &'a dyn Authenticator,
}

impl<'a> CeremonyDriver<'a> {
    pub fn new(authenticator: &'a dyn Authenticator) -> Self {
        CeremonyDriver { authenticator }
    }

    /// Fails with [`FlowError::Timeout`] when nothing answers within
    /// `timeout` and with [`FlowError::Cancelled`] as soon as `liveness` is
    /// cancelled. In both cases the pending ceremony is dropped.
    pub async fn perform(
        &self,
        app_id: &str,
        requests: &[RegisterRequest],
        excluded: &[RegisteredKey],
        timeout: Duration,
        liveness: &CancellationToken,
    ) -> FlowResult<AuthenticatorResponse> {
        if requests.is_empty() {
            return Err(FlowError::EmptyChallengeSet);
        }

        let requests: Vec<CeremonyRequest> = requests
            .iter()
            .map(|request| CeremonyRequest {
                app_id: app_id.to_string(),
                challenge: request.challenge.clone(),
                version: request.version.clone(),
            })
            .collect();

        info!("Waiting for a security key touch ({} challenge(s))", requests.len());
        let ceremony = self.authenticator.register(&requests, excluded, timeout);

        tokio::select! {
            _ = liveness.cancelled() => {
                debug!("Ceremony abandoned");
                Err(FlowError::Cancelled)
            }
            outcome = tokio::time::timeout(timeout, ceremony) => match outcome {
                Ok(answer) => answer.map_err(FlowError::from),
                Err(_) => Err(FlowError::Timeout),
            },
        }
    }
}

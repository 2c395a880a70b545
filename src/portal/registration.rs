//! Security key registration: token → challenge → touch → finalize.

use log::{debug, error, info, warn};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::portal::authenticator::{Authenticator, CeremonyDriver};
use crate::portal::classifier::registration_notice;
use crate::portal::error::{FlowError, FlowResult};
use crate::portal::identity_token::{extract_identity_token, IdentityToken};
use crate::portal::navigation::Navigation;
use crate::portal::PortalContext;

/// Why a registration ended in [`RegistrationState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub reason: String,
    /// Message shown to the user, `None` when nothing was shown.
    pub notice: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    Idle,
    Fetching,
    AwaitingTouch,
    Finalizing,
    Succeeded,
    Failed(Failure),
}

/// One registration attempt, owned by the view hosting it.
///
/// The host calls [`mount`](Self::mount) once with the query string it was
/// opened with, and cancels the [`liveness`](Self::liveness) token when it
/// is torn down.
pub struct RegistrationFlow {
    context: PortalContext,
    authenticator: Arc<dyn Authenticator>,
    state: RegistrationState,
    started: bool,
    in_progress: bool,
    liveness: CancellationToken,
}

impl RegistrationFlow {
    pub fn new(context: PortalContext, authenticator: Arc<dyn Authenticator>) -> Self {
        RegistrationFlow {
            context,
            authenticator,
            state: RegistrationState::Idle,
            started: false,
            in_progress: false,
            liveness: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    /// Token the host cancels when it goes away. Pending steps then stop
    /// without notifying or navigating.
    pub fn liveness(&self) -> CancellationToken {
        self.liveness.clone()
    }

    /// Entry action. Runs the whole registration when `query` carries an
    /// identity token; stays [`RegistrationState::Idle`] otherwise. Only
    /// the first call on an instance does anything.
    pub async fn mount(&mut self, query: &str) -> &RegistrationState {
        if self.started {
            warn!("Registration flow already started, ignoring");
            return &self.state;
        }
        self.started = true;

        match extract_identity_token(query) {
            Some(token) => self.start(token).await,
            None => debug!("{}, registration stays idle", FlowError::MissingPrecondition),
        }

        &self.state
    }

    /// Leaves a failed registration for the first factor, where a new link
    /// (new token, new challenge) is requested. The instance returns to
    /// [`RegistrationState::Idle`] and may be mounted again.
    pub fn retry(&mut self) -> bool {
        if !matches!(self.state, RegistrationState::Failed(_)) || self.in_progress {
            warn!("Retry refused in state {:?}", self.state);
            return false;
        }

        self.state = RegistrationState::Idle;
        self.started = false;
        self.context
            .navigator
            .navigate(Navigation::Internal(self.context.settings.first_factor_path.clone()));
        true
    }

    /// Abandons the registration and returns to the first factor.
    pub fn cancel(&mut self) {
        self.liveness.cancel();
        self.context
            .navigator
            .navigate(Navigation::Internal(self.context.settings.first_factor_path.clone()));
    }

    async fn start(&mut self, token: IdentityToken) {
        if self.in_progress {
            warn!("{}", FlowError::AlreadyInProgress);
            return;
        }

        self.in_progress = true;
        let mut guard = InProgress { flow: self };
        let outcome = guard.flow.run(&token).await;
        guard.flow.settle(outcome);
    }

    async fn run(&mut self, token: &IdentityToken) -> FlowResult<()> {
        self.transition(RegistrationState::Fetching)?;
        let challenges = until_torn_down(&self.liveness, self.context.verifier.fetch_challenge(token)).await?;

        self.transition(RegistrationState::AwaitingTouch)?;
        let response = CeremonyDriver::new(self.authenticator.as_ref())
            .perform(
                &challenges.app_id,
                &challenges.register_requests,
                &[],
                self.context.settings.ceremony_timeout,
                &self.liveness,
            )
            .await?;

        self.transition(RegistrationState::Finalizing)?;
        until_torn_down(&self.liveness, self.context.verifier.finalize(&response)).await?;

        self.ensure_alive()
    }

    fn transition(&mut self, next: RegistrationState) -> FlowResult<()> {
        self.ensure_alive()?;
        debug!("Registration {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn ensure_alive(&self) -> FlowResult<()> {
        if self.liveness.is_cancelled() {
            return Err(FlowError::Cancelled);
        }
        Ok(())
    }

    fn is_pending(&self) -> bool {
        matches!(
            self.state,
            RegistrationState::Fetching | RegistrationState::AwaitingTouch | RegistrationState::Finalizing
        )
    }

    fn settle(&mut self, outcome: FlowResult<()>) {
        let err = match outcome {
            Ok(()) => {
                info!("Security key registered");
                self.state = RegistrationState::Succeeded;
                self.context
                    .navigator
                    .navigate(Navigation::Internal(self.context.settings.first_factor_path.clone()));
                return;
            }
            Err(err) => err,
        };

        // A result arriving after teardown is dropped.
        let err = if self.liveness.is_cancelled() { FlowError::Cancelled } else { err };

        let notice = registration_notice(&err);
        match notice {
            Some(message) => {
                error!("Security key registration failed: {}", err);
                self.context.notifications.error(message);
            }
            None => debug!("Security key registration stopped: {}", err),
        }

        self.state = RegistrationState::Failed(Failure {
            reason: err.to_string(),
            notice,
        });
    }
}

/// Clears the in-progress flag when a run ends, including when the caller
/// drops the `mount` future halfway. An abandoned run ends up in
/// `Failed(Cancelled)` so that [`RegistrationFlow::retry`] can recover it.
struct InProgress<'a> {
    flow: &'a mut RegistrationFlow,
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.flow.in_progress = false;

        if self.flow.is_pending() {
            debug!("Registration abandoned in {:?}", self.flow.state);
            self.flow.state = RegistrationState::Failed(Failure {
                reason: FlowError::Cancelled.to_string(),
                notice: None,
            });
        }
    }
}

/// Runs a verifying party call, giving up as soon as the host is torn down.
async fn until_torn_down<T>(
    liveness: &CancellationToken,
    step: impl Future<Output = FlowResult<T>>,
) -> FlowResult<T> {
    tokio::select! {
        _ = liveness.cancelled() => Err(FlowError::Cancelled),
        outcome = step => outcome,
    }
}

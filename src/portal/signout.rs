//! Sign-out: destroy the session, wait the settle delay, then leave.

use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::portal::error::FlowError;
use crate::portal::identity_token::extract_redirection_url;
use crate::portal::navigation::Navigation;
use crate::portal::PortalContext;
use crate::utils::error_messages::SIGN_OUT_FAILED;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutState {
    Pending,
    SigningOut,
    Settling,
    Done,
}

/// A single sign-out. Whatever the verifying party answers, the user is
/// navigated away exactly once after the settle delay, unless the host was
/// torn down first.
pub struct SignOutSequencer {
    context: PortalContext,
    state: SignOutState,
    safe_redirect: bool,
    liveness: CancellationToken,
}

impl SignOutSequencer {
    pub fn new(context: PortalContext) -> Self {
        SignOutSequencer {
            context,
            state: SignOutState::Pending,
            safe_redirect: false,
            liveness: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> SignOutState {
        self.state
    }

    pub fn liveness(&self) -> CancellationToken {
        self.liveness.clone()
    }

    /// Entry action: signs out with the target found in `query`, if any.
    pub async fn mount(&mut self, query: &str) -> Option<Navigation> {
        let redirection_url = extract_redirection_url(query);
        self.sign_out(redirection_url.as_deref()).await
    }

    /// Returns the navigation performed, `None` when the sequencer had
    /// already run or was torn down before the delay elapsed.
    pub async fn sign_out(&mut self, redirection_url: Option<&str>) -> Option<Navigation> {
        if self.state != SignOutState::Pending {
            warn!("Sign out already performed, ignoring");
            return None;
        }
        self.state = SignOutState::SigningOut;

        let outcome = tokio::select! {
            _ = self.liveness.cancelled() => {
                debug!("Sign out view torn down");
                return None;
            }
            outcome = self.context.verifier.sign_out(redirection_url) => outcome,
        };

        match outcome {
            Ok(result) => self.safe_redirect = result.safe_target_url,
            Err(err) => {
                let err = FlowError::SignOutFailure(Box::new(err));
                error!("{}", err);
                self.context.notifications.error(SIGN_OUT_FAILED);
            }
        }

        self.state = SignOutState::Settling;
        tokio::select! {
            _ = self.liveness.cancelled() => {
                debug!("Sign out view torn down while settling");
                return None;
            }
            _ = tokio::time::sleep(self.context.settings.settle_delay) => {}
        }

        self.state = SignOutState::Done;
        let navigation = self.destination(redirection_url);
        info!("Signed out, navigating to {:?}", navigation);
        self.context.navigator.navigate(navigation.clone());
        Some(navigation)
    }

    fn destination(&self, redirection_url: Option<&str>) -> Navigation {
        let first_factor = Navigation::Internal(self.context.settings.first_factor_path.clone());

        match redirection_url {
            Some(target) if self.safe_redirect => match Url::parse(target) {
                Ok(url) => Navigation::External(url),
                Err(e) => {
                    warn!("Redirection target {:?} is not a URL: {}", target, e);
                    first_factor
                }
            },
            _ => first_factor,
        }
    }
}

//! Client-side flows of the portal.
//!
//! Each flow is a state machine owned by the view hosting it. Outbound
//! effects go through the collaborators bundled in [`PortalContext`].

pub mod authenticator;
pub mod classifier;
pub mod error;
pub mod identity_token;
pub mod navigation;
pub mod registration;
pub mod signout;
pub mod verifier;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::FlowSettings;

pub use authenticator::{Authenticator, CeremonyDriver, CeremonyRequest};
pub use error::{AuthenticatorError, FlowError, FlowResult};
pub use identity_token::IdentityToken;
pub use navigation::{Navigation, Navigator, Notifications};
pub use registration::{Failure, RegistrationFlow, RegistrationState};
pub use signout::{SignOutSequencer, SignOutState};
pub use verifier::{HttpVerifyingParty, VerifyingParty};

/// Collaborators shared by the flows of one portal.
#[derive(Clone)]
pub struct PortalContext {
    pub verifier: Arc<dyn VerifyingParty>,
    pub navigator: Arc<dyn Navigator>,
    pub notifications: Arc<dyn Notifications>,
    pub settings: FlowSettings,
}

impl PortalContext {
    /// Context whose flow settings come from the environment
    /// (`CEREMONY_TIMEOUT_SECS`, `SIGN_OUT_SETTLE_MS`).
    pub fn from_env(
        verifier: Arc<dyn VerifyingParty>,
        navigator: Arc<dyn Navigator>,
        notifications: Arc<dyn Notifications>,
    ) -> Result<Self> {
        let settings = FlowSettings::from_env().context("Invalid portal flow settings")?;

        Ok(PortalContext {
            verifier,
            navigator,
            notifications,
            settings,
        })
    }
}

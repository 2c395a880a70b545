//! Failures of the portal flows.

use http::StatusCode;
use thiserror::Error;

/// Failure reported by the authenticator capability, using the U2F client error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthenticatorError {
    #[error("authenticator failed")]
    OtherError,
    #[error("authenticator rejected the request")]
    BadRequest,
    #[error("configuration not supported by the authenticator")]
    ConfigurationUnsupported,
    #[error("authenticator is not eligible (already registered?)")]
    DeviceIneligible,
    #[error("authenticator timed out")]
    Timeout,
}

impl AuthenticatorError {
    pub fn from_code(code: u8) -> Self {
        match code {
            2 => AuthenticatorError::BadRequest,
            3 => AuthenticatorError::ConfigurationUnsupported,
            4 => AuthenticatorError::DeviceIneligible,
            5 => AuthenticatorError::Timeout,
            _ => AuthenticatorError::OtherError,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            AuthenticatorError::OtherError => 1,
            AuthenticatorError::BadRequest => 2,
            AuthenticatorError::ConfigurationUnsupported => 3,
            AuthenticatorError::DeviceIneligible => 4,
            AuthenticatorError::Timeout => 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum FlowError {
    /// No identity token in the request. Not a failure the user sees.
    #[error("no identity token")]
    MissingPrecondition,

    #[error("identity token refused ({0})")]
    Unauthorized(StatusCode),

    /// The verifying party got the response from another device or browser
    /// than the one that asked for the challenge.
    #[error("registration completed from another device or browser")]
    OriginMismatch,

    #[error("no authenticator answered in time")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("verifying party answered {0}")]
    Rejected(StatusCode),

    #[error("verifying party sent no challenge")]
    EmptyChallengeSet,

    #[error("authenticator error {}: {}", .0.code(), .0)]
    Authenticator(AuthenticatorError),

    #[error("a registration is already in progress")]
    AlreadyInProgress,

    /// Never fatal: the sequencer still navigates after the settle delay.
    #[error("sign out failed: {0}")]
    SignOutFailure(Box<FlowError>),

    /// The hosting view went away.
    #[error("flow cancelled")]
    Cancelled,
}

impl From<AuthenticatorError> for FlowError {
    fn from(err: AuthenticatorError) -> Self {
        match err {
            AuthenticatorError::Timeout => FlowError::Timeout,
            other => FlowError::Authenticator(other),
        }
    }
}

pub type FlowResult<T> = Result<T, FlowError>;

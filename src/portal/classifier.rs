//! Maps registration failures to what the user is told.

use crate::portal::error::FlowError;
use crate::utils::error_messages::{REGISTRATION_FAILED, SAME_DEVICE_REQUIRED};

/// The notification a registration failure produces, if any.
///
/// Origin mismatches get their own message; every other failure the user
/// can act on gets the generic retry message.
pub fn registration_notice(err: &FlowError) -> Option<&'static str> {
    match err {
        FlowError::MissingPrecondition | FlowError::Cancelled | FlowError::AlreadyInProgress => None,
        FlowError::OriginMismatch => Some(SAME_DEVICE_REQUIRED),
        FlowError::Unauthorized(_)
        | FlowError::Timeout
        | FlowError::Transport(_)
        | FlowError::Rejected(_)
        | FlowError::EmptyChallengeSet
        | FlowError::Authenticator(_)
        | FlowError::SignOutFailure(_) => Some(REGISTRATION_FAILED),
    }
}

//! Constants used throughout the validation system


/// Maximum length for a username
pub const MAX_USERNAME_LENGTH: usize = 100;
/// Maximum length for an email address
pub const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum length for a redirection target
pub const MAX_REDIRECTION_LENGTH: usize = 2_048;

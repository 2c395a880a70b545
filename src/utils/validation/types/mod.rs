//! Type definitions for the validation system

mod recipient_input;
mod redirection_input;

// Re-export commonly used types and functions
pub use recipient_input::RecipientInput;
pub use redirection_input::RedirectionInput;

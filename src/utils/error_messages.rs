//! Messages returned to clients and shown to users.

// Verifying party rejections
pub const IDENTITY_ERROR: &str = "Identity verification failed";

pub const REGISTRATION_ERROR: &str = "Unable to register your security key.";

pub const FORBIDDEN_ERROR: &str = "Forbidden";

pub const LOGOUT_ERROR: &str = "Logout failed";

// Portal notifications
pub const SAME_DEVICE_REQUIRED: &str =
    "You must open the link from the same device and browser that initiated the registration process";

pub const REGISTRATION_FAILED: &str =
    "Failed to register your security key. The identity verification process might have timed out.";

pub const SIGN_OUT_FAILED: &str = "There was an issue signing out";

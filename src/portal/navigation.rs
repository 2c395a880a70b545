//! Collaborators the flows drive but do not own: the router of the hosting
//! application and its notification area.

use url::Url;

/// Where a flow sends the user once it is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Route transition inside the portal.
    Internal(String),
    /// Full navigation leaving the portal.
    External(Url),
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, to: Navigation);
}

pub trait Notifications: Send + Sync {
    fn error(&self, message: &str);
}

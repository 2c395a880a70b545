//! Security key registration and sign-out for an authentication portal.
//!
//! [`portal`] holds the client-side flows; [`backend`] is a verifying party
//! speaking the same protocol, used by the `authportal` binary and the
//! end-to-end tests.

pub mod backend;
pub mod config;
pub mod consts;
pub mod database;
pub mod email;
pub mod models;
pub mod portal;
pub mod utils;

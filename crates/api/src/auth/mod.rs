//! Authentication primitives.
//!
//! - [`jwt`] -- access-token generation/validation and refresh-token helpers.
//! - [`oauth_state`] -- HMAC-signed OAuth `state` values.
//! - [`github`] -- the GitHub identity provider.

pub mod github;
pub mod jwt;
pub mod oauth_state;

//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the user behind a valid access token.
//! - [`auth::MaybeAuthUser`] -- optional authentication on public routes.
//! - [`guards::RequireOwner`] -- owner-only routes.
//! - [`guards::RequireStoreAccess`] -- the points store.

pub mod auth;
pub mod guards;

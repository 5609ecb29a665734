//! Session tokens for the portal.
//!
//! A sign-in yields two credentials. The access token is a short-lived HS256
//! JWT carrying [`Claims`]; the refresh token is 32 random bytes, hex encoded,
//! and only its SHA-256 digest is stored in `user_sessions`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use onboard_core::hashing::sha256_hex;
use onboard_core::types::DbId;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{env_opt, env_or};

/// `iss` claim stamped on every access token.
pub const TOKEN_ISSUER: &str = "onboard-portal";

const REFRESH_TOKEN_BYTES: usize = 32;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's id.
    pub sub: DbId,
    /// Owner flag when the token was minted. The portal uses it to decide
    /// which navigation to show; owner routes always re-read the user row.
    pub is_owner: bool,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signs access tokens and OAuth `state` values.
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// | Env Var                    | Default  |
    /// |----------------------------|----------|
    /// | `JWT_SECRET`               | required |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | `15`     |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | `7`      |
    ///
    /// # Panics
    ///
    /// Panics when `JWT_SECRET` is missing or blank.
    pub fn from_env() -> Self {
        Self {
            secret: env_opt("JWT_SECRET").expect("JWT_SECRET must be set to a non-empty value"),
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", 15),
            refresh_token_expiry_days: env_or("JWT_REFRESH_EXPIRY_DAYS", 7),
        }
    }

    /// Access token lifetime, as reported in `expires_in` and the cookie
    /// `Max-Age`.
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    /// Expiry of a refresh session created now.
    pub fn refresh_expires_at(&self) -> chrono::DateTime<Utc> {
        Utc::now() + Duration::days(self.refresh_token_expiry_days)
    }
}

pub fn generate_access_token(
    user_id: DbId,
    is_owner: bool,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        is_owner,
        iss: TOKEN_ISSUER.to_string(),
        exp: iat + config.access_token_ttl_secs(),
        iat,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Decode an access token, checking signature, expiry and issuer.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[TOKEN_ISSUER]);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Returns `(plaintext, digest)`; only the digest is persisted.
pub fn generate_refresh_token() -> (String, String) {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let plaintext: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let digest = hash_refresh_token(&plaintext);
    (plaintext, digest)
}

pub fn hash_refresh_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

//! Handlers for the `/auth` resource (GitHub sign-in, refresh, logout).

use axum::extract::State;
use axum::http::header::{SET_COOKIE, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use chrono::Utc;
use onboard_db::models::session::CreateSession;
use onboard_db::models::user::{ProvisionUser, User, UserResponse};
use onboard_db::repositories::{SessionRepo, UserRepo};
use onboard_notify::bus::event_types;
use onboard_notify::PlatformEvent;
use serde::{Deserialize, Serialize};

use crate::auth::github::IdentityError;
use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::oauth_state;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, ACCESS_TOKEN_COOKIE};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Response body for `GET /auth/github/authorize`.
#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub authorize_url: String,
    pub state: String,
}

/// Request body for `POST /auth/github/callback`.
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    pub code: String,
    pub state: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by callback and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Whether this sign-in created the account.
    pub is_new_user: bool,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/auth/github/authorize
///
/// Start the OAuth flow: returns the GitHub URL to send the browser to and
/// the signed `state` it will echo back.
pub async fn github_authorize(State(state): State<AppState>) -> Json<AuthorizeResponse> {
    let signed = oauth_state::issue(&state.config.jwt.secret, Utc::now().timestamp());
    Json(AuthorizeResponse {
        authorize_url: state.identity.authorize_url(&signed),
        state: signed,
    })
}

/// POST /api/v1/auth/github/callback
///
/// Finish the OAuth flow. Unknown GitHub accounts are provisioned as regular
/// users (no ownership, no store access, zero points).
pub async fn github_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CallbackRequest>,
) -> AppResult<impl IntoResponse> {
    oauth_state::verify(&state.config.jwt.secret, &input.state, Utc::now().timestamp())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let identity = state
        .identity
        .exchange_code(&input.code)
        .await
        .map_err(|e| match e {
            IdentityError::Rejected(msg) => AppError::unauthorized(msg),
            other => AppError::InternalError(other.to_string()),
        })?;

    let (user, is_new_user) = match UserRepo::find_by_github_id(&state.pool, identity.github_id)
        .await?
    {
        Some(existing) => (existing, false),
        None => {
            let (first_name, last_name) = identity.split_name();
            let created = UserRepo::provision(
                &state.pool,
                &ProvisionUser {
                    github_id: identity.github_id,
                    github_username: identity.login.clone(),
                    avatar_url: identity.avatar_url.clone(),
                    personal_email: identity.email.clone(),
                    first_name,
                    last_name,
                },
            )
            .await?;
            tracing::info!(user_id = created.id, github = %identity.login, "Provisioned user");
            state.publish(
                PlatformEvent::new(event_types::USER_PROVISIONED)
                    .with_source("user", created.id)
                    .with_actor(created.id)
                    .with_payload(serde_json::json!({ "github_username": identity.login })),
            );
            (created, true)
        }
    };

    let user = UserRepo::record_login(
        &state.pool,
        user.id,
        &identity.login,
        identity.avatar_url.as_deref(),
    )
    .await?;

    let client = ClientInfo::from_headers(&headers);
    let (session, response) = new_session(&state, &user, is_new_user, client)?;
    SessionRepo::create(&state.pool, &session).await?;

    state.publish(PlatformEvent::new(event_types::USER_SIGNED_IN).with_actor(user.id));
    tracing::info!(user_id = user.id, "User signed in");

    Ok(with_cookie(&state, response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new access + refresh token pair. A token
/// that was already rotated is treated as stolen: every session of the user
/// is revoked.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<impl IntoResponse> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid or expired refresh token"))?;

    if session.is_revoked {
        let revoked = SessionRepo::revoke_all_for_user(&state.pool, session.user_id).await?;
        tracing::warn!(user_id = session.user_id, revoked, "Refresh token replay detected");
        return Err(AppError::unauthorized("Invalid or expired refresh token"));
    }

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

    let client = ClientInfo {
        user_agent: session.user_agent.clone(),
        ip_address: session.ip_address.clone(),
    };
    let (replacement, response) = new_session(&state, &user, false, client)?;

    if SessionRepo::rotate(&state.pool, session.id, &replacement)
        .await?
        .is_none()
    {
        let revoked = SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;
        tracing::warn!(user_id = user.id, revoked, "Refresh token replay detected");
        return Err(AppError::unauthorized("Invalid or expired refresh token"));
    }

    Ok(with_cookie(&state, response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    SessionRepo::revoke_all_for_user(&state.pool, auth.user_id).await?;
    let clear = format!("{ACCESS_TOKEN_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    Ok((StatusCode::NO_CONTENT, AppendHeaders([(SET_COOKIE, clear)])))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Who a session was opened from, as far as the proxy tells us.
struct ClientInfo {
    user_agent: Option<String>,
    ip_address: Option<String>,
}

impl ClientInfo {
    fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        // The left-most X-Forwarded-For entry is the original client.
        let ip_address = header("x-forwarded-for")
            .and_then(|chain| chain.split(',').next())
            .or_else(|| header("x-real-ip"))
            .map(|ip| ip.trim().to_string());
        Self {
            user_agent: header(USER_AGENT.as_str()).map(str::to_string),
            ip_address,
        }
    }
}

/// Mint an access token and a refresh session for `user`. The session row is
/// returned unsaved so refresh can persist it inside its rotation.
fn new_session(
    state: &AppState,
    user: &User,
    is_new_user: bool,
    client: ClientInfo,
) -> AppResult<(CreateSession, AuthResponse)> {
    let access_token = generate_access_token(user.id, user.is_owner, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();

    let session = CreateSession {
        user_id: user.id,
        refresh_token_hash: refresh_hash,
        expires_at: state.config.jwt.refresh_expires_at(),
        user_agent: client.user_agent,
        ip_address: client.ip_address,
    };

    let response = AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_ttl_secs(),
        is_new_user,
        user: UserResponse::from(user),
    };
    Ok((session, response))
}

/// Attach the access token cookie for browser clients.
fn with_cookie(state: &AppState, response: AuthResponse) -> impl IntoResponse {
    let cookie = format!(
        "{ACCESS_TOKEN_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        response.access_token,
        state.config.jwt.access_token_ttl_secs()
    );
    (AppendHeaders([(SET_COOKIE, cookie)]), Json(response))
}

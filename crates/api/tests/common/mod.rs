#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use onboard_api::auth::github::{GitHubConfig, GitHubIdentity, IdentityError, IdentityProvider};
use onboard_api::auth::jwt::{generate_access_token, JwtConfig};
use onboard_api::captcha::{CaptchaError, CaptchaVerifier};
use onboard_api::config::ServerConfig;
use onboard_api::router::build_app_router;
use onboard_api::state::AppState;
use onboard_db::models::user::{ProvisionUser, UpdateUserFlags, User};
use onboard_db::repositories::UserRepo;
use onboard_notify::{EmailError, EventBus, Mailer};

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hs256";
pub const FRONTEND_URL: &str = "http://localhost:5173";
pub const COMPANY_DOMAIN: &str = "example.com";
/// Token the stub CAPTCHA accepts.
pub const GOOD_CAPTCHA: &str = "captcha-ok";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![FRONTEND_URL.to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_url: String::new(),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        github: GitHubConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: format!("{FRONTEND_URL}/auth/callback"),
        },
        frontend_url: FRONTEND_URL.to_string(),
        company_email_domain: Some(COMPANY_DOMAIN.to_string()),
        captcha: None,
    }
}

// ---------------------------------------------------------------------------
// Stubs
// ---------------------------------------------------------------------------

/// Identity provider that accepts codes of the form `gh-<github id>` and
/// rejects everything else.
pub struct StubIdentity;

#[async_trait]
impl IdentityProvider for StubIdentity {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://github.test/login/oauth/authorize?state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<GitHubIdentity, IdentityError> {
        let github_id: i64 = code
            .strip_prefix("gh-")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| IdentityError::Rejected("bad_verification_code".to_string()))?;
        Ok(GitHubIdentity {
            github_id,
            login: format!("octo{github_id}"),
            avatar_url: None,
            email: Some(format!("octo{github_id}@users.test")),
            name: Some("Ada Lovelace".to_string()),
        })
    }
}

/// Mailer that records every code it was asked to send.
#[derive(Default)]
pub struct CapturingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl CapturingMailer {
    pub fn last_code(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), code.to_string()));
        Ok(())
    }
}

/// CAPTCHA verifier that only accepts [`GOOD_CAPTCHA`].
pub struct StubCaptcha;

#[async_trait]
impl CaptchaVerifier for StubCaptcha {
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError> {
        Ok(token == GOOD_CAPTCHA)
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<CapturingMailer>,
    pub event_bus: Arc<EventBus>,
}

/// Build the full application router through the same builder `main.rs`
/// uses, with stubbed outbound integrations.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_env(pool).router
}

/// Like [`build_test_app`], but also hands back the stubs for inspection.
pub fn build_test_env(pool: PgPool) -> TestApp {
    let config = test_config();
    let mailer = Arc::new(CapturingMailer::default());
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        identity: Arc::new(StubIdentity),
        mailer: Arc::clone(&mailer) as Arc<dyn Mailer>,
        captcha: Arc::new(StubCaptcha),
    };

    TestApp {
        router: build_app_router(state, &config),
        mailer,
        event_bus,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user directly, bypassing OAuth.
pub async fn create_user(pool: &PgPool, github_id: i64, first: &str, last: &str) -> User {
    UserRepo::provision(
        pool,
        &ProvisionUser {
            github_id,
            github_username: format!("user{github_id}"),
            avatar_url: None,
            personal_email: None,
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
        },
    )
    .await
    .expect("user provisioning should succeed")
}

/// Insert a user and grant ownership.
pub async fn create_owner(pool: &PgPool, github_id: i64) -> User {
    let user = create_user(pool, github_id, "Olive", "Owner").await;
    set_flags(
        pool,
        user.id,
        UpdateUserFlags {
            is_owner: Some(true),
            ..Default::default()
        },
    )
    .await
}

pub async fn set_flags(pool: &PgPool, user_id: i64, flags: UpdateUserFlags) -> User {
    UserRepo::update_flags(pool, user_id, &flags)
        .await
        .expect("flag update should succeed")
        .expect("user should exist")
}

/// Mint an access token for `user` signed with the test secret.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, user.is_owner, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status, then return the parsed body.
pub async fn expect_status(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    let actual = response.status();
    let json = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {json}");
    json
}

//! GitHub OAuth identity provider.
//!
//! [`IdentityProvider`] is the seam the auth handlers call; [`GitHubOAuth`]
//! implements it against the GitHub REST API with `reqwest`. Tests swap in a
//! stub so no network is touched.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::env_opt;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USER_URL: &str = "https://api.github.com/user";
const EMAILS_URL: &str = "https://api.github.com/user/emails";
const SCOPES: &str = "read:user user:email";
const USER_AGENT: &str = concat!("onboard-api/", env!("CARGO_PKG_VERSION"));

/// GitHub OAuth application settings.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Where GitHub sends the browser back to (the portal's callback page).
    pub redirect_uri: String,
}

impl GitHubConfig {
    /// | Env Var                | Required | Default                            |
    /// |------------------------|----------|------------------------------------|
    /// | `GITHUB_CLIENT_ID`     | **yes**  | --                                 |
    /// | `GITHUB_CLIENT_SECRET` | **yes**  | --                                 |
    /// | `GITHUB_REDIRECT_URI`  | no       | `<FRONTEND_URL>/auth/callback`     |
    pub fn from_env(frontend_url: &str) -> Self {
        Self {
            client_id: env_opt("GITHUB_CLIENT_ID").expect("GITHUB_CLIENT_ID must be set"),
            client_secret: env_opt("GITHUB_CLIENT_SECRET")
                .expect("GITHUB_CLIENT_SECRET must be set"),
            redirect_uri: env_opt("GITHUB_REDIRECT_URI")
                .unwrap_or_else(|| format!("{frontend_url}/auth/callback")),
        }
    }
}

/// The account details the portal keeps from a GitHub sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct GitHubIdentity {
    pub github_id: i64,
    pub login: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    /// Display name as set on the GitHub profile.
    pub name: Option<String>,
}

impl GitHubIdentity {
    /// Split the display name into `(first, last)` at the first whitespace.
    pub fn split_name(&self) -> (Option<String>, Option<String>) {
        let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
            return (None, None);
        };
        match name.split_once(char::is_whitespace) {
            Some((first, last)) => (Some(first.to_string()), Some(last.trim().to_string())),
            None => (Some(name.to_string()), None),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub answered but refused the exchange (bad or reused code).
    #[error("GitHub rejected the sign-in: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Browser URL that starts the OAuth flow.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the signed-in account.
    async fn exchange_code(&self, code: &str) -> Result<GitHubIdentity, IdentityError>;
}

pub struct GitHubOAuth {
    config: GitHubConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct UserResponse {
    id: i64,
    login: String,
    avatar_url: Option<String>,
    email: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct EmailEntry {
    email: String,
    primary: bool,
    verified: bool,
}

impl GitHubOAuth {
    pub fn new(config: GitHubConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn primary_email(&self, token: &str) -> Result<Option<String>, IdentityError> {
        let emails: Vec<EmailEntry> = self
            .client
            .get(EMAILS_URL)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(emails
            .into_iter()
            .find(|e| e.primary && e.verified)
            .map(|e| e.email))
    }
}

#[async_trait]
impl IdentityProvider for GitHubOAuth {
    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{AUTHORIZE_URL}?client_id={}&redirect_uri={}&state={}&scope={}",
            urlencoding(&self.config.client_id),
            urlencoding(&self.config.redirect_uri),
            urlencoding(state),
            urlencoding(SCOPES),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<GitHubIdentity, IdentityError> {
        let token: TokenResponse = self
            .client
            .post(TOKEN_URL)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let access_token = match token {
            TokenResponse {
                access_token: Some(t),
                ..
            } => t,
            TokenResponse {
                error,
                error_description,
                ..
            } => {
                return Err(IdentityError::Rejected(
                    error_description
                        .or(error)
                        .unwrap_or_else(|| "no access token returned".to_string()),
                ))
            }
        };

        let user: UserResponse = self
            .client
            .get(USER_URL)
            .bearer_auth(&access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // Private profile emails are only visible through /user/emails.
        let email = match user.email {
            Some(email) => Some(email),
            None => self.primary_email(&access_token).await?,
        };

        Ok(GitHubIdentity {
            github_id: user.id,
            login: user.login,
            avatar_url: user.avatar_url,
            email,
            name: user.name,
        })
    }
}

/// Percent-encode an OAuth query parameter.
fn urlencoding(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push(char::from(b"0123456789ABCDEF"[(b >> 4) as usize]));
                out.push(char::from(b"0123456789ABCDEF"[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: Option<&str>) -> GitHubIdentity {
        GitHubIdentity {
            github_id: 1,
            login: "octo".to_string(),
            avatar_url: None,
            email: None,
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn authorize_url_carries_client_and_state() {
        let provider = GitHubOAuth::new(GitHubConfig {
            client_id: "abc123".to_string(),
            client_secret: "s".to_string(),
            redirect_uri: "http://localhost:5173/auth/callback".to_string(),
        });
        let url = provider.authorize_url("n.1.ff");
        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("client_id=abc123"));
        assert!(url.contains("state=n.1.ff"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5173%2Fauth%2Fcallback"));
        assert!(url.contains("scope=read%3Auser%20user%3Aemail"));
    }

    #[test]
    fn name_splitting() {
        assert_eq!(
            identity(Some("Ada King Lovelace")).split_name(),
            (Some("Ada".to_string()), Some("King Lovelace".to_string()))
        );
        assert_eq!(identity(Some("Mononym")).split_name(), (Some("Mononym".to_string()), None));
        assert_eq!(identity(Some("  ")).split_name(), (None, None));
        assert_eq!(identity(None).split_name(), (None, None));
    }
}

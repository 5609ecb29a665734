use std::fmt::Debug;
use std::str::FromStr;

use crate::auth::github::GitHubConfig;
use crate::auth::jwt::JwtConfig;
use crate::captcha::CaptchaConfig;

const DEV_PORTAL_URL: &str = "http://localhost:5173";

/// Everything the portal API needs at startup, read once from the process
/// environment (after `.env` has been loaded by `main`).
///
/// SMTP settings live on [`onboard_notify::EmailConfig`] since the notify
/// crate owns delivery.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Grace period for the activity bus to drain on shutdown.
    pub shutdown_timeout_secs: u64,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub github: GitHubConfig,
    /// Public portal URL without a trailing slash. OAuth redirects and ticket
    /// QR payloads are built from it.
    pub frontend_url: String,
    /// Verified company emails must end in `@<domain>` when this is set.
    pub company_email_domain: Option<String>,
    /// `None` turns CAPTCHA checks off.
    pub captcha: Option<CaptchaConfig>,
}

impl ServerConfig {
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `10`                    |
    /// | `DATABASE_URL`          | required                |
    /// | `FRONTEND_URL`          | `http://localhost:5173` |
    /// | `COMPANY_EMAIL_DOMAIN`  | unset                   |
    ///
    /// JWT, GitHub and CAPTCHA variables are listed on their own types.
    ///
    /// # Panics
    ///
    /// On a missing `DATABASE_URL` or any value that fails to parse.
    pub fn from_env() -> Self {
        let frontend_url = env_opt("FRONTEND_URL")
            .unwrap_or_else(|| DEV_PORTAL_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let cors_origins =
            parse_list(&env_opt("CORS_ORIGINS").unwrap_or_else(|| DEV_PORTAL_URL.to_string()));

        Self {
            host: env_opt("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 10),
            database_url: env_opt("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt: JwtConfig::from_env(),
            github: GitHubConfig::from_env(&frontend_url),
            company_email_domain: env_opt("COMPANY_EMAIL_DOMAIN")
                .map(|d| d.trim_start_matches('@').to_lowercase()),
            captcha: CaptchaConfig::from_env(),
            frontend_url,
        }
    }
}

/// A variable's trimmed value, treating blank as unset.
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a variable, falling back to `default` when it is unset.
///
/// # Panics
///
/// When the variable is set but does not parse as `T`.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match env_opt(key) {
        Some(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value {raw:?}: {e:?}")),
        None => default,
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_list_skips_blank_entries() {
        assert_eq!(
            parse_list(" http://a.test , ,http://b.test,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn unset_numbers_fall_back_to_defaults() {
        assert_eq!(env_or::<u16>("ONBOARD_TEST_SURELY_UNSET_PORT", 3000), 3000);
        assert_eq!(env_opt("ONBOARD_TEST_SURELY_UNSET_HOST"), None);
    }
}

//! CAPTCHA token verification for public forms.
//!
//! The browser widget produces a token; [`SiteVerify`] checks it with the
//! provider's `siteverify` endpoint (Turnstile and hCaptcha share the same
//! form-encoded protocol). Without `CAPTCHA_SECRET`, [`NoCaptcha`] is used
//! and public endpoints accept requests without a token.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::env_opt;

const DEFAULT_VERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

#[derive(Debug, Clone)]
pub struct CaptchaConfig {
    pub secret: String,
    pub verify_url: String,
}

impl CaptchaConfig {
    /// | Env Var              | Required | Default                  |
    /// |----------------------|----------|--------------------------|
    /// | `CAPTCHA_SECRET`     | no       | unset disables CAPTCHA   |
    /// | `CAPTCHA_VERIFY_URL` | no       | Turnstile siteverify     |
    pub fn from_env() -> Option<Self> {
        let secret = env_opt("CAPTCHA_SECRET")?;
        Some(Self {
            secret,
            verify_url: env_opt("CAPTCHA_VERIFY_URL")
                .unwrap_or_else(|| DEFAULT_VERIFY_URL.to_string()),
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("CAPTCHA verification request failed: {0}")]
pub struct CaptchaError(#[from] reqwest::Error);

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Whether requests must carry a token at all.
    fn is_required(&self) -> bool {
        true
    }

    /// `Ok(false)` means the provider judged the token invalid.
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError>;
}

/// Verifier backed by a provider `siteverify` endpoint.
pub struct SiteVerify {
    config: CaptchaConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

impl SiteVerify {
    pub fn new(config: CaptchaConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CaptchaVerifier for SiteVerify {
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError> {
        let response: SiteVerifyResponse = self
            .client
            .post(&self.config.verify_url)
            .form(&[("secret", self.config.secret.as_str()), ("response", token)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if !response.success {
            tracing::info!(errors = ?response.error_codes, "CAPTCHA token rejected");
        }
        Ok(response.success)
    }
}

/// Used when no CAPTCHA secret is configured.
#[derive(Debug, Default)]
pub struct NoCaptcha;

#[async_trait]
impl CaptchaVerifier for NoCaptcha {
    fn is_required(&self) -> bool {
        false
    }

    async fn verify(&self, _token: &str) -> Result<bool, CaptchaError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siteverify_response_parses_error_codes() {
        let parsed: SiteVerifyResponse = serde_json::from_str(
            r#"{"success": false, "error-codes": ["invalid-input-response"]}"#,
        )
        .unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.error_codes, vec!["invalid-input-response".to_string()]);

        let ok: SiteVerifyResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(ok.success && ok.error_codes.is_empty());
    }

    #[tokio::test]
    async fn disabled_verifier_accepts_anything() {
        let verifier = NoCaptcha;
        assert!(!verifier.is_required());
        assert!(verifier.verify("").await.unwrap());
    }
}

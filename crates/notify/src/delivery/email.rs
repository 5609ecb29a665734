//! Verification mail.
//!
//! The OTP wizard only ever sends one kind of message, so [`Mailer`] has a
//! single method. [`SmtpMailer`] delivers through `lettre`; [`LogMailer`]
//! stands in on development machines without an SMTP relay.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use onboard_core::otp::OTP_TTL_MINUTES;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Invalid mailbox: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Could not assemble message: {0}")]
    Build(#[from] lettre::error::Error),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), EmailError>;
}

/// Subject and plain-text body of a verification code email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationMail {
    pub subject: &'static str,
    pub body: String,
}

impl VerificationMail {
    pub fn new(code: &str) -> Self {
        Self {
            subject: "Your onboarding verification code",
            body: format!(
                "Hi,\n\n\
                 Enter {code} in the onboarding portal to confirm your company email.\n\
                 The code expires in {OTP_TTL_MINUTES} minutes.\n\n\
                 If you did not ask for this, you can ignore this message."
            ),
        }
    }
}

/// Whether the relay connection is upgraded with STARTTLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    StartTls,
    /// Unencrypted, for local catch-all relays such as MailHog.
    Plain,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub security: SmtpSecurity,
    pub from_address: String,
    /// Username and password, only when both are set.
    pub credentials: Option<(String, String)>,
}

impl EmailConfig {
    /// | Variable        | Default                 |
    /// |-----------------|-------------------------|
    /// | `SMTP_HOST`     | unset disables SMTP     |
    /// | `SMTP_PORT`     | `587`                   |
    /// | `SMTP_TLS`      | `starttls` (or `none`)  |
    /// | `SMTP_FROM`     | `noreply@onboard.local` |
    /// | `SMTP_USER`     | unset                   |
    /// | `SMTP_PASSWORD` | unset                   |
    pub fn from_env() -> Option<Self> {
        let var = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let smtp_host = var("SMTP_HOST")?;
        let security = match var("SMTP_TLS").as_deref() {
            Some("none") | Some("off") => SmtpSecurity::Plain,
            _ => SmtpSecurity::StartTls,
        };
        let smtp_port = var("SMTP_PORT").and_then(|p| p.parse().ok()).unwrap_or(587);

        Some(Self {
            smtp_host,
            smtp_port,
            security,
            from_address: var("SMTP_FROM").unwrap_or_else(|| "noreply@onboard.local".to_string()),
            credentials: var("SMTP_USER").zip(var("SMTP_PASSWORD")),
        })
    }
}

#[derive(Debug)]
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Fails on an unparsable `from` address or relay host. No connection is
    /// made until the first send.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let builder = match config.security {
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            }
            SmtpSecurity::Plain => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            }
        };
        let builder = match config.credentials {
            Some((user, password)) => builder.credentials(Credentials::new(user, password)),
            None => builder,
        };

        Ok(Self {
            from: config.from_address.parse()?,
            transport: builder.port(config.smtp_port).build(),
        })
    }

    fn compose(&self, to: &str, mail: VerificationMail) -> Result<Message, EmailError> {
        Ok(Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body)?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        let message = self.compose(to, VerificationMail::new(code))?;
        self.transport.send(message).await?;
        tracing::info!(to, "Verification code mailed");
        Ok(())
    }
}

/// Writes the code to the log instead of sending it.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        tracing::warn!(to, code, "No SMTP relay configured, verification code not mailed");
        Ok(())
    }
}

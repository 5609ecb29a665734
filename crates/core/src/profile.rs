//! Profile validation and onboarding wizard progress.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::CoreError;

/// Maximum length of a name or department field.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of an email address (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("valid regex")
});

/// Trim and lowercase an email address for storage and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Validate the syntax of an email address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(CoreError::Validation("Email is required".to_string()));
    }
    if email.len() > MAX_EMAIL_LENGTH || !EMAIL_RE.is_match(email) {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

/// Validate an address submitted for company verification.
///
/// When `company_domain` is set, the address must belong to that domain
/// (case-insensitive, exact domain match).
pub fn validate_company_email(email: &str, company_domain: Option<&str>) -> Result<(), CoreError> {
    validate_email(email)?;
    if let Some(domain) = company_domain {
        let email = normalize_email(email);
        let domain = domain.trim().trim_start_matches('@').to_ascii_lowercase();
        let matches = email
            .rsplit_once('@')
            .is_some_and(|(_, host)| host == domain);
        if !matches {
            return Err(CoreError::Validation(format!(
                "Company email must be an @{domain} address"
            )));
        }
    }
    Ok(())
}

fn validate_required_name(value: &str, label: &str) -> Result<(), CoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{label} is required")));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{label} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional free-text field against [`MAX_NAME_LENGTH`].
pub fn validate_optional_text(value: Option<&str>, label: &str) -> Result<(), CoreError> {
    match value {
        Some(v) if v.chars().count() > MAX_NAME_LENGTH => Err(CoreError::Validation(format!(
            "{label} must be at most {MAX_NAME_LENGTH} characters"
        ))),
        _ => Ok(()),
    }
}

/// Validate the bio step of the onboarding wizard.
pub fn validate_bio(
    first_name: &str,
    last_name: &str,
    department: Option<&str>,
) -> Result<(), CoreError> {
    validate_required_name(first_name, "First name")?;
    validate_required_name(last_name, "Last name")?;
    validate_optional_text(department, "Department")
}

// ---------------------------------------------------------------------------
// Wizard progress
// ---------------------------------------------------------------------------

/// Wizard step keys, in the order the portal presents them.
pub const STEP_BIO: &str = "bio";
pub const STEP_EMAIL: &str = "email";
pub const STEP_CHECKLIST: &str = "checklist";

/// Snapshot of a user's progress through the onboarding wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WizardProgress {
    pub bio_completed: bool,
    pub email_verified: bool,
    pub checklist_completed: bool,
}

impl WizardProgress {
    /// The first unfinished step, or `None` when everything is done.
    pub fn next_step(&self) -> Option<&'static str> {
        if !self.bio_completed {
            Some(STEP_BIO)
        } else if !self.email_verified {
            Some(STEP_EMAIL)
        } else if !self.checklist_completed {
            Some(STEP_CHECKLIST)
        } else {
            None
        }
    }

    pub fn is_complete(&self) -> bool {
        self.next_step().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_bio_passes() {
        assert!(validate_bio("Ada", "Lovelace", Some("Platform")).is_ok());
        assert!(validate_bio("Ada", "Lovelace", None).is_ok());
    }

    #[test]
    fn empty_last_name_rejected() {
        let err = validate_bio("Ada", "   ", None).unwrap_err();
        assert!(err.to_string().contains("Last name is required"));
    }

    #[test]
    fn overlong_fields_rejected() {
        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(validate_bio(&long, "Lovelace", None).is_err());
        assert!(validate_bio("Ada", "Lovelace", Some(&long)).is_err());
    }

    #[test]
    fn email_syntax() {
        assert!(validate_email("dev@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.co").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("dev@localhost").is_err());
    }

    #[test]
    fn company_domain_enforced_when_configured() {
        assert!(validate_company_email("dev@acme.io", Some("acme.io")).is_ok());
        assert!(validate_company_email("Dev@ACME.io", Some("@acme.io")).is_ok());
        assert!(validate_company_email("dev@gmail.com", Some("acme.io")).is_err());
        assert!(validate_company_email("dev@evil-acme.io", Some("acme.io")).is_err());
        assert!(validate_company_email("dev@gmail.com", None).is_ok());
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_email("  Dev@Acme.IO "), "dev@acme.io");
    }

    #[test]
    fn wizard_steps_in_order() {
        let mut progress = WizardProgress {
            bio_completed: false,
            email_verified: false,
            checklist_completed: false,
        };
        assert_eq!(progress.next_step(), Some(STEP_BIO));
        progress.bio_completed = true;
        assert_eq!(progress.next_step(), Some(STEP_EMAIL));
        progress.email_verified = true;
        assert_eq!(progress.next_step(), Some(STEP_CHECKLIST));
        progress.checklist_completed = true;
        assert!(progress.is_complete());
    }
}

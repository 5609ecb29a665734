//! Landing page builder: block types, slugs and content validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Section types
// ---------------------------------------------------------------------------

pub const SECTION_HERO: &str = "hero";
pub const SECTION_FEATURES: &str = "features";
pub const SECTION_TEXT: &str = "text";
pub const SECTION_IMAGE: &str = "image";
pub const SECTION_CTA: &str = "cta";
pub const SECTION_FAQ: &str = "faq";
/// Embeds a published form; `content.form_id` names it.
pub const SECTION_FORM: &str = "form";

pub const VALID_SECTION_TYPES: &[&str] = &[
    SECTION_HERO,
    SECTION_FEATURES,
    SECTION_TEXT,
    SECTION_IMAGE,
    SECTION_CTA,
    SECTION_FAQ,
    SECTION_FORM,
];

// ---------------------------------------------------------------------------
// Component types
// ---------------------------------------------------------------------------

pub const COMPONENT_HEADING: &str = "heading";
pub const COMPONENT_PARAGRAPH: &str = "paragraph";
pub const COMPONENT_IMAGE: &str = "image";
pub const COMPONENT_BUTTON: &str = "button";
pub const COMPONENT_LIST: &str = "list";
pub const COMPONENT_EMBED: &str = "embed";

pub const VALID_COMPONENT_TYPES: &[&str] = &[
    COMPONENT_HEADING,
    COMPONENT_PARAGRAPH,
    COMPONENT_IMAGE,
    COMPONENT_BUTTON,
    COMPONENT_LIST,
    COMPONENT_EMBED,
];

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub const MAX_SLUG_LENGTH: usize = 80;
pub const MAX_TITLE_LENGTH: usize = 200;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex"));

/// Validate a URL slug: lowercase alphanumerics separated by single hyphens.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LENGTH || !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "Invalid slug '{slug}'. Use lowercase letters, digits and single hyphens \
             (max {MAX_SLUG_LENGTH} characters)"
        )));
    }
    Ok(())
}

/// Validate a page, section, or form title.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_section_type(section_type: &str) -> Result<(), CoreError> {
    if VALID_SECTION_TYPES.contains(&section_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid section type '{section_type}'. Must be one of: {VALID_SECTION_TYPES:?}"
        )))
    }
}

pub fn validate_component_type(component_type: &str) -> Result<(), CoreError> {
    if VALID_COMPONENT_TYPES.contains(&component_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid component type '{component_type}'. Must be one of: {VALID_COMPONENT_TYPES:?}"
        )))
    }
}

/// Block content must be a JSON object. A `form` section must reference a
/// form through an integer `form_id`.
pub fn validate_block_content(
    section_type: Option<&str>,
    content: &serde_json::Value,
) -> Result<(), CoreError> {
    let Some(object) = content.as_object() else {
        return Err(CoreError::Validation(
            "Block content must be a JSON object".to_string(),
        ));
    };
    if section_type == Some(SECTION_FORM) && !object.get("form_id").is_some_and(|v| v.is_i64()) {
        return Err(CoreError::Validation(
            "Form sections require an integer 'form_id' in content".to_string(),
        ));
    }
    Ok(())
}

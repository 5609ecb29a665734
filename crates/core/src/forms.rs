//! Form builder question types and answer validation.
//!
//! Answers travel as JSON values:
//!
//! | Question type     | Answer shape                     |
//! |-------------------|----------------------------------|
//! | `short_text`      | string (max 500 chars)           |
//! | `long_text`       | string (max 10 000 chars)        |
//! | `email`           | string, valid email address      |
//! | `number`          | JSON number                      |
//! | `checkbox`        | boolean, `true` when required    |
//! | `single_choice`   | option id                        |
//! | `multiple_choice` | array of distinct option ids     |

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::error::CoreError;
use crate::profile::validate_email;
use crate::types::DbId;

pub const QUESTION_SHORT_TEXT: &str = "short_text";
pub const QUESTION_LONG_TEXT: &str = "long_text";
pub const QUESTION_EMAIL: &str = "email";
pub const QUESTION_NUMBER: &str = "number";
pub const QUESTION_CHECKBOX: &str = "checkbox";
pub const QUESTION_SINGLE_CHOICE: &str = "single_choice";
pub const QUESTION_MULTIPLE_CHOICE: &str = "multiple_choice";

pub const VALID_QUESTION_TYPES: &[&str] = &[
    QUESTION_SHORT_TEXT,
    QUESTION_LONG_TEXT,
    QUESTION_EMAIL,
    QUESTION_NUMBER,
    QUESTION_CHECKBOX,
    QUESTION_SINGLE_CHOICE,
    QUESTION_MULTIPLE_CHOICE,
];

pub const MAX_SHORT_TEXT_LENGTH: usize = 500;
pub const MAX_LONG_TEXT_LENGTH: usize = 10_000;
pub const MAX_OPTIONS: usize = 50;

/// Whether answers to this type reference option ids.
pub fn is_choice_type(question_type: &str) -> bool {
    question_type == QUESTION_SINGLE_CHOICE || question_type == QUESTION_MULTIPLE_CHOICE
}

/// Validate a question definition together with its option labels.
pub fn validate_question(
    question_type: &str,
    label: &str,
    option_labels: &[String],
) -> Result<(), CoreError> {
    if !VALID_QUESTION_TYPES.contains(&question_type) {
        return Err(CoreError::Validation(format!(
            "Invalid question type '{question_type}'. Must be one of: {VALID_QUESTION_TYPES:?}"
        )));
    }
    if label.trim().is_empty() {
        return Err(CoreError::Validation("Question label is required".to_string()));
    }
    if is_choice_type(question_type) {
        if option_labels.is_empty() {
            return Err(CoreError::Validation(format!(
                "Questions of type '{question_type}' need at least one option"
            )));
        }
        if option_labels.len() > MAX_OPTIONS {
            return Err(CoreError::Validation(format!(
                "A question may have at most {MAX_OPTIONS} options"
            )));
        }
        if option_labels.iter().any(|o| o.trim().is_empty()) {
            return Err(CoreError::Validation("Option labels must not be empty".to_string()));
        }
    } else if !option_labels.is_empty() {
        return Err(CoreError::Validation(format!(
            "Questions of type '{question_type}' do not take options"
        )));
    }
    Ok(())
}

/// The subset of a stored question needed to validate an answer.
#[derive(Debug, Clone)]
pub struct QuestionRule {
    pub id: DbId,
    pub question_type: String,
    pub is_required: bool,
    pub option_ids: Vec<DbId>,
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn invalid(question_id: DbId, reason: &str) -> CoreError {
    CoreError::Validation(format!("Answer to question {question_id} {reason}"))
}

fn validate_text(question_id: DbId, value: &Value, max: usize) -> Result<(), CoreError> {
    match value.as_str() {
        Some(s) if s.chars().count() <= max => Ok(()),
        Some(_) => Err(invalid(question_id, &format!("exceeds {max} characters"))),
        None => Err(invalid(question_id, "must be text")),
    }
}

/// Validate a single answer value against its question.
pub fn validate_answer(rule: &QuestionRule, value: &Value) -> Result<(), CoreError> {
    let id = rule.id;
    match rule.question_type.as_str() {
        QUESTION_SHORT_TEXT => validate_text(id, value, MAX_SHORT_TEXT_LENGTH),
        QUESTION_LONG_TEXT => validate_text(id, value, MAX_LONG_TEXT_LENGTH),
        QUESTION_EMAIL => {
            let s = value.as_str().ok_or_else(|| invalid(id, "must be text"))?;
            validate_email(s).map_err(|_| invalid(id, "must be a valid email address"))
        }
        QUESTION_NUMBER => value
            .is_number()
            .then_some(())
            .ok_or_else(|| invalid(id, "must be a number")),
        QUESTION_CHECKBOX => match value.as_bool() {
            Some(false) if rule.is_required => Err(invalid(id, "must be checked")),
            Some(_) => Ok(()),
            None => Err(invalid(id, "must be true or false")),
        },
        QUESTION_SINGLE_CHOICE => {
            let option = value.as_i64().ok_or_else(|| invalid(id, "must be an option id"))?;
            if rule.option_ids.contains(&option) {
                Ok(())
            } else {
                Err(invalid(id, &format!("references unknown option {option}")))
            }
        }
        QUESTION_MULTIPLE_CHOICE => {
            let items = value
                .as_array()
                .ok_or_else(|| invalid(id, "must be a list of option ids"))?;
            let mut seen = HashSet::new();
            for item in items {
                let option = item
                    .as_i64()
                    .ok_or_else(|| invalid(id, "must be a list of option ids"))?;
                if !rule.option_ids.contains(&option) {
                    return Err(invalid(id, &format!("references unknown option {option}")));
                }
                if !seen.insert(option) {
                    return Err(invalid(id, &format!("repeats option {option}")));
                }
            }
            Ok(())
        }
        other => Err(CoreError::Internal(format!(
            "Stored question {id} has unknown type '{other}'"
        ))),
    }
}

/// Validate a whole submission: every answer targets a question of the form,
/// required questions are answered, and each answer fits its question.
///
/// Blank answers to optional questions are accepted and should be dropped by
/// the caller.
pub fn validate_submission(
    rules: &[QuestionRule],
    answers: &HashMap<DbId, Value>,
) -> Result<(), CoreError> {
    let by_id: HashMap<DbId, &QuestionRule> = rules.iter().map(|r| (r.id, r)).collect();

    if let Some(unknown) = answers.keys().find(|id| !by_id.contains_key(id)) {
        return Err(CoreError::Validation(format!(
            "Question {unknown} does not belong to this form"
        )));
    }

    for rule in rules {
        match answers.get(&rule.id) {
            Some(value) if !is_blank(value) => validate_answer(rule, value)?,
            _ if rule.is_required => {
                return Err(CoreError::Validation(format!(
                    "Question {} is required",
                    rule.id
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Whether a submitted value carries an answer worth storing.
pub fn has_answer(value: &Value) -> bool {
    !is_blank(value)
}

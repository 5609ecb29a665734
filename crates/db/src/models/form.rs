//! Form builder models: forms, questions, options, submissions, answers.

use onboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `forms` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct Form {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub slug: String,
    pub is_published: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateForm {
    pub title: String,
    pub description: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub is_published: Option<bool>,
}

/// A row from the `form_questions` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct FormQuestion {
    pub id: DbId,
    pub form_id: DbId,
    pub question_type: String,
    pub label: String,
    pub help_text: Option<String>,
    pub is_required: bool,
    pub order_index: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `form_question_options` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct FormQuestionOption {
    pub id: DbId,
    pub question_id: DbId,
    pub label: String,
    pub order_index: i32,
}

/// DTO for creating a question with its option labels in display order.
#[derive(Debug, Deserialize)]
pub struct CreateQuestion {
    pub question_type: String,
    pub label: String,
    pub help_text: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

/// DTO for updating a question. When `options` is present it replaces the
/// whole option list.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuestion {
    pub question_type: Option<String>,
    pub label: Option<String>,
    pub help_text: Option<String>,
    pub is_required: Option<bool>,
    pub options: Option<Vec<String>>,
}

/// A question with its ordered options.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct QuestionWithOptions {
    #[serde(flatten)]
    #[ts(flatten)]
    pub question: FormQuestion,
    pub options: Vec<FormQuestionOption>,
}

/// A form with its ordered questions.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct FormTree {
    #[serde(flatten)]
    #[ts(flatten)]
    pub form: Form,
    pub questions: Vec<QuestionWithOptions>,
}

/// A row from the `form_submissions` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct FormSubmission {
    pub id: DbId,
    pub form_id: DbId,
    pub user_id: Option<DbId>,
    pub submitted_at: Timestamp,
}

/// A row from the `form_answers` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct FormAnswer {
    pub id: DbId,
    pub submission_id: DbId,
    pub question_id: DbId,
    pub value: serde_json::Value,
}

/// A submission with its answers.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct SubmissionWithAnswers {
    #[serde(flatten)]
    #[ts(flatten)]
    pub submission: FormSubmission,
    pub answers: Vec<FormAnswer>,
}

//! Repository for the forms builder and its submissions.

use std::collections::HashMap;

use onboard_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use super::ordering::{reorder_children, ReorderOutcome};
use crate::models::form::{
    CreateForm, CreateQuestion, Form, FormAnswer, FormQuestion, FormQuestionOption, FormSubmission,
    FormTree, QuestionWithOptions, SubmissionWithAnswers, UpdateForm, UpdateQuestion,
};

const FORM_COLUMNS: &str =
    "id, title, description, slug, is_published, created_by, created_at, updated_at";

const QUESTION_COLUMNS: &str = "id, form_id, question_type, label, help_text, is_required, \
                                 order_index, created_at, updated_at";

const OPTION_COLUMNS: &str = "id, question_id, label, order_index";

pub struct FormRepo;

impl FormRepo {
    // -----------------------------------------------------------------------
    // Forms
    // -----------------------------------------------------------------------

    /// Create a form. A taken slug violates `uq_forms_slug`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateForm,
        created_by: DbId,
    ) -> Result<Form, sqlx::Error> {
        let query = format!(
            "INSERT INTO forms (title, description, slug, is_published, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {FORM_COLUMNS}"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(&input.slug)
            .bind(input.is_published)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Form>, sqlx::Error> {
        let query = format!("SELECT {FORM_COLUMNS} FROM forms ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Form>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Form>, sqlx::Error> {
        let query = format!("SELECT {FORM_COLUMNS} FROM forms WHERE id = $1");
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A published form by slug. Drafts are invisible here.
    pub async fn find_published_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Form>, sqlx::Error> {
        let query = format!("SELECT {FORM_COLUMNS} FROM forms WHERE slug = $1 AND is_published");
        sqlx::query_as::<_, Form>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateForm,
    ) -> Result<Option<Form>, sqlx::Error> {
        let query = format!(
            "UPDATE forms SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                slug = COALESCE($4, slug),
                is_published = COALESCE($5, is_published)
             WHERE id = $1
             RETURNING {FORM_COLUMNS}"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.slug)
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Questions
    // -----------------------------------------------------------------------

    /// Append a question with its options in one transaction.
    pub async fn create_question(
        pool: &PgPool,
        form_id: DbId,
        input: &CreateQuestion,
    ) -> Result<QuestionWithOptions, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO form_questions (form_id, question_type, label, help_text, is_required, order_index)
             VALUES ($1, $2, $3, $4, $5,
                     (SELECT COALESCE(MAX(order_index) + 1, 0) FROM form_questions WHERE form_id = $1))
             RETURNING {QUESTION_COLUMNS}"
        );
        let question = sqlx::query_as::<_, FormQuestion>(&query)
            .bind(form_id)
            .bind(&input.question_type)
            .bind(input.label.trim())
            .bind(&input.help_text)
            .bind(input.is_required)
            .fetch_one(&mut *tx)
            .await?;

        let options = insert_options(&mut tx, question.id, &input.options).await?;

        tx.commit().await?;
        Ok(QuestionWithOptions { question, options })
    }

    /// Update a question. A present `options` list replaces the old options.
    pub async fn update_question(
        pool: &PgPool,
        form_id: DbId,
        question_id: DbId,
        input: &UpdateQuestion,
    ) -> Result<Option<QuestionWithOptions>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE form_questions SET
                question_type = COALESCE($3, question_type),
                label = COALESCE($4, label),
                help_text = COALESCE($5, help_text),
                is_required = COALESCE($6, is_required)
             WHERE id = $2 AND form_id = $1
             RETURNING {QUESTION_COLUMNS}"
        );
        let Some(question) = sqlx::query_as::<_, FormQuestion>(&query)
            .bind(form_id)
            .bind(question_id)
            .bind(&input.question_type)
            .bind(&input.label)
            .bind(&input.help_text)
            .bind(input.is_required)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let options = match &input.options {
            Some(labels) => {
                sqlx::query("DELETE FROM form_question_options WHERE question_id = $1")
                    .bind(question.id)
                    .execute(&mut *tx)
                    .await?;
                insert_options(&mut tx, question.id, labels).await?
            }
            None => {
                let query = format!(
                    "SELECT {OPTION_COLUMNS} FROM form_question_options
                     WHERE question_id = $1 ORDER BY order_index, id"
                );
                sqlx::query_as::<_, FormQuestionOption>(&query)
                    .bind(question.id)
                    .fetch_all(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;
        Ok(Some(QuestionWithOptions { question, options }))
    }

    pub async fn delete_question(
        pool: &PgPool,
        form_id: DbId,
        question_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM form_questions WHERE id = $2 AND form_id = $1")
            .bind(form_id)
            .bind(question_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn reorder_questions(
        pool: &PgPool,
        form_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<ReorderOutcome, sqlx::Error> {
        reorder_children(pool, "form_questions", "form_id", form_id, ordered_ids).await
    }

    /// Questions of a form with their options, in display order.
    pub async fn questions(
        pool: &PgPool,
        form_id: DbId,
    ) -> Result<Vec<QuestionWithOptions>, sqlx::Error> {
        let query = format!(
            "SELECT {QUESTION_COLUMNS} FROM form_questions
             WHERE form_id = $1 ORDER BY order_index, id"
        );
        let questions = sqlx::query_as::<_, FormQuestion>(&query)
            .bind(form_id)
            .fetch_all(pool)
            .await?;

        let question_ids: Vec<DbId> = questions.iter().map(|q| q.id).collect();
        let query = format!(
            "SELECT {OPTION_COLUMNS} FROM form_question_options
             WHERE question_id = ANY($1) ORDER BY order_index, id"
        );
        let options = sqlx::query_as::<_, FormQuestionOption>(&query)
            .bind(&question_ids)
            .fetch_all(pool)
            .await?;

        let mut by_question: HashMap<DbId, Vec<FormQuestionOption>> = HashMap::new();
        for option in options {
            by_question.entry(option.question_id).or_default().push(option);
        }

        Ok(questions
            .into_iter()
            .map(|question| QuestionWithOptions {
                options: by_question.remove(&question.id).unwrap_or_default(),
                question,
            })
            .collect())
    }

    pub async fn tree(pool: &PgPool, form: Form) -> Result<FormTree, sqlx::Error> {
        let questions = Self::questions(pool, form.id).await?;
        Ok(FormTree { form, questions })
    }

    // -----------------------------------------------------------------------
    // Submissions
    // -----------------------------------------------------------------------

    /// Store a submission and its answers atomically. Answers must already be
    /// validated against the form's questions.
    pub async fn submit(
        pool: &PgPool,
        form_id: DbId,
        user_id: Option<DbId>,
        answers: &[(DbId, serde_json::Value)],
    ) -> Result<SubmissionWithAnswers, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let submission = sqlx::query_as::<_, FormSubmission>(
            "INSERT INTO form_submissions (form_id, user_id)
             VALUES ($1, $2)
             RETURNING id, form_id, user_id, submitted_at",
        )
        .bind(form_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut stored = Vec::with_capacity(answers.len());
        for (question_id, value) in answers {
            let answer = sqlx::query_as::<_, FormAnswer>(
                "INSERT INTO form_answers (submission_id, question_id, value)
                 VALUES ($1, $2, $3)
                 RETURNING id, submission_id, question_id, value",
            )
            .bind(submission.id)
            .bind(question_id)
            .bind(value)
            .fetch_one(&mut *tx)
            .await?;
            stored.push(answer);
        }

        tx.commit().await?;
        Ok(SubmissionWithAnswers {
            submission,
            answers: stored,
        })
    }

    /// Submissions of a form with their answers, newest first.
    pub async fn list_submissions(
        pool: &PgPool,
        form_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SubmissionWithAnswers>, sqlx::Error> {
        let submissions = sqlx::query_as::<_, FormSubmission>(
            "SELECT id, form_id, user_id, submitted_at FROM form_submissions
             WHERE form_id = $1
             ORDER BY submitted_at DESC, id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(form_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let submission_ids: Vec<DbId> = submissions.iter().map(|s| s.id).collect();
        let answers = sqlx::query_as::<_, FormAnswer>(
            "SELECT a.id, a.submission_id, a.question_id, a.value
             FROM form_answers a
             JOIN form_questions q ON q.id = a.question_id
             WHERE a.submission_id = ANY($1)
             ORDER BY q.order_index, q.id",
        )
        .bind(&submission_ids)
        .fetch_all(pool)
        .await?;

        let mut by_submission: HashMap<DbId, Vec<FormAnswer>> = HashMap::new();
        for answer in answers {
            by_submission
                .entry(answer.submission_id)
                .or_default()
                .push(answer);
        }

        Ok(submissions
            .into_iter()
            .map(|submission| SubmissionWithAnswers {
                answers: by_submission.remove(&submission.id).unwrap_or_default(),
                submission,
            })
            .collect())
    }
}

async fn insert_options(
    tx: &mut Transaction<'_, Postgres>,
    question_id: DbId,
    labels: &[String],
) -> Result<Vec<FormQuestionOption>, sqlx::Error> {
    let mut options = Vec::with_capacity(labels.len());
    for (index, label) in labels.iter().enumerate() {
        let query = format!(
            "INSERT INTO form_question_options (question_id, label, order_index)
             VALUES ($1, $2, $3)
             RETURNING {OPTION_COLUMNS}"
        );
        let option = sqlx::query_as::<_, FormQuestionOption>(&query)
            .bind(question_id)
            .bind(label.trim())
            .bind(index as i32)
            .fetch_one(&mut **tx)
            .await?;
        options.push(option);
    }
    Ok(options)
}

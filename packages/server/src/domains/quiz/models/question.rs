use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;

/// Quiz question - SQL persistence layer
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: i64,
    pub category_id: i64,
    pub question: String,
    pub explanation: Option<String>,
}

/// Answer option belonging to a question. `is_correct` only appears in
/// admin payloads; the public quiz payload carries a bare index instead.
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

/// Flattened join row for the admin question listing
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct QuestionWithCategory {
    pub id: i64,
    pub category_id: i64,
    pub question: String,
    pub explanation: Option<String>,
    pub category_key: String,
    pub category_title: String,
}

impl QuizQuestion {
    pub async fn find_by_id(id: i64, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM quiz_questions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Questions of one category in creation order
    pub async fn list_for_category(category_id: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM quiz_questions WHERE category_id = $1 ORDER BY id ASC",
        )
        .bind(category_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Every question joined with its category, sorted for the admin
    /// console (category key, then question id)
    pub async fn list_all_with_category(pool: &PgPool) -> Result<Vec<QuestionWithCategory>> {
        sqlx::query_as::<_, QuestionWithCategory>(
            "SELECT q.id, q.category_id, q.question, q.explanation,
                    c.key AS category_key, c.title AS category_title
             FROM quiz_questions q
             JOIN quiz_categories c ON c.id = q.category_id
             ORDER BY c.key ASC, q.id ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a question together with its options in one transaction
    pub async fn create_with_options(
        category_id: i64,
        question: &str,
        explanation: Option<&str>,
        options: &[(String, bool)],
        pool: &PgPool,
    ) -> Result<(Self, Vec<QuizOption>)> {
        let mut tx = pool.begin().await?;

        let created = sqlx::query_as::<_, Self>(
            "INSERT INTO quiz_questions (category_id, question, explanation)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(category_id)
        .bind(question)
        .bind(explanation)
        .fetch_one(&mut *tx)
        .await?;

        let mut created_options = Vec::with_capacity(options.len());
        for (text, is_correct) in options {
            let option = sqlx::query_as::<_, QuizOption>(
                "INSERT INTO quiz_options (question_id, text, is_correct)
                 VALUES ($1, $2, $3)
                 RETURNING *",
            )
            .bind(created.id)
            .bind(text)
            .bind(is_correct)
            .fetch_one(&mut *tx)
            .await?;
            created_options.push(option);
        }

        tx.commit().await?;
        Ok((created, created_options))
    }

    /// Rewrite a question and replace its options wholesale. A `None`
    /// category keeps the question where it is. Returns `None` when the
    /// question does not exist.
    pub async fn update_with_options(
        id: i64,
        category_id: Option<i64>,
        question: &str,
        explanation: Option<&str>,
        options: &[(String, bool)],
        pool: &PgPool,
    ) -> Result<Option<(Self, Vec<QuizOption>)>> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query_as::<_, Self>(
            "UPDATE quiz_questions
             SET category_id = COALESCE($2, category_id),
                 question = $3,
                 explanation = $4
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(category_id)
        .bind(question)
        .bind(explanation)
        .fetch_optional(&mut *tx)
        .await?;

        let updated = match updated {
            Some(updated) => updated,
            None => return Ok(None),
        };

        sqlx::query("DELETE FROM quiz_options WHERE question_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let mut created_options = Vec::with_capacity(options.len());
        for (text, is_correct) in options {
            let option = sqlx::query_as::<_, QuizOption>(
                "INSERT INTO quiz_options (question_id, text, is_correct)
                 VALUES ($1, $2, $3)
                 RETURNING *",
            )
            .bind(id)
            .bind(text)
            .bind(is_correct)
            .fetch_one(&mut *tx)
            .await?;
            created_options.push(option);
        }

        tx.commit().await?;
        Ok(Some((updated, created_options)))
    }

    /// Delete a question and its options. Returns false when nothing
    /// matched.
    pub async fn delete_with_options(id: i64, pool: &PgPool) -> Result<bool> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM quiz_options WHERE question_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM quiz_questions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

impl QuizOption {
    /// Options of one question in creation order
    pub async fn list_for_question(question_id: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM quiz_options WHERE question_id = $1 ORDER BY id ASC",
        )
        .bind(question_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Options for a batch of questions, grouped client-side
    pub async fn list_for_questions(question_ids: &[i64], pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM quiz_options WHERE question_id = ANY($1) ORDER BY question_id ASC, id ASC",
        )
        .bind(question_ids)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

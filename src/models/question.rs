use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Page size of every question listing.
pub const QUESTIONS_PER_PAGE: i64 = 10;

/// Full question record, answer included. Serialized only on curator
/// surfaces and listings; quiz play uses [`PublicQuestion`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub difficulty: i32,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Answer-free representation handed to players.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub question: String,
    pub difficulty: i32,
    pub category_id: i64,
}

impl Question {
    pub fn public(&self) -> PublicQuestion {
        PublicQuestion {
            id: self.id,
            question: self.question.clone(),
            difficulty: self.difficulty,
            category_id: self.category_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestionData {
    pub question: String,
    pub answer: String,
    pub difficulty: i32,
    pub category_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuestionData {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub difficulty: Option<i32>,
    pub category_id: Option<i64>,
}

impl UpdateQuestionData {
    pub fn is_empty(&self) -> bool {
        self.question.is_none()
            && self.answer.is_none()
            && self.difficulty.is_none()
            && self.category_id.is_none()
    }
}

impl Question {
    /// Creates a new question record
    pub async fn create(pool: &PgPool, data: CreateQuestionData) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO questions (question, answer, difficulty, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.question)
        .bind(&data.answer)
        .bind(data.difficulty)
        .bind(data.category_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM questions WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Partial update with PATCH semantics. Returns the updated row,
    /// or None when the question does not exist.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateQuestionData,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE questions
            SET
                question = COALESCE($2, question),
                answer = COALESCE($3, answer),
                difficulty = COALESCE($4, difficulty),
                category_id = COALESCE($5, category_id)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.question)
        .bind(data.answer)
        .bind(data.difficulty)
        .bind(data.category_id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a question. Returns false when no row matched.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM questions WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM questions
            "#,
        )
        .fetch_one(pool)
        .await
    }

    pub async fn count_by_category(pool: &PgPool, category_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM questions WHERE category_id = $1
            "#,
        )
        .bind(category_id)
        .fetch_one(pool)
        .await
    }

    /// One page of questions, id order. `page` is 1-based.
    pub async fn page(pool: &PgPool, page: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM questions
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(QUESTIONS_PER_PAGE)
        .bind((page - 1) * QUESTIONS_PER_PAGE)
        .fetch_all(pool)
        .await
    }

    pub async fn page_by_category(
        pool: &PgPool,
        category_id: i64,
        page: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM questions
            WHERE category_id = $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category_id)
        .bind(QUESTIONS_PER_PAGE)
        .bind((page - 1) * QUESTIONS_PER_PAGE)
        .fetch_all(pool)
        .await
    }

    /// Case-insensitive substring search over question text.
    pub async fn search(pool: &PgPool, term: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM questions
            WHERE question ILIKE $1
            ORDER BY id
            "#,
        )
        .bind(format!("%{}%", term))
        .fetch_all(pool)
        .await
    }

    /// Every question in one category, for quiz selection.
    pub async fn list_by_category(
        pool: &PgPool,
        category_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM questions WHERE category_id = $1
            "#,
        )
        .bind(category_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM questions
            "#,
        )
        .fetch_all(pool)
        .await
    }
}

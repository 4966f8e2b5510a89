use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::{middleware::auth::Claims, AppState};
use crate::error::{AppError, Result};
use crate::models::question::{CreateQuestionData, UpdateQuestionData, QUESTIONS_PER_PAGE};
use crate::models::{Category, Question};

/// Largest page whose OFFSET still fits in an i64.
const MAX_PAGE: i64 = i64::MAX / QUESTIONS_PER_PAGE;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
}

/// Resolves the 1-based page query parameter, defaulting to the first page.
pub fn resolve_page(page: Option<i64>) -> Result<i64> {
    match page {
        None => Ok(1),
        Some(p) if (1..=MAX_PAGE).contains(&p) => Ok(p),
        Some(p) => Err(AppError::BadRequest(format!("invalid page {}", p))),
    }
}

/// A page past the end of the question list is a 404.
fn non_empty_page(questions: Vec<Question>, page: i64) -> Result<Vec<Question>> {
    if questions.is_empty() {
        Err(AppError::NotFound(format!("no questions on page {}", page)))
    } else {
        Ok(questions)
    }
}

/// Deleting a question that does not exist is a 422.
fn ensure_deleted(deleted: bool, question_id: i64) -> Result<()> {
    if deleted {
        Ok(())
    } else {
        Err(AppError::Unprocessable(format!(
            "question {} does not exist",
            question_id
        )))
    }
}

/// Maps constraint violations (unknown category, difficulty range) to 422.
fn constraint_to_unprocessable(error: sqlx::Error) -> AppError {
    let is_constraint = error
        .as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation() || db.is_check_violation());

    if is_constraint {
        AppError::Unprocessable(error.to_string())
    } else {
        AppError::Database(error)
    }
}

#[derive(Debug, Serialize)]
struct QuestionListResponse {
    questions: Vec<Question>,
    page: i64,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
    current_category: Vec<i64>,
}

/// GET /questions?page=N
async fn list_questions(
    State(state): State<AppState>,
    params: std::result::Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<QuestionListResponse>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.to_string()))?;
    let page = resolve_page(params.page)?;

    let questions = non_empty_page(Question::page(&state.pool, page).await?, page)?;

    let total_questions = Question::count(&state.pool).await?;
    let categories = Category::list_all(&state.pool).await?;
    let current_category = questions.iter().map(|q| q.category_id).collect();

    Ok(Json(QuestionListResponse {
        questions,
        page,
        total_questions,
        categories: Category::as_map(&categories),
        current_category,
    }))
}

#[derive(Debug, Serialize)]
struct CreatedResponse {
    success: bool,
    created: i64,
}

/// POST /questions, requires `post:questions`
async fn create_question(
    State(state): State<AppState>,
    claims: Claims,
    payload: std::result::Result<Json<CreateQuestionData>, JsonRejection>,
) -> Result<Json<CreatedResponse>> {
    claims.require("post:questions")?;

    let Json(data) = payload.map_err(|e| AppError::BadRequest(e.to_string()))?;

    let question = Question::create(&state.pool, data)
        .await
        .map_err(constraint_to_unprocessable)?;

    tracing::info!(question_id = question.id, "question created");

    Ok(Json(CreatedResponse {
        success: true,
        created: question.id,
    }))
}

#[derive(Debug, Serialize)]
struct DeletedResponse {
    success: bool,
    deleted: i64,
}

/// DELETE /questions/:id, requires `delete:questions`
async fn delete_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    claims: Claims,
) -> Result<Json<DeletedResponse>> {
    claims.require("delete:questions")?;

    let deleted = Question::delete(&state.pool, question_id).await?;
    ensure_deleted(deleted, question_id)?;

    tracing::info!(question_id, "question deleted");

    Ok(Json(DeletedResponse {
        success: true,
        deleted: question_id,
    }))
}

#[derive(Debug, Serialize)]
struct QuestionResponse {
    success: bool,
    question: Question,
}

/// PATCH /questions/:id, requires `patch:questions`
async fn update_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    claims: Claims,
    payload: std::result::Result<Json<UpdateQuestionData>, JsonRejection>,
) -> Result<Json<QuestionResponse>> {
    claims.require("patch:questions")?;

    let Json(data) = payload.map_err(|e| AppError::BadRequest(e.to_string()))?;
    if data.is_empty() {
        return Err(AppError::BadRequest("update changes nothing".to_string()));
    }

    let question = Question::update(&state.pool, question_id, data)
        .await
        .map_err(constraint_to_unprocessable)?
        .ok_or_else(|| AppError::NotFound(format!("question {}", question_id)))?;

    tracing::info!(question_id, "question updated");

    Ok(Json(QuestionResponse {
        success: true,
        question,
    }))
}

/// GET /questions/:id/answer, requires `get:answers`
async fn question_answer(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    claims: Claims,
) -> Result<Json<QuestionResponse>> {
    claims.require("get:answers")?;

    let question = Question::find_by_id(&state.pool, question_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("question {}", question_id)))?;

    Ok(Json(QuestionResponse {
        success: true,
        question,
    }))
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    search_term: String,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    questions: Vec<Question>,
    total_questions: i64,
    current_category: Vec<i64>,
}

/// POST /questions/search
async fn search_questions(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.to_string()))?;

    let questions = Question::search(&state.pool, &request.search_term).await?;
    let current_category = questions.iter().map(|q| q.category_id).collect();
    let total_questions = questions.len() as i64;

    Ok(Json(SearchResponse {
        questions,
        total_questions,
        current_category,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/search", post(search_questions))
        .route(
            "/questions/:id",
            delete(delete_question).patch(update_question),
        )
        .route("/questions/:id/answer", get(question_answer))
}

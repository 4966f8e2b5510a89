use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::api::questions::{resolve_page, PageParams};
use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::{Category, Question};

#[derive(Debug, Serialize)]
struct CategoriesResponse {
    categories: BTreeMap<i64, String>,
}

/// GET /categories
async fn list_categories(State(state): State<AppState>) -> Result<Json<CategoriesResponse>> {
    let categories = Category::list_all(&state.pool).await?;

    Ok(Json(CategoriesResponse {
        categories: Category::as_map(&categories),
    }))
}

#[derive(Debug, Serialize)]
struct CategoryQuestionsResponse {
    questions: Vec<Question>,
    page: i64,
    total_questions: i64,
    current_category: Vec<i64>,
}

/// GET /categories/:id/questions?page=N
async fn questions_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    params: std::result::Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<CategoryQuestionsResponse>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.to_string()))?;
    let page = resolve_page(params.page)?;

    require_category(Category::find_by_id(&state.pool, category_id).await?, category_id)?;

    let questions = Question::page_by_category(&state.pool, category_id, page).await?;
    let total_questions = Question::count_by_category(&state.pool, category_id).await?;
    let current_category = questions.iter().map(|q| q.category_id).collect();

    Ok(Json(CategoryQuestionsResponse {
        questions,
        page,
        total_questions,
        current_category,
    }))
}

/// A listing scoped to an unknown category is a 404.
fn require_category(category: Option<Category>, category_id: i64) -> Result<Category> {
    category.ok_or_else(|| AppError::NotFound(format!("category {}", category_id)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/:id/questions", get(questions_by_category))
}

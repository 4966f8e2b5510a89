use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::question::PublicQuestion;
use crate::models::Question;
use crate::services::quiz_picker;

/// Category id 0 selects from every category.
pub const ALL_CATEGORIES: i64 = 0;

#[derive(Debug, Deserialize)]
struct QuizRequest {
    previous_questions: Vec<i64>,
    quiz_category: QuizCategory,
}

#[derive(Debug, Deserialize)]
struct QuizCategory {
    id: i64,
}

#[derive(Debug, Serialize)]
struct QuizResponse {
    /// None once every candidate question has been played
    question: Option<PublicQuestion>,
}

/// POST /quizzes
async fn play_quiz(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QuizRequest>, JsonRejection>,
) -> Result<Json<QuizResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.to_string()))?;

    let pool = if request.quiz_category.id == ALL_CATEGORIES {
        Question::list_all(&state.pool).await?
    } else {
        Question::list_by_category(&state.pool, request.quiz_category.id).await?
    };

    let question = quiz_picker::pick_question(pool, &request.previous_questions);

    Ok(Json(QuizResponse {
        question: question.map(|q| q.public()),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/quizzes", post(play_quiz))
}

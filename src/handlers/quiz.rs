// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        question::{ChoiceTextUpdate, CorrectChoiceRequest, NewQuestion},
        quiz::{NewQuiz, QuizUpdate, VisibilityRequest},
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListQuizzesQuery {
    pub creator_id: Option<i64>,
    #[serde(default)]
    pub include_hidden: bool,
}

/// Lists quizzes.
///
/// * With `creator_id`: every quiz of that teacher, hidden ones included.
/// * Otherwise: visible quizzes, unless `include_hidden` is set.
pub async fn list_quizzes(
    State(state): State<AppState>,
    Query(query): Query<ListQuizzesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = match query.creator_id {
        Some(creator_id) => state.catalog.list_quizzes_by_creator(creator_id).await?,
        None => state.catalog.list_quizzes(query.include_hidden).await?,
    };

    Ok(Json(quizzes))
}

pub async fn create_quiz(
    State(state): State<AppState>,
    Json(payload): Json<NewQuiz>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id = state.catalog.create_quiz(&payload).await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Returns a quiz with its question count.
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = state
        .catalog
        .get_quiz_by_id(quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;
    let question_count = state.catalog.count_questions(quiz_id).await?;

    Ok(Json(serde_json::json!({
        "quiz": quiz,
        "question_count": question_count,
    })))
}

pub async fn update_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<QuizUpdate>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if !state.catalog.update_quiz(quiz_id, &payload).await? {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Hides or shows a quiz. Hidden quizzes reject new attempts.
pub async fn set_visibility(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<VisibilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !state.catalog.set_hidden(quiz_id, payload.hidden).await? {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Adds a question with its options to the end of a quiz.
pub async fn add_question(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<NewQuestion>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id = state
        .catalog
        .add_question(quiz_id, &payload)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

pub async fn update_option(
    State(state): State<AppState>,
    Path(option_id): Path<i64>,
    Json(payload): Json<ChoiceTextUpdate>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if !state.catalog.update_option_text(option_id, &payload.text).await? {
        return Err(AppError::NotFound("Option not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Moves the correct mark of a question to another of its options.
/// Scores of completed attempts are not affected.
pub async fn set_correct_option(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    Json(payload): Json<CorrectChoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !state
        .catalog
        .set_correct_option(question_id, payload.option_id)
        .await?
    {
        return Err(AppError::NotFound(
            "Option not found for this question".to_string(),
        ));
    }

    Ok(StatusCode::OK)
}
